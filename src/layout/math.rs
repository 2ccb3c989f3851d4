//! Superscript and subscript reconstruction.
//!
//! Raised or lowered spans that are noticeably smaller than the line's body
//! text are collected into runs and rendered in TeX-like notation
//! (`x^{2}`, `a_{i}`, `e^{x^{2}}`) attached to the preceding base token.

use super::line::needs_space;
use super::Line;
use crate::clean::text::symbol_density;
use crate::clean::MathThresholds;
use crate::model::{BBox, Role, Span};

/// Direction of a displaced span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// Raised above the baseline
    Superscript,
    /// Lowered below the baseline
    Subscript,
}

impl ScriptKind {
    fn marker(self) -> &'static str {
        match self {
            ScriptKind::Superscript => "^{",
            ScriptKind::Subscript => "_{",
        }
    }
}

/// A maximal run of adjacent super/subscript spans.
#[derive(Debug, Clone, PartialEq)]
pub struct MathRun {
    /// Base token followed by the rendered notation
    pub text: String,
    /// Union of the run's span boxes
    pub bbox: BBox,
    /// `Math` or `MathComplex`
    pub role: Role,
    /// Deepest nesting level found in the run
    pub depth: usize,
    /// Whether the run mixes superscripts and subscripts
    pub mixed: bool,
}

/// Line text with math notation spliced in, plus the runs it contains.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconstructedLine {
    /// Rendered line text
    pub text: String,
    /// Runs in left-to-right order
    pub runs: Vec<MathRun>,
}

/// Detects and renders super/subscript runs.
#[derive(Debug, Clone, Copy)]
pub struct MathReconstructor<'a> {
    thresholds: &'a MathThresholds,
}

impl<'a> MathReconstructor<'a> {
    /// Create a reconstructor.
    pub fn new(thresholds: &'a MathThresholds) -> Self {
        Self { thresholds }
    }

    /// Classify a span relative to its line.
    pub fn script_kind(&self, span: &Span, line_font_size: f32) -> Option<ScriptKind> {
        let limit = self.thresholds.offset_fraction * line_font_size;
        if span.baseline_offset.abs() <= limit || span.size_ratio >= self.thresholds.size_ratio_max {
            return None;
        }
        if span.baseline_offset < 0.0 {
            Some(ScriptKind::Superscript)
        } else {
            Some(ScriptKind::Subscript)
        }
    }

    /// Render a line, replacing displaced spans with notation.
    pub fn reconstruct(&self, line: &Line) -> ReconstructedLine {
        let kinds: Vec<Option<ScriptKind>> = line
            .spans
            .iter()
            .map(|s| self.script_kind(s, line.font_size))
            .collect();

        if kinds.iter().all(Option::is_none) {
            return ReconstructedLine {
                text: line.text(),
                runs: Vec::new(),
            };
        }

        let mut text = String::new();
        let mut runs = Vec::new();
        let mut i = 0;
        while i < line.spans.len() {
            if kinds[i].is_none() {
                if i > 0 && needs_space(&line.spans[i - 1], &line.spans[i]) {
                    text.push(' ');
                }
                text.push_str(&line.spans[i].text);
                i += 1;
                continue;
            }

            let start = i;
            while i < line.spans.len() && kinds[i].is_some() {
                i += 1;
            }
            let members: Vec<(&Span, ScriptKind)> = line.spans[start..i]
                .iter()
                .zip(kinds[start..i].iter().flatten().copied())
                .collect();

            let base = base_token(&text).to_string();
            let notation = self.render(&members, line.font_size);
            text.push_str(&notation);

            let run = self.classify(&members, line.font_size, format!("{}{}", base, notation));
            log::debug!("math run {:?} ({})", run.text, run.role);
            runs.push(run);
        }

        ReconstructedLine { text, runs }
    }

    fn render(&self, members: &[(&Span, ScriptKind)], font_size: f32) -> String {
        let levels = self.levels(members, font_size);
        let mut out = String::new();
        let mut open: Vec<(ScriptKind, usize)> = Vec::new();

        for ((span, kind), level) in members.iter().zip(levels) {
            while let Some(&(top_kind, top_level)) = open.last() {
                if top_kind == *kind && top_level <= level {
                    break;
                }
                open.pop();
                out.push('}');
            }
            let current = match open.last() {
                Some(&(_, top_level)) => top_level,
                None => 0,
            };
            for depth in current + 1..=level {
                out.push_str(kind.marker());
                open.push((*kind, depth));
            }
            out.push_str(&span.text);
        }
        for _ in open {
            out.push('}');
        }
        out
    }

    /// Nesting level (1-based) of every member, per script kind.
    fn levels(&self, members: &[(&Span, ScriptKind)], font_size: f32) -> Vec<usize> {
        let tolerance = self.thresholds.level_tolerance * font_size;
        let clusters = |kind: ScriptKind| {
            let mut magnitudes: Vec<f32> = members
                .iter()
                .filter(|(_, k)| *k == kind)
                .map(|(s, _)| s.baseline_offset.abs())
                .collect();
            magnitudes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let mut floors: Vec<f32> = Vec::new();
            for m in magnitudes {
                match floors.last() {
                    Some(floor) if m - floor <= tolerance => {}
                    _ => floors.push(m),
                }
            }
            floors
        };
        let sup = clusters(ScriptKind::Superscript);
        let sub = clusters(ScriptKind::Subscript);

        members
            .iter()
            .map(|(span, kind)| {
                let floors = match kind {
                    ScriptKind::Superscript => &sup,
                    ScriptKind::Subscript => &sub,
                };
                let magnitude = span.baseline_offset.abs();
                floors.iter().rposition(|f| *f <= magnitude).unwrap_or(0) + 1
            })
            .collect()
    }

    fn classify(&self, members: &[(&Span, ScriptKind)], font_size: f32, text: String) -> MathRun {
        let depth = self.levels(members, font_size).into_iter().max().unwrap_or(1);
        let has_sup = members.iter().any(|(_, k)| *k == ScriptKind::Superscript);
        let has_sub = members.iter().any(|(_, k)| *k == ScriptKind::Subscript);
        let mixed = has_sup && has_sub;

        let glyphs: String = members.iter().map(|(s, _)| s.text.as_str()).collect();
        let dense = symbol_density(&glyphs) > self.thresholds.symbol_density;

        let role = if depth > 1 || mixed || dense {
            Role::MathComplex
        } else {
            Role::Math
        };

        MathRun {
            text,
            bbox: BBox::union_all(members.iter().map(|(s, _)| &s.bbox)).unwrap_or_default(),
            role,
            depth,
            mixed,
        }
    }
}

/// Trailing word of the text rendered so far.
fn base_token(text: &str) -> &str {
    let start = text
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    &text[start..]
}
