//! Visual lines: spans grouped by vertical overlap and horizontal proximity.

use crate::model::{BBox, Span};
use std::cmp::Ordering;
use std::collections::HashMap;

/// A text line composed of spans on the same baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// The spans in this line, sorted by x position
    pub spans: Vec<Span>,
    /// Union of the span boxes
    pub bbox: BBox,
    /// Dominant font size (character-weighted mode)
    pub font_size: f32,
    /// Dominant baseline (character-weighted mode over body-sized spans)
    pub baseline: f32,
    /// Index of the column band the line was assigned to
    pub band: usize,
}

impl Line {
    /// Create a line from spans, annotating every span with its baseline
    /// offset and size ratio relative to the line.
    pub fn from_spans(mut spans: Vec<Span>) -> Self {
        if spans.is_empty() {
            return Self {
                spans,
                bbox: BBox::default(),
                font_size: 0.0,
                baseline: 0.0,
                band: 0,
            };
        }

        spans.sort_by(|a, b| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal));

        let bbox = BBox::union_all(spans.iter().map(|s| &s.bbox)).unwrap_or_default();
        let font_size = weighted_mode(spans.iter(), |s| s.font_size).unwrap_or(spans[0].font_size);

        // Raised or lowered glyphs are smaller, so only body-sized spans vote
        // for the line's baseline.
        let body_key = bucket(font_size);
        let baseline = weighted_mode(
            spans.iter().filter(|s| bucket(s.font_size) == body_key),
            Span::baseline,
        )
        .unwrap_or_else(|| spans[0].baseline());

        for span in &mut spans {
            span.baseline_offset = span.baseline() - baseline;
            span.size_ratio = if font_size > 0.0 {
                span.font_size / font_size
            } else {
                1.0
            };
        }

        Self {
            spans,
            bbox,
            font_size,
            baseline,
            band: 0,
        }
    }

    /// Get the combined text of all spans with appropriate spacing.
    ///
    /// Inserts spaces between spans based on their x gaps. For CJK
    /// characters, no space is inserted between adjacent characters.
    pub fn text(&self) -> String {
        if self.spans.len() == 1 {
            return self.spans[0].text.clone();
        }

        let mut result = String::new();
        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 && needs_space(&self.spans[i - 1], span) {
                result.push(' ');
            }
            result.push_str(&span.text);
        }
        result
    }

    /// Check if the line is predominantly bold.
    pub fn is_bold(&self) -> bool {
        let bold_chars: usize = self
            .spans
            .iter()
            .filter(|s| s.is_bold)
            .map(|s| s.char_count())
            .sum();
        let total_chars = self.char_count();
        total_chars > 0 && bold_chars as f32 / total_chars as f32 > 0.5
    }

    /// Number of characters across all spans.
    pub fn char_count(&self) -> usize {
        self.spans.iter().map(|s| s.char_count()).sum()
    }

    /// Mean confidence of the spans that carry one.
    pub fn confidence(&self) -> Option<f32> {
        let scores: Vec<f32> = self.spans.iter().filter_map(|s| s.confidence).collect();
        if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f32>() / scores.len() as f32)
        }
    }

    /// Line width.
    pub fn width(&self) -> f32 {
        self.bbox.width()
    }

    /// Line height.
    pub fn height(&self) -> f32 {
        self.bbox.height()
    }
}

/// Whether a space separates two adjacent spans of a line.
///
/// A gap wider than 20% of the average character width counts as a word
/// break, unless both sides are from a script written without spaces.
pub(crate) fn needs_space(prev: &Span, span: &Span) -> bool {
    let gap = span.bbox.x0 - prev.bbox.x1;

    let char_count = span.char_count();
    let avg_char_width = if char_count > 0 && span.bbox.width() > 0.0 {
        span.bbox.width() / char_count as f32
    } else {
        span.font_size * 0.5
    };

    if gap <= avg_char_width * 0.2 {
        return false;
    }

    let prev_is_cjk = prev.text.chars().last().map(is_spaceless_script_char).unwrap_or(false);
    let curr_is_cjk = span.text.chars().next().map(is_spaceless_script_char).unwrap_or(false);
    if prev_is_cjk && curr_is_cjk {
        return false;
    }

    !prev.text.ends_with(' ') && !span.text.starts_with(' ')
}

/// Group spans into lines.
///
/// A span joins an existing line when they overlap vertically by at least
/// half of the smaller height and the horizontal gap is at most
/// `join_gap × font size`. Lines are returned top-to-bottom, then
/// left-to-right.
pub fn group_lines(mut spans: Vec<Span>, join_gap: f32) -> Vec<Line> {
    spans.sort_by(|a, b| {
        a.bbox
            .y0
            .partial_cmp(&b.bbox.y0)
            .unwrap_or(Ordering::Equal)
            .then(a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal))
    });

    struct Pending {
        bbox: BBox,
        font_size: f32,
        spans: Vec<Span>,
    }

    let mut pending: Vec<Pending> = Vec::new();
    for span in spans {
        let joined = pending.iter_mut().rev().find(|line| {
            let min_height = line.bbox.height().min(span.bbox.height());
            let overlap = line.bbox.vertical_overlap(&span.bbox);
            let max_gap = join_gap * line.font_size.max(span.font_size);
            min_height > 0.0
                && overlap >= 0.5 * min_height
                && line.bbox.horizontal_gap(&span.bbox) <= max_gap
        });

        match joined {
            Some(line) => {
                line.bbox = line.bbox.union(&span.bbox);
                line.font_size = line.font_size.max(span.font_size);
                line.spans.push(span);
            }
            None => pending.push(Pending {
                bbox: span.bbox,
                font_size: span.font_size,
                spans: vec![span],
            }),
        }
    }

    let mut lines: Vec<Line> = pending.into_iter().map(|p| Line::from_spans(p.spans)).collect();
    sort_lines(&mut lines);
    lines
}

/// Sort lines top-to-bottom, then left-to-right.
pub fn sort_lines(lines: &mut [Line]) {
    lines.sort_by(|a, b| {
        a.bbox
            .y0
            .partial_cmp(&b.bbox.y0)
            .unwrap_or(Ordering::Equal)
            .then(a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal))
    });
}

/// Histogram key with 0.1 precision.
fn bucket(value: f32) -> i32 {
    (value * 10.0).round() as i32
}

/// Character-weighted mode of a span metric. Ties go to the larger value.
fn weighted_mode<'a, I, F>(spans: I, metric: F) -> Option<f32>
where
    I: Iterator<Item = &'a Span>,
    F: Fn(&Span) -> f32,
{
    let mut histogram: HashMap<i32, usize> = HashMap::new();
    for span in spans {
        *histogram.entry(bucket(metric(span))).or_insert(0) += span.char_count().max(1);
    }
    histogram
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(key, _)| key as f32 / 10.0)
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs
    (0x4E00..=0x9FFF).contains(&code)
    // CJK Unified Ideographs Extension A
    || (0x3400..=0x4DBF).contains(&code)
    // CJK Unified Ideographs Extension B-F
    || (0x20000..=0x2A6DF).contains(&code)
    || (0x2A700..=0x2B73F).contains(&code)
    || (0x2B740..=0x2B81F).contains(&code)
    || (0x2B820..=0x2CEAF).contains(&code)
    || (0x2CEB0..=0x2EBEF).contains(&code)
    // Hiragana
    || (0x3040..=0x309F).contains(&code)
    // Katakana
    || (0x30A0..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}
