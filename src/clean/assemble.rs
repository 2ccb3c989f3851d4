//! Text assembly: paragraphs, roles and segment emission.

use super::markdown::{parse_blocks, MarkdownBlock};
use super::text::{is_list_item, join_lines, math_score, normalize_whitespace, split_paragraphs};
use super::CleanOptions;
use crate::layout::{ColumnBand, FontStatistics, Line, MathReconstructor, MathRun, ReconstructedLine};
use crate::model::{segment_id, BBox, MathCrop, PageResult, Role, Segment, SourceMode};

/// Per-page information every segment carries.
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    /// Document identifier
    pub doc_id: &'a str,
    /// Page number (1-indexed)
    pub number: u32,
    /// Provenance of the page
    pub source_mode: &'a SourceMode,
    /// Page box
    pub bbox: BBox,
    /// Page-level confidence
    pub confidence: Option<f32>,
}

/// Collects segments of one page, numbering them in emission order.
struct SegmentWriter<'a> {
    ctx: &'a PageContext<'a>,
    options: &'a CleanOptions,
    segments: Vec<Segment>,
    body: Vec<String>,
}

impl<'a> SegmentWriter<'a> {
    fn new(ctx: &'a PageContext<'a>, options: &'a CleanOptions) -> Self {
        Self {
            ctx,
            options,
            segments: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Emit a segment. Empty text is dropped without using a sequence number.
    fn push(&mut self, role: Role, text: &str, bbox: BBox, confidence: Option<f32>, body: bool) {
        let text = if self.options.normalize_whitespace {
            normalize_whitespace(text)
        } else {
            text.trim().to_string()
        };
        if text.is_empty() {
            return;
        }

        let bbox = bbox.clamp_to(&self.ctx.bbox);
        let confidence = if self.ctx.source_mode.is_probabilistic() {
            confidence.or(self.ctx.confidence)
        } else {
            None
        };
        let crop = (role.is_math() && self.options.export_math_crops).then_some(MathCrop {
            page: self.ctx.number,
            bbox,
        });

        if body {
            self.body.push(text.clone());
        }
        self.segments.push(Segment {
            doc_id: self.ctx.doc_id.to_string(),
            page: self.ctx.number,
            segment_id: segment_id(self.ctx.doc_id, self.ctx.number, self.segments.len() + 1),
            role,
            bbox,
            text,
            source_mode: self.ctx.source_mode.clone(),
            confidence,
            crop,
        });
    }

    fn finish(self) -> PageResult {
        PageResult {
            number: self.ctx.number,
            source_mode: self.ctx.source_mode.clone(),
            segments: self.segments,
            cleaned_text: self.body.join("\n\n"),
        }
    }
}

/// Lines collected for one paragraph.
struct Paragraph {
    lines: Vec<String>,
    bbox: BBox,
    last: BBox,
    band: usize,
    heading_like: bool,
    all_heading_sized: bool,
    bold: bool,
    runs: Vec<MathRun>,
    confidences: Vec<f32>,
}

impl Paragraph {
    fn start(line: &Line, rendered: ReconstructedLine, heading_sized: bool) -> Self {
        let mut paragraph = Self {
            lines: Vec::new(),
            bbox: line.bbox,
            last: line.bbox,
            band: line.band,
            heading_like: heading_sized || line.is_bold(),
            all_heading_sized: heading_sized,
            bold: line.is_bold(),
            runs: Vec::new(),
            confidences: Vec::new(),
        };
        paragraph.push(line, rendered, heading_sized);
        paragraph
    }

    fn push(&mut self, line: &Line, rendered: ReconstructedLine, heading_sized: bool) {
        if !self.lines.is_empty() {
            self.bbox = self.bbox.union(&line.bbox);
            self.all_heading_sized &= heading_sized;
            self.bold &= line.is_bold();
        }
        self.last = line.bbox;
        self.lines.push(rendered.text);
        self.runs.extend(rendered.runs);
        self.confidences.extend(line.spans.iter().filter_map(|s| s.confidence));
    }

    fn confidence(&self) -> Option<f32> {
        if self.confidences.is_empty() {
            None
        } else {
            Some(self.confidences.iter().sum::<f32>() / self.confidences.len() as f32)
        }
    }
}

/// Builds the segments and cleaned text of a page.
#[derive(Debug, Clone, Copy)]
pub struct Assembler<'a> {
    options: &'a CleanOptions,
    fonts: &'a FontStatistics,
}

impl<'a> Assembler<'a> {
    /// Create an assembler.
    pub fn new(options: &'a CleanOptions, fonts: &'a FontStatistics) -> Self {
        Self { options, fonts }
    }

    /// Assemble a page of positioned lines already split into ordered bands.
    ///
    /// Retained boilerplate from the top margin is emitted before the body,
    /// bottom-margin boilerplate after it.
    pub fn assemble_lines(
        &self,
        ctx: &PageContext<'_>,
        top: Vec<(Role, Line)>,
        bands: Vec<ColumnBand>,
        bottom: Vec<(Role, Line)>,
    ) -> PageResult {
        let mut writer = SegmentWriter::new(ctx, self.options);

        if self.options.retain_boilerplate {
            for (role, line) in &top {
                writer.push(*role, &line.text(), line.bbox, line.confidence(), false);
            }
        }

        let reconstructor = MathReconstructor::new(&self.options.math);
        let mut current: Option<Paragraph> = None;
        for line in bands.into_iter().flat_map(|b| b.lines) {
            let rendered = if self.options.detect_math {
                reconstructor.reconstruct(&line)
            } else {
                ReconstructedLine {
                    text: line.text(),
                    runs: Vec::new(),
                }
            };
            let heading_sized = self
                .fonts
                .is_heading_size(line.font_size, self.options.layout.heading_size_ratio);

            let starts_new = match &current {
                Some(paragraph) => self.breaks(paragraph, &line, heading_sized, &rendered.text),
                None => true,
            };
            if starts_new {
                if let Some(done) = current.take() {
                    self.emit(&mut writer, done);
                }
                current = Some(Paragraph::start(&line, rendered, heading_sized));
            } else if let Some(paragraph) = current.as_mut() {
                paragraph.push(&line, rendered, heading_sized);
            }
        }
        if let Some(done) = current {
            self.emit(&mut writer, done);
        }

        if self.options.retain_boilerplate {
            for (role, line) in &bottom {
                writer.push(*role, &line.text(), line.bbox, line.confidence(), false);
            }
        }

        writer.finish()
    }

    /// Assemble a page of plain text lines.
    pub fn assemble_text(
        &self,
        ctx: &PageContext<'_>,
        top: Vec<(Role, String)>,
        body: Vec<String>,
        bottom: Vec<(Role, String)>,
    ) -> PageResult {
        let mut writer = SegmentWriter::new(ctx, self.options);
        self.push_retained(&mut writer, &top);
        self.push_text_paragraphs(&mut writer, &body);
        self.push_retained(&mut writer, &bottom);
        writer.finish()
    }

    /// Assemble a page of stripped Markdown lines.
    pub fn assemble_markdown(
        &self,
        ctx: &PageContext<'_>,
        top: Vec<(Role, String)>,
        body: Vec<String>,
        bottom: Vec<(Role, String)>,
    ) -> PageResult {
        let mut writer = SegmentWriter::new(ctx, self.options);
        self.push_retained(&mut writer, &top);
        for block in parse_blocks(&body) {
            match block {
                MarkdownBlock::Heading(text) => writer.push(Role::Heading, &text, ctx.bbox, None, true),
                MarkdownBlock::Math(text) => writer.push(Role::Math, &text, ctx.bbox, None, true),
                MarkdownBlock::Text(lines) => self.push_text_paragraphs(&mut writer, &lines),
            }
        }
        self.push_retained(&mut writer, &bottom);
        writer.finish()
    }

    fn push_retained(&self, writer: &mut SegmentWriter<'_>, lines: &[(Role, String)]) {
        if self.options.retain_boilerplate {
            let bbox = writer.ctx.bbox;
            for (role, text) in lines {
                writer.push(*role, text, bbox, None, false);
            }
        }
    }

    fn push_text_paragraphs(&self, writer: &mut SegmentWriter<'_>, lines: &[String]) {
        let paragraphs = split_paragraphs(lines, self.options.dehyphenate, self.options.merge_paragraphs);
        let bbox = writer.ctx.bbox;
        for text in paragraphs {
            let role = self.display_math_role(&text).unwrap_or(Role::Paragraph);
            writer.push(role, &text, bbox, None, true);
        }
    }

    /// Whether `line` starts a new paragraph after `paragraph`.
    fn breaks(&self, paragraph: &Paragraph, line: &Line, heading_sized: bool, text: &str) -> bool {
        let layout = &self.options.layout;
        let previous = &paragraph.last;

        if line.band != paragraph.band {
            return true;
        }
        if line.bbox.y0 - previous.y1 > layout.paragraph_gap_ratio * previous.height() {
            return true;
        }
        let shift = line.bbox.x0 - previous.x0;
        if shift > layout.indent_ratio * line.font_size {
            return true;
        }
        // A jump back to the left that clears the previous line is a new block.
        if -shift > layout.indent_ratio * line.font_size && line.bbox.horizontal_gap(previous) > 0.0 {
            return true;
        }
        if (heading_sized || line.is_bold()) != paragraph.heading_like {
            return true;
        }
        self.options.merge_paragraphs && is_list_item(text)
    }

    fn emit(&self, writer: &mut SegmentWriter<'_>, paragraph: Paragraph) {
        let text = join_lines(
            &paragraph.lines,
            self.options.dehyphenate,
            self.options.merge_paragraphs,
        );
        let role = if self.is_heading(&paragraph, &text) {
            Role::Heading
        } else if paragraph.runs.is_empty() {
            self.display_math_role(&text).unwrap_or(Role::Paragraph)
        } else {
            Role::Paragraph
        };

        let confidence = paragraph.confidence();
        writer.push(role, &text, paragraph.bbox, confidence, true);
        for run in paragraph.runs {
            writer.push(run.role, &run.text, run.bbox, confidence, false);
        }
    }

    fn is_heading(&self, paragraph: &Paragraph, text: &str) -> bool {
        let styled = paragraph.all_heading_sized || (paragraph.lines.len() == 1 && paragraph.bold);
        let text = text.trim();
        styled
            && !text.is_empty()
            && text.chars().count() <= self.options.layout.heading_max_chars
            && !text.ends_with('.')
    }

    /// Role of a short paragraph that reads as a displayed formula.
    fn display_math_role(&self, text: &str) -> Option<Role> {
        let thresholds = &self.options.math;
        if !self.options.detect_math || text.chars().count() > thresholds.display_math_max_chars {
            return None;
        }
        let score = math_score(text);
        if score >= thresholds.display_complex_score {
            Some(Role::MathComplex)
        } else if score >= thresholds.display_math_score {
            Some(Role::Math)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ColumnClusterer;
    use crate::model::Span;

    fn line(text: &str, x0: f32, y0: f32, size: f32) -> Line {
        let width = text.chars().count() as f32 * size * 0.5;
        Line::from_spans(vec![Span::new(text, BBox::new(x0, y0, x0 + width, y0 + size), size, "Times")])
    }

    fn fonts() -> FontStatistics {
        let mut fonts = FontStatistics::default();
        fonts.add_size(10.0, 1000);
        fonts.analyze();
        fonts
    }

    fn assemble(options: &CleanOptions, lines: Vec<Line>) -> PageResult {
        let fonts = fonts();
        let mode = SourceMode::ExtractText;
        let ctx = PageContext {
            doc_id: "doc",
            number: 1,
            source_mode: &mode,
            bbox: BBox::page(612.0, 792.0),
            confidence: None,
        };
        let bands = ColumnClusterer::new(&options.layout, false).cluster(lines);
        Assembler::new(options, &fonts).assemble_lines(&ctx, Vec::new(), bands, Vec::new())
    }

    #[test]
    fn test_paragraphs_and_heading() {
        let options = CleanOptions::default();
        let page = assemble(
            &options,
            vec![
                line("Introduction", 72.0, 80.0, 16.0),
                line("The first line of an exam-", 72.0, 110.0, 10.0),
                line("ple paragraph.", 72.0, 122.0, 10.0),
                line("A second paragraph follows", 72.0, 150.0, 10.0),
            ],
        );

        let roles: Vec<Role> = page.segments.iter().map(|s| s.role).collect();
        assert_eq!(roles, vec![Role::Heading, Role::Paragraph, Role::Paragraph]);
        assert_eq!(page.segments[1].text, "The first line of an example paragraph.");
        assert_eq!(page.segments[0].segment_id, "doc-p001-s001");
        assert_eq!(page.segments[2].segment_id, "doc-p001-s003");
        assert_eq!(
            page.cleaned_text,
            "Introduction\n\nThe first line of an example paragraph.\n\nA second paragraph follows"
        );
    }

    #[test]
    fn test_leftward_jump_starts_paragraph() {
        let options = CleanOptions::default();
        let page = assemble(
            &options,
            vec![line("Right line 0", 322.0, 110.0, 10.0), line("Left line 1", 72.0, 122.0, 10.0)],
        );
        assert_eq!(page.segments.len(), 2);
        assert_eq!(page.segments[0].text, "Right line 0");
        assert_eq!(page.segments[1].text, "Left line 1");
    }

    #[test]
    fn test_outdented_continuation_stays_in_paragraph() {
        let options = CleanOptions::default();
        let page = assemble(
            &options,
            vec![
                line("An indented opening line", 90.0, 110.0, 10.0),
                line("and its continuation", 72.0, 122.0, 10.0),
            ],
        );
        assert_eq!(page.segments.len(), 1);
    }

    #[test]
    fn test_dehyphenation_disabled() {
        let options = CleanOptions::default().with_dehyphenation(false);
        let page = assemble(
            &options,
            vec![line("exam-", 72.0, 110.0, 10.0), line("ple", 72.0, 122.0, 10.0)],
        );
        assert_eq!(page.segments[0].text, "exam-\nple");
    }

    #[test]
    fn test_line_breaks_without_merging() {
        let options = CleanOptions::default().with_paragraph_merging(false);
        let page = assemble(
            &options,
            vec![line("first line", 72.0, 110.0, 10.0), line("second line", 72.0, 122.0, 10.0)],
        );
        assert_eq!(page.segments[0].text, "first line\nsecond line");
    }

    #[test]
    fn test_list_items_split() {
        let options = CleanOptions::default();
        let page = assemble(
            &options,
            vec![line("- apples", 72.0, 110.0, 10.0), line("- pears", 72.0, 122.0, 10.0)],
        );
        assert_eq!(page.segments.len(), 2);
    }

    #[test]
    fn test_inline_math_segment_follows_paragraph() {
        let options = CleanOptions::default();
        let body = Span::new("energy is mc", BBox::new(72.0, 110.0, 132.0, 120.0), 10.0, "Times");
        let sup = Span::new("2", BBox::new(132.5, 106.0, 136.0, 112.0), 6.0, "Times");
        let page = assemble(&options, vec![Line::from_spans(vec![body, sup])]);

        assert_eq!(page.segments.len(), 2);
        assert_eq!(page.segments[0].role, Role::Paragraph);
        assert_eq!(page.segments[0].text, "energy is mc^{2}");
        assert_eq!(page.segments[1].role, Role::Math);
        assert_eq!(page.segments[1].text, "mc^{2}");
        assert_eq!(page.cleaned_text, "energy is mc^{2}");
    }

    #[test]
    fn test_display_math_paragraph() {
        let options = CleanOptions::default();
        let page = assemble(&options, vec![line("a = b + c", 200.0, 300.0, 10.0)]);
        assert_eq!(page.segments[0].role, Role::Math);
    }

    #[test]
    fn test_confidence_only_for_probabilistic_sources() {
        let options = CleanOptions::default();
        let fonts = fonts();
        let spans = vec![Span::new("scanned words", BBox::new(72.0, 100.0, 140.0, 110.0), 10.0, "")
            .with_confidence(0.9)];
        let lines = vec![Line::from_spans(spans)];

        for (mode, expected) in [
            (SourceMode::Ocr("paddle".into()), Some(0.9)),
            (SourceMode::ExtractText, None),
        ] {
            let ctx = PageContext {
                doc_id: "d",
                number: 4,
                source_mode: &mode,
                bbox: BBox::page(612.0, 792.0),
                confidence: Some(0.5),
            };
            let bands = ColumnClusterer::new(&options.layout, true).cluster(lines.clone());
            let page = Assembler::new(&options, &fonts).assemble_lines(&ctx, Vec::new(), bands, Vec::new());
            assert_eq!(page.segments[0].confidence, expected);
            assert_eq!(page.segments[0].source_mode, mode);
        }
    }

    #[test]
    fn test_text_page_uses_page_confidence() {
        let options = CleanOptions::default();
        let fonts = fonts();
        let mode = SourceMode::Ocr("paddle".into());
        let ctx = PageContext {
            doc_id: "d",
            number: 2,
            source_mode: &mode,
            bbox: BBox::page(600.0, 800.0),
            confidence: Some(0.75),
        };
        let body = vec!["Recognized text of".to_string(), "the page.".to_string()];
        let page = Assembler::new(&options, &fonts).assemble_text(&ctx, Vec::new(), body, Vec::new());
        assert_eq!(page.segments.len(), 1);
        assert_eq!(page.segments[0].text, "Recognized text of the page.");
        assert_eq!(page.segments[0].confidence, Some(0.75));
        assert_eq!(page.segments[0].bbox, BBox::page(600.0, 800.0));
    }

    #[test]
    fn test_markdown_page() {
        let options = CleanOptions::default();
        let fonts = fonts();
        let mode = SourceMode::Remote("simpletex".into());
        let ctx = PageContext {
            doc_id: "d",
            number: 1,
            source_mode: &mode,
            bbox: BBox::page(600.0, 800.0),
            confidence: None,
        };
        let body = vec!["# Title".to_string(), "Some *text*".to_string(), "$$x^2$$".to_string()];
        let page = Assembler::new(&options, &fonts).assemble_markdown(&ctx, Vec::new(), body, Vec::new());
        let roles: Vec<Role> = page.segments.iter().map(|s| s.role).collect();
        assert_eq!(roles, vec![Role::Heading, Role::Paragraph, Role::Math]);
        assert_eq!(page.segments[1].text, "Some text");
        assert_eq!(page.segments[0].confidence, None);
    }

    #[test]
    fn test_retained_boilerplate_order() {
        let options = CleanOptions::default().retain_boilerplate(true);
        let fonts = fonts();
        let mode = SourceMode::ExtractText;
        let ctx = PageContext {
            doc_id: "d",
            number: 1,
            source_mode: &mode,
            bbox: BBox::page(612.0, 792.0),
            confidence: None,
        };
        let bands = ColumnClusterer::new(&options.layout, true).cluster(vec![line("Body text here", 72.0, 300.0, 10.0)]);
        let page = Assembler::new(&options, &fonts).assemble_lines(
            &ctx,
            vec![(Role::Header, line("Running head", 72.0, 20.0, 10.0))],
            bands,
            vec![(Role::PageNumber, line("1", 300.0, 760.0, 10.0))],
        );
        let roles: Vec<Role> = page.segments.iter().map(|s| s.role).collect();
        assert_eq!(roles, vec![Role::Header, Role::Paragraph, Role::PageNumber]);
        assert_eq!(page.cleaned_text, "Body text here");
    }
}
