//! Page-level types.

use super::{BBox, Role, Segment, SourceMode, Span};
use serde::{Deserialize, Serialize};

/// Content of a page as delivered by the upstream collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PageContent {
    /// Positioned spans from a text-extraction or OCR collaborator
    Spans(Vec<Span>),
    /// Plain text without geometry (line-oriented OCR output)
    Text(String),
    /// Markdown from a remote conversion backend
    Markdown(String),
}

impl Default for PageContent {
    fn default() -> Self {
        PageContent::Spans(Vec::new())
    }
}

/// A single input page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInput {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Provenance of the page content
    #[serde(default)]
    pub source_mode: SourceMode,

    /// Page-level confidence reported by a probabilistic source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,

    /// Page content
    pub content: PageContent,
}

impl PageInput {
    /// Create an empty page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            source_mode: SourceMode::ExtractText,
            confidence: None,
            content: PageContent::default(),
        }
    }

    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0)
    }

    /// Create a new page with standard A4 size (210 x 297 mm).
    pub fn a4(number: u32) -> Self {
        Self::new(number, 595.0, 842.0)
    }

    /// Set positioned spans as the page content.
    pub fn with_spans(mut self, spans: Vec<Span>) -> Self {
        self.content = PageContent::Spans(spans);
        self
    }

    /// Set plain text as the page content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content = PageContent::Text(text.into());
        self
    }

    /// Set remote Markdown as the page content.
    pub fn with_markdown(mut self, markdown: impl Into<String>) -> Self {
        self.content = PageContent::Markdown(markdown.into());
        self
    }

    /// Set the source mode tag.
    pub fn with_source_mode(mut self, mode: SourceMode) -> Self {
        self.source_mode = mode;
        self
    }

    /// Set the page-level confidence.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Add a span to a span-based page. Has no effect on text pages.
    pub fn add_span(&mut self, span: Span) {
        if let PageContent::Spans(spans) = &mut self.content {
            spans.push(span);
        }
    }

    /// The page box.
    pub fn bbox(&self) -> BBox {
        BBox::page(self.width, self.height)
    }

    /// 0-based page index.
    pub fn index(&self) -> usize {
        self.number.saturating_sub(1) as usize
    }
}

impl Default for PageInput {
    fn default() -> Self {
        Self::letter(1)
    }
}

/// One page's cleaned output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// Page number (1-indexed)
    pub number: u32,

    /// Provenance of the page content
    pub source_mode: SourceMode,

    /// Segments in reading order
    pub segments: Vec<Segment>,

    /// Assembled cleaned text of the page body
    pub cleaned_text: String,
}

impl PageResult {
    /// Create an empty result for a page.
    pub fn new(number: u32, source_mode: SourceMode) -> Self {
        Self {
            number,
            source_mode,
            segments: Vec::new(),
            cleaned_text: String::new(),
        }
    }

    /// Segments with the given role.
    pub fn segments_with_role(&self, role: Role) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(move |s| s.role == role)
    }

    /// Whether the page produced no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_new() {
        let page = PageInput::new(3, 612.0, 792.0);
        assert_eq!(page.number, 3);
        assert_eq!(page.index(), 2);
        assert_eq!(page.bbox(), BBox::new(0.0, 0.0, 612.0, 792.0));
    }

    #[test]
    fn test_add_span_only_on_span_pages() {
        let span = Span::new("a", BBox::new(0.0, 0.0, 5.0, 10.0), 10.0, "Times");
        let mut page = PageInput::letter(1);
        page.add_span(span.clone());
        assert!(matches!(&page.content, PageContent::Spans(s) if s.len() == 1));

        let mut text_page = PageInput::letter(1).with_text("hello");
        text_page.add_span(span);
        assert!(matches!(text_page.content, PageContent::Text(_)));
    }
}
