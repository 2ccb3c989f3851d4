//! Document-level types.

use super::{PageInput, PageResult, Role, Segment, SourceMode};
use crate::clean::CleanOptions;
use serde::{Deserialize, Serialize};

/// Separator placed between pages in the document-level cleaned text.
pub const PAGE_SEPARATOR: &str = "\n\n\u{000C}\n\n";

/// A document to clean: an id plus its pages in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentInput {
    /// Document identifier, used as the segment id prefix
    pub doc_id: String,

    /// Pages in source order
    pub pages: Vec<PageInput>,
}

impl DocumentInput {
    /// Create a new empty document.
    pub fn new(doc_id: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            pages: Vec::new(),
        }
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: PageInput) {
        self.pages.push(page);
    }

    /// Builder-style variant of [`DocumentInput::add_page`].
    pub fn with_page(mut self, page: PageInput) -> Self {
        self.pages.push(page);
        self
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Cleaned output of a whole document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    /// Document identifier
    pub doc_id: String,

    /// Page results in source page order
    pub pages: Vec<PageResult>,

    /// Summary statistics and warnings
    pub summary: Summary,
}

impl DocumentResult {
    /// All segments of the document in page order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.pages.iter().flat_map(|p| p.segments.iter())
    }

    /// Cleaned text of the document, pages separated by a form feed.
    pub fn cleaned_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.cleaned_text.as_str())
            .collect::<Vec<_>>()
            .join(PAGE_SEPARATOR)
    }

    /// Get a page result by number (1-indexed).
    pub fn get_page(&self, number: u32) -> Option<&PageResult> {
        self.pages.iter().find(|p| p.number == number)
    }
}

/// Statistics and warnings collected while cleaning a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    /// Document identifier
    pub doc_id: String,

    /// Total number of pages processed
    pub pages: u32,

    /// Source mode of every page, in page order
    pub page_modes: Vec<SourceMode>,

    /// Header and footer lines removed from the body text
    pub boilerplate_removed: u32,

    /// Page-number lines removed from the body text
    pub page_numbers_removed: u32,

    /// Segments with role `math`
    pub math_segments: u32,

    /// Segments with role `math_complex`
    pub math_complex_segments: u32,

    /// Segments with role `heading`
    pub heading_segments: u32,

    /// Segments with role `paragraph`
    pub paragraph_segments: u32,

    /// Total segments emitted
    pub segment_count: u32,

    /// Spans dropped by the normalizer (empty text or unusable geometry)
    pub spans_dropped: u32,

    /// Non-fatal anomalies
    pub warnings: Vec<String>,

    /// Options the document was cleaned with
    pub options: CleanOptions,
}

impl Summary {
    /// Create a new empty summary.
    pub fn new(doc_id: impl Into<String>, options: CleanOptions) -> Self {
        Self {
            doc_id: doc_id.into(),
            options,
            ..Default::default()
        }
    }

    /// Record a warning.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.warnings.push(message);
    }

    /// Count a segment by role.
    pub fn count_segment(&mut self, role: Role) {
        self.segment_count += 1;
        match role {
            Role::Math => self.math_segments += 1,
            Role::MathComplex => self.math_complex_segments += 1,
            Role::Heading => self.heading_segments += 1,
            Role::Paragraph => self.paragraph_segments += 1,
            Role::Header | Role::Footer | Role::PageNumber => {}
        }
    }

    /// Merge per-page statistics into this summary.
    pub fn merge(&mut self, other: &PageStats) {
        self.boilerplate_removed += other.boilerplate_removed;
        self.page_numbers_removed += other.page_numbers_removed;
        self.spans_dropped += other.spans_dropped;
        self.warnings.extend(other.warnings.iter().cloned());
    }

    /// Total math segments (`math` + `math_complex`).
    pub fn total_math(&self) -> u32 {
        self.math_segments + self.math_complex_segments
    }
}

/// Statistics gathered while processing one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageStats {
    /// Header and footer lines removed
    pub boilerplate_removed: u32,
    /// Page-number lines removed
    pub page_numbers_removed: u32,
    /// Spans dropped by the normalizer
    pub spans_dropped: u32,
    /// Page-scoped warnings
    pub warnings: Vec<String>,
}
