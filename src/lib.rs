//! # pagescribe
//!
//! Layout reconstruction and cleaning for paginated documents.
//!
//! This library takes per-page text spans (text, bounding box and font
//! metadata, as produced by a PDF text extractor or an OCR engine) and turns
//! them into clean, reading-ordered text and structured segments.
//!
//! ## Quick Start
//!
//! ```
//! use pagescribe::{BBox, DocumentInput, PageInput, Scribe, Span};
//!
//! fn main() -> pagescribe::Result<()> {
//!     let page = PageInput::letter(1).with_spans(vec![
//!         Span::new("Layout recon-", BBox::new(72.0, 300.0, 150.0, 312.0), 12.0, "Times-Roman"),
//!         Span::new("struction works.", BBox::new(72.0, 314.0, 170.0, 326.0), 12.0, "Times-Roman"),
//!     ]);
//!     let input = DocumentInput::new("report").with_page(page);
//!
//!     let result = Scribe::new().clean(&input)?;
//!     assert_eq!(result.cleaned_text(), "Layout reconstruction works.");
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Reading order**: multi-column pages are read column by column
//! - **Boilerplate removal**: repeating headers, footers and page numbers
//! - **Prose cleanup**: dehyphenation, whitespace and Unicode normalization
//! - **Math reconstruction**: superscripts and subscripts as `x^{2}`, `a_{i}`
//! - **Parallel processing**: uses Rayon for multi-page documents

pub mod clean;
pub mod cleaner;
pub mod detect;
pub mod error;
pub mod layout;
pub mod model;
pub mod render;

// Re-export commonly used types
pub use clean::{CleanOptions, CleanPreset, LayoutThresholds, MathThresholds};
pub use cleaner::Cleaner;
pub use detect::{plan_page_modes, ModePolicy, PageModePlan, PageProbe};
pub use error::{Error, Result};
pub use model::{
    BBox, DocumentInput, DocumentResult, MathCrop, PageContent, PageInput, PageResult, Role,
    Segment, SourceMode, Span, Summary, PAGE_SEPARATOR,
};
pub use render::JsonFormat;

/// Clean a document with the given options.
///
/// # Arguments
///
/// * `input` - Document pages in source order
/// * `options` - Cleaning options
///
/// # Returns
///
/// The cleaned document, or `Error::InvalidOption` if the options violate
/// their contract. Page content itself never makes cleaning fail.
///
/// # Example
///
/// ```
/// use pagescribe::{clean_document, CleanOptions, DocumentInput, PageInput};
///
/// let input = DocumentInput::new("scan")
///     .with_page(PageInput::letter(1).with_text("Recognized text of a page."));
/// let result = clean_document(&input, &CleanOptions::default()).unwrap();
/// assert_eq!(result.pages[0].cleaned_text, "Recognized text of a page.");
/// ```
pub fn clean_document(input: &DocumentInput, options: &CleanOptions) -> Result<DocumentResult> {
    let cleaner = Cleaner::new(options.clone())?;
    Ok(cleaner.clean(input))
}

/// Clean a document and return its cleaned text.
pub fn clean_text(input: &DocumentInput, options: &CleanOptions) -> Result<String> {
    let result = clean_document(input, options)?;
    render::to_text(&result)
}

/// Builder for cleaning documents.
///
/// # Example
///
/// ```
/// use pagescribe::{CleanPreset, DocumentInput, Scribe};
///
/// let jsonl = Scribe::new()
///     .with_preset(CleanPreset::Aggressive)
///     .retain_boilerplate()
///     .with_math_crops()
///     .sequential()
///     .clean(&DocumentInput::new("empty"))?
///     .to_segments_jsonl()?;
/// assert!(jsonl.is_empty());
/// # Ok::<(), pagescribe::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scribe {
    options: CleanOptions,
}

impl Scribe {
    /// Create a new builder with standard options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a preset.
    pub fn with_preset(mut self, preset: CleanPreset) -> Self {
        self.options = CleanOptions::from_preset(preset);
        self
    }

    /// Replace all options.
    pub fn with_options(mut self, options: CleanOptions) -> Self {
        self.options = options;
        self
    }

    /// Emit removed headers, footers and page numbers as their own segments.
    pub fn retain_boilerplate(mut self) -> Self {
        self.options = self.options.retain_boilerplate(true);
        self
    }

    /// Keep hyphenated line breaks as they are.
    pub fn without_dehyphenation(mut self) -> Self {
        self.options = self.options.with_dehyphenation(false);
        self
    }

    /// Read pages strictly top to bottom.
    pub fn single_column(mut self) -> Self {
        self.options = self.options.with_multicolumn(false);
        self
    }

    /// Skip super/subscript and display math detection.
    pub fn without_math(mut self) -> Self {
        self.options = self.options.with_math_detection(false);
        self
    }

    /// Attach crop references to math segments.
    pub fn with_math_crops(mut self) -> Self {
        self.options = self.options.with_math_crops(true);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// The options the builder will clean with.
    pub fn options(&self) -> &CleanOptions {
        &self.options
    }

    /// Clean a document.
    pub fn clean(&self, input: &DocumentInput) -> Result<ScribeResult> {
        let result = clean_document(input, &self.options)?;
        Ok(ScribeResult { result })
    }
}

/// Result of cleaning a document, with encoders attached.
#[derive(Debug, Clone)]
pub struct ScribeResult {
    /// The cleaned document
    pub result: DocumentResult,
}

impl ScribeResult {
    /// Document cleaned text, pages separated by [`PAGE_SEPARATOR`].
    pub fn cleaned_text(&self) -> String {
        self.result.cleaned_text()
    }

    /// Segments as JSON Lines.
    pub fn to_segments_jsonl(&self) -> Result<String> {
        render::to_segments_jsonl(&self.result)
    }

    /// Page texts as JSON Lines.
    pub fn to_pages_jsonl(&self) -> Result<String> {
        render::to_pages_jsonl(&self.result)
    }

    /// Summary as JSON.
    pub fn to_meta_json(&self, format: JsonFormat) -> Result<String> {
        render::to_meta_json(&self.result, format)
    }

    /// Plain text.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.result)
    }

    /// Get the summary.
    pub fn summary(&self) -> &Summary {
        &self.result.summary
    }

    /// Get the document result.
    pub fn document(&self) -> &DocumentResult {
        &self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scribe_builder() {
        let scribe = Scribe::new()
            .with_preset(CleanPreset::Minimal)
            .retain_boilerplate()
            .single_column()
            .sequential();

        assert!(scribe.options().retain_boilerplate);
        assert!(!scribe.options().multicolumn_enabled);
        assert!(!scribe.options().parallel);
        assert!(!scribe.options().remove_headers_footers);
    }

    #[test]
    fn test_invalid_options_fail_before_processing() {
        let options = CleanOptions::default().with_margin_ratio(2.0);
        let result = clean_document(&DocumentInput::new("x"), &options);
        assert!(matches!(result, Err(Error::InvalidOption(_))));
    }

    #[test]
    fn test_clean_text_empty_document() {
        let text = clean_text(&DocumentInput::new("x"), &CleanOptions::default()).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn test_scribe_result_encoders() {
        let input = DocumentInput::new("d").with_page(PageInput::letter(1).with_text("Some text."));
        let result = Scribe::new().clean(&input).unwrap();
        assert_eq!(result.to_text().unwrap(), "Some text.");
        assert_eq!(result.to_pages_jsonl().unwrap().lines().count(), 1);
        assert_eq!(result.summary().pages, 1);
    }
}
