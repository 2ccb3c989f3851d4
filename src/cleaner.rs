//! Document cleaning pipeline.
//!
//! The cleaner runs in three passes over a document:
//!
//! 1. normalize every page (spans to lines, or text to lines);
//! 2. build the document-wide [`RepetitionProfile`] and [`FontStatistics`];
//! 3. filter boilerplate, order columns, rebuild math and assemble segments.
//!
//! Passes 1 and 3 are per page and run on the rayon pool when
//! [`CleanOptions::parallel`] is set. Results always come back in source
//! page order.

use crate::clean::text::{clean_span_text, normalize_unicode};
use crate::clean::{
    strip_markup, Assembler, BoilerplateDetector, CleanOptions, MarginCandidates, PageContext,
    RepetitionProfile, INSUFFICIENT_PAGES, NO_POSITIONED_PAGES,
};
use crate::error::Result;
use crate::layout::{ColumnClusterer, FontStatistics, Line, SpanNormalizer};
use crate::model::{
    BBox, DocumentInput, DocumentResult, PageContent, PageInput, PageResult, PageStats, SourceMode,
    Summary,
};
use rayon::prelude::*;
use std::collections::HashSet;

/// Warning recorded when page numbers cannot key segment ids.
pub const PAGES_RENUMBERED: &str = "page numbers are zero or repeated: pages numbered by position";

/// Page content after normalization.
#[derive(Debug, Clone)]
enum Prepared {
    Lines(Vec<Line>),
    Text(Vec<String>),
    Markdown(Vec<String>),
}

/// A normalized page waiting for the document-wide statistics.
#[derive(Debug, Clone)]
struct PreparedPage {
    number: u32,
    height: f32,
    bbox: BBox,
    source_mode: SourceMode,
    confidence: Option<f32>,
    content: Prepared,
    dropped: u32,
}

/// Document-wide state built before any page is assembled. Read-only
/// afterwards.
#[derive(Debug, Clone, Default)]
struct DocumentProfile {
    repetition: RepetitionProfile,
    fonts: FontStatistics,
}

/// Cleans documents with a fixed, validated configuration.
///
/// # Example
///
/// ```
/// use pagescribe::{BBox, CleanOptions, Cleaner, DocumentInput, PageInput, Span};
///
/// let page = PageInput::letter(1).with_spans(vec![Span::new(
///     "Hello world.",
///     BBox::new(72.0, 300.0, 140.0, 312.0),
///     12.0,
///     "Times-Roman",
/// )]);
/// let input = DocumentInput::new("doc").with_page(page);
///
/// let cleaner = Cleaner::new(CleanOptions::default())?;
/// let result = cleaner.clean(&input);
/// assert_eq!(result.cleaned_text(), "Hello world.");
/// assert_eq!(result.pages[0].segments[0].segment_id, "doc-p001-s001");
/// # Ok::<(), pagescribe::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Cleaner {
    options: CleanOptions,
}

impl Cleaner {
    /// Create a cleaner. Fails when the options violate their contract.
    pub fn new(options: CleanOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// The options in use.
    pub fn options(&self) -> &CleanOptions {
        &self.options
    }

    /// Clean a document.
    pub fn clean(&self, input: &DocumentInput) -> DocumentResult {
        log::info!(
            "cleaning document {} ({} pages)",
            input.doc_id,
            input.page_count()
        );

        let mut summary = Summary::new(input.doc_id.clone(), self.options.clone());
        let numbers = page_numbers(&input.pages, &mut summary);

        let prepared: Vec<PreparedPage> = if self.options.parallel {
            input
                .pages
                .par_iter()
                .zip(numbers.par_iter())
                .map(|(p, n)| self.prepare(p, *n))
                .collect()
        } else {
            input
                .pages
                .iter()
                .zip(&numbers)
                .map(|(p, n)| self.prepare(p, *n))
                .collect()
        };

        let profile = self.build_profile(&prepared, &mut summary);

        let processed: Vec<(PageResult, PageStats)> = if self.options.parallel {
            prepared
                .into_par_iter()
                .map(|p| self.process(&input.doc_id, p, &profile))
                .collect()
        } else {
            prepared
                .into_iter()
                .map(|p| self.process(&input.doc_id, p, &profile))
                .collect()
        };

        let mut pages = Vec::with_capacity(processed.len());
        for (page, stats) in processed {
            summary.merge(&stats);
            summary.page_modes.push(page.source_mode.clone());
            for segment in &page.segments {
                summary.count_segment(segment.role);
            }
            pages.push(page);
        }
        summary.pages = pages.len() as u32;

        log::info!(
            "document {}: {} segments, {} boilerplate lines, {} page numbers removed",
            input.doc_id,
            summary.segment_count,
            summary.boilerplate_removed,
            summary.page_numbers_removed
        );

        DocumentResult {
            doc_id: input.doc_id.clone(),
            pages,
            summary,
        }
    }

    /// Normalize one page under its effective page number.
    fn prepare(&self, page: &PageInput, number: u32) -> PreparedPage {
        let (content, dropped) = match &page.content {
            PageContent::Spans(spans) => {
                let normalized = SpanNormalizer::new(page.bbox(), number.saturating_sub(1) as usize)
                    .with_unicode(self.options.normalize_unicode)
                    .with_join_gap(self.options.layout.line_join_gap)
                    .normalize(spans.clone());
                (Prepared::Lines(normalized.lines), normalized.dropped)
            }
            PageContent::Text(text) => (Prepared::Text(self.text_lines(text)), 0),
            PageContent::Markdown(markdown) => {
                let lines = strip_markup(markdown)
                    .iter()
                    .map(|l| self.clean_text_line(l))
                    .collect();
                (Prepared::Markdown(lines), 0)
            }
        };

        PreparedPage {
            number,
            height: page.height,
            bbox: page.bbox(),
            source_mode: page.source_mode.clone(),
            confidence: page.confidence,
            content,
            dropped,
        }
    }

    fn text_lines(&self, text: &str) -> Vec<String> {
        text.lines().map(|l| self.clean_text_line(l)).collect()
    }

    fn clean_text_line(&self, line: &str) -> String {
        let cleaned = clean_span_text(line);
        if self.options.normalize_unicode {
            normalize_unicode(&cleaned)
        } else {
            cleaned
        }
    }

    /// Build the document-wide statistics from positioned pages.
    fn build_profile(&self, pages: &[PreparedPage], summary: &mut Summary) -> DocumentProfile {
        let mut profile = DocumentProfile::default();

        for page in pages {
            if let Prepared::Lines(lines) = &page.content {
                let candidates = MarginCandidates::of_lines(lines, page.height, &self.options);
                let texts: Vec<String> = lines.iter().map(|l| l.text()).collect();
                profile.repetition.observe_page(candidates.signatures(&texts));
                for line in lines {
                    profile.fonts.add_line(line);
                }
            }
        }
        profile.fonts.analyze();

        log::debug!(
            "repetition profile: {} signatures over {} pages, body size {}",
            profile.repetition.len(),
            profile.repetition.page_count(),
            profile.fonts.body_size
        );

        if self.options.remove_headers_footers && !profile.repetition.is_active() {
            let positioned = profile.repetition.page_count() > 0;
            if !positioned && !pages.is_empty() {
                summary.warn(NO_POSITIONED_PAGES);
            } else {
                summary.warn(INSUFFICIENT_PAGES);
            }
        }
        profile
    }

    /// Filter, order and assemble one page.
    fn process(&self, doc_id: &str, page: PreparedPage, profile: &DocumentProfile) -> (PageResult, PageStats) {
        let ctx = PageContext {
            doc_id,
            number: page.number,
            source_mode: &page.source_mode,
            bbox: page.bbox,
            confidence: page.confidence,
        };
        let detector = BoilerplateDetector::new(&profile.repetition, &self.options);
        let assembler = Assembler::new(&self.options, &profile.fonts);

        let (result, mut stats) = match page.content {
            Prepared::Lines(lines) => {
                let filtered = detector.filter_lines(lines, page.number, page.height);
                let bands = ColumnClusterer::new(&self.options.layout, self.options.multicolumn_enabled)
                    .cluster(filtered.body);
                let result = assembler.assemble_lines(&ctx, filtered.top, bands, filtered.bottom);
                (result, filtered.stats)
            }
            Prepared::Text(lines) => {
                let filtered = detector.filter_text(lines, page.number);
                let result = assembler.assemble_text(&ctx, filtered.top, filtered.body, filtered.bottom);
                (result, filtered.stats)
            }
            Prepared::Markdown(lines) => {
                let filtered = detector.filter_text(lines, page.number);
                let result = assembler.assemble_markdown(&ctx, filtered.top, filtered.body, filtered.bottom);
                (result, filtered.stats)
            }
        };

        stats.spans_dropped = page.dropped;
        if page.dropped > 0 {
            stats.warnings.push(format!(
                "page {}: dropped {} spans with empty text or invalid geometry",
                page.number, page.dropped
            ));
            log::warn!("page {}: dropped {} spans", page.number, page.dropped);
        }
        if result.is_empty() {
            log::debug!("page {}: no text", page.number);
        }

        (result, stats)
    }
}

/// Page numbers that key segment ids: the given ones when they are non-zero
/// and unique, otherwise 1-based positions.
fn page_numbers(pages: &[PageInput], summary: &mut Summary) -> Vec<u32> {
    let mut seen = HashSet::with_capacity(pages.len());
    if pages.iter().all(|p| p.number > 0 && seen.insert(p.number)) {
        return pages.iter().map(|p| p.number).collect();
    }
    summary.warn(PAGES_RENUMBERED);
    (1..=pages.len() as u32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Span;
    use crate::Error;

    fn body_page(number: u32, header: &str) -> PageInput {
        let mut spans = vec![Span::new(header, BBox::new(72.0, 30.0, 250.0, 40.0), 10.0, "Times")];
        for i in 0..4 {
            let y = 200.0 + i as f32 * 12.0;
            spans.push(Span::new(
                format!("Body line {} of page {}", i, number),
                BBox::new(72.0, y, 300.0, y + 10.0),
                10.0,
                "Times",
            ));
        }
        PageInput::letter(number).with_spans(spans)
    }

    #[test]
    fn test_invalid_options_rejected() {
        let result = Cleaner::new(CleanOptions::default().with_repetition_ratio(1.5));
        assert!(matches!(result, Err(Error::InvalidOption(_))));
    }

    #[test]
    fn test_empty_document() {
        let cleaner = Cleaner::new(CleanOptions::default()).unwrap();
        let result = cleaner.clean(&DocumentInput::new("empty"));
        assert!(result.pages.is_empty());
        assert_eq!(result.cleaned_text(), "");
        assert_eq!(result.summary.warnings, vec![INSUFFICIENT_PAGES.to_string()]);
    }

    #[test]
    fn test_single_page_warns_and_keeps_header() {
        let cleaner = Cleaner::new(CleanOptions::default()).unwrap();
        let input = DocumentInput::new("one").with_page(body_page(1, "Running Head"));
        let result = cleaner.clean(&input);

        assert!(result.summary.warnings.iter().any(|w| w == INSUFFICIENT_PAGES));
        assert!(result.cleaned_text().contains("Running Head"));
    }

    #[test]
    fn test_repeated_header_removed() {
        let cleaner = Cleaner::new(CleanOptions::default()).unwrap();
        let input = DocumentInput::new("doc")
            .with_page(body_page(1, "Running Head"))
            .with_page(body_page(2, "Running Head"))
            .with_page(body_page(3, "Running Head"));
        let result = cleaner.clean(&input);

        assert!(!result.cleaned_text().contains("Running Head"));
        assert_eq!(result.summary.boilerplate_removed, 3);
        assert_eq!(result.summary.pages, 3);
        assert!(result.summary.warnings.is_empty());
    }

    #[test]
    fn test_dropped_spans_reported() {
        let cleaner = Cleaner::new(CleanOptions::default().sequential()).unwrap();
        let page = body_page(1, "Head").with_spans(vec![
            Span::new("kept", BBox::new(72.0, 300.0, 100.0, 310.0), 10.0, "Times"),
            Span::new("", BBox::new(72.0, 320.0, 100.0, 330.0), 10.0, "Times"),
        ]);
        let result = cleaner.clean(&DocumentInput::new("d").with_page(page));
        assert_eq!(result.summary.spans_dropped, 1);
        assert!(result.summary.warnings.iter().any(|w| w.contains("dropped 1 spans")));
    }

    #[test]
    fn test_text_pages_do_not_feed_profile() {
        let cleaner = Cleaner::new(CleanOptions::default()).unwrap();
        let input = DocumentInput::new("t")
            .with_page(PageInput::letter(1).with_text("Header\nFirst page text."))
            .with_page(PageInput::letter(2).with_text("Header\nSecond page text."));
        let result = cleaner.clean(&input);
        assert!(result.cleaned_text().contains("Header"));
        assert_eq!(result.summary.warnings, vec![NO_POSITIONED_PAGES.to_string()]);
    }

    #[test]
    fn test_one_positioned_page_is_insufficient() {
        let cleaner = Cleaner::new(CleanOptions::default()).unwrap();
        let input = DocumentInput::new("mixed")
            .with_page(body_page(1, "Running Head"))
            .with_page(PageInput::letter(2).with_text("Running Head\nSecond page text."));
        let result = cleaner.clean(&input);
        assert_eq!(result.summary.warnings, vec![INSUFFICIENT_PAGES.to_string()]);
    }

    #[test]
    fn test_repeated_page_numbers_renumbered() {
        let cleaner = Cleaner::new(CleanOptions::default().sequential()).unwrap();
        let input = DocumentInput::new("dup")
            .with_page(body_page(1, "Running Head"))
            .with_page(body_page(1, "Running Head"));
        let result = cleaner.clean(&input);

        assert!(result.summary.warnings.iter().any(|w| w == PAGES_RENUMBERED));
        assert_eq!(result.pages[0].number, 1);
        assert_eq!(result.pages[1].number, 2);
        let mut ids: Vec<&str> = result.segments().map(|s| s.segment_id.as_str()).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert!(result.pages[1].segments[0].segment_id.starts_with("dup-p002-"));
    }

    #[test]
    fn test_zero_page_number_renumbered() {
        let cleaner = Cleaner::new(CleanOptions::default()).unwrap();
        let input = DocumentInput::new("z")
            .with_page(body_page(0, "Head"))
            .with_page(body_page(5, "Head"));
        let result = cleaner.clean(&input);
        let numbers: Vec<u32> = result.pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert!(result.summary.warnings.iter().any(|w| w == PAGES_RENUMBERED));
    }

    #[test]
    fn test_unique_page_numbers_kept() {
        let cleaner = Cleaner::new(CleanOptions::default()).unwrap();
        let input = DocumentInput::new("gap")
            .with_page(body_page(3, "Head"))
            .with_page(body_page(7, "Head"));
        let result = cleaner.clean(&input);
        let numbers: Vec<u32> = result.pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![3, 7]);
        assert!(!result.summary.warnings.iter().any(|w| w == PAGES_RENUMBERED));
    }
}
