//! Span normalization: text cleanup, geometry validation and line grouping.

use super::{group_lines, Line};
use crate::clean::text::{clean_span_text, normalize_unicode};
use crate::model::{BBox, Span};

/// A page's spans after normalization, grouped into lines.
#[derive(Debug, Clone, Default)]
pub struct NormalizedPage {
    /// Lines top-to-bottom, spans annotated with offsets and size ratios
    pub lines: Vec<Line>,
    /// Number of spans dropped (empty text or unusable geometry)
    pub dropped: u32,
}

/// Normalizes raw spans of one page.
#[derive(Debug, Clone, Copy)]
pub struct SpanNormalizer {
    page_box: BBox,
    page_index: usize,
    unicode: bool,
    join_gap: f32,
}

impl SpanNormalizer {
    /// Create a normalizer for a page.
    pub fn new(page_box: BBox, page_index: usize) -> Self {
        Self {
            page_box,
            page_index,
            unicode: true,
            join_gap: 1.0,
        }
    }

    /// Enable or disable Unicode NFC and ligature expansion.
    pub fn with_unicode(mut self, unicode: bool) -> Self {
        self.unicode = unicode;
        self
    }

    /// Set the horizontal join gap (in multiples of the font size).
    pub fn with_join_gap(mut self, join_gap: f32) -> Self {
        self.join_gap = join_gap;
        self
    }

    /// Clean one span, or `None` when it has to be dropped.
    pub fn normalize_span(&self, mut span: Span) -> Option<Span> {
        if !span.bbox.is_valid() || span.bbox.is_degenerate() {
            return None;
        }
        if !span.font_size.is_finite() || span.font_size <= 0.0 {
            return None;
        }

        let mut text = clean_span_text(&span.text);
        if self.unicode {
            text = normalize_unicode(&text);
        }
        if text.is_empty() {
            return None;
        }

        let bbox = span.bbox.clamp_to(&self.page_box);
        if bbox.is_degenerate() {
            return None;
        }

        span.text = text;
        span.bbox = bbox;
        span.page_index = self.page_index;
        span.baseline_offset = 0.0;
        span.size_ratio = 1.0;
        Some(span)
    }

    /// Normalize all spans of a page and group them into lines.
    pub fn normalize(&self, spans: Vec<Span>) -> NormalizedPage {
        let total = spans.len();
        let kept: Vec<Span> = spans.into_iter().filter_map(|s| self.normalize_span(s)).collect();
        let dropped = (total - kept.len()) as u32;
        if dropped > 0 {
            log::debug!("page {}: dropped {} of {} spans", self.page_index + 1, dropped, total);
        }

        NormalizedPage {
            lines: group_lines(kept, self.join_gap),
            dropped,
        }
    }
}
