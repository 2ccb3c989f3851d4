//! Span-level types.

use super::BBox;
use serde::{Deserialize, Serialize};

/// An atomic text run with position and style information.
///
/// Spans are produced by the extraction or OCR collaborator. The normalizer
/// cleans their text in place and fills in `baseline_offset` and
/// `size_ratio`; nothing else about a span changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// The text content
    pub text: String,
    /// Bounding box in page units
    pub bbox: BBox,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    #[serde(default)]
    pub font_name: String,
    /// Whether the font appears to be bold
    #[serde(default)]
    pub is_bold: bool,
    /// Whether the font appears to be italic
    #[serde(default)]
    pub is_italic: bool,
    /// Baseline (origin) y coordinate, when the extractor reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_y: Option<f32>,
    /// Recognition confidence in 0..=1 (OCR spans only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    /// 0-based index of the page this span belongs to
    #[serde(default)]
    pub page_index: usize,
    /// Vertical displacement from the line's dominant baseline (negative = raised)
    #[serde(default)]
    pub baseline_offset: f32,
    /// Font size relative to the line's dominant font size
    #[serde(default = "default_size_ratio")]
    pub size_ratio: f32,
}

fn default_size_ratio() -> f32 {
    1.0
}

impl Span {
    /// Create a new span. Bold/italic flags are inferred from the font name.
    pub fn new(text: impl Into<String>, bbox: BBox, font_size: f32, font_name: impl Into<String>) -> Self {
        let font_name = font_name.into();
        let lower = font_name.to_lowercase();
        let is_bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        let is_italic = lower.contains("italic") || lower.contains("oblique");

        Self {
            text: text.into(),
            bbox,
            font_size,
            font_name,
            is_bold,
            is_italic,
            origin_y: None,
            confidence: None,
            page_index: 0,
            baseline_offset: 0.0,
            size_ratio: 1.0,
        }
    }

    /// Set explicit font flags.
    pub fn with_flags(mut self, bold: bool, italic: bool) -> Self {
        self.is_bold = bold;
        self.is_italic = italic;
        self
    }

    /// Set the baseline origin reported by the extractor.
    pub fn with_origin_y(mut self, y: f32) -> Self {
        self.origin_y = Some(y);
        self
    }

    /// Set an OCR confidence score.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Baseline y coordinate: the reported origin, else the bottom edge.
    pub fn baseline(&self) -> f32 {
        self.origin_y.unwrap_or(self.bbox.y1)
    }

    /// Number of characters in the span text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}
