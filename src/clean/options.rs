//! Cleaning options and configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Cleaning preset levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanPreset {
    /// Minimal cleaning: text normalization and reading order only
    Minimal,
    /// Standard cleaning: boilerplate removal, dehyphenation, math detection
    #[default]
    Standard,
    /// Aggressive cleaning: looser boilerplate thresholds, deeper margin scan
    Aggressive,
}

/// Thresholds for superscript/subscript and display math detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MathThresholds {
    /// Minimum |baseline offset| as a fraction of the line's font size
    pub offset_fraction: f32,

    /// A candidate glyph must be smaller than this fraction of the line's font size
    pub size_ratio_max: f32,

    /// Share of non-alphanumeric glyphs above which a run is `math_complex`
    pub symbol_density: f32,

    /// Offsets closer than this fraction of the font size share a nesting level
    pub level_tolerance: f32,

    /// Math score at which a short paragraph becomes display math
    pub display_math_score: u32,

    /// Math score at which display math becomes `math_complex`
    pub display_complex_score: u32,

    /// Longest paragraph considered for display math
    pub display_math_max_chars: usize,
}

impl Default for MathThresholds {
    fn default() -> Self {
        Self {
            offset_fraction: 0.15,
            size_ratio_max: 0.9,
            symbol_density: 0.5,
            level_tolerance: 0.1,
            display_math_score: 2,
            display_complex_score: 4,
            display_math_max_chars: 120,
        }
    }
}

/// Geometric thresholds for line grouping, column clustering and paragraphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutThresholds {
    /// Largest horizontal gap (in font sizes) between spans of one line
    pub line_join_gap: f32,

    /// Left-edge gap, as a fraction of the median line width, that splits columns
    pub column_gap_ratio: f32,

    /// Lines wider than this fraction of the content width span all columns
    pub spanning_width_ratio: f32,

    /// Clusters with fewer lines are not treated as columns
    pub min_column_lines: usize,

    /// Vertical overlap (fraction of the shorter band) that makes bands side by side
    pub side_by_side_overlap: f32,

    /// Vertical gap (in line heights) that starts a new paragraph
    pub paragraph_gap_ratio: f32,

    /// Indentation (in font sizes) that starts a new paragraph
    pub indent_ratio: f32,

    /// Font size relative to the body size from which a line is a heading
    pub heading_size_ratio: f32,

    /// Longest text considered for a heading
    pub heading_max_chars: usize,
}

impl Default for LayoutThresholds {
    fn default() -> Self {
        Self {
            line_join_gap: 1.0,
            column_gap_ratio: 0.5,
            spanning_width_ratio: 0.55,
            min_column_lines: 3,
            side_by_side_overlap: 0.5,
            paragraph_gap_ratio: 0.75,
            indent_ratio: 1.5,
            heading_size_ratio: 1.3,
            heading_max_chars: 80,
        }
    }
}

/// Options for cleaning a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanOptions {
    /// Candidate boilerplate lines taken from the top of each page
    pub header_max_lines: usize,

    /// Candidate boilerplate lines taken from the bottom of each page
    pub footer_max_lines: usize,

    /// Share of pages a margin line must repeat on to count as boilerplate
    pub min_repetition_ratio: f32,

    /// Height of the top and bottom margins as a fraction of the page height
    pub margin_ratio: f32,

    /// Page numbers must be within this distance of the real page number
    pub page_number_tolerance: Option<u32>,

    /// Remove repeating headers and footers from the body text
    pub remove_headers_footers: bool,

    /// Remove page-number lines from the body text
    pub remove_page_numbers: bool,

    /// Emit removed boilerplate as header/footer/page_number segments
    pub retain_boilerplate: bool,

    /// Rejoin words split by a line-ending hyphen
    pub dehyphenate: bool,

    /// Collapse blank lines and trim trailing spaces in the final text
    pub normalize_whitespace: bool,

    /// Normalize Unicode to NFC and expand ligatures
    pub normalize_unicode: bool,

    /// Detect columns; when off the page is read strictly top-to-bottom
    pub multicolumn_enabled: bool,

    /// Join the lines of a paragraph with spaces instead of line breaks
    pub merge_paragraphs: bool,

    /// Detect superscript/subscript runs and display math
    pub detect_math: bool,

    /// Attach crop references to math segments
    pub export_math_crops: bool,

    /// Process pages in parallel
    pub parallel: bool,

    /// Math detection thresholds
    pub math: MathThresholds,

    /// Layout thresholds
    pub layout: LayoutThresholds,
}

impl CleanOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create options from a preset.
    pub fn from_preset(preset: CleanPreset) -> Self {
        match preset {
            CleanPreset::Minimal => Self::minimal(),
            CleanPreset::Standard => Self::standard(),
            CleanPreset::Aggressive => Self::aggressive(),
        }
    }

    /// Minimal cleaning options.
    pub fn minimal() -> Self {
        Self {
            remove_headers_footers: false,
            remove_page_numbers: false,
            dehyphenate: false,
            detect_math: false,
            ..Self::standard()
        }
    }

    /// Standard cleaning options.
    pub fn standard() -> Self {
        Self {
            header_max_lines: 3,
            footer_max_lines: 3,
            min_repetition_ratio: 0.6,
            margin_ratio: 0.15,
            page_number_tolerance: None,
            remove_headers_footers: true,
            remove_page_numbers: true,
            retain_boilerplate: false,
            dehyphenate: true,
            normalize_whitespace: true,
            normalize_unicode: true,
            multicolumn_enabled: true,
            merge_paragraphs: true,
            detect_math: true,
            export_math_crops: false,
            parallel: true,
            math: MathThresholds::default(),
            layout: LayoutThresholds::default(),
        }
    }

    /// Aggressive cleaning options.
    pub fn aggressive() -> Self {
        Self {
            header_max_lines: 4,
            footer_max_lines: 4,
            min_repetition_ratio: 0.4,
            margin_ratio: 0.2,
            ..Self::standard()
        }
    }

    /// Set header/footer candidate line caps.
    pub fn with_margin_lines(mut self, header: usize, footer: usize) -> Self {
        self.header_max_lines = header;
        self.footer_max_lines = footer;
        self
    }

    /// Set the boilerplate repetition ratio.
    pub fn with_repetition_ratio(mut self, ratio: f32) -> Self {
        self.min_repetition_ratio = ratio;
        self
    }

    /// Set the margin height ratio.
    pub fn with_margin_ratio(mut self, ratio: f32) -> Self {
        self.margin_ratio = ratio;
        self
    }

    /// Require page numbers to match the page within a tolerance.
    pub fn with_page_number_tolerance(mut self, tolerance: u32) -> Self {
        self.page_number_tolerance = Some(tolerance);
        self
    }

    /// Enable or disable header/footer removal.
    pub fn with_header_footer_removal(mut self, remove: bool) -> Self {
        self.remove_headers_footers = remove;
        self
    }

    /// Enable or disable page-number removal.
    pub fn with_page_number_removal(mut self, remove: bool) -> Self {
        self.remove_page_numbers = remove;
        self
    }

    /// Keep removed boilerplate as its own segments.
    pub fn retain_boilerplate(mut self, retain: bool) -> Self {
        self.retain_boilerplate = retain;
        self
    }

    /// Enable or disable dehyphenation.
    pub fn with_dehyphenation(mut self, dehyphenate: bool) -> Self {
        self.dehyphenate = dehyphenate;
        self
    }

    /// Enable or disable whitespace normalization.
    pub fn with_whitespace_normalization(mut self, normalize: bool) -> Self {
        self.normalize_whitespace = normalize;
        self
    }

    /// Enable or disable Unicode normalization.
    pub fn with_unicode_normalization(mut self, normalize: bool) -> Self {
        self.normalize_unicode = normalize;
        self
    }

    /// Enable or disable column detection.
    pub fn with_multicolumn(mut self, enabled: bool) -> Self {
        self.multicolumn_enabled = enabled;
        self
    }

    /// Enable or disable paragraph merging.
    pub fn with_paragraph_merging(mut self, merge: bool) -> Self {
        self.merge_paragraphs = merge;
        self
    }

    /// Enable or disable math detection.
    pub fn with_math_detection(mut self, detect: bool) -> Self {
        self.detect_math = detect;
        self
    }

    /// Enable or disable math crop references.
    pub fn with_math_crops(mut self, export: bool) -> Self {
        self.export_math_crops = export;
        self
    }

    /// Set math thresholds.
    pub fn with_math_thresholds(mut self, math: MathThresholds) -> Self {
        self.math = math;
        self
    }

    /// Set layout thresholds.
    pub fn with_layout_thresholds(mut self, layout: LayoutThresholds) -> Self {
        self.layout = layout;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check every option against its contract.
    pub fn validate(&self) -> Result<()> {
        check_fraction("min_repetition_ratio", self.min_repetition_ratio, false)?;
        check_fraction("margin_ratio", self.margin_ratio, true)?;
        if self.margin_ratio > 0.5 {
            return Err(Error::InvalidOption(format!(
                "margin_ratio must be at most 0.5, got {}",
                self.margin_ratio
            )));
        }

        let math = &self.math;
        check_positive("math.offset_fraction", math.offset_fraction)?;
        check_fraction("math.size_ratio_max", math.size_ratio_max, false)?;
        check_fraction("math.symbol_density", math.symbol_density, true)?;
        check_positive("math.level_tolerance", math.level_tolerance)?;
        if math.display_complex_score < math.display_math_score {
            return Err(Error::InvalidOption(format!(
                "math.display_complex_score ({}) must not be below math.display_math_score ({})",
                math.display_complex_score, math.display_math_score
            )));
        }

        let layout = &self.layout;
        check_positive("layout.line_join_gap", layout.line_join_gap)?;
        check_positive("layout.column_gap_ratio", layout.column_gap_ratio)?;
        check_fraction("layout.spanning_width_ratio", layout.spanning_width_ratio, false)?;
        check_fraction("layout.side_by_side_overlap", layout.side_by_side_overlap, false)?;
        check_positive("layout.paragraph_gap_ratio", layout.paragraph_gap_ratio)?;
        check_positive("layout.indent_ratio", layout.indent_ratio)?;
        check_positive("layout.heading_size_ratio", layout.heading_size_ratio)?;
        if layout.min_column_lines == 0 {
            return Err(Error::InvalidOption(
                "layout.min_column_lines must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self::standard()
    }
}

/// `value` must be finite and within `0..=1` (`0` allowed only when `allow_zero`).
fn check_fraction(name: &str, value: f32, allow_zero: bool) -> Result<()> {
    let lower_ok = if allow_zero { value >= 0.0 } else { value > 0.0 };
    if !value.is_finite() || !lower_ok || value > 1.0 {
        let range = if allow_zero { "0..=1" } else { "(0, 1]" };
        return Err(Error::InvalidOption(format!(
            "{} must be within {}, got {}",
            name, range, value
        )));
    }
    Ok(())
}

fn check_positive(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidOption(format!(
            "{} must be a positive number, got {}",
            name, value
        )));
    }
    Ok(())
}
