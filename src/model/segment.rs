//! Segment types: the externally visible output unit.

use super::BBox;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a segment. The set is closed; every role goes through the same writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Body text paragraph
    Paragraph,
    /// Section heading
    Heading,
    /// Repeating top-margin boilerplate
    Header,
    /// Repeating bottom-margin boilerplate
    Footer,
    /// Page number line
    PageNumber,
    /// Inline or display math handled by heuristic reconstruction
    Math,
    /// Math that likely needs a dedicated math OCR/typesetting backend
    MathComplex,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Paragraph => "paragraph",
            Role::Heading => "heading",
            Role::Header => "header",
            Role::Footer => "footer",
            Role::PageNumber => "page_number",
            Role::Math => "math",
            Role::MathComplex => "math_complex",
        }
    }

    /// Header, footer or page number.
    pub fn is_boilerplate(&self) -> bool {
        matches!(self, Role::Header | Role::Footer | Role::PageNumber)
    }

    /// Math or math_complex.
    pub fn is_math(&self) -> bool {
        matches!(self, Role::Math | Role::MathComplex)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of a page's text, propagated unchanged into every segment.
///
/// Serialized as `extract:text`, `extract:failed_ocr`, `ocr:<engine>` or
/// `remote:<backend>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SourceMode {
    /// Text layer extracted directly
    #[default]
    ExtractText,
    /// Scanned page whose OCR was unavailable or failed; text layer used instead
    ExtractFailedOcr,
    /// Text recognized by an OCR engine
    Ocr(String),
    /// Text produced by a remote conversion backend
    Remote(String),
}

impl SourceMode {
    /// Whether text from this source carries probabilistic confidence.
    pub fn is_probabilistic(&self) -> bool {
        matches!(self, SourceMode::Ocr(_) | SourceMode::Remote(_))
    }
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceMode::ExtractText => f.write_str("extract:text"),
            SourceMode::ExtractFailedOcr => f.write_str("extract:failed_ocr"),
            SourceMode::Ocr(engine) => write!(f, "ocr:{}", engine),
            SourceMode::Remote(backend) => write!(f, "remote:{}", backend),
        }
    }
}

impl FromStr for SourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("extract", "text")) => Ok(SourceMode::ExtractText),
            Some(("extract", "failed_ocr")) => Ok(SourceMode::ExtractFailedOcr),
            Some(("ocr", engine)) if !engine.is_empty() => Ok(SourceMode::Ocr(engine.to_string())),
            Some(("remote", backend)) if !backend.is_empty() => {
                Ok(SourceMode::Remote(backend.to_string()))
            }
            _ => Err(format!("unknown source mode: {}", s)),
        }
    }
}

impl From<SourceMode> for String {
    fn from(mode: SourceMode) -> Self {
        mode.to_string()
    }
}

impl TryFrom<String> for SourceMode {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Reference to a page region for external verification of a math segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MathCrop {
    /// 1-based page number
    pub page: u32,
    /// Region on the page
    pub bbox: BBox,
}

/// A structured output segment. Immutable once emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Document identifier
    pub doc_id: String,
    /// 1-based page number
    pub page: u32,
    /// Stable identifier derived from doc id, page and sequence
    pub segment_id: String,
    /// Segment role
    pub role: Role,
    /// Bounding box, always within the page box
    pub bbox: BBox,
    /// Segment text (never empty)
    pub text: String,
    /// Provenance of the text
    pub source_mode: SourceMode,
    /// Confidence for probabilistic sources, otherwise null
    pub confidence: Option<f32>,
    /// Crop reference for math segments when crop export is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<MathCrop>,
}

/// Build a segment id: `{doc_id}-p{page:03}-s{seq:03}`.
pub fn segment_id(doc_id: &str, page: u32, seq: usize) -> String {
    format!("{}-p{:03}-s{:03}", doc_id, page, seq)
}
