//! Page mode detection.
//!
//! Decides per page whether text can be taken from the extracted text layer
//! or has to come from OCR (or a remote conversion backend). The caller runs
//! the probes and the OCR itself; this module only makes the decision and
//! produces the [`SourceMode`] tags the cleaner consumes.

use crate::model::{PageContent, PageInput, SourceMode};
use serde::{Deserialize, Serialize};

/// Minimum non-whitespace characters for a page to count as text-bearing.
pub const MIN_TEXT_CHARS: usize = 15;

/// What a quick look at a page's text layer found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageProbe {
    /// Non-whitespace characters in the text layer
    pub text_chars: usize,
    /// Number of text blocks
    pub text_blocks: usize,
    /// Number of image blocks
    pub image_blocks: usize,
}

impl PageProbe {
    /// Create a probe.
    pub fn new(text_chars: usize, text_blocks: usize, image_blocks: usize) -> Self {
        Self {
            text_chars,
            text_blocks,
            image_blocks,
        }
    }

    /// Probe the content of an input page. Lines count as text blocks;
    /// image blocks are unknown at this level.
    pub fn from_page(page: &PageInput) -> Self {
        let count = |text: &str| text.chars().filter(|c| !c.is_whitespace()).count();
        match &page.content {
            PageContent::Spans(spans) => Self {
                text_chars: spans.iter().map(|s| count(&s.text)).sum(),
                text_blocks: spans.len(),
                image_blocks: 0,
            },
            PageContent::Text(text) | PageContent::Markdown(text) => Self {
                text_chars: count(text),
                text_blocks: text.lines().filter(|l| !l.trim().is_empty()).count(),
                image_blocks: 0,
            },
        }
    }
}

/// Whether a page looks scanned.
///
/// # Arguments
/// * `probe` - Text layer statistics of the page
/// * `min_text_chars` - Character count below which the text layer is ignored
///
/// # Returns
/// * `true` if the page has almost no text, or a single text block on top of images
pub fn is_scanned(probe: &PageProbe, min_text_chars: usize) -> bool {
    probe.text_chars < min_text_chars || (probe.text_blocks <= 1 && probe.image_blocks > 0)
}

/// How scanned pages are handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModePolicy {
    /// Character threshold for [`is_scanned`]
    pub min_text_chars: usize,
    /// OCR engine name, `None` when OCR is unavailable
    pub ocr_engine: Option<String>,
    /// Maximum number of pages sent to OCR, `None` for no limit
    pub max_ocr_pages: Option<usize>,
    /// Remote backend that converts every page, overriding OCR
    pub remote_backend: Option<String>,
}

impl Default for ModePolicy {
    fn default() -> Self {
        Self {
            min_text_chars: MIN_TEXT_CHARS,
            ocr_engine: None,
            max_ocr_pages: None,
            remote_backend: None,
        }
    }
}

impl ModePolicy {
    /// Create a policy without OCR.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable OCR with the given engine.
    pub fn with_ocr(mut self, engine: impl Into<String>) -> Self {
        self.ocr_engine = Some(engine.into());
        self
    }

    /// Cap the number of OCR pages.
    pub fn with_max_ocr_pages(mut self, max: usize) -> Self {
        self.max_ocr_pages = Some(max);
        self
    }

    /// Send every page to a remote backend.
    pub fn with_remote(mut self, backend: impl Into<String>) -> Self {
        self.remote_backend = Some(backend.into());
        self
    }
}

/// Source mode decided for every page of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageModePlan {
    /// Mode per page, in page order
    pub modes: Vec<SourceMode>,
    /// Pages that could not be handled as requested
    pub warnings: Vec<String>,
}

impl PageModePlan {
    /// 0-based indices of the pages to send to OCR.
    pub fn ocr_pages(&self) -> Vec<usize> {
        self.modes
            .iter()
            .enumerate()
            .filter(|(_, m)| matches!(m, SourceMode::Ocr(_)))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Decide the source mode of every page.
///
/// # Example
/// ```
/// use pagescribe::detect::{plan_page_modes, ModePolicy, PageProbe};
/// use pagescribe::SourceMode;
///
/// let probes = [PageProbe::new(900, 12, 0), PageProbe::new(0, 0, 1)];
/// let plan = plan_page_modes(&probes, &ModePolicy::new().with_ocr("paddle"));
/// assert_eq!(plan.modes[0], SourceMode::ExtractText);
/// assert_eq!(plan.modes[1], SourceMode::Ocr("paddle".into()));
/// ```
pub fn plan_page_modes(probes: &[PageProbe], policy: &ModePolicy) -> PageModePlan {
    let mut plan = PageModePlan::default();

    if let Some(backend) = &policy.remote_backend {
        plan.modes = vec![SourceMode::Remote(backend.clone()); probes.len()];
        return plan;
    }

    let mut ocr_used = 0usize;
    for (index, probe) in probes.iter().enumerate() {
        if !is_scanned(probe, policy.min_text_chars) {
            plan.modes.push(SourceMode::ExtractText);
            continue;
        }

        let within_budget = policy.max_ocr_pages.map_or(true, |max| ocr_used < max);
        let mode = match &policy.ocr_engine {
            Some(engine) if within_budget => {
                ocr_used += 1;
                SourceMode::Ocr(engine.clone())
            }
            Some(_) => {
                plan.warnings
                    .push(format!("page {}: OCR page limit reached, using text layer", index + 1));
                SourceMode::ExtractFailedOcr
            }
            None => {
                plan.warnings
                    .push(format!("page {}: scanned page but OCR is unavailable", index + 1));
                SourceMode::ExtractFailedOcr
            }
        };
        log::debug!("page {}: scanned, mode {}", index + 1, mode);
        plan.modes.push(mode);
    }

    plan
}
