//! Error types for pagescribe.

use thiserror::Error;

/// Result type alias for pagescribe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while cleaning a document.
///
/// Page content never produces an error: malformed geometry, empty pages and
/// ambiguous layouts degrade to best-effort output and are reported as
/// warnings in the document summary.
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration value violates its contract (e.g. a ratio outside 0..=1).
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Error while encoding results (JSON, JSONL).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
