//! Plain text rendering of cleaning results.

use crate::error::Result;
use crate::model::{DocumentResult, PAGE_SEPARATOR};

/// Convert a result to plain text: the cleaned text of every page,
/// separated by a form feed between blank lines.
pub fn to_text(result: &DocumentResult) -> Result<String> {
    Ok(result.cleaned_text())
}

/// Cleaned text of every page, without separators, skipping empty pages.
pub fn to_page_texts(result: &DocumentResult) -> Vec<&str> {
    result
        .pages
        .iter()
        .map(|p| p.cleaned_text.as_str())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Whether text contains a page separator.
pub fn has_page_breaks(text: &str) -> bool {
    text.contains(PAGE_SEPARATOR)
}
