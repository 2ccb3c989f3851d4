//! Encoders for cleaning results.
//!
//! All encoders work in memory; writing files is left to the caller.

mod json;
mod text;

pub use json::{to_json, to_meta_json, to_pages_jsonl, to_segments_jsonl, JsonFormat};
pub use text::{has_page_breaks, to_page_texts, to_text};
