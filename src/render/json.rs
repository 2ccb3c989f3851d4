//! JSON and JSON Lines encoding of cleaning results.

use crate::error::{Error, Result};
use crate::model::{DocumentResult, SourceMode};
use serde::Serialize;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// One line of the page-text stream.
#[derive(Debug, Serialize)]
struct PageRecord<'a> {
    doc_id: &'a str,
    page: u32,
    text: &'a str,
    source_mode: &'a SourceMode,
}

fn encode<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

fn jsonl<T, I>(records: I) -> Result<String>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut output = String::new();
    for record in records {
        output.push_str(&encode(&record, JsonFormat::Compact)?);
        output.push('\n');
    }
    Ok(output)
}

/// Convert a whole result (pages, segments and summary) to JSON.
pub fn to_json(result: &DocumentResult, format: JsonFormat) -> Result<String> {
    encode(result, format)
}

/// Encode the summary (statistics, warnings, options) as JSON.
pub fn to_meta_json(result: &DocumentResult, format: JsonFormat) -> Result<String> {
    encode(&result.summary, format)
}

/// Encode every segment as one JSON object per line.
pub fn to_segments_jsonl(result: &DocumentResult) -> Result<String> {
    jsonl(result.segments())
}

/// Encode every page's cleaned text as one JSON object per line.
pub fn to_pages_jsonl(result: &DocumentResult) -> Result<String> {
    jsonl(result.pages.iter().map(|p| PageRecord {
        doc_id: &result.doc_id,
        page: p.number,
        text: &p.cleaned_text,
        source_mode: &p.source_mode,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, PageResult, Role, Segment, Summary};

    fn sample() -> DocumentResult {
        let mut page = PageResult::new(1, SourceMode::Ocr("paddle".into()));
        page.segments.push(Segment {
            doc_id: "doc".into(),
            page: 1,
            segment_id: "doc-p001-s001".into(),
            role: Role::PageNumber,
            bbox: BBox::new(300.0, 760.0, 310.0, 770.0),
            text: "1".into(),
            source_mode: SourceMode::Ocr("paddle".into()),
            confidence: Some(0.5),
            crop: None,
        });
        page.cleaned_text = "Body".into();
        DocumentResult {
            doc_id: "doc".into(),
            pages: vec![page],
            summary: Summary::new("doc", Default::default()),
        }
    }

    #[test]
    fn test_segments_jsonl_schema() {
        let jsonl = to_segments_jsonl(&sample()).unwrap();
        assert_eq!(jsonl.lines().count(), 1);

        let value: serde_json::Value = serde_json::from_str(jsonl.trim()).unwrap();
        assert_eq!(value["segment_id"], "doc-p001-s001");
        assert_eq!(value["role"], "page_number");
        assert_eq!(value["source_mode"], "ocr:paddle");
        assert_eq!(value["bbox"].as_array().unwrap().len(), 4);
        assert_eq!(value["confidence"], 0.5);
        assert!(value.get("crop").is_none());
    }

    #[test]
    fn test_pages_jsonl() {
        let jsonl = to_pages_jsonl(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(jsonl.trim()).unwrap();
        assert_eq!(value["doc_id"], "doc");
        assert_eq!(value["page"], 1);
        assert_eq!(value["text"], "Body");
        assert_eq!(value["source_mode"], "ocr:paddle");
    }

    #[test]
    fn test_meta_json_formats() {
        let result = sample();
        let pretty = to_meta_json(&result, JsonFormat::Pretty).unwrap();
        assert!(pretty.contains('\n'));
        assert!(pretty.contains("\"warnings\""));
        let compact = to_meta_json(&result, JsonFormat::Compact).unwrap();
        assert!(!compact.contains('\n'));
    }

    #[test]
    fn test_empty_result_encodes_to_empty_stream() {
        let result = DocumentResult {
            doc_id: "e".into(),
            pages: Vec::new(),
            summary: Summary::default(),
        };
        assert_eq!(to_segments_jsonl(&result).unwrap(), "");
        assert!(to_json(&result, JsonFormat::Compact).unwrap().contains("\"pages\":[]"));
    }
}
