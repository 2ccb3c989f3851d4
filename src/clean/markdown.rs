//! Markdown pages from remote conversion backends.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();
    static ref CODE_FENCE: Regex = Regex::new(r"(?s)```.*?```").unwrap();
    static ref IMAGE: Regex = Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap();
    static ref HEADING: Regex = Regex::new(r"^#{1,6}\s+(.*)$").unwrap();
    static ref RULE: Regex = Regex::new(r"^(?:-{3,}|\*{3,}|_{3,})$").unwrap();
    static ref EMPHASIS: Regex = Regex::new(r"\*\*|__|\*").unwrap();
    static ref INLINE_MATH: Regex = Regex::new(r"\$([^$]+)\$").unwrap();
}

/// A block of a Markdown page.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkdownBlock {
    /// `#` heading text
    Heading(String),
    /// Contents of a `$$ .. $$` display block
    Math(String),
    /// Plain text lines (may contain blank lines)
    Text(Vec<String>),
}

/// Strip comments, code fences and images, returning the remaining lines.
pub fn strip_markup(markdown: &str) -> Vec<String> {
    let text = COMMENT.replace_all(markdown, "");
    let text = CODE_FENCE.replace_all(&text, "");
    let text = IMAGE.replace_all(&text, " ");
    text.lines().map(|l| l.trim_end().to_string()).collect()
}

/// Parse stripped Markdown lines into blocks.
pub fn parse_blocks(lines: &[String]) -> Vec<MarkdownBlock> {
    let mut blocks = Vec::new();
    let mut text: Vec<String> = Vec::new();
    let mut math: Option<Vec<String>> = None;

    let flush_text = |text: &mut Vec<String>, blocks: &mut Vec<MarkdownBlock>| {
        if text.iter().any(|l| !l.trim().is_empty()) {
            blocks.push(MarkdownBlock::Text(std::mem::take(text)));
        }
        text.clear();
    };

    for raw in lines {
        let line = raw.trim();

        if let Some(body) = math.as_mut() {
            if let Some(rest) = line.strip_suffix("$$") {
                body.push(rest.to_string());
                let content = body.join("\n").trim().to_string();
                blocks.push(MarkdownBlock::Math(content));
                math = None;
            } else {
                body.push(line.to_string());
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("$$") {
            flush_text(&mut text, &mut blocks);
            match rest.strip_suffix("$$") {
                Some(inner) => blocks.push(MarkdownBlock::Math(inner.trim().to_string())),
                None => math = Some(vec![rest.to_string()]),
            }
            continue;
        }

        if let Some(caps) = HEADING.captures(line) {
            flush_text(&mut text, &mut blocks);
            blocks.push(MarkdownBlock::Heading(strip_inline(&caps[1])));
            continue;
        }

        if RULE.is_match(line) {
            flush_text(&mut text, &mut blocks);
            continue;
        }

        text.push(strip_inline(line));
    }

    if let Some(body) = math {
        // Unterminated display block
        blocks.push(MarkdownBlock::Math(body.join("\n").trim().to_string()));
    }
    flush_text(&mut text, &mut blocks);
    blocks
}

/// Remove emphasis markers and inline math delimiters.
fn strip_inline(text: &str) -> String {
    let text = INLINE_MATH.replace_all(text, "$1");
    EMPHASIS.replace_all(&text, "").trim().to_string()
}
