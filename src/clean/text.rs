//! Text-level cleaning rules shared by the pipeline stages.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref HORIZONTAL_WS: Regex = Regex::new(r"[ \t\u{00A0}]+").unwrap();
    static ref TRAILING_WS: Regex = Regex::new(r"[ \t]+\n").unwrap();
    static ref LEADING_WS: Regex = Regex::new(r"\n[ \t]+").unwrap();
    static ref BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
    static ref DIGIT_RUN: Regex = Regex::new(r"\d+").unwrap();
    static ref PAGE_NUMBER: Regex = Regex::new(
        r"(?i)^[\-–—(\[]?\s*(?:(?:page|pg\.?|p\.)\s*)?(\d{1,4})(?:\s*(?:/|of)\s*\d{1,4})?\s*[\-–—)\]]?$"
    )
    .unwrap();
    static ref LIST_ITEM: Regex = Regex::new(r"^(?:[\-*•]|\d+\.|\d+\)|[a-zA-Z]\))\s+").unwrap();
    static ref SENTENCE_END: Regex = Regex::new(r"[。！？.!?]\s*$").unwrap();
    static ref TEX_SCRIPT: Regex = Regex::new(r"[_^]\{").unwrap();
    static ref MATH_SYMBOL: Regex = Regex::new(r"[=<>±×÷∑∫√∞≈≠≤≥πθλμΩαβγδΔΣ∏∂]").unwrap();
    static ref MATH_FUNCTION: Regex = Regex::new(r"\b(?:sin|cos|tan|log|ln|exp)\b").unwrap();
    static ref FRACTION: Regex = Regex::new(r"\d+/\d+").unwrap();
}

const LIGATURES: [(&str, &str); 7] = [
    ("\u{FB00}", "ff"),
    ("\u{FB01}", "fi"),
    ("\u{FB02}", "fl"),
    ("\u{FB03}", "ffi"),
    ("\u{FB04}", "ffl"),
    ("\u{FB05}", "st"),
    ("\u{FB06}", "st"),
];

/// Strip control characters, collapse whitespace runs to one space and trim.
pub fn clean_span_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = true;
        } else if c.is_control() {
            continue;
        } else {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        }
    }
    out
}

/// Unicode NFC, ligature expansion and removal of the replacement character.
pub fn normalize_unicode(text: &str) -> String {
    let mut result: String = text.nfc().collect();
    for (ligature, replacement) in LIGATURES {
        if result.contains(ligature) {
            result = result.replace(ligature, replacement);
        }
    }
    if result.contains('\u{FFFD}') {
        result = result.replace('\u{FFFD}', "");
    }
    result
}

/// Normalize whitespace of assembled text.
///
/// Collapses horizontal whitespace, trims trailing and leading spaces of
/// every line, keeps at most one blank line between paragraphs. Applying it
/// twice gives the same result as applying it once.
pub fn normalize_whitespace(text: &str) -> String {
    let text = HORIZONTAL_WS.replace_all(text, " ");
    let text = TRAILING_WS.replace_all(&text, "\n");
    let text = LEADING_WS.replace_all(&text, "\n");
    let text = BLANK_LINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Line fingerprint: whitespace-collapsed, lowercased, digit runs masked.
///
/// "Page 3" and "Page 14" share the fingerprint "page #".
pub fn fingerprint(text: &str) -> String {
    let collapsed = clean_span_text(text).to_lowercase();
    DIGIT_RUN.replace_all(&collapsed, "#").into_owned()
}

/// Parse a page-number line, returning the number it shows.
///
/// Accepts "12", "- 12 -", "(12)", "[12]", "Page 12", "p. 12", "Page 3 of 20",
/// "3/20".
pub fn parse_page_number(text: &str) -> Option<u32> {
    let text = clean_span_text(text);
    PAGE_NUMBER
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Whether the text is a page-number line.
pub fn is_page_number(text: &str) -> bool {
    parse_page_number(text).is_some()
}

/// Whether the line starts with a list marker.
pub fn is_list_item(text: &str) -> bool {
    LIST_ITEM.is_match(text.trim_start())
}

/// Whether the text ends a sentence.
pub fn ends_sentence(text: &str) -> bool {
    SENTENCE_END.is_match(text)
}

/// How strongly the text looks like mathematics.
pub fn math_score(text: &str) -> u32 {
    let mut score = 0;
    if TEX_SCRIPT.is_match(text) {
        score += 2;
    }
    if MATH_SYMBOL.is_match(text) {
        score += 2;
    }
    if MATH_FUNCTION.is_match(text) {
        score += 1;
    }
    if FRACTION.is_match(text) {
        score += 1;
    }
    score
}

/// Share of non-alphanumeric glyphs among the non-whitespace characters.
pub fn symbol_density(text: &str) -> f32 {
    let mut total = 0usize;
    let mut symbols = 0usize;
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        total += 1;
        if !c.is_alphanumeric() {
            symbols += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        symbols as f32 / total as f32
    }
}

/// Outcome of joining a line-ending hyphen with the next line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HyphenJoin {
    /// The line does not end in a hyphen
    None,
    /// The hyphen splits a word; drop it and join without a space
    Merge,
    /// The hyphen is real (next line not lowercase); keep it and join without a space
    Keep,
}

/// Decide how a line ending is joined with the next line's start.
pub fn hyphen_join(line: &str, next: &str) -> HyphenJoin {
    let mut rev = line.chars().rev();
    let last = match rev.next() {
        Some(c) => c,
        None => return HyphenJoin::None,
    };
    if last == '\u{00AD}' {
        return HyphenJoin::Merge;
    }
    if last != '-' {
        return HyphenJoin::None;
    }
    match rev.next() {
        Some(c) if c.is_alphanumeric() => {}
        _ => return HyphenJoin::None,
    }
    match next.trim_start().chars().next() {
        Some(c) if c.is_lowercase() => HyphenJoin::Merge,
        Some(_) => HyphenJoin::Keep,
        None => HyphenJoin::None,
    }
}

/// Join paragraph lines.
///
/// With `dehyphenate`, hyphen-split words are rejoined; otherwise a
/// hyphenated line break is preserved verbatim as `-\n`. Other lines are
/// joined with a space when `merge` is set and with a line break otherwise.
pub fn join_lines<S: AsRef<str>>(lines: &[S], dehyphenate: bool, merge: bool) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref().trim();
        if i == 0 {
            out.push_str(line);
            continue;
        }
        match hyphen_join(&out, line) {
            HyphenJoin::Merge if dehyphenate => {
                out.pop();
            }
            HyphenJoin::Keep if dehyphenate && merge => {}
            HyphenJoin::Merge | HyphenJoin::Keep => out.push('\n'),
            HyphenJoin::None => out.push(if merge { ' ' } else { '\n' }),
        }
        out.push_str(line);
    }
    out
}

/// Split plain text lines into paragraphs.
///
/// Blank lines always separate paragraphs. With `merge`, list items stand
/// alone and a line ending a sentence closes its paragraph; without it, each
/// blank-line separated block is kept with its line breaks.
pub fn split_paragraphs(lines: &[String], dehyphenate: bool, merge: bool) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();

    let flush = |buffer: &mut Vec<&str>, paragraphs: &mut Vec<String>| {
        if !buffer.is_empty() {
            let joined = join_lines(buffer.as_slice(), dehyphenate, merge);
            let joined = joined.trim();
            if !joined.is_empty() {
                paragraphs.push(joined.to_string());
            }
            buffer.clear();
        }
    };

    for line in lines {
        let stripped = line.trim();
        if stripped.is_empty() {
            flush(&mut buffer, &mut paragraphs);
            continue;
        }
        if merge {
            if is_list_item(stripped) {
                flush(&mut buffer, &mut paragraphs);
                buffer.push(stripped);
                flush(&mut buffer, &mut paragraphs);
                continue;
            }
            if buffer.last().is_some_and(|prev| ends_sentence(prev)) {
                flush(&mut buffer, &mut paragraphs);
            }
        }
        buffer.push(stripped);
    }
    flush(&mut buffer, &mut paragraphs);
    paragraphs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_span_text() {
        assert_eq!(clean_span_text("  hello \t\n world  "), "hello world");
        assert_eq!(clean_span_text("a\u{0007}b"), "ab");
        assert_eq!(clean_span_text(" \n\t "), "");
    }

    #[test]
    fn test_ligature_fix() {
        assert_eq!(normalize_unicode("ﬁnding ﬂowers"), "finding flowers");
        assert_eq!(normalize_unicode("Hello\u{FFFD}World"), "HelloWorld");
    }

    #[test]
    fn test_normalize_whitespace_idempotent() {
        let raw = "First   line  \n   second\t\tline\n\n\n\nThird paragraph.  ";
        let once = normalize_whitespace(raw);
        assert_eq!(once, "First line\nsecond line\n\nThird paragraph.");
        assert_eq!(normalize_whitespace(&once), once);
    }

    #[test]
    fn test_fingerprint_masks_digits() {
        assert_eq!(fingerprint("Page 3"), fingerprint("page  14"));
        assert_eq!(fingerprint("Confidential Draft"), "confidential draft");
        assert_ne!(fingerprint("Chapter 2"), fingerprint("Page 2"));
    }

    #[test]
    fn test_page_number_patterns() {
        assert_eq!(parse_page_number("42"), Some(42));
        assert_eq!(parse_page_number("- 7 -"), Some(7));
        assert_eq!(parse_page_number("[12]"), Some(12));
        assert_eq!(parse_page_number("Page 3"), Some(3));
        assert_eq!(parse_page_number("Page 1/20"), Some(1));
        assert_eq!(parse_page_number("page 4 of 9"), Some(4));
        assert_eq!(parse_page_number("p. 5"), Some(5));
        assert!(!is_page_number("Chapter 3"));
        assert!(!is_page_number("12345"));
        assert!(!is_page_number("The year 1999 was"));
    }

    #[test]
    fn test_dehyphenation_round_trip() {
        let lines = ["exam-", "ple"];
        assert_eq!(join_lines(&lines, true, true), "example");
        assert_eq!(join_lines(&lines, false, true), "exam-\nple");
    }

    #[test]
    fn test_hyphen_before_capital_is_kept() {
        assert_eq!(join_lines(&["pre-", "Raphaelite"], true, true), "pre-Raphaelite");
        assert_eq!(join_lines(&["a list -", "item"], true, true), "a list - item");
        assert_eq!(join_lines(&["soft\u{00AD}", "ware"], true, true), "software");
    }

    #[test]
    fn test_join_without_merge_keeps_breaks() {
        assert_eq!(join_lines(&["one", "two"], true, false), "one\ntwo");
        assert_eq!(join_lines(&["infor-", "mation"], true, false), "information");
    }

    #[test]
    fn test_split_paragraphs() {
        let lines: Vec<String> = [
            "This is a demon-",
            "stration of text.",
            "Next sentence starts",
            "here",
            "",
            "- a list item",
            "Tail",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let paragraphs = split_paragraphs(&lines, true, true);
        assert_eq!(
            paragraphs,
            vec![
                "This is a demonstration of text.",
                "Next sentence starts here",
                "- a list item",
                "Tail",
            ]
        );
    }

    #[test]
    fn test_math_score() {
        assert!(math_score("x^{2} + y^{2} = z^{2}") >= 4);
        assert_eq!(math_score("plain words only"), 0);
        assert_eq!(math_score("sin x"), 1);
    }

    #[test]
    fn test_symbol_density() {
        assert_eq!(symbol_density("ab"), 0.0);
        assert_eq!(symbol_density("+1"), 0.5);
        assert_eq!(symbol_density("  "), 0.0);
    }
}
