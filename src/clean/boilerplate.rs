//! Header, footer and page-number detection.
//!
//! Detection runs in two passes. The first pass feeds the margin lines of
//! every page into a [`RepetitionProfile`]; the second pass asks a
//! [`BoilerplateDetector`] built on the finished profile which margin lines
//! repeat often enough to be boilerplate.

use super::text::{fingerprint, parse_page_number};
use super::CleanOptions;
use crate::layout::Line;
use crate::model::{PageStats, Role};
use std::collections::{HashMap, HashSet};

/// Warning recorded when a document is too short for repetition analysis.
pub const INSUFFICIENT_PAGES: &str = "header/footer detection skipped: insufficient pages";

/// Warning recorded when no page carries positioned spans to compare.
pub const NO_POSITIONED_PAGES: &str = "header/footer detection skipped: no positioned pages";

/// Page margin a candidate line was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarginZone {
    /// Top margin
    Top,
    /// Bottom margin
    Bottom,
}

impl MarginZone {
    fn role(self) -> Role {
        match self {
            MarginZone::Top => Role::Header,
            MarginZone::Bottom => Role::Footer,
        }
    }
}

/// Fingerprint of a margin line: digit-masked, case-folded text plus zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineSignature {
    /// Margin zone
    pub zone: MarginZone,
    /// Normalized text
    pub text: String,
}

impl LineSignature {
    /// Create the signature of a line.
    pub fn new(zone: MarginZone, text: &str) -> Self {
        Self {
            zone,
            text: fingerprint(text),
        }
    }
}

/// Number of pages every margin signature occurs on.
#[derive(Debug, Clone, Default)]
pub struct RepetitionProfile {
    counts: HashMap<LineSignature, usize>,
    pages: usize,
}

impl RepetitionProfile {
    /// Create an empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the margin signatures of one page. A signature seen twice on
    /// the same page counts once.
    pub fn observe_page<I>(&mut self, signatures: I)
    where
        I: IntoIterator<Item = LineSignature>,
    {
        self.pages += 1;
        let unique: HashSet<LineSignature> = signatures.into_iter().collect();
        for signature in unique {
            *self.counts.entry(signature).or_insert(0) += 1;
        }
    }

    /// Number of pages observed.
    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Number of pages a signature occurs on.
    pub fn count(&self, signature: &LineSignature) -> usize {
        self.counts.get(signature).copied().unwrap_or(0)
    }

    /// Whether enough pages were observed for repetition to mean anything.
    pub fn is_active(&self) -> bool {
        self.pages >= 2
    }

    /// Whether a signature repeats on at least `min_ratio` of the pages
    /// (and on two pages at least).
    pub fn is_repeated(&self, signature: &LineSignature, min_ratio: f32) -> bool {
        if !self.is_active() {
            return false;
        }
        let count = self.count(signature);
        count >= 2 && count as f64 + 1e-9 >= min_ratio as f64 * self.pages as f64
    }

    /// Number of distinct signatures.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no signature has been recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Margin candidates of a page, as indices into its line list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarginCandidates {
    /// Lines in the top margin, top-to-bottom
    pub top: Vec<usize>,
    /// Lines in the bottom margin, top-to-bottom
    pub bottom: Vec<usize>,
}

impl MarginCandidates {
    /// Candidates of positioned lines (sorted top-to-bottom).
    pub fn of_lines(lines: &[Line], page_height: f32, options: &CleanOptions) -> Self {
        let margin = options.margin_ratio * page_height;

        let top: Vec<usize> = (0..lines.len())
            .filter(|&i| lines[i].bbox.y0 <= margin)
            .take(options.header_max_lines)
            .collect();
        let mut bottom: Vec<usize> = (0..lines.len())
            .rev()
            .filter(|&i| lines[i].bbox.y1 >= page_height - margin && !top.contains(&i))
            .take(options.footer_max_lines)
            .collect();
        bottom.reverse();

        Self { top, bottom }
    }

    /// Candidates of plain text lines: the first and last non-empty lines.
    pub fn of_text<S: AsRef<str>>(lines: &[S], options: &CleanOptions) -> Self {
        let non_empty: Vec<usize> = (0..lines.len())
            .filter(|&i| !lines[i].as_ref().trim().is_empty())
            .collect();

        let top: Vec<usize> = non_empty.iter().copied().take(options.header_max_lines).collect();
        let mut bottom: Vec<usize> = non_empty
            .iter()
            .rev()
            .copied()
            .filter(|i| !top.contains(i))
            .take(options.footer_max_lines)
            .collect();
        bottom.reverse();

        Self { top, bottom }
    }

    /// Signatures of the candidates.
    pub fn signatures<S: AsRef<str>>(&self, texts: &[S]) -> Vec<LineSignature> {
        let top = self.top.iter().map(|&i| LineSignature::new(MarginZone::Top, texts[i].as_ref()));
        let bottom = self
            .bottom
            .iter()
            .map(|&i| LineSignature::new(MarginZone::Bottom, texts[i].as_ref()));
        top.chain(bottom).collect()
    }

    fn zone_of(&self, index: usize) -> Option<MarginZone> {
        if self.top.contains(&index) {
            Some(MarginZone::Top)
        } else if self.bottom.contains(&index) {
            Some(MarginZone::Bottom)
        } else {
            None
        }
    }
}

/// Lines of a page split into body and removed boilerplate.
#[derive(Debug, Clone)]
pub struct FilteredLines<T> {
    /// Removed top-margin lines with their role
    pub top: Vec<(Role, T)>,
    /// Remaining body lines
    pub body: Vec<T>,
    /// Removed bottom-margin lines with their role
    pub bottom: Vec<(Role, T)>,
    /// Removal counts
    pub stats: PageStats,
}

/// Flags margin lines as header, footer or page number.
#[derive(Debug, Clone, Copy)]
pub struct BoilerplateDetector<'a> {
    profile: &'a RepetitionProfile,
    options: &'a CleanOptions,
}

impl<'a> BoilerplateDetector<'a> {
    /// Create a detector over a finished profile.
    pub fn new(profile: &'a RepetitionProfile, options: &'a CleanOptions) -> Self {
        Self { profile, options }
    }

    /// Role of a margin line, or `None` for body text.
    ///
    /// A page number takes precedence over header/footer.
    pub fn classify(&self, zone: MarginZone, text: &str, page_number: u32) -> Option<Role> {
        if let Some(shown) = parse_page_number(text) {
            let within = match self.options.page_number_tolerance {
                Some(tolerance) => shown.abs_diff(page_number) <= tolerance,
                None => true,
            };
            if within {
                return Some(Role::PageNumber);
            }
        }

        let signature = LineSignature::new(zone, text);
        if self.profile.is_repeated(&signature, self.options.min_repetition_ratio) {
            Some(zone.role())
        } else {
            None
        }
    }

    /// Whether a line with this role is removed from the body.
    fn removes(&self, role: Role) -> bool {
        match role {
            Role::PageNumber => self.options.remove_page_numbers,
            Role::Header | Role::Footer => self.options.remove_headers_footers,
            _ => false,
        }
    }

    /// Split items into body and boilerplate.
    pub fn filter<T>(
        &self,
        items: Vec<T>,
        texts: &[String],
        candidates: &MarginCandidates,
        page_number: u32,
    ) -> FilteredLines<T> {
        let mut filtered = FilteredLines {
            top: Vec::new(),
            body: Vec::new(),
            bottom: Vec::new(),
            stats: PageStats::default(),
        };

        for (index, item) in items.into_iter().enumerate() {
            let flagged = candidates.zone_of(index).and_then(|zone| {
                self.classify(zone, &texts[index], page_number)
                    .filter(|role| self.removes(*role))
                    .map(|role| (zone, role))
            });

            match flagged {
                Some((zone, role)) => {
                    log::debug!("page {}: {} {:?}", page_number, role, texts[index]);
                    if role == Role::PageNumber {
                        filtered.stats.page_numbers_removed += 1;
                    } else {
                        filtered.stats.boilerplate_removed += 1;
                    }
                    match zone {
                        MarginZone::Top => filtered.top.push((role, item)),
                        MarginZone::Bottom => filtered.bottom.push((role, item)),
                    }
                }
                None => filtered.body.push(item),
            }
        }
        filtered
    }

    /// Split positioned lines (sorted top-to-bottom).
    pub fn filter_lines(&self, lines: Vec<Line>, page_number: u32, page_height: f32) -> FilteredLines<Line> {
        let candidates = MarginCandidates::of_lines(&lines, page_height, self.options);
        let texts: Vec<String> = lines.iter().map(|l| l.text()).collect();
        self.filter(lines, &texts, &candidates, page_number)
    }

    /// Split plain text lines.
    pub fn filter_text(&self, lines: Vec<String>, page_number: u32) -> FilteredLines<String> {
        let candidates = MarginCandidates::of_text(&lines, self.options);
        let texts = lines.clone();
        self.filter(lines, &texts, &candidates, page_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Span};

    fn line(text: &str, y0: f32) -> Line {
        Line::from_spans(vec![Span::new(text, BBox::new(72.0, y0, 300.0, y0 + 10.0), 10.0, "Times")])
    }

    fn profile_with(pages: &[&[&str]]) -> RepetitionProfile {
        let mut profile = RepetitionProfile::new();
        for page in pages {
            profile.observe_page(page.iter().map(|t| LineSignature::new(MarginZone::Top, t)));
        }
        profile
    }

    #[test]
    fn test_signature_masks_digits() {
        assert_eq!(
            LineSignature::new(MarginZone::Bottom, "Page 3"),
            LineSignature::new(MarginZone::Bottom, "page 17")
        );
        assert_ne!(
            LineSignature::new(MarginZone::Top, "Draft"),
            LineSignature::new(MarginZone::Bottom, "Draft")
        );
    }

    #[test]
    fn test_counts_once_per_page() {
        let profile = profile_with(&[&["Draft", "Draft"], &["Draft"]]);
        assert_eq!(profile.page_count(), 2);
        assert_eq!(profile.count(&LineSignature::new(MarginZone::Top, "draft")), 2);
    }

    #[test]
    fn test_repetition_threshold_boundary() {
        // Four pages, the line appears on exactly half of them
        let profile = profile_with(&[&["Journal of Things"], &["Journal of Things"], &["Other"], &["Else"]]);
        let signature = LineSignature::new(MarginZone::Top, "Journal of Things");
        assert!(profile.is_repeated(&signature, 0.5));
        assert!(!profile.is_repeated(&signature, 0.51));
    }

    #[test]
    fn test_single_occurrence_never_repeats() {
        let profile = profile_with(&[&["Only once"], &["Other"]]);
        assert!(!profile.is_repeated(&LineSignature::new(MarginZone::Top, "Only once"), 0.1));
    }

    #[test]
    fn test_single_page_profile_inactive() {
        let profile = profile_with(&[&["Draft"]]);
        assert!(!profile.is_active());
        assert!(!profile.is_repeated(&LineSignature::new(MarginZone::Top, "Draft"), 0.0));
    }

    #[test]
    fn test_margin_candidates() {
        let options = CleanOptions::default();
        let lines = vec![
            line("Header", 20.0),
            line("Body one", 300.0),
            line("Body two", 320.0),
            line("Footer", 760.0),
        ];
        let candidates = MarginCandidates::of_lines(&lines, 792.0, &options);
        assert_eq!(candidates.top, vec![0]);
        assert_eq!(candidates.bottom, vec![3]);
    }

    #[test]
    fn test_filter_lines() {
        let options = CleanOptions::default();
        let mut profile = RepetitionProfile::new();
        for _ in 0..3 {
            profile.observe_page(vec![LineSignature::new(MarginZone::Top, "Confidential Draft")]);
        }
        let detector = BoilerplateDetector::new(&profile, &options);

        let lines = vec![
            line("Confidential Draft", 20.0),
            line("Body", 300.0),
            line("Page 2", 760.0),
        ];
        let filtered = detector.filter_lines(lines, 2, 792.0);
        assert_eq!(filtered.body.len(), 1);
        assert_eq!(filtered.top[0].0, Role::Header);
        assert_eq!(filtered.bottom[0].0, Role::PageNumber);
        assert_eq!(filtered.stats.boilerplate_removed, 1);
        assert_eq!(filtered.stats.page_numbers_removed, 1);
    }

    #[test]
    fn test_page_number_tolerance() {
        let options = CleanOptions::default().with_page_number_tolerance(1);
        let profile = RepetitionProfile::new();
        let detector = BoilerplateDetector::new(&profile, &options);
        assert_eq!(detector.classify(MarginZone::Bottom, "5", 5), Some(Role::PageNumber));
        assert_eq!(detector.classify(MarginZone::Bottom, "6", 5), Some(Role::PageNumber));
        assert_eq!(detector.classify(MarginZone::Bottom, "42", 5), None);
    }

    #[test]
    fn test_removal_switches() {
        let options = CleanOptions::default().with_page_number_removal(false);
        let profile = RepetitionProfile::new();
        let detector = BoilerplateDetector::new(&profile, &options);
        let filtered = detector.filter_text(vec!["Intro".into(), "Body".into(), "7".into()], 7);
        assert_eq!(filtered.body, vec!["Intro", "Body", "7"]);
    }

    #[test]
    fn test_filter_text_candidates_skip_blank_lines() {
        let options = CleanOptions::default().with_margin_lines(1, 1);
        let profile = RepetitionProfile::new();
        let detector = BoilerplateDetector::new(&profile, &options);
        let lines: Vec<String> = vec!["".into(), "3".into(), "Body".into(), "More".into(), "".into()];
        let filtered = detector.filter_text(lines, 3);
        assert_eq!(filtered.top.len(), 1);
        assert_eq!(filtered.body, vec!["", "Body", "More", ""]);
    }
}
