//! Document-wide font statistics for heading detection.

use super::Line;
use std::collections::HashMap;

/// Size assumed for the body text when a document has no spans.
const DEFAULT_BODY_SIZE: f32 = 12.0;

/// Font statistics for heading detection.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    /// Body text font size (most common, weighted by characters)
    pub body_size: f32,
    /// Font sizes larger than body (potential headings), largest first
    pub heading_sizes: Vec<f32>,
    /// All observed font sizes with character counts
    pub size_histogram: HashMap<i32, usize>,
}

impl FontStatistics {
    /// Add a font size observation weighted by a character count.
    pub fn add_size(&mut self, size: f32, chars: usize) {
        let key = (size * 10.0).round() as i32; // Round to 0.1 precision
        *self.size_histogram.entry(key).or_insert(0) += chars.max(1);
    }

    /// Add every span of a line.
    pub fn add_line(&mut self, line: &Line) {
        for span in &line.spans {
            self.add_size(span.font_size, span.char_count());
        }
    }

    /// Calculate body size and heading sizes. On a tie the smaller size is
    /// the body size.
    pub fn analyze(&mut self) {
        let body_key = self
            .size_histogram
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(key, _)| *key);

        let Some(body_key) = body_key else {
            self.body_size = DEFAULT_BODY_SIZE;
            self.heading_sizes.clear();
            return;
        };
        self.body_size = body_key as f32 / 10.0;

        let mut larger_sizes: Vec<f32> = self
            .size_histogram
            .keys()
            .filter(|k| **k > body_key)
            .map(|k| *k as f32 / 10.0)
            .collect();
        larger_sizes.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        self.heading_sizes = larger_sizes;
    }

    /// Whether a font size is large enough to mark a heading.
    pub fn is_heading_size(&self, font_size: f32, ratio: f32) -> bool {
        self.body_size > 0.0 && font_size >= self.body_size * ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_statistics() {
        let mut stats = FontStatistics::default();
        stats.add_size(12.0, 400);
        stats.add_size(18.0, 20);
        stats.add_size(24.0, 12);
        stats.analyze();

        assert!((stats.body_size - 12.0).abs() < 0.1);
        assert_eq!(stats.heading_sizes, vec![24.0, 18.0]);
        assert!(!stats.is_heading_size(12.0, 1.3));
        assert!(stats.is_heading_size(18.0, 1.3));
    }

    #[test]
    fn test_weighted_by_characters() {
        let mut stats = FontStatistics::default();
        // Many short title spans do not outweigh one long body span
        for _ in 0..10 {
            stats.add_size(20.0, 3);
        }
        stats.add_size(10.0, 500);
        stats.analyze();
        assert_eq!(stats.body_size, 10.0);
    }

    #[test]
    fn test_empty_defaults() {
        let mut stats = FontStatistics::default();
        stats.analyze();
        assert_eq!(stats.body_size, DEFAULT_BODY_SIZE);
    }
}
