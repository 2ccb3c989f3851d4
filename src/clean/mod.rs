//! Text cleaning: boilerplate removal, paragraph assembly and text rules.
//!
//! # Example
//!
//! ```
//! use pagescribe::clean::{normalize_whitespace, CleanOptions};
//!
//! let options = CleanOptions::default().with_repetition_ratio(0.5);
//! assert!(options.validate().is_ok());
//! assert_eq!(normalize_whitespace("a  b \n\n\n c"), "a b\n\nc");
//! ```

mod assemble;
mod boilerplate;
mod markdown;
mod options;
pub mod text;

pub use assemble::{Assembler, PageContext};
pub use boilerplate::{
    BoilerplateDetector, FilteredLines, LineSignature, MarginCandidates, MarginZone,
    RepetitionProfile, INSUFFICIENT_PAGES, NO_POSITIONED_PAGES,
};
pub use markdown::{parse_blocks, strip_markup, MarkdownBlock};
pub use options::{CleanOptions, CleanPreset, LayoutThresholds, MathThresholds};
pub use text::{is_page_number, join_lines, normalize_whitespace, split_paragraphs};
