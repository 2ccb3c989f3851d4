//! Page layout reconstruction.
//!
//! Turns raw spans into normalized lines, column bands in reading order and
//! lines with super/subscript notation.

pub mod columns;
mod fonts;
mod line;
pub mod math;
mod normalize;

pub use columns::{order_bands, reading_order, ColumnBand, ColumnClusterer};
pub use fonts::FontStatistics;
pub use line::{group_lines, sort_lines, Line};
pub use math::{MathReconstructor, MathRun, ReconstructedLine, ScriptKind};
pub use normalize::{NormalizedPage, SpanNormalizer};
