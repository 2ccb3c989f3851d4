//! Document model types.
//!
//! This module defines the data that flows through the cleaning engine:
//! spans and pages coming in, segments and page results going out.

mod document;
mod geometry;
mod page;
mod segment;
mod span;

pub use document::{DocumentInput, DocumentResult, PageStats, Summary, PAGE_SEPARATOR};
pub use geometry::BBox;
pub use page::{PageContent, PageInput, PageResult};
pub use segment::{segment_id, MathCrop, Role, Segment, SourceMode};
pub use span::Span;
