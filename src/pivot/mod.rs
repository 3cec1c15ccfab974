//! Multi-segment pivot queries.
//!
//! - [`model`] - Breakdown, Metric and Segment value entities
//! - [`query`] - the assembler composing them into one SQL statement

pub mod model;
pub mod query;

pub use model::{Breakdown, Metric, Segment, SegmentConfig};
pub use query::{PivotConfig, PivotQuery};
