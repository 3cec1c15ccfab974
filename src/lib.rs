//! # pivotsql
//!
//! Compiles declarative, JSON-shaped filter expressions into SQL `WHERE`
//! predicates (and English descriptions), and composes them with
//! breakdowns, metrics and segments into multi-segment pivot queries.
//!
//! ```text
//! raw config (JSON or typed)
//!          │
//!          ▼ [filter]
//!   Filter tree ───► SQL predicate / English description
//!          │                 ▲
//!          ▼ [pivot]         │ column collection, inversion
//!   breakdowns + metrics + segments
//!          │
//!          ▼
//!   WITH ... SELECT ... UNION ...
//! ```
//!
//! The crate emits one generic ANSI-ish SQL surface. It never validates
//! column identifiers against a schema, never parses SQL, and only escapes
//! string literal values.
//!
//! ## Example
//!
//! ```
//! use pivotsql::Filter;
//! use serde_json::json;
//!
//! let filter = Filter::from_value(json!({
//!     "operator": "and",
//!     "filters": [
//!         { "operator": "is", "columnId": "age", "value": 30 },
//!         { "operator": "isNotEmpty", "columnId": "name" },
//!     ],
//! }))
//! .unwrap();
//!
//! assert_eq!(
//!     filter.to_sql().unwrap(),
//!     "age = 30 AND name IS NOT NULL AND name != ''"
//! );
//! ```

pub mod error;
pub mod filter;
pub mod pivot;
pub mod sql;

pub use error::{FilterError, FilterResult};
pub use filter::{Filter, FilterConfig, FilterOp, FilterValue, Scalar};
pub use pivot::{Breakdown, Metric, PivotConfig, PivotQuery, Segment, SegmentConfig};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::error::{FilterError, FilterResult};
    pub use crate::filter::{Filter, FilterConfig, FilterOp, FilterValue, Scalar};
    pub use crate::pivot::{Breakdown, Metric, PivotConfig, PivotQuery, Segment, SegmentConfig};
    pub use crate::sql::{Token, TokenStream};
}
