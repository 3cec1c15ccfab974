//! Filter expression trees.
//!
//! A [`Filter`] owns one raw configuration tree and compiles it on demand
//! to a SQL predicate ([`Filter::to_sql`]) or an English description
//! ([`Filter::to_human_readable`]). Construction never validates: the
//! `ignoreInvalid` policy decides at compile time whether an invalid node
//! degrades to an empty contribution or aborts the compilation.
//!
//! Transformations ([`Filter::invert`], [`Filter::and`], [`Filter::or`])
//! return new trees; the receiver is never mutated, so a segment's live
//! filter can be inverted without corrupting the segment.

mod analyze;
mod config;
mod op;
mod render;

pub use config::{FilterConfig, FilterValue, Scalar};
pub use op::FilterOp;

use std::collections::BTreeSet;

use crate::error::{FilterError, FilterResult};
use render::RenderOptions;

/// A compiled filter expression tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    config: FilterConfig,
    ignore_invalid: bool,
    legacy_grouping: bool,
}

impl Default for Filter {
    /// An empty filter: compiles to `""` under the default policy.
    fn default() -> Self {
        Filter::new(FilterConfig::default())
    }
}

impl Filter {
    /// Build a filter from a typed configuration tree.
    ///
    /// The error-suppression policy is read from the root node's
    /// `ignoreInvalid` field and defaults to on.
    pub fn new(config: FilterConfig) -> Self {
        let ignore_invalid = config.ignore_invalid.unwrap_or(true);
        Self {
            config,
            ignore_invalid,
            legacy_grouping: false,
        }
    }

    /// Build a filter from a JSON configuration value.
    pub fn from_value(value: serde_json::Value) -> FilterResult<Self> {
        let config: FilterConfig =
            serde_json::from_value(value).map_err(|e| FilterError::Config(e.to_string()))?;
        Ok(Self::new(config))
    }

    /// Build a filter from a JSON configuration string.
    pub fn from_json(json: &str) -> FilterResult<Self> {
        let config: FilterConfig =
            serde_json::from_str(json).map_err(|e| FilterError::Config(e.to_string()))?;
        Ok(Self::new(config))
    }

    /// Override the error-suppression policy for the whole tree.
    pub fn with_ignore_invalid(mut self, ignore: bool) -> Self {
        self.ignore_invalid = ignore;
        self
    }

    /// Use the legacy parenthesization rule: nested groups are wrapped
    /// only when they hold more than one child. The default wraps every
    /// nested group, which keeps compound grandchildren unambiguous.
    pub fn with_legacy_grouping(mut self, legacy: bool) -> Self {
        self.legacy_grouping = legacy;
        self
    }

    /// The underlying configuration tree.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    fn options(&self) -> RenderOptions {
        RenderOptions {
            ignore_invalid: self.ignore_invalid,
            legacy_grouping: self.legacy_grouping,
        }
    }

    /// Compile to a SQL `WHERE` predicate.
    ///
    /// With suppression on (the default) this never fails; invalid nodes
    /// contribute empty strings and an entirely invalid tree compiles to
    /// `""`. With suppression off, the first invalid node anywhere in the
    /// tree aborts the compilation.
    pub fn to_sql(&self) -> FilterResult<String> {
        render::sql(&self.config, self.options())
    }

    /// Compile to an English description of the conditions.
    ///
    /// Follows the same dispatch and error policy as [`Filter::to_sql`].
    pub fn to_human_readable(&self) -> FilterResult<String> {
        render::human(&self.config, self.options())
    }

    /// The distinct source columns referenced anywhere in the tree.
    ///
    /// Never fails and never validates; it only reads columns that are
    /// present.
    pub fn collect_columns(&self) -> BTreeSet<String> {
        let mut columns = BTreeSet::new();
        analyze::collect_columns(&self.config, &mut columns);
        columns
    }

    /// A new filter with every operator replaced by its logical negation
    /// (`<` becomes `>=`, `isIn` becomes `isNotIn`, `and` becomes `or`,
    /// and so on). The receiver is left untouched.
    ///
    /// Fails with [`FilterError::MalformedNode`] if any node is neither a
    /// well-formed leaf nor a well-formed group; inversion does not honor
    /// the suppression policy.
    pub fn invert(&self) -> FilterResult<Filter> {
        Ok(Filter {
            config: analyze::invert(&self.config)?,
            ignore_invalid: self.ignore_invalid,
            legacy_grouping: self.legacy_grouping,
        })
    }

    /// A new `and` group holding a copy of this filter followed by copies
    /// of `others`, in order.
    pub fn and(&self, others: &[Filter]) -> Filter {
        self.combine(FilterOp::And, others)
    }

    /// A new `or` group holding a copy of this filter followed by copies
    /// of `others`, in order.
    pub fn or(&self, others: &[Filter]) -> Filter {
        self.combine(FilterOp::Or, others)
    }

    fn combine(&self, op: FilterOp, others: &[Filter]) -> Filter {
        let mut children = Vec::with_capacity(1 + others.len());
        children.push(self.config.clone());
        children.extend(others.iter().map(|f| f.config.clone()));
        Filter::new(FilterConfig::group(op.name(), children))
    }
}

impl From<FilterConfig> for Filter {
    fn from(config: FilterConfig) -> Self {
        Filter::new(config)
    }
}
