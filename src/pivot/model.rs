//! Pivot model entities: breakdowns, metrics and segments.

use serde::{Deserialize, Serialize};

use crate::error::FilterResult;
use crate::filter::{Filter, FilterConfig};
use crate::sql::token::{Token, TokenStream};

/// A grouping dimension: one output column per distinct value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub column_id: String,
    pub column_alias: String,
}

impl Breakdown {
    pub fn new(column_id: &str, column_alias: &str) -> Self {
        Self {
            column_id: column_id.into(),
            column_alias: column_alias.into(),
        }
    }

    /// Select-list fragment: `column AS "alias"`.
    pub fn to_sql(&self) -> String {
        self.to_tokens().serialize()
    }

    pub(crate) fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Ident(self.column_id.clone()))
            .space()
            .push(Token::As)
            .space()
            .push(Token::Alias(self.column_alias.clone()));
        ts
    }
}

/// A selected value, optionally wrapped in an aggregation function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    /// Source expression; configuration key `value`. Emitted verbatim.
    #[serde(rename = "value")]
    pub expression: String,
    pub column_alias: String,
    /// Aggregation function name, e.g. `COUNT` or `SUM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
}

impl Metric {
    /// A bare selected expression.
    pub fn new(expression: &str, column_alias: &str) -> Self {
        Self {
            expression: expression.into(),
            column_alias: column_alias.into(),
            aggregation: None,
        }
    }

    /// An aggregated expression.
    pub fn aggregated(expression: &str, column_alias: &str, aggregation: &str) -> Self {
        Self {
            expression: expression.into(),
            column_alias: column_alias.into(),
            aggregation: Some(aggregation.into()),
        }
    }

    /// Select-list fragment: `AGG(expr) AS "alias"`, or `expr AS "alias"`
    /// without an aggregation.
    pub fn to_sql(&self) -> String {
        self.to_tokens().serialize()
    }

    pub(crate) fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        match &self.aggregation {
            Some(aggregation) => {
                ts.push(Token::FunctionName(aggregation.clone()))
                    .lparen()
                    .push(Token::Raw(self.expression.clone()))
                    .rparen();
            }
            None => {
                ts.push(Token::Raw(self.expression.clone()));
            }
        }
        ts.space()
            .push(Token::As)
            .space()
            .push(Token::Alias(self.column_alias.clone()));
        ts
    }
}

/// Raw segment configuration: a label plus the filter tree that defines
/// membership.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SegmentConfig {
    pub label: String,
    pub column_alias: String,
    pub filter: FilterConfig,
}

/// A named, independently filtered partition of rows. Each segment emits
/// its own grouped result set tagged with its label.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub label: String,
    pub column_alias: String,
    pub filter: Filter,
}

impl Segment {
    /// Build from an already-compiled filter.
    pub fn new(label: &str, column_alias: &str, filter: Filter) -> Self {
        Self {
            label: label.into(),
            column_alias: column_alias.into(),
            filter,
        }
    }

    /// Build from raw configuration, compiling the filter tree.
    pub fn from_config(config: SegmentConfig) -> Self {
        Self {
            label: config.label,
            column_alias: config.column_alias,
            filter: Filter::new(config.filter),
        }
    }

    /// The segment's membership predicate.
    pub fn to_sql(&self) -> FilterResult<String> {
        self.filter.to_sql()
    }
}
