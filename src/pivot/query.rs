//! The pivot query assembler.
//!
//! Composes a table, breakdowns, metrics, segments and a top-level filter
//! into one statement: a `filtered_data` CTE restricted to the union of
//! all segment memberships, then one grouped `SELECT` per segment joined
//! by `UNION`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, FilterResult};
use crate::filter::{Filter, FilterConfig};
use crate::pivot::model::{Breakdown, Metric, Segment, SegmentConfig};
use crate::sql::token::{Token, TokenStream};

/// Raw pivot configuration, as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PivotConfig {
    pub table_name: String,
    pub breakdowns: Vec<Breakdown>,
    pub segments: Vec<SegmentConfig>,
    pub metrics: Vec<Metric>,
    pub filter: FilterConfig,
    /// When set, materialized as a named CTE that stands in for the table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_query: Option<String>,
}

/// A pivot query over one table.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "PivotQuery has no effect until compiled with to_sql()"]
pub struct PivotQuery {
    pub table_name: String,
    pub breakdowns: Vec<Breakdown>,
    pub segments: Vec<Segment>,
    pub metrics: Vec<Metric>,
    pub filter: Filter,
    pub source_query: Option<String>,
}

impl PivotQuery {
    /// An empty pivot query over a table.
    pub fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.into(),
            breakdowns: vec![],
            segments: vec![],
            metrics: vec![],
            filter: Filter::default(),
            source_query: None,
        }
    }

    /// Build from raw configuration, compiling every filter tree.
    pub fn from_config(config: PivotConfig) -> Self {
        Self {
            table_name: config.table_name,
            breakdowns: config.breakdowns,
            segments: config
                .segments
                .into_iter()
                .map(Segment::from_config)
                .collect(),
            metrics: config.metrics,
            filter: Filter::new(config.filter),
            source_query: config.source_query,
        }
    }

    /// Build from a JSON configuration value.
    pub fn from_value(value: serde_json::Value) -> FilterResult<Self> {
        let config: PivotConfig =
            serde_json::from_value(value).map_err(|e| FilterError::Config(e.to_string()))?;
        Ok(Self::from_config(config))
    }

    /// Build from a JSON configuration string.
    pub fn from_json(json: &str) -> FilterResult<Self> {
        let config: PivotConfig =
            serde_json::from_str(json).map_err(|e| FilterError::Config(e.to_string()))?;
        Ok(Self::from_config(config))
    }

    /// Add a grouping dimension.
    pub fn breakdown(mut self, breakdown: Breakdown) -> Self {
        self.breakdowns.push(breakdown);
        self
    }

    /// Add a metric.
    pub fn metric(mut self, metric: Metric) -> Self {
        self.metrics.push(metric);
        self
    }

    /// Add a segment.
    pub fn segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    /// Set the top-level filter restricting every segment.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Use a source query, materialized as a CTE named after the table.
    pub fn source_query(mut self, query: &str) -> Self {
        self.source_query = Some(query.into());
        self
    }

    /// Every distinct column the query depends on: breakdown columns,
    /// metric expressions, segment filter columns and top-level filter
    /// columns, in first-occurrence order. Empty and whitespace-only
    /// entries are dropped.
    pub fn collect_required_columns(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        {
            let mut add = |value: &str| {
                if value.trim().is_empty() {
                    return;
                }
                if seen.insert(value.to_string()) {
                    out.push(value.to_string());
                }
            };
            for breakdown in &self.breakdowns {
                add(&breakdown.column_id);
            }
            for metric in &self.metrics {
                add(&metric.expression);
            }
            for segment in &self.segments {
                for column in segment.filter.collect_columns() {
                    add(&column);
                }
            }
            for column in self.filter.collect_columns() {
                add(&column);
            }
        }
        out
    }

    /// Compile the full statement.
    ///
    /// With no segments configured, a single default segment covering all
    /// rows is synthesized (and a diagnostic is logged); the statement
    /// always holds at least one segment `SELECT`.
    pub fn to_sql(&self) -> FilterResult<String> {
        let synthesized;
        let segments: &[Segment] = if self.segments.is_empty() {
            tracing::warn!(
                table = %self.table_name,
                "no segments configured; generating a single default segment"
            );
            synthesized = [Self::default_segment()];
            &synthesized
        } else {
            &self.segments
        };
        tracing::debug!(
            table = %self.table_name,
            segments = segments.len(),
            breakdowns = self.breakdowns.len(),
            metrics = self.metrics.len(),
            "assembling pivot query"
        );

        let combined = self.combined_filter_sql(segments)?;

        let mut ts = TokenStream::new();
        ts.push(Token::With).space();
        if let Some(source) = &self.source_query {
            ts.push(Token::Ident(self.table_name.clone()))
                .space()
                .push(Token::As)
                .space()
                .lparen()
                .newline()
                .indent(1)
                .push(Token::Raw(source.clone()))
                .newline()
                .rparen()
                .comma()
                .newline();
        }
        ts.push(Token::Ident("filtered_data".into()))
            .space()
            .push(Token::As)
            .space()
            .lparen()
            .newline();
        ts.indent(1)
            .push(Token::Select)
            .space()
            .push(Token::Star)
            .newline();
        ts.indent(1)
            .push(Token::From)
            .space()
            .push(Token::Ident(self.table_name.clone()));
        if !combined.is_empty() {
            ts.newline()
                .indent(1)
                .push(Token::Where)
                .space()
                .push(Token::Raw(combined));
        }
        ts.newline().rparen().newline();

        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                ts.newline().push(Token::Union).newline();
            }
            self.segment_select(segment, &mut ts)?;
        }
        Ok(ts.serialize())
    }

    /// The always-true fallback segment used when none are configured.
    fn default_segment() -> Segment {
        Segment::new(
            "All",
            "All Segments",
            Filter::new(FilterConfig::condition("isTrue", "1")),
        )
    }

    /// `(top) AND ((s1) OR (s2) ...)`: the top-level filter restricts the
    /// union of all segment memberships. Either side drops out cleanly
    /// when it compiles empty.
    fn combined_filter_sql(&self, segments: &[Segment]) -> FilterResult<String> {
        let top = self.filter.to_sql()?;
        let mut memberships: Vec<String> = Vec::new();
        for segment in segments {
            let sql = segment.filter.to_sql()?;
            if !sql.is_empty() {
                memberships.push(format!("({sql})"));
            }
        }
        let membership = memberships.join(" OR ");
        Ok(match (top.is_empty(), membership.is_empty()) {
            (false, false) => format!("({top}) AND ({membership})"),
            (false, true) => format!("({top})"),
            (true, false) => membership,
            (true, true) => String::new(),
        })
    }

    /// One grouped `SELECT` for a segment: breakdowns, the label literal
    /// tagged with the segment alias, then metrics.
    fn segment_select(&self, segment: &Segment, ts: &mut TokenStream) -> FilterResult<()> {
        ts.push(Token::Select).newline();

        let mut items: Vec<TokenStream> = Vec::new();
        items.extend(self.breakdowns.iter().map(Breakdown::to_tokens));
        let mut label = TokenStream::new();
        label
            .push(Token::LitString(segment.label.clone()))
            .space()
            .push(Token::As)
            .space()
            .push(Token::Alias(segment.column_alias.clone()));
        items.push(label);
        items.extend(self.metrics.iter().map(Metric::to_tokens));

        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                ts.comma().newline();
            }
            ts.indent(1).append(item);
        }

        ts.newline()
            .push(Token::From)
            .space()
            .push(Token::Ident("filtered_data".into()));

        let predicate = segment.filter.to_sql()?;
        if !predicate.is_empty() {
            ts.newline().push(Token::Where).space().push(Token::Raw(predicate));
        }

        // Always grouped by the raw column identifiers, not their aliases.
        if !self.breakdowns.is_empty() {
            ts.newline().push(Token::GroupBy).space();
            for (i, breakdown) in self.breakdowns.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.push(Token::Ident(breakdown.column_id.clone()));
            }
        }
        Ok(())
    }
}
