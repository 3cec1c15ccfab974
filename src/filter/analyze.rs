//! Static analysis over filter trees: column collection and inversion.

use std::collections::BTreeSet;

use crate::error::{FilterError, FilterResult};
use crate::filter::config::FilterConfig;
use crate::filter::op::FilterOp;

/// Collect every column referenced anywhere in the tree.
///
/// A pure read: no validity checks, visits every node even where
/// compilation would have given up.
pub(crate) fn collect_columns(config: &FilterConfig, out: &mut BTreeSet<String>) {
    if let Some(column) = &config.column_id {
        out.insert(column.clone());
    }
    if let Some(children) = &config.filters {
        for child in children {
            collect_columns(child, out);
        }
    }
}

/// Build a structurally identical tree with every operator replaced by its
/// inverse. Operator names outside the registry are left unchanged.
///
/// Every node must be a well-formed leaf (operator + column) or a
/// well-formed group (operator + at least one child); anything else aborts,
/// regardless of the tree's suppression policy.
pub(crate) fn invert(config: &FilterConfig) -> FilterResult<FilterConfig> {
    let Some(operator) = config.operator.as_deref() else {
        return Err(FilterError::MalformedNode);
    };
    let has_column = config.column_id.as_deref().is_some_and(|c| !c.is_empty());

    let mut out = config.clone();
    out.operator = Some(invert_name(operator));
    if let Some(children) = config.filters.as_ref().filter(|f| !f.is_empty()) {
        out.filters = Some(
            children
                .iter()
                .map(invert)
                .collect::<FilterResult<Vec<_>>>()?,
        );
        Ok(out)
    } else if has_column {
        Ok(out)
    } else {
        Err(FilterError::MalformedNode)
    }
}

fn invert_name(name: &str) -> String {
    match FilterOp::parse(name) {
        Some(op) => op.inverse().name().to_string(),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_columns_from_every_depth() {
        let tree = FilterConfig::group(
            "and",
            vec![
                FilterConfig::condition("isTrue", "isActive"),
                FilterConfig::group(
                    "or",
                    vec![
                        FilterConfig::condition("is", "country").with_value("DE"),
                        FilterConfig::condition("is", "country").with_value("FR"),
                        FilterConfig::condition("<", "age").with_value(30),
                    ],
                ),
            ],
        );
        let mut columns = BTreeSet::new();
        collect_columns(&tree, &mut columns);
        let expected: BTreeSet<String> = ["age", "country", "isActive"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(columns, expected);
    }

    #[test]
    fn collect_never_validates() {
        // Unsupported operator and an empty group: collection still reads
        // whatever columns are present.
        let tree = FilterConfig::group(
            "and",
            vec![
                FilterConfig::condition("someUnknownOp", "score"),
                FilterConfig::group("or", vec![]),
            ],
        );
        let mut columns = BTreeSet::new();
        collect_columns(&tree, &mut columns);
        assert_eq!(columns.len(), 1);
        assert!(columns.contains("score"));
    }

    #[test]
    fn invert_rejects_shapeless_nodes() {
        let err = invert(&FilterConfig::default()).unwrap_err();
        assert_eq!(err, FilterError::MalformedNode);

        // Operator alone is not enough: no column, no children.
        let err = invert(&FilterConfig {
            operator: Some("is".into()),
            ..FilterConfig::default()
        })
        .unwrap_err();
        assert_eq!(err, FilterError::MalformedNode);
    }

    #[test]
    fn invert_keeps_unknown_operators() {
        let tree = FilterConfig::condition("someUnknownOp", "score");
        let inverted = invert(&tree).unwrap();
        assert_eq!(inverted.operator.as_deref(), Some("someUnknownOp"));
    }
}
