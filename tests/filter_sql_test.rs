//! SQL compilation of filter trees: one fragment shape per operator, the
//! grouping rules, and the error-suppression policy.

use pivotsql::{Filter, FilterConfig, FilterError, FilterValue};
use serde_json::json;

fn leaf(operator: &str, column: &str, value: impl Into<FilterValue>) -> Filter {
    Filter::new(FilterConfig::condition(operator, column).with_value(value))
}

#[test]
fn simple_is_comparison() {
    let filter = leaf("is", "age", 30);
    assert_eq!(filter.to_sql().unwrap(), "age = 30");
}

#[test]
fn symbolic_comparisons() {
    assert_eq!(leaf("=", "score", 10).to_sql().unwrap(), "score = 10");
    assert_eq!(leaf("<>", "score", 10).to_sql().unwrap(), "score <> 10");
    assert_eq!(leaf("<", "age", 30).to_sql().unwrap(), "age < 30");
    assert_eq!(leaf(">", "age", 30).to_sql().unwrap(), "age > 30");
    assert_eq!(leaf("<=", "age", 30).to_sql().unwrap(), "age <= 30");
    assert_eq!(leaf(">=", "age", 30).to_sql().unwrap(), "age >= 30");
}

#[test]
fn is_not_renders_angle_brackets() {
    let filter = leaf("isNot", "status", "archived");
    assert_eq!(filter.to_sql().unwrap(), "status <> 'archived'");
}

#[test]
fn string_values_are_quoted_and_escaped() {
    let filter = leaf("is", "name", "O'Brien");
    assert_eq!(filter.to_sql().unwrap(), "name = 'O''Brien'");
}

#[test]
fn numeric_and_boolean_values_render_bare() {
    assert_eq!(leaf(">=", "price", 19.99).to_sql().unwrap(), "price >= 19.99");
    assert_eq!(leaf("is", "flag", true).to_sql().unwrap(), "flag = true");
}

#[test]
fn pattern_matching() {
    assert_eq!(
        leaf("includes", "name", "ann").to_sql().unwrap(),
        "name LIKE '%' || 'ann' || '%'"
    );
    assert_eq!(
        leaf("doesNotInclude", "name", "ann").to_sql().unwrap(),
        "name NOT LIKE '%' || 'ann' || '%'"
    );
}

#[test]
fn boolean_conditions_need_no_value() {
    let active = Filter::new(FilterConfig::condition("isTrue", "isActive"));
    assert_eq!(active.to_sql().unwrap(), "isActive = true");
    let deleted = Filter::new(FilterConfig::condition("isFalse", "deleted"));
    assert_eq!(deleted.to_sql().unwrap(), "deleted = false");
}

#[test]
fn emptiness_checks() {
    let empty = Filter::new(FilterConfig::condition("isEmpty", "nickname"));
    assert_eq!(empty.to_sql().unwrap(), "nickname IS NULL OR nickname = ''");
    let not_empty = Filter::new(FilterConfig::condition("isNotEmpty", "name"));
    assert_eq!(
        not_empty.to_sql().unwrap(),
        "name IS NOT NULL AND name != ''"
    );
}

#[test]
fn list_membership() {
    let countries = leaf("isIn", "country", FilterValue::many(vec!["DE", "FR"]));
    assert_eq!(countries.to_sql().unwrap(), "country IN ('DE', 'FR')");

    let ages = leaf("isIn", "age", FilterValue::many(vec![20, 30]));
    assert_eq!(ages.to_sql().unwrap(), "age IN (20, 30)");

    let excluded = leaf("isNotIn", "country", FilterValue::many(vec!["DE"]));
    assert_eq!(excluded.to_sql().unwrap(), "country NOT IN ('DE')");
}

#[test]
fn logical_groups_join_children() {
    let filter = Filter::new(FilterConfig::group(
        "and",
        vec![
            FilterConfig::condition("is", "a").with_value(1),
            FilterConfig::condition("is", "b").with_value(2),
        ],
    ));
    assert_eq!(filter.to_sql().unwrap(), "a = 1 AND b = 2");

    let filter = Filter::new(FilterConfig::group(
        "or",
        vec![
            FilterConfig::condition("is", "a").with_value(1),
            FilterConfig::condition("is", "b").with_value(2),
        ],
    ));
    assert_eq!(filter.to_sql().unwrap(), "a = 1 OR b = 2");
}

#[test]
fn nested_groups_are_parenthesized() {
    let filter = Filter::new(FilterConfig::group(
        "and",
        vec![
            FilterConfig::condition("is", "a").with_value(1),
            FilterConfig::group(
                "or",
                vec![
                    FilterConfig::condition("is", "b").with_value(2),
                    FilterConfig::condition("is", "c").with_value(3),
                ],
            ),
        ],
    ));
    assert_eq!(filter.to_sql().unwrap(), "a = 1 AND (b = 2 OR c = 3)");
}

#[test]
fn single_child_groups_are_still_parenthesized() {
    // The legacy rule skipped parentheses for single-child groups, which
    // produced ambiguous precedence once the grandchild was compound.
    let config = FilterConfig::group(
        "and",
        vec![
            FilterConfig::condition("is", "a").with_value(1),
            FilterConfig::group(
                "or",
                vec![FilterConfig::group(
                    "and",
                    vec![
                        FilterConfig::condition("is", "b").with_value(2),
                        FilterConfig::condition("is", "c").with_value(3),
                    ],
                )],
            ),
        ],
    );

    let filter = Filter::new(config.clone());
    assert_eq!(filter.to_sql().unwrap(), "a = 1 AND ((b = 2 AND c = 3))");

    // Legacy: the single-child `or` goes unwrapped; only the two-child
    // grandchild earns parentheses from its own parent.
    let legacy = Filter::new(config).with_legacy_grouping(true);
    assert_eq!(legacy.to_sql().unwrap(), "a = 1 AND (b = 2 AND c = 3)");
}

#[test]
fn grouping_modes_diverge_on_compound_grandchildren() {
    // `isEmpty` renders as a compound predicate. Under the legacy rule the
    // single-child `or` is not wrapped, so the emitted string has broken
    // precedence; the default rule wraps it.
    let config = FilterConfig::group(
        "and",
        vec![
            FilterConfig::condition("is", "a").with_value(1),
            FilterConfig::group("or", vec![FilterConfig::condition("isEmpty", "x")]),
        ],
    );

    let filter = Filter::new(config.clone());
    assert_eq!(
        filter.to_sql().unwrap(),
        "a = 1 AND (x IS NULL OR x = '')"
    );

    let legacy = Filter::new(config).with_legacy_grouping(true);
    assert_eq!(legacy.to_sql().unwrap(), "a = 1 AND x IS NULL OR x = ''");
}

#[test]
fn invalid_leaves_degrade_to_empty_by_default() {
    // Missing column.
    let filter = Filter::new(FilterConfig {
        operator: Some("is".into()),
        value: Some(30.into()),
        ..FilterConfig::default()
    });
    assert_eq!(filter.to_sql().unwrap(), "");

    // Missing value.
    let filter = Filter::new(FilterConfig::condition("is", "age"));
    assert_eq!(filter.to_sql().unwrap(), "");

    // Empty value list.
    let filter = Filter::new(
        FilterConfig::condition("isIn", "country").with_value(FilterValue::Many(vec![])),
    );
    assert_eq!(filter.to_sql().unwrap(), "");
}

#[test]
fn strict_mode_surfaces_the_error() {
    let filter = Filter::new(FilterConfig {
        operator: Some("is".into()),
        value: Some(30.into()),
        ..FilterConfig::default()
    })
    .with_ignore_invalid(false);
    assert_eq!(
        filter.to_sql().unwrap_err(),
        FilterError::InvalidCondition {
            operator: "is".into(),
            reason: "missing column",
        }
    );
}

#[test]
fn unsupported_operators_follow_the_policy() {
    let config = FilterConfig::condition("matches", "name").with_value("x");
    assert_eq!(Filter::new(config.clone()).to_sql().unwrap(), "");
    assert_eq!(
        Filter::new(config).with_ignore_invalid(false).to_sql().unwrap_err(),
        FilterError::UnsupportedOperator("matches".into())
    );
}

#[test]
fn empty_groups_follow_the_policy() {
    let config = FilterConfig::group("and", vec![]);
    assert_eq!(Filter::new(config.clone()).to_sql().unwrap(), "");
    assert_eq!(
        Filter::new(config).with_ignore_invalid(false).to_sql().unwrap_err(),
        FilterError::EmptyGroup {
            operator: "and".into()
        }
    );
}

#[test]
fn suppressed_children_drop_out_of_the_join() {
    let filter = Filter::new(FilterConfig::group(
        "and",
        vec![
            FilterConfig::condition("is", "a").with_value(1),
            FilterConfig::condition("is", "broken"), // missing value
            FilterConfig::condition("is", "b").with_value(2),
        ],
    ));
    assert_eq!(filter.to_sql().unwrap(), "a = 1 AND b = 2");
}

#[test]
fn group_with_only_invalid_children_compiles_empty() {
    let filter = Filter::new(FilterConfig::group(
        "or",
        vec![
            FilterConfig::condition("is", "a"),
            FilterConfig::condition("unknownOp", "b").with_value(1),
        ],
    ));
    assert_eq!(filter.to_sql().unwrap(), "");
}

#[test]
fn strict_mode_reaches_nested_nodes() {
    let filter = Filter::new(FilterConfig::group(
        "and",
        vec![
            FilterConfig::condition("is", "a").with_value(1),
            FilterConfig::group("or", vec![FilterConfig::condition("is", "broken")]),
        ],
    ))
    .with_ignore_invalid(false);
    assert_eq!(
        filter.to_sql().unwrap_err(),
        FilterError::InvalidCondition {
            operator: "is".into(),
            reason: "missing value",
        }
    );
}

#[test]
fn policy_can_come_from_the_configuration() {
    let filter = Filter::from_value(json!({
        "operator": "is",
        "columnId": "age",
        "ignoreInvalid": false,
    }))
    .unwrap();
    assert!(filter.to_sql().is_err());
}

#[test]
fn json_and_typed_construction_agree() {
    let from_json = Filter::from_value(json!({
        "operator": "and",
        "filters": [
            { "operator": "is", "columnId": "age", "value": 30 },
            { "operator": "isIn", "columnId": "country", "value": ["DE", "FR"] },
        ],
    }))
    .unwrap();
    let typed = Filter::new(FilterConfig::group(
        "and",
        vec![
            FilterConfig::condition("is", "age").with_value(30),
            FilterConfig::condition("isIn", "country")
                .with_value(FilterValue::many(vec!["DE", "FR"])),
        ],
    ));
    assert_eq!(from_json.to_sql().unwrap(), typed.to_sql().unwrap());
}

#[test]
fn json_strings_parse_directly() {
    let filter =
        Filter::from_json(r#"{ "operator": "isIn", "columnId": "country", "value": ["DE"] }"#)
            .unwrap();
    assert_eq!(filter.to_sql().unwrap(), "country IN ('DE')");

    let err = Filter::from_json("not json").unwrap_err();
    assert!(matches!(err, FilterError::Config(_)));
}

#[test]
fn compilation_is_idempotent() {
    let filter = Filter::new(FilterConfig::group(
        "or",
        vec![
            FilterConfig::condition("isEmpty", "nickname"),
            FilterConfig::condition(">=", "age").with_value(18),
        ],
    ));
    let first = filter.to_sql().unwrap();
    let second = filter.to_sql().unwrap();
    assert_eq!(first, second);
}
