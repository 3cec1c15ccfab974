//! Raw filter configuration trees.
//!
//! A [`FilterConfig`] is the JSON-shaped input callers hand us: a recursive
//! node with optional fields. Shape checks are deferred to compile and
//! inversion time so the `ignoreInvalid` policy can degrade an invalid node
//! locally instead of rejecting the whole tree up front.

use serde::{Deserialize, Serialize};

use crate::sql::token::Token;

/// A single literal value in a filter condition.
///
/// Untagged: JSON `30` is an integer, `30.5` a float, `true` a boolean and
/// anything quoted a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// Token for SQL output: numbers and booleans render bare, strings are
    /// single-quoted with embedded quotes doubled.
    pub(crate) fn to_token(&self) -> Token {
        match self {
            Scalar::Bool(b) => Token::LitBool(*b),
            Scalar::Int(n) => Token::LitInt(*n),
            Scalar::Float(f) => Token::LitFloat(*f),
            Scalar::Str(s) => Token::LitString(s.clone()),
        }
    }

    /// Bare text for human-readable output; no quoting or escaping.
    pub(crate) fn display_text(&self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(f) => {
                let mut buffer = ryu::Buffer::new();
                buffer.format(*f).to_string()
            }
            Scalar::Str(s) => s.clone(),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.into())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

/// A condition value: one scalar, or an ordered list of scalars for the
/// list operators (`isIn`/`isNotIn`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl FilterValue {
    /// Build a single-scalar value.
    pub fn one(scalar: impl Into<Scalar>) -> Self {
        FilterValue::One(scalar.into())
    }

    /// Build a list value.
    pub fn many<T: Into<Scalar>>(items: Vec<T>) -> Self {
        FilterValue::Many(items.into_iter().map(Into::into).collect())
    }

    /// The scalar, if this is a single value.
    pub fn scalar(&self) -> Option<&Scalar> {
        match self {
            FilterValue::One(s) => Some(s),
            FilterValue::Many(_) => None,
        }
    }

    /// The list, if this is a list value.
    pub fn list(&self) -> Option<&[Scalar]> {
        match self {
            FilterValue::One(_) => None,
            FilterValue::Many(items) => Some(items),
        }
    }
}

impl From<Scalar> for FilterValue {
    fn from(v: Scalar) -> Self {
        FilterValue::One(v)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::One(v.into())
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::One(v.into())
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::One(v.into())
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::One(v.into())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::One(v.into())
    }
}

impl From<Vec<Scalar>> for FilterValue {
    fn from(v: Vec<Scalar>) -> Self {
        FilterValue::Many(v)
    }
}

/// One node of a raw filter tree.
///
/// Leaf conditions carry `operator` + `column_id` (+ `value` where the
/// operator needs one); logical groups carry `operator` + `filters`. A node
/// matching neither shape is only rejected when compiled or inverted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterConfig {
    /// Registry operator name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// Source column for leaf conditions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_id: Option<String>,
    /// Comparison value(s) for leaf conditions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<FilterValue>,
    /// Child conditions for `and`/`or` groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<FilterConfig>>,
    /// Error-suppression policy; read from the root node only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_invalid: Option<bool>,
}

impl FilterConfig {
    /// A leaf condition on a column.
    pub fn condition(operator: &str, column: &str) -> Self {
        Self {
            operator: Some(operator.into()),
            column_id: Some(column.into()),
            ..Self::default()
        }
    }

    /// A logical group of child conditions.
    pub fn group(operator: &str, children: Vec<FilterConfig>) -> Self {
        Self {
            operator: Some(operator.into()),
            filters: Some(children),
            ..Self::default()
        }
    }

    /// Attach a comparison value.
    pub fn with_value(mut self, value: impl Into<FilterValue>) -> Self {
        self.value = Some(value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_camel_case_leaves() {
        let config: FilterConfig = serde_json::from_value(json!({
            "operator": "is",
            "columnId": "age",
            "value": 30,
        }))
        .unwrap();
        assert_eq!(config.operator.as_deref(), Some("is"));
        assert_eq!(config.column_id.as_deref(), Some("age"));
        assert_eq!(config.value, Some(FilterValue::One(Scalar::Int(30))));
    }

    #[test]
    fn deserializes_nested_groups() {
        let config: FilterConfig = serde_json::from_value(json!({
            "operator": "and",
            "filters": [
                { "operator": "isTrue", "columnId": "isActive" },
                { "operator": "isIn", "columnId": "country", "value": ["DE", "FR"] },
            ],
        }))
        .unwrap();
        let children = config.filters.unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(
            children[1].value.as_ref().unwrap().list().unwrap(),
            &[Scalar::Str("DE".into()), Scalar::Str("FR".into())]
        );
    }

    #[test]
    fn scalar_types_resolve_untagged() {
        let values: Vec<Scalar> = serde_json::from_value(json!([1, 2.5, true, "x"])).unwrap();
        assert_eq!(
            values,
            vec![
                Scalar::Int(1),
                Scalar::Float(2.5),
                Scalar::Bool(true),
                Scalar::Str("x".into())
            ]
        );
    }

    #[test]
    fn builders_mirror_the_serde_shape() {
        let built = FilterConfig::condition("is", "age").with_value(30);
        let parsed: FilterConfig =
            serde_json::from_value(json!({ "operator": "is", "columnId": "age", "value": 30 }))
                .unwrap();
        assert_eq!(built, parsed);
    }
}
