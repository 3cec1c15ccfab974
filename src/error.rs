//! Error types shared by filter compilation, inversion and pivot assembly.

/// Errors produced while compiling or transforming a filter tree.
///
/// Compilation (`to_sql`, `to_human_readable`) only surfaces these when the
/// tree's `ignore_invalid` policy is disabled; inversion surfaces
/// [`FilterError::MalformedNode`] unconditionally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// Operator name absent from the registry.
    #[error("unsupported operator `{0}`")]
    UnsupportedOperator(String),

    /// A leaf condition missing a required part (column, value, or the
    /// right value shape for the operator).
    #[error("invalid `{operator}` condition: {reason}")]
    InvalidCondition {
        operator: String,
        reason: &'static str,
    },

    /// An `and`/`or` group with no child conditions.
    #[error("`{operator}` group has no sub-filters")]
    EmptyGroup { operator: String },

    /// Inversion met a node that is neither a leaf condition nor a
    /// logical group in shape.
    #[error("filter node is neither a leaf condition nor a logical group")]
    MalformedNode,

    /// A configuration value could not be deserialized.
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type FilterResult<T> = Result<T, FilterError>;
