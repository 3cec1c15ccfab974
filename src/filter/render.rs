//! Rendering filter trees to SQL predicates and English descriptions.
//!
//! Both walkers dispatch through [`FilterOp`] and apply the same validity
//! checks; they differ only in the fragments they produce. Invalid nodes
//! either degrade to an empty contribution (`ignore_invalid`, the default)
//! or abort the whole compilation with the first error found.

use crate::error::{FilterError, FilterResult};
use crate::filter::config::{FilterConfig, Scalar};
use crate::filter::op::FilterOp;
use crate::sql::token::{Token, TokenStream};

/// Settings threaded through one compilation walk.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RenderOptions {
    /// Degrade invalid nodes to empty output instead of failing.
    pub ignore_invalid: bool,
    /// Compatibility mode: parenthesize nested groups only when they have
    /// more than one child. Off by default; every nested group is wrapped.
    pub legacy_grouping: bool,
}

// =============================================================================
// SQL rendering
// =============================================================================

/// Compile a tree to a SQL predicate string.
pub(crate) fn sql(config: &FilterConfig, opts: RenderOptions) -> FilterResult<String> {
    Ok(match sql_node(config, opts)? {
        Some(ts) => ts.serialize(),
        None => String::new(),
    })
}

/// Compile one node. `Ok(None)` means the node contributes nothing: it was
/// invalid and the policy suppressed it, or all of its children were.
fn sql_node(config: &FilterConfig, opts: RenderOptions) -> FilterResult<Option<TokenStream>> {
    let op = match lookup(config, opts)? {
        Some(op) => op,
        None => return Ok(None),
    };
    match op {
        FilterOp::Is | FilterOp::Eq => comparison(config, Token::Eq, opts),
        FilterOp::IsNot | FilterOp::Ne => comparison(config, Token::Ne, opts),
        FilterOp::Lt => comparison(config, Token::Lt, opts),
        FilterOp::Gt => comparison(config, Token::Gt, opts),
        FilterOp::Lte => comparison(config, Token::Lte, opts),
        FilterOp::Gte => comparison(config, Token::Gte, opts),
        FilterOp::Includes => pattern(config, false, opts),
        FilterOp::DoesNotInclude => pattern(config, true, opts),
        FilterOp::IsTrue => boolean(config, true, opts),
        FilterOp::IsFalse => boolean(config, false, opts),
        FilterOp::IsEmpty => emptiness(config, false, opts),
        FilterOp::IsNotEmpty => emptiness(config, true, opts),
        FilterOp::IsIn => membership(config, false, opts),
        FilterOp::IsNotIn => membership(config, true, opts),
        FilterOp::And => group(config, op, Token::And, opts),
        FilterOp::Or => group(config, op, Token::Or, opts),
    }
}

/// `col <op> value` for the scalar comparisons.
fn comparison(
    config: &FilterConfig,
    op: Token,
    opts: RenderOptions,
) -> FilterResult<Option<TokenStream>> {
    let (column, value) = match leaf_with_scalar(config, opts)? {
        Some(parts) => parts,
        None => return Ok(None),
    };
    let mut ts = TokenStream::new();
    ts.push(Token::Ident(column.into()))
        .space()
        .push(op)
        .space()
        .push(value.to_token());
    Ok(Some(ts))
}

/// `col LIKE '%' || value || '%'`, or `NOT LIKE` when negated.
fn pattern(
    config: &FilterConfig,
    negated: bool,
    opts: RenderOptions,
) -> FilterResult<Option<TokenStream>> {
    let (column, value) = match leaf_with_scalar(config, opts)? {
        Some(parts) => parts,
        None => return Ok(None),
    };
    let mut ts = TokenStream::new();
    ts.push(Token::Ident(column.into())).space();
    if negated {
        ts.push(Token::Not).space();
    }
    ts.push(Token::Like)
        .space()
        .push(Token::LitString("%".into()))
        .space()
        .push(Token::Concat)
        .space()
        .push(value.to_token())
        .space()
        .push(Token::Concat)
        .space()
        .push(Token::LitString("%".into()));
    Ok(Some(ts))
}

/// `col = true` / `col = false`. Any configured value is ignored.
fn boolean(
    config: &FilterConfig,
    value: bool,
    opts: RenderOptions,
) -> FilterResult<Option<TokenStream>> {
    let column = match column_of(config, opts)? {
        Some(column) => column,
        None => return Ok(None),
    };
    let mut ts = TokenStream::new();
    ts.push(Token::Ident(column.into()))
        .space()
        .push(Token::Eq)
        .space()
        .push(Token::LitBool(value));
    Ok(Some(ts))
}

/// `col IS NULL OR col = ''`, or the negated form with `IS NOT NULL` and
/// `!=` when checking non-emptiness.
fn emptiness(
    config: &FilterConfig,
    negated: bool,
    opts: RenderOptions,
) -> FilterResult<Option<TokenStream>> {
    let column = match column_of(config, opts)? {
        Some(column) => column,
        None => return Ok(None),
    };
    let mut ts = TokenStream::new();
    ts.push(Token::Ident(column.into())).space();
    if negated {
        ts.push(Token::IsNotNull).space().push(Token::And).space();
    } else {
        ts.push(Token::IsNull).space().push(Token::Or).space();
    }
    ts.push(Token::Ident(column.into()))
        .space()
        .push(if negated { Token::BangEq } else { Token::Eq })
        .space()
        .push(Token::LitString(String::new()));
    Ok(Some(ts))
}

/// `col IN (v1, v2, ...)`, or `NOT IN` when negated.
fn membership(
    config: &FilterConfig,
    negated: bool,
    opts: RenderOptions,
) -> FilterResult<Option<TokenStream>> {
    let (column, values) = match leaf_with_list(config, opts)? {
        Some(parts) => parts,
        None => return Ok(None),
    };
    let mut ts = TokenStream::new();
    ts.push(Token::Ident(column.into())).space();
    if negated {
        ts.push(Token::Not).space();
    }
    ts.push(Token::In).space().lparen();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            ts.comma().space();
        }
        ts.push(value.to_token());
    }
    ts.rparen();
    Ok(Some(ts))
}

/// Children joined by `AND`/`OR`; suppressed children drop out of the
/// join, and a group whose children all drop contributes nothing itself.
fn group(
    config: &FilterConfig,
    op: FilterOp,
    connective: Token,
    opts: RenderOptions,
) -> FilterResult<Option<TokenStream>> {
    let children = match children_of(config, op, opts)? {
        Some(children) => children,
        None => return Ok(None),
    };
    let mut rendered: Vec<TokenStream> = Vec::new();
    for child in children {
        if let Some(ts) = sql_node(child, opts)? {
            rendered.push(wrap_child(child, ts, opts));
        }
    }
    if rendered.is_empty() {
        return Ok(None);
    }
    let mut out = TokenStream::new();
    for (i, ts) in rendered.iter().enumerate() {
        if i > 0 {
            out.space().push(connective.clone()).space();
        }
        out.append(ts);
    }
    Ok(Some(out))
}

/// Parenthesize a rendered child where precedence demands it.
fn wrap_child(child: &FilterConfig, ts: TokenStream, opts: RenderOptions) -> TokenStream {
    let wrap = if opts.legacy_grouping {
        child.filters.as_ref().is_some_and(|f| f.len() > 1)
    } else {
        child
            .operator
            .as_deref()
            .and_then(FilterOp::parse)
            .is_some_and(FilterOp::is_logical)
    };
    if !wrap {
        return ts;
    }
    let mut wrapped = TokenStream::new();
    wrapped.lparen().append(&ts).rparen();
    wrapped
}

// =============================================================================
// Human-readable rendering
// =============================================================================

/// Compile a tree to an English description.
pub(crate) fn human(config: &FilterConfig, opts: RenderOptions) -> FilterResult<String> {
    Ok(human_node(config, opts)?.unwrap_or_default())
}

fn human_node(config: &FilterConfig, opts: RenderOptions) -> FilterResult<Option<String>> {
    let op = match lookup(config, opts)? {
        Some(op) => op,
        None => return Ok(None),
    };
    match op {
        FilterOp::Is => quoted_phrase(config, "is exactly", opts),
        FilterOp::IsNot => quoted_phrase(config, "is not", opts),
        FilterOp::Includes => quoted_phrase(config, "includes", opts),
        FilterOp::DoesNotInclude => quoted_phrase(config, "does not include", opts),
        FilterOp::Eq => bare_phrase(config, "equals", opts),
        FilterOp::Ne => bare_phrase(config, "does not equal", opts),
        FilterOp::Lt => bare_phrase(config, "is less than", opts),
        FilterOp::Gt => bare_phrase(config, "is greater than", opts),
        FilterOp::Lte => bare_phrase(config, "is less than or equal to", opts),
        FilterOp::Gte => bare_phrase(config, "is greater than or equal to", opts),
        FilterOp::IsTrue => column_phrase(config, "is true", opts),
        FilterOp::IsFalse => column_phrase(config, "is false", opts),
        FilterOp::IsEmpty => column_phrase(config, "is empty", opts),
        FilterOp::IsNotEmpty => column_phrase(config, "is not empty", opts),
        FilterOp::IsIn => membership_phrase(config, "is in", opts),
        FilterOp::IsNotIn => membership_phrase(config, "is not in", opts),
        FilterOp::And => human_group(config, op, "and", opts),
        FilterOp::Or => human_group(config, op, "or", opts),
    }
}

/// `col <verb> 'value'`.
fn quoted_phrase(
    config: &FilterConfig,
    verb: &str,
    opts: RenderOptions,
) -> FilterResult<Option<String>> {
    Ok(leaf_with_scalar(config, opts)?
        .map(|(column, value)| format!("{column} {verb} '{}'", value.display_text())))
}

/// `col <verb> value`.
fn bare_phrase(
    config: &FilterConfig,
    verb: &str,
    opts: RenderOptions,
) -> FilterResult<Option<String>> {
    Ok(leaf_with_scalar(config, opts)?
        .map(|(column, value)| format!("{column} {verb} {}", value.display_text())))
}

/// `col <phrase>` for the value-less operators.
fn column_phrase(
    config: &FilterConfig,
    phrase: &str,
    opts: RenderOptions,
) -> FilterResult<Option<String>> {
    Ok(column_of(config, opts)?.map(|column| format!("{column} {phrase}")))
}

/// `col is in ('a', 'b')` - the value list keeps its SQL spelling.
fn membership_phrase(
    config: &FilterConfig,
    verb: &str,
    opts: RenderOptions,
) -> FilterResult<Option<String>> {
    let (column, values) = match leaf_with_list(config, opts)? {
        Some(parts) => parts,
        None => return Ok(None),
    };
    let rendered: Vec<String> = values.iter().map(|v| v.to_token().serialize()).collect();
    Ok(Some(format!("{column} {verb} ({})", rendered.join(", "))))
}

/// Children joined with commas and a trailing conjunction: `A, B and C`.
/// A single surviving child stands alone.
fn human_group(
    config: &FilterConfig,
    op: FilterOp,
    conjunction: &str,
    opts: RenderOptions,
) -> FilterResult<Option<String>> {
    let children = match children_of(config, op, opts)? {
        Some(children) => children,
        None => return Ok(None),
    };
    let mut rendered: Vec<String> = Vec::new();
    for child in children {
        if let Some(text) = human_node(child, opts)? {
            rendered.push(text);
        }
    }
    let Some(last) = rendered.pop() else {
        return Ok(None);
    };
    if rendered.is_empty() {
        return Ok(Some(last));
    }
    Ok(Some(format!("{} {conjunction} {last}", rendered.join(", "))))
}

// =============================================================================
// Shared extraction and policy helpers
// =============================================================================

/// Resolve a node's operator, degrading unsupported or missing names.
fn lookup(config: &FilterConfig, opts: RenderOptions) -> FilterResult<Option<FilterOp>> {
    let name = config.operator.as_deref().unwrap_or("<missing>");
    match FilterOp::parse(name) {
        Some(op) => Ok(Some(op)),
        None => degrade(opts, FilterError::UnsupportedOperator(name.into())),
    }
}

/// Apply the suppression policy to an invalid node.
fn degrade<T>(opts: RenderOptions, err: FilterError) -> FilterResult<Option<T>> {
    if opts.ignore_invalid {
        Ok(None)
    } else {
        Err(err)
    }
}

fn invalid(config: &FilterConfig, reason: &'static str) -> FilterError {
    FilterError::InvalidCondition {
        operator: config.operator.clone().unwrap_or_default(),
        reason,
    }
}

/// The node's column, required non-empty.
fn column_of<'a>(config: &'a FilterConfig, opts: RenderOptions) -> FilterResult<Option<&'a str>> {
    match config.column_id.as_deref().filter(|c| !c.is_empty()) {
        Some(column) => Ok(Some(column)),
        None => degrade(opts, invalid(config, "missing column")),
    }
}

/// Column plus a single scalar value.
fn leaf_with_scalar<'a>(
    config: &'a FilterConfig,
    opts: RenderOptions,
) -> FilterResult<Option<(&'a str, &'a Scalar)>> {
    let Some(column) = column_of(config, opts)? else {
        return Ok(None);
    };
    let Some(value) = config.value.as_ref() else {
        return degrade(opts, invalid(config, "missing value"));
    };
    match value.scalar() {
        Some(scalar) => Ok(Some((column, scalar))),
        None => degrade(opts, invalid(config, "expects a single scalar value")),
    }
}

/// Column plus a non-empty value list.
fn leaf_with_list<'a>(
    config: &'a FilterConfig,
    opts: RenderOptions,
) -> FilterResult<Option<(&'a str, &'a [Scalar])>> {
    let Some(column) = column_of(config, opts)? else {
        return Ok(None);
    };
    match config.value.as_ref().and_then(|v| v.list()) {
        Some(values) if !values.is_empty() => Ok(Some((column, values))),
        _ => degrade(opts, invalid(config, "expects a non-empty list of values")),
    }
}

/// The group's children, required non-empty.
fn children_of<'a>(
    config: &'a FilterConfig,
    op: FilterOp,
    opts: RenderOptions,
) -> FilterResult<Option<&'a [FilterConfig]>> {
    match config.filters.as_deref().filter(|f| !f.is_empty()) {
        Some(children) => Ok(Some(children)),
        None => degrade(
            opts,
            FilterError::EmptyGroup {
                operator: op.name().into(),
            },
        ),
    }
}
