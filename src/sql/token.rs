//! SQL tokens - the atomic units of generated SQL.
//!
//! Every rendered statement is assembled from tokens, so escaping policy
//! lives in exactly one place: string literals double embedded quotes,
//! identifiers pass through untouched, output aliases are double-quoted.

/// One element of a SQL statement.
///
/// Adding a variant forces every `serialize` site to handle it
/// (exhaustive matching).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    Select,
    From,
    Where,
    GroupBy,
    Union,
    With,
    As,
    And,
    Or,
    Not,
    In,
    Like,
    IsNull,
    IsNotNull,

    // === Operators ===
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    /// `!=` - kept separate from [`Token::Ne`] (`<>`) because empty-string
    /// checks render with the bang form.
    BangEq,
    /// String concatenation, `||`.
    Concat,

    // === Punctuation ===
    Comma,
    Star,
    LParen,
    RParen,

    // === Whitespace / Formatting ===
    Space,
    Newline,
    Indent(usize),

    // === Dynamic Content ===
    /// Column or table identifier, emitted verbatim (identifier quoting is
    /// out of scope for this crate).
    Ident(String),
    /// Output alias, double-quoted: `AS "Total Users"`.
    Alias(String),
    /// Integer literal.
    LitInt(i64),
    /// Float literal.
    LitFloat(f64),
    /// String literal, single-quoted with embedded quotes doubled.
    LitString(String),
    /// Boolean literal, lowercase `true`/`false`.
    LitBool(bool),

    /// Function name (aggregations), emitted verbatim.
    FunctionName(String),

    // === Escape Hatch ===
    /// Raw SQL passed through without escaping. Only for fragments the
    /// caller already owns (metric expressions, source queries, predicates
    /// this crate rendered itself) - never for literal values.
    Raw(String),
}

impl Token {
    /// Serialize this token to its SQL text.
    pub fn serialize(&self) -> String {
        match self {
            // Keywords
            Token::Select => "SELECT".into(),
            Token::From => "FROM".into(),
            Token::Where => "WHERE".into(),
            Token::GroupBy => "GROUP BY".into(),
            Token::Union => "UNION".into(),
            Token::With => "WITH".into(),
            Token::As => "AS".into(),
            Token::And => "AND".into(),
            Token::Or => "OR".into(),
            Token::Not => "NOT".into(),
            Token::In => "IN".into(),
            Token::Like => "LIKE".into(),
            Token::IsNull => "IS NULL".into(),
            Token::IsNotNull => "IS NOT NULL".into(),

            // Operators
            Token::Eq => "=".into(),
            Token::Ne => "<>".into(),
            Token::Lt => "<".into(),
            Token::Gt => ">".into(),
            Token::Lte => "<=".into(),
            Token::Gte => ">=".into(),
            Token::BangEq => "!=".into(),
            Token::Concat => "||".into(),

            // Punctuation
            Token::Comma => ",".into(),
            Token::Star => "*".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),

            // Whitespace
            Token::Space => " ".into(),
            Token::Newline => "\n".into(),
            Token::Indent(n) => "  ".repeat(*n),

            // Dynamic content
            Token::Ident(name) => name.clone(),
            Token::Alias(name) => format!("\"{name}\""),
            Token::LitInt(n) => n.to_string(),
            Token::LitFloat(f) => {
                if f.is_nan() {
                    panic!("Cannot serialize NaN to SQL")
                }
                if f.is_infinite() {
                    panic!("Cannot serialize Infinity to SQL")
                }
                let mut buffer = ryu::Buffer::new();
                buffer.format(*f).to_string()
            }
            Token::LitString(s) => format!("'{}'", s.replace('\'', "''")),
            Token::LitBool(b) => (if *b { "true" } else { "false" }).into(),

            Token::FunctionName(name) => name.clone(),

            // Escape hatch
            Token::Raw(s) => s.clone(),
        }
    }
}

/// A stream of tokens that serializes to a SQL string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Extend with multiple tokens.
    pub fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) -> &mut Self {
        self.tokens.extend(tokens);
        self
    }

    /// Append another token stream.
    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    /// Whether the stream holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Serialize all tokens to a SQL string.
    pub fn serialize(&self) -> String {
        self.tokens.iter().map(Token::serialize).collect()
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn newline(&mut self) -> &mut Self {
        self.push(Token::Newline)
    }
    pub fn indent(&mut self, n: usize) -> &mut Self {
        self.push(Token::Indent(n))
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}
