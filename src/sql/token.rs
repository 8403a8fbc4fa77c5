//! SQL tokens, the atomic units of rendered output.
//!
//! Tokens carry no dialect. Quoting and literal formats are applied when a
//! [`TokenStream`] is serialized.

use std::fmt::Write;

use super::dialect::{Dialect, SqlDialect};

/// Reserved words emitted by chart queries. Multi-word forms are single
/// keywords so that layout never splits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Select,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Join,
    Inner,
    Left,
    Cross,
    On,
    As,
    And,
    Or,
    Not,
    Asc,
    Case,
    When,
    Then,
    Else,
    End,
    In,
    Between,
    Like,
    Escape,
    IsNull,
    IsNotNull,
    Distinct,
    Exists,
    Cast,
    Date,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Select => "SELECT",
            Keyword::From => "FROM",
            Keyword::Where => "WHERE",
            Keyword::GroupBy => "GROUP BY",
            Keyword::Having => "HAVING",
            Keyword::OrderBy => "ORDER BY",
            Keyword::Join => "JOIN",
            Keyword::Inner => "INNER",
            Keyword::Left => "LEFT",
            Keyword::Cross => "CROSS",
            Keyword::On => "ON",
            Keyword::As => "AS",
            Keyword::And => "AND",
            Keyword::Or => "OR",
            Keyword::Not => "NOT",
            Keyword::Asc => "ASC",
            Keyword::Case => "CASE",
            Keyword::When => "WHEN",
            Keyword::Then => "THEN",
            Keyword::Else => "ELSE",
            Keyword::End => "END",
            Keyword::In => "IN",
            Keyword::Between => "BETWEEN",
            Keyword::Like => "LIKE",
            Keyword::Escape => "ESCAPE",
            Keyword::IsNull => "IS NULL",
            Keyword::IsNotNull => "IS NOT NULL",
            Keyword::Distinct => "DISTINCT",
            Keyword::Exists => "EXISTS",
            Keyword::Cast => "CAST",
            Keyword::Date => "DATE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Keyword(Keyword),
    /// Punctuation or operator, emitted verbatim.
    Symbol(&'static str),
    Space,
    Newline,
    /// Two spaces per level.
    Indent(usize),

    /// Table, column or alias name.
    Ident(String),
    /// `schema.table`, or just `table`.
    Table {
        schema: Option<String>,
        name: String,
    },
    /// Function name, rendered upper case.
    Function(String),

    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    /// `YYYY-MM-DD`
    Date(String),
}

impl Token {
    fn write_to(&self, out: &mut String, dialect: Dialect) {
        match self {
            Token::Keyword(kw) => out.push_str(kw.as_str()),
            Token::Symbol(s) => out.push_str(s),
            Token::Space => out.push(' '),
            Token::Newline => out.push('\n'),
            Token::Indent(level) => {
                for _ in 0..*level {
                    out.push_str("  ");
                }
            }
            Token::Ident(name) => out.push_str(&dialect.quote_identifier(name)),
            Token::Table { schema, name } => {
                if let Some(schema) = schema {
                    out.push_str(&dialect.quote_identifier(schema));
                    out.push('.');
                }
                out.push_str(&dialect.quote_identifier(name));
            }
            Token::Function(name) => out.push_str(&name.to_uppercase()),
            Token::Int(n) => {
                let _ = write!(out, "{n}");
            }
            // No SQL literal for NaN or infinity.
            Token::Float(f) if !f.is_finite() => out.push_str("NULL"),
            Token::Float(f) => out.push_str(ryu::Buffer::new().format(*f)),
            Token::Str(s) => out.push_str(&dialect.quote_string(s)),
            Token::Bool(b) => out.push_str(dialect.format_bool(*b)),
            Token::Date(d) => out.push_str(&dialect.format_date_literal(d)),
        }
    }

    pub fn serialize(&self, dialect: Dialect) -> String {
        let mut out = String::new();
        self.write_to(&mut out, dialect);
        out
    }
}

/// An ordered run of tokens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    pub fn keyword(&mut self, keyword: Keyword) -> &mut Self {
        self.push(Token::Keyword(keyword))
    }

    pub fn symbol(&mut self, symbol: &'static str) -> &mut Self {
        self.push(Token::Symbol(symbol))
    }

    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend_from_slice(&other.tokens);
        self
    }

    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }

    /// ` KEYWORD ` between two operands.
    pub fn infix(&mut self, keyword: Keyword) -> &mut Self {
        self.space().keyword(keyword).space()
    }

    pub fn newline(&mut self) -> &mut Self {
        self.push(Token::Newline)
    }

    pub fn indent(&mut self, level: usize) -> &mut Self {
        self.push(Token::Indent(level))
    }

    pub fn comma(&mut self) -> &mut Self {
        self.symbol(",")
    }

    pub fn lparen(&mut self) -> &mut Self {
        self.symbol("(")
    }

    pub fn rparen(&mut self) -> &mut Self {
        self.symbol(")")
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn serialize(&self, dialect: Dialect) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            token.write_to(&mut out, dialect);
        }
        out
    }
}
