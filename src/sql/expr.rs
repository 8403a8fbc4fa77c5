//! Expression tree for chart SQL.
//!
//! Only the shapes chart compilation produces are representable; every
//! variant is rendered by [`Expr::write`].

use super::dialect::{DatePart, Dialect, SqlDialect};
use super::query::{Query, SelectExpr};
use super::token::{Keyword, Token, TokenStream};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `column` or `table.column`
    Column {
        table: Option<String>,
        column: String,
    },
    Literal(Literal),
    Binary {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
    /// `NAME(args)` or `NAME(DISTINCT args)`
    Function {
        name: String,
        args: Vec<Expr>,
        distinct: bool,
    },
    /// Searched `CASE WHEN .. THEN .. ELSE .. END`.
    Case {
        branches: Vec<(Expr, Expr)>,
        otherwise: Option<Box<Expr>>,
    },
    /// Scalar `(SELECT ...)`.
    Subquery(Box<Query>),
    Exists(Box<Query>),
    /// `expr [NOT] IN (v1, v2, ...)`
    InList {
        expr: Box<Expr>,
        values: Vec<Expr>,
        negated: bool,
    },
    InSubquery {
        expr: Box<Expr>,
        subquery: Box<Query>,
    },
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },
    /// `IS NULL`, or `IS NOT NULL` when negated.
    IsNull { expr: Box<Expr>, negated: bool },
    /// `expr LIKE pattern ESCAPE 'c'`
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        escape: char,
    },
    /// `CAST(expr AS DATE)`
    CastDate(Box<Expr>),
    /// Numeric calendar bucket: `yyyy`, `yyyy * 100 + mm` or `yyyy * 100 + ww`.
    DateBucket { part: DatePart, expr: Box<Expr> },
    Nested(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    /// `YYYY-MM-DD`
    Date(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    And,
    Or,
    Plus,
    Mul,
}

impl BinaryOperator {
    fn token(self) -> Token {
        match self {
            BinaryOperator::Eq => Token::Symbol("="),
            BinaryOperator::Ne => Token::Symbol("<>"),
            BinaryOperator::Lt => Token::Symbol("<"),
            BinaryOperator::Gt => Token::Symbol(">"),
            BinaryOperator::Lte => Token::Symbol("<="),
            BinaryOperator::Gte => Token::Symbol(">="),
            BinaryOperator::And => Token::Keyword(Keyword::And),
            BinaryOperator::Or => Token::Keyword(Keyword::Or),
            BinaryOperator::Plus => Token::Symbol("+"),
            BinaryOperator::Mul => Token::Symbol("*"),
        }
    }
}

impl Literal {
    fn token(&self) -> Token {
        match self {
            Literal::Int(n) => Token::Int(*n),
            Literal::Float(f) => Token::Float(*f),
            Literal::String(s) => Token::Str(s.clone()),
            Literal::Bool(b) => Token::Bool(*b),
            Literal::Date(d) => Token::Date(d.clone()),
        }
    }
}

impl Expr {
    /// Append this expression to `out`.
    pub fn write(&self, out: &mut TokenStream, dialect: Dialect) {
        match self {
            Expr::Column { table, column } => {
                if let Some(table) = table {
                    out.push(Token::Ident(table.clone())).symbol(".");
                }
                out.push(Token::Ident(column.clone()));
            }
            Expr::Literal(literal) => {
                out.push(literal.token());
            }
            Expr::Binary { left, op, right } => {
                left.write(out, dialect);
                out.space().push(op.token()).space();
                right.write(out, dialect);
            }
            Expr::Function {
                name,
                args,
                distinct,
            } => {
                out.push(Token::Function(name.clone())).lparen();
                if *distinct {
                    out.keyword(Keyword::Distinct).space();
                }
                write_list(args, out, dialect);
                out.rparen();
            }
            Expr::Case {
                branches,
                otherwise,
            } => {
                out.keyword(Keyword::Case);
                for (condition, value) in branches {
                    out.infix(Keyword::When);
                    condition.write(out, dialect);
                    out.infix(Keyword::Then);
                    value.write(out, dialect);
                }
                if let Some(otherwise) = otherwise {
                    out.infix(Keyword::Else);
                    otherwise.write(out, dialect);
                }
                out.space().keyword(Keyword::End);
            }
            Expr::Subquery(query) => {
                out.lparen();
                query.write(out, dialect);
                out.rparen();
            }
            Expr::Exists(query) => {
                out.keyword(Keyword::Exists).space().lparen();
                query.write(out, dialect);
                out.rparen();
            }
            // `x IN ()` is invalid: an empty IN is false, an empty NOT IN is true.
            Expr::InList {
                values, negated, ..
            } if values.is_empty() => {
                out.push(Token::Bool(*negated));
            }
            Expr::InList {
                expr,
                values,
                negated,
            } => {
                expr.write(out, dialect);
                if *negated {
                    out.space().keyword(Keyword::Not);
                }
                out.infix(Keyword::In).lparen();
                write_list(values, out, dialect);
                out.rparen();
            }
            Expr::InSubquery { expr, subquery } => {
                expr.write(out, dialect);
                out.infix(Keyword::In).lparen();
                subquery.write(out, dialect);
                out.rparen();
            }
            Expr::Between { expr, low, high } => {
                expr.write(out, dialect);
                out.infix(Keyword::Between);
                low.write(out, dialect);
                out.infix(Keyword::And);
                high.write(out, dialect);
            }
            Expr::IsNull { expr, negated } => {
                expr.write(out, dialect);
                out.space().keyword(if *negated {
                    Keyword::IsNotNull
                } else {
                    Keyword::IsNull
                });
            }
            Expr::Like {
                expr,
                pattern,
                escape,
            } => {
                expr.write(out, dialect);
                out.infix(Keyword::Like);
                pattern.write(out, dialect);
                out.infix(Keyword::Escape)
                    .push(Token::Str(escape.to_string()));
            }
            Expr::CastDate(inner) => {
                out.keyword(Keyword::Cast).lparen();
                inner.write(out, dialect);
                out.infix(Keyword::As).keyword(Keyword::Date).rparen();
            }
            Expr::DateBucket { part, expr } => {
                let inner = expr.to_tokens(dialect);
                dialect.write_date_part(DatePart::Year, &inner, out);
                if *part != DatePart::Year {
                    out.space()
                        .symbol("*")
                        .space()
                        .push(Token::Int(100))
                        .space()
                        .symbol("+")
                        .space();
                    dialect.write_date_part(*part, &inner, out);
                }
            }
            Expr::Nested(inner) => {
                out.lparen();
                inner.write(out, dialect);
                out.rparen();
            }
        }
    }

    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut out = TokenStream::new();
        self.write(&mut out, dialect);
        out
    }

    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).serialize(dialect)
    }

    /// Whether a scalar subquery appears anywhere in this expression.
    pub fn contains_subquery(&self) -> bool {
        match self {
            Expr::Subquery(_) => true,
            Expr::Binary { left, right, .. } => {
                left.contains_subquery() || right.contains_subquery()
            }
            Expr::IsNull { expr, .. }
            | Expr::DateBucket { expr, .. }
            | Expr::CastDate(expr)
            | Expr::Nested(expr) => expr.contains_subquery(),
            Expr::Function { args, .. } => args.iter().any(Expr::contains_subquery),
            Expr::Case {
                branches,
                otherwise,
            } => {
                branches
                    .iter()
                    .any(|(w, t)| w.contains_subquery() || t.contains_subquery())
                    || otherwise.as_ref().is_some_and(|e| e.contains_subquery())
            }
            _ => false,
        }
    }
}

fn write_list(items: &[Expr], out: &mut TokenStream, dialect: Dialect) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.comma().space();
        }
        item.write(out, dialect);
    }
}

/// Unqualified column reference.
pub fn col(name: &str) -> Expr {
    Expr::Column {
        table: None,
        column: name.into(),
    }
}

/// `table.column`
pub fn table_col(table: &str, column: &str) -> Expr {
    Expr::Column {
        table: Some(table.into()),
        column: column.into(),
    }
}

pub fn lit_int(n: i64) -> Expr {
    Expr::Literal(Literal::Int(n))
}

pub fn lit_float(f: f64) -> Expr {
    Expr::Literal(Literal::Float(f))
}

pub fn lit_str(s: &str) -> Expr {
    Expr::Literal(Literal::String(s.into()))
}

pub fn lit_bool(b: bool) -> Expr {
    Expr::Literal(Literal::Bool(b))
}

pub fn lit_date(d: &str) -> Expr {
    Expr::Literal(Literal::Date(d.into()))
}

fn aggregate(name: &str, expr: Expr, distinct: bool) -> Expr {
    Expr::Function {
        name: name.into(),
        args: vec![expr],
        distinct,
    }
}

pub fn count(expr: Expr) -> Expr {
    aggregate("COUNT", expr, false)
}

pub fn count_distinct(expr: Expr) -> Expr {
    aggregate("COUNT", expr, true)
}

pub fn sum(expr: Expr) -> Expr {
    aggregate("SUM", expr, false)
}

pub fn avg(expr: Expr) -> Expr {
    aggregate("AVG", expr, false)
}

pub fn min(expr: Expr) -> Expr {
    aggregate("MIN", expr, false)
}

pub fn max(expr: Expr) -> Expr {
    aggregate("MAX", expr, false)
}

/// `CASE WHEN condition THEN TRUE ELSE FALSE END`
pub fn bool_case(condition: Expr) -> Expr {
    Expr::Case {
        branches: vec![(condition, lit_bool(true))],
        otherwise: Some(Box::new(lit_bool(false))),
    }
}

pub fn exists(subquery: Query) -> Expr {
    Expr::Exists(Box::new(subquery))
}

pub fn cast_date(expr: Expr) -> Expr {
    Expr::CastDate(Box::new(expr))
}

pub fn date_bucket(part: DatePart, expr: Expr) -> Expr {
    Expr::DateBucket {
        part,
        expr: Box::new(expr),
    }
}

/// AND together a list of predicates; `None` when empty.
pub fn conjunction(exprs: Vec<Expr>) -> Option<Expr> {
    exprs.into_iter().reduce(|acc, e| acc.and(e))
}

/// OR together a list of predicates, parenthesised when there is more than one.
pub fn disjunction(exprs: Vec<Expr>) -> Option<Expr> {
    let many = exprs.len() > 1;
    let joined = exprs.into_iter().reduce(|acc, e| acc.or(e))?;
    Some(if many {
        Expr::Nested(Box::new(joined))
    } else {
        joined
    })
}

/// Fluent predicate building on anything that converts into an [`Expr`].
pub trait ExprExt: Into<Expr> {
    fn eq(self, other: impl Into<Expr>) -> Expr {
        binary(self.into(), BinaryOperator::Eq, other.into())
    }

    fn ne(self, other: impl Into<Expr>) -> Expr {
        binary(self.into(), BinaryOperator::Ne, other.into())
    }

    fn gt(self, other: impl Into<Expr>) -> Expr {
        binary(self.into(), BinaryOperator::Gt, other.into())
    }

    fn gte(self, other: impl Into<Expr>) -> Expr {
        binary(self.into(), BinaryOperator::Gte, other.into())
    }

    fn lt(self, other: impl Into<Expr>) -> Expr {
        binary(self.into(), BinaryOperator::Lt, other.into())
    }

    fn lte(self, other: impl Into<Expr>) -> Expr {
        binary(self.into(), BinaryOperator::Lte, other.into())
    }

    fn and(self, other: impl Into<Expr>) -> Expr {
        binary(self.into(), BinaryOperator::And, other.into())
    }

    fn or(self, other: impl Into<Expr>) -> Expr {
        binary(self.into(), BinaryOperator::Or, other.into())
    }

    fn like_escape(self, pattern: impl Into<Expr>, escape: char) -> Expr {
        Expr::Like {
            expr: Box::new(self.into()),
            pattern: Box::new(pattern.into()),
            escape,
        }
    }

    fn is_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self.into()),
            negated: false,
        }
    }

    fn is_not_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self.into()),
            negated: true,
        }
    }

    fn in_list(self, values: Vec<Expr>) -> Expr {
        Expr::InList {
            expr: Box::new(self.into()),
            values,
            negated: false,
        }
    }

    fn not_in_list(self, values: Vec<Expr>) -> Expr {
        Expr::InList {
            expr: Box::new(self.into()),
            values,
            negated: true,
        }
    }

    fn in_subquery(self, subquery: Query) -> Expr {
        Expr::InSubquery {
            expr: Box::new(self.into()),
            subquery: Box::new(subquery),
        }
    }

    fn between(self, low: impl Into<Expr>, high: impl Into<Expr>) -> Expr {
        Expr::Between {
            expr: Box::new(self.into()),
            low: Box::new(low.into()),
            high: Box::new(high.into()),
        }
    }

    /// Select item `self AS name`.
    fn alias(self, name: &str) -> SelectExpr {
        SelectExpr::new(self.into()).with_alias(name)
    }
}

impl ExprExt for Expr {}

fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        lit_int(n)
    }
}

impl From<f64> for Expr {
    fn from(f: f64) -> Self {
        lit_float(f)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        lit_str(s)
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        lit_bool(b)
    }
}

/// A query used as an expression is a scalar subquery.
impl From<Query> for Expr {
    fn from(query: Query) -> Self {
        Expr::Subquery(Box::new(query))
    }
}
