//! SELECT statements built with a fluent API.
//!
//! Layout is fixed: one select item per line, one clause per line, joins in
//! insertion order.

use super::dialect::Dialect;
use super::expr::{Expr, ExprExt};
use super::token::{Keyword, Token, TokenStream};

/// A SELECT list item.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct SelectExpr {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectExpr {
    pub fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    fn write(&self, out: &mut TokenStream, dialect: Dialect) {
        self.expr.write(out, dialect);
        write_alias(self.alias.as_deref(), out);
    }
}

impl From<Expr> for SelectExpr {
    fn from(expr: Expr) -> Self {
        SelectExpr::new(expr)
    }
}

fn write_alias(alias: Option<&str>, out: &mut TokenStream) {
    if let Some(alias) = alias {
        out.infix(Keyword::As).push(Token::Ident(alias.into()));
    }
}

/// A physical table, optionally schema-qualified and aliased.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct TableRef {
    pub schema: Option<String>,
    pub table: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(table: &str) -> Self {
        Self {
            schema: None,
            table: table.into(),
            alias: None,
        }
    }

    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The name other clauses use to refer to this table.
    pub fn reference_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }

    fn write(&self, out: &mut TokenStream) {
        out.push(Token::Table {
            schema: self.schema.clone(),
            name: self.table.clone(),
        });
        write_alias(self.alias.as_deref(), out);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    /// No `ON` clause; the pairing predicate goes to `WHERE`.
    Cross,
}

impl JoinType {
    fn keyword(self) -> Keyword {
        match self {
            JoinType::Inner => Keyword::Inner,
            JoinType::Left => Keyword::Left,
            JoinType::Cross => Keyword::Cross,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub table: TableRef,
    pub on: Option<Expr>,
}

impl Join {
    fn write(&self, out: &mut TokenStream, dialect: Dialect) {
        out.keyword(self.join_type.keyword())
            .space()
            .keyword(Keyword::Join)
            .space();
        self.table.write(out);
        if let Some(on) = &self.on {
            out.infix(Keyword::On);
            on.write(out, dialect);
        }
    }
}

/// An ascending ORDER BY item; chart axes only sort in natural order.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct OrderByExpr {
    pub expr: Expr,
}

impl OrderByExpr {
    pub fn asc(expr: Expr) -> Self {
        Self { expr }
    }

    fn write(&self, out: &mut TokenStream, dialect: Dialect) {
        self.expr.write(out, dialect);
        out.space().keyword(Keyword::Asc);
    }
}

/// A SELECT statement.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use = "Query has no effect until rendered with to_sql()"]
pub struct Query {
    pub select: Vec<SelectExpr>,
    pub from: Option<TableRef>,
    pub joins: Vec<Join>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderByExpr>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, exprs: Vec<impl Into<SelectExpr>>) -> Self {
        self.select = exprs.into_iter().map(Into::into).collect();
        self
    }

    pub fn from(mut self, table: TableRef) -> Self {
        self.from = Some(table);
        self
    }

    pub fn join(mut self, join_type: JoinType, table: TableRef, on: Expr) -> Self {
        self.joins.push(Join {
            join_type,
            table,
            on: Some(on),
        });
        self
    }

    pub fn inner_join(self, table: TableRef, on: Expr) -> Self {
        self.join(JoinType::Inner, table, on)
    }

    pub fn cross_join(mut self, table: TableRef) -> Self {
        self.joins.push(Join {
            join_type: JoinType::Cross,
            table,
            on: None,
        });
        self
    }

    /// AND `condition` into the WHERE clause.
    pub fn filter(mut self, condition: Expr) -> Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    pub fn group_by(mut self, exprs: Vec<Expr>) -> Self {
        self.group_by = exprs;
        self
    }

    /// AND `condition` into the HAVING clause.
    pub fn having(mut self, condition: Expr) -> Self {
        self.having = Some(match self.having.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    pub fn order_by(mut self, exprs: Vec<OrderByExpr>) -> Self {
        self.order_by = exprs;
        self
    }

    /// Whether a FROM or JOIN source is already registered under this alias.
    pub fn has_alias(&self, alias: &str) -> bool {
        self.from
            .iter()
            .chain(self.joins.iter().map(|j| &j.table))
            .any(|t| t.reference_name() == alias)
    }

    /// Append the statement to `out`, without surrounding parentheses.
    pub fn write(&self, out: &mut TokenStream, dialect: Dialect) {
        out.keyword(Keyword::Select);
        for (i, item) in self.select.iter().enumerate() {
            if i > 0 {
                out.comma();
            }
            out.newline().indent(1);
            item.write(out, dialect);
        }

        if let Some(from) = &self.from {
            out.newline().keyword(Keyword::From).space();
            from.write(out);
        }
        for join in &self.joins {
            out.newline();
            join.write(out, dialect);
        }

        if let Some(condition) = &self.where_clause {
            out.newline().keyword(Keyword::Where).space();
            condition.write(out, dialect);
        }
        if !self.group_by.is_empty() {
            out.newline().keyword(Keyword::GroupBy).space();
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    out.comma().space();
                }
                expr.write(out, dialect);
            }
        }
        if let Some(condition) = &self.having {
            out.newline().keyword(Keyword::Having).space();
            condition.write(out, dialect);
        }
        if !self.order_by.is_empty() {
            out.newline().keyword(Keyword::OrderBy).space();
            for (i, item) in self.order_by.iter().enumerate() {
                if i > 0 {
                    out.comma().space();
                }
                item.write(out, dialect);
            }
        }
    }

    pub fn to_sql(&self, dialect: Dialect) -> String {
        let mut out = TokenStream::new();
        self.write(&mut out, dialect);
        out.serialize(dialect)
    }
}
