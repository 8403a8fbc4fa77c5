//! SQL rendering for chart queries.
//!
//! Queries are built as a typed tree ([`query`], [`expr`]), flattened into
//! dialect-neutral [`token`]s, then serialized for one [`dialect`].

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;

pub use dialect::{DatePart, Dialect, SqlDialect};
pub use expr::{
    avg, bool_case, cast_date, col, conjunction, count, count_distinct, date_bucket, disjunction,
    exists, lit_bool, lit_date, lit_float, lit_int, lit_str, max, min, sum, table_col,
    BinaryOperator, Expr, ExprExt, Literal,
};
pub use query::{Join, JoinType, OrderByExpr, Query, SelectExpr, TableRef};
pub use token::{Keyword, Token, TokenStream};
