//! SQL Dialect definitions and formatting rules.
//!
//! Each dialect implements `SqlDialect` to handle its specific syntax:
//!
//! - Identifier quoting: `"` (PostgreSQL/DuckDB), `` ` `` (MySQL)
//! - Boolean literals: true/false vs 1/0
//! - Date parts: `DATE_PART('year', x)` vs `YEAR(x)`
//!
//! # Usage
//!
//! ```ignore
//! use chartplan::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Postgres;
//! let quoted = dialect.quote_identifier("test_case");  // "test_case"
//! ```

mod duckdb;
pub mod helpers;
mod mysql;
mod postgres;

pub use duckdb::DuckDb;
pub use mysql::MySql;
pub use postgres::Postgres;

use serde::{Deserialize, Serialize};

use super::token::TokenStream;

/// Calendar component extracted by date bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Year,
    Month,
    Week,
}

impl DatePart {
    /// Lowercase keyword understood by `DATE_PART`.
    pub fn keyword(&self) -> &'static str {
        match self {
            DatePart::Year => "year",
            DatePart::Month => "month",
            DatePart::Week => "week",
        }
    }
}

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    /// Quote an identifier (table, column, alias).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal with `''` escaping.
    fn quote_string(&self, s: &str) -> String {
        format!("'{}'", s.replace('\'', "''"))
    }

    /// Format a boolean literal.
    ///
    /// - PostgreSQL/DuckDB: `true`/`false`
    /// - MySQL: `1`/`0`
    fn format_bool(&self, b: bool) -> &'static str;

    /// Format a date literal: `DATE 'YYYY-MM-DD'`.
    fn format_date_literal(&self, date: &str) -> String {
        format!("DATE {}", self.quote_string(date))
    }

    /// Write one calendar component of `inner` as a number.
    fn write_date_part(&self, part: DatePart, inner: &TokenStream, out: &mut TokenStream) {
        helpers::write_date_part_standard(part, inner, out)
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    DuckDb,
    MySql,
    Postgres,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::DuckDb => &DuckDb,
            Dialect::Postgres => &Postgres,
            Dialect::MySql => &MySql,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn format_date_literal(&self, date: &str) -> String {
        self.dialect().format_date_literal(date)
    }

    fn write_date_part(&self, part: DatePart, inner: &TokenStream, out: &mut TokenStream) {
        self.dialect().write_date_part(part, inner, out)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
