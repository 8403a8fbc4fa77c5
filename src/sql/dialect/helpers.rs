//! Shared helper functions for SQL dialect implementations.
//!
//! Dialects compose these to implement `SqlDialect` without repeating
//! quoting and date-part rules.

use super::super::token::{Token, TokenStream};
use super::DatePart;

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, DuckDB
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with backticks.
/// Used by: MySQL
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

// =============================================================================
// Boolean Formatting
// =============================================================================

/// Format boolean as literal true/false.
/// Used by: Postgres, DuckDB
pub fn format_bool_literal(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

/// Format boolean as numeric 1/0.
/// Used by: MySQL
pub fn format_bool_numeric(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

// =============================================================================
// Date parts
// =============================================================================

/// `DATE_PART('year', x)`, shared by Postgres and DuckDB.
pub fn write_date_part_standard(part: DatePart, inner: &TokenStream, out: &mut TokenStream) {
    out.push(Token::Function("DATE_PART".into()))
        .lparen()
        .push(Token::Str(part.keyword().into()))
        .comma()
        .space()
        .append(inner)
        .rparen();
}

/// `YEAR(x)`, `MONTH(x)`, `WEEK(x, 3)`: MySQL has one function per part.
///
/// Mode 3 is ISO-8601 week numbering, matching `DATE_PART('week', x)`.
pub fn write_date_part_mysql(part: DatePart, inner: &TokenStream, out: &mut TokenStream) {
    let name = match part {
        DatePart::Year => "YEAR",
        DatePart::Month => "MONTH",
        DatePart::Week => "WEEK",
    };
    out.push(Token::Function(name.into())).lparen().append(inner);
    if part == DatePart::Week {
        out.comma().space().push(Token::Int(3));
    }
    out.rparen();
}
