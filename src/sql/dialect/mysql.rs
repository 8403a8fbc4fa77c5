//! MySQL SQL dialect.
//!
//! MySQL differences from ANSI:
//! - Backtick identifier quoting (`` `name` ``)
//! - Boolean is TINYINT(1), returns 1/0
//! - One function per date part (`YEAR`, `MONTH`, `WEEK`)

use super::helpers;
use super::{DatePart, SqlDialect};
use crate::sql::token::TokenStream;

/// MySQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn write_date_part(&self, part: DatePart, inner: &TokenStream, out: &mut TokenStream) {
        helpers::write_date_part_mysql(part, inner, out)
    }
}
