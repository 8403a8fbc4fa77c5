//! Table references and SQL aliases.
//!
//! Aliases are derived from the entity, so two compilations of the same
//! definition produce the same SQL. Nested queries add a depth suffix to
//! stay distinct from the query they are correlated with.

use std::collections::BTreeMap;

use crate::domain::{Edge, InternalEntityType};
use crate::sql::TableRef;

/// Maps logical table names to physical ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableNaming {
    schema: Option<String>,
    overrides: BTreeMap<String, String>,
}

impl TableNaming {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Use `physical` wherever the domain refers to `logical`.
    pub fn with_override(mut self, logical: &str, physical: &str) -> Self {
        self.overrides.insert(logical.into(), physical.into());
        self
    }

    pub fn physical_name<'t>(&'t self, logical: &'t str) -> &'t str {
        self.overrides
            .get(logical)
            .map(String::as_str)
            .unwrap_or(logical)
    }

    pub fn table_ref(&self, logical: &str, alias: &str) -> TableRef {
        let table = TableRef::new(self.physical_name(logical)).with_alias(alias);
        match &self.schema {
            Some(schema) => table.with_schema(schema),
            None => table,
        }
    }
}

/// `<base>` at the top level, `<base>_<depth>` inside nested queries.
pub fn depth_alias(base: &str, depth: usize) -> String {
    if depth == 0 {
        base.to_string()
    } else {
        format!("{base}_{depth}")
    }
}

pub fn entity_alias(entity: InternalEntityType, depth: usize) -> String {
    depth_alias(entity.table_mapping().alias, depth)
}

/// Alias of the link table crossed by a many-to-many edge.
pub fn link_alias(edge: &Edge, depth: usize) -> String {
    let base = format!(
        "{}_{}_lnk",
        edge.src.table_mapping().alias,
        edge.dest.table_mapping().alias
    );
    depth_alias(&base, depth)
}

/// Alias of the value-store row holding custom field `cuf_id` of `entity`.
pub fn cuf_alias(entity: InternalEntityType, cuf_id: i64, depth: usize) -> String {
    format!("cuf_{}_{cuf_id}", entity_alias(entity, depth))
}

/// Alias of the selected option rows of a multi-valued custom field.
pub fn cuf_option_alias(entity: InternalEntityType, cuf_id: i64, depth: usize) -> String {
    format!("cufo_{}_{cuf_id}", entity_alias(entity, depth))
}

/// Positional alias of a select item, referenced by GROUP BY and ORDER BY.
pub fn select_alias(index: usize) -> String {
    format!("col_{index}_0")
}
