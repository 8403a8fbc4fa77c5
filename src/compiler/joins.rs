//! FROM and JOIN clauses along a query plan.

use super::columns::required_cuf_id;
use super::naming::{cuf_alias, cuf_option_alias, link_alias};
use super::CompileContext;
use crate::domain::{
    ColumnPrototype, DataType, Edge, InternalEntityType, JoinKind, Navigation, QueryStrategy,
};
use crate::error::{ChartError, ChartResult};
use crate::planner::QueryPlan;
use crate::query::{JoinStyle, QueryDefinition};
use crate::sql::{lit_int, lit_str, table_col, ExprExt, JoinType, Query};

/// Value store of custom fields.
pub(crate) const CUF_VALUE_TABLE: &str = "custom_field_value";
/// Selected options of multi-valued custom fields.
pub(crate) const CUF_OPTION_TABLE: &str = "custom_field_value_option";

/// Adds the entities of a plan to a query, skipping those already joined.
///
/// Running it again on a query that already holds part of the plan only
/// adds what is missing, which is how scope restrictions extend a compiled
/// query.
pub struct JoinCompiler<'a> {
    ctx: CompileContext<'a>,
}

impl<'a> JoinCompiler<'a> {
    pub fn new(ctx: CompileContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn compile(
        &self,
        definition: &QueryDefinition,
        plan: &QueryPlan,
        mut query: Query,
    ) -> ChartResult<Query> {
        let join_type = match definition.join_style {
            JoinStyle::Inner => JoinType::Inner,
            JoinStyle::Left => JoinType::Left,
        };

        let root = plan.root();
        if !query.has_alias(&self.ctx.alias(root)) {
            query = match query.from {
                None => query.from(self.ctx.table(root)),
                Some(_) => query.cross_join(self.ctx.table(root)),
            };
        }

        for edge in plan.traverse() {
            query = match edge.join_kind {
                JoinKind::Natural => self.natural(query, edge, join_type)?,
                JoinKind::Where => self.reversed_where(query, edge)?,
            };
        }

        let mut custom_fields = Vec::new();
        collect_custom_fields(definition, &mut custom_fields);
        for (prototype, cuf_id) in custom_fields {
            query = self.custom_field(query, prototype, cuf_id)?;
        }

        Ok(query)
    }

    fn natural(&self, query: Query, edge: &Edge, join_type: JoinType) -> ChartResult<Query> {
        let dest_alias = self.ctx.alias(edge.dest);
        if query.has_alias(&dest_alias) {
            return Ok(query);
        }

        let query = match edge.navigation {
            Navigation::ForeignKey {
                source_column,
                dest_column,
            } => query.join(
                join_type,
                self.ctx.table(edge.dest),
                self.ctx
                    .column(edge.src, source_column)
                    .eq(self.ctx.column(edge.dest, dest_column)),
            ),
            Navigation::LinkTable {
                table,
                source_key,
                dest_key,
            } => {
                let link = link_alias(edge, self.ctx.depth);
                query
                    .join(
                        join_type,
                        self.ctx.naming.table_ref(table, &link),
                        self.ctx.id(edge.src).eq(table_col(&link, source_key)),
                    )
                    .join(
                        join_type,
                        self.ctx.table(edge.dest),
                        table_col(&link, dest_key).eq(self.ctx.id(edge.dest)),
                    )
            }
        };
        Ok(query)
    }

    /// Cross join whichever endpoint is missing, then narrow by the key.
    fn reversed_where(&self, mut query: Query, edge: &Edge) -> ChartResult<Query> {
        let Navigation::ForeignKey {
            source_column,
            dest_column,
        } = edge.navigation
        else {
            return Err(ChartError::plan(format!(
                "where join from {} to {} must use a foreign key",
                edge.src, edge.dest
            )));
        };

        for entity in [edge.src, edge.dest] {
            if !query.has_alias(&self.ctx.alias(entity)) {
                query = query.cross_join(self.ctx.table(entity));
            }
        }

        Ok(query.filter(
            self.ctx
                .column(edge.dest, dest_column)
                .eq(self.ctx.column(edge.src, source_column)),
        ))
    }

    fn custom_field(
        &self,
        mut query: Query,
        prototype: &ColumnPrototype,
        cuf_id: Option<i64>,
    ) -> ChartResult<Query> {
        let cuf_id = required_cuf_id(prototype, cuf_id)?;
        let entity = prototype.entity.internal()?;
        let binding = cuf_binding(entity, prototype)?;

        let alias = cuf_alias(entity, cuf_id, self.ctx.depth);
        if query.has_alias(&alias) {
            return Ok(query);
        }

        query = query.cross_join(self.ctx.naming.table_ref(CUF_VALUE_TABLE, &alias));
        query = query.filter(
            table_col(&alias, "bound_entity_type")
                .eq(lit_str(binding))
                .and(table_col(&alias, "bound_entity_id").eq(self.ctx.id(entity)))
                .and(table_col(&alias, "cf_id").eq(lit_int(cuf_id))),
        );

        if prototype.data_type == DataType::Tag {
            let option_alias = cuf_option_alias(entity, cuf_id, self.ctx.depth);
            query = query.inner_join(
                self.ctx.naming.table_ref(CUF_OPTION_TABLE, &option_alias),
                table_col(&option_alias, "cfv_id").eq(table_col(&alias, "cfv_id")),
            );
        }

        Ok(query)
    }
}

fn cuf_binding(entity: InternalEntityType, prototype: &ColumnPrototype) -> ChartResult<&'static str> {
    entity.cuf_binding().ok_or_else(|| {
        ChartError::plan(format!(
            "{} cannot carry custom field column {}",
            entity, prototype.label
        ))
    })
}

/// Custom field columns of a definition, including those inside inlined
/// calculated columns, first occurrence first.
fn collect_custom_fields<'d>(
    definition: &'d QueryDefinition,
    out: &mut Vec<(&'d ColumnPrototype, Option<i64>)>,
) {
    let columns = definition
        .axes
        .iter()
        .map(|c| (&c.prototype, c.cuf_id))
        .chain(definition.measures.iter().map(|c| (&c.prototype, c.cuf_id)))
        .chain(definition.filters.iter().map(|c| (&c.prototype, c.cuf_id)))
        .chain(definition.measure_filters.iter().map(|c| (&c.prototype, c.cuf_id)));

    for (prototype, cuf_id) in columns {
        if prototype.is_custom_field() {
            if !out
                .iter()
                .any(|(p, id)| p.label == prototype.label && *id == cuf_id)
            {
                out.push((prototype, cuf_id));
            }
        } else if let Some(calc) = prototype.calculation() {
            if calc.strategy == QueryStrategy::Inlined {
                collect_custom_fields(&calc.query, out);
            }
        }
    }
}
