//! Compilation of chart query definitions into SQL queries.
//!
//! A definition goes through four stages, each a pure transform of the
//! query built so far:
//!
//! ```text
//! QueryDefinition ──▶ QueryPlanBuilder ──▶ JoinCompiler ──▶ FilterCompiler ──▶ ProjectionCompiler
//!                                              │                   │                  │
//!                                              └──── SubqueryCompiler (calculated columns) ◀┘
//! ```
//!
//! Calculated columns backed by a subquery re-enter the whole pipeline one
//! nesting level deeper.

mod columns;
mod filters;
mod joins;
pub mod naming;
mod projection;
mod subquery;

pub use columns::ColumnExpressions;
pub use filters::FilterCompiler;
pub use joins::JoinCompiler;
pub use naming::TableNaming;
pub use projection::{ProjectionCompiler, QueryProfile};
pub use subquery::SubqueryCompiler;

use tracing::trace;

use crate::domain::{DomainSchema, InternalEntityType};
use crate::error::ChartResult;
use crate::planner::{QueryPlan, QueryPlanBuilder};
use crate::query::QueryDefinition;
use crate::sql::{table_col, Expr, Query, TableRef};

/// Shared, read-only inputs of one compilation, plus the nesting depth.
#[derive(Debug, Clone, Copy)]
pub struct CompileContext<'a> {
    pub schema: &'a DomainSchema,
    pub naming: &'a TableNaming,
    pub depth: usize,
}

impl<'a> CompileContext<'a> {
    pub fn new(schema: &'a DomainSchema, naming: &'a TableNaming) -> Self {
        Self {
            schema,
            naming,
            depth: 0,
        }
    }

    /// Context of a query nested inside this one.
    pub fn nested(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..*self
        }
    }

    pub fn alias(&self, entity: InternalEntityType) -> String {
        naming::entity_alias(entity, self.depth)
    }

    pub fn table(&self, entity: InternalEntityType) -> TableRef {
        self.naming
            .table_ref(entity.table_mapping().table, &self.alias(entity))
    }

    /// `alias.column` for a column of `entity`.
    pub fn column(&self, entity: InternalEntityType, column: &str) -> Expr {
        table_col(&self.alias(entity), column)
    }

    /// `alias.<id column>` of `entity`.
    pub fn id(&self, entity: InternalEntityType) -> Expr {
        self.column(entity, entity.table_mapping().id_column)
    }
}

/// Runs the whole pipeline for one definition.
pub struct QueryCompiler<'a> {
    ctx: CompileContext<'a>,
}

impl<'a> QueryCompiler<'a> {
    pub fn new(schema: &'a DomainSchema, naming: &'a TableNaming) -> Self {
        Self {
            ctx: CompileContext::new(schema, naming),
        }
    }

    pub fn with_context(ctx: CompileContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> CompileContext<'a> {
        self.ctx
    }

    /// Compile the main query of a chart.
    pub fn compile(&self, definition: &QueryDefinition) -> ChartResult<(QueryPlan, Query)> {
        self.compile_profile(definition, QueryProfile::Main)
    }

    pub fn compile_profile(
        &self,
        definition: &QueryDefinition,
        profile: QueryProfile,
    ) -> ChartResult<(QueryPlan, Query)> {
        let plan = QueryPlanBuilder::new(self.ctx.schema).build(definition)?;
        trace!(depth = self.ctx.depth, ?profile, plan = %plan, "compiling chart query");

        let query = JoinCompiler::new(self.ctx).compile(definition, &plan, Query::new())?;
        let query = FilterCompiler::new(self.ctx).compile(definition, query)?;
        let query = ProjectionCompiler::new(self.ctx).compile(definition, query, profile)?;
        Ok((plan, query))
    }
}
