//! Entry point: compile a chart definition, run it, shape the result.

use tracing::{debug, error};

use crate::compiler::{CompileContext, QueryCompiler, TableNaming};
use crate::config::{Settings, SettingsError};
use crate::domain::{ColumnCatalog, DomainSchema};
use crate::error::{ChartError, ChartResult};
use crate::planner::QueryPlan;
use crate::query::QueryDefinition;
use crate::scope::{Scope, ScopeCompiler};
use crate::services::{
    AuthorizationOracle, CustomFieldCatalog, LabelResolver, NoLabels, QueryExecutor,
};
use crate::sql::{Dialect, Query};
use crate::tuples::{ChartSeries, TupleProcessor};

/// A chart query ready for execution.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    pub plan: QueryPlan,
    pub query: Query,
    pub sql: String,
    pub dialect: Dialect,
}

/// Compiles and runs chart queries against the collaborators it borrows.
pub struct ChartEngine<'a> {
    schema: &'a DomainSchema,
    catalog: &'a ColumnCatalog,
    naming: TableNaming,
    dialect: Dialect,
    permission: String,
    oracle: &'a dyn AuthorizationOracle,
    executor: &'a dyn QueryExecutor,
    labels: &'a dyn LabelResolver,
    custom_fields: &'a dyn CustomFieldCatalog,
}

impl<'a> ChartEngine<'a> {
    /// Engine over the built-in schema and catalog, with codes left unlabelled.
    pub fn new(oracle: &'a dyn AuthorizationOracle, executor: &'a dyn QueryExecutor) -> Self {
        Self {
            schema: DomainSchema::global(),
            catalog: ColumnCatalog::global(),
            naming: TableNaming::new(),
            dialect: Dialect::default(),
            permission: "READ".to_string(),
            oracle,
            executor,
            labels: &NoLabels,
            custom_fields: &NoLabels,
        }
    }

    /// Apply dialect, table naming and scope permission from `settings`.
    pub fn configure(mut self, settings: &Settings) -> Result<Self, SettingsError> {
        self.naming = settings.table_naming()?;
        self.dialect = settings.sql.dialect;
        self.permission = settings.scope.permission.clone();
        Ok(self)
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_naming(mut self, naming: TableNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_labels(mut self, labels: &'a dyn LabelResolver) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_custom_fields(mut self, custom_fields: &'a dyn CustomFieldCatalog) -> Self {
        self.custom_fields = custom_fields;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Plan and compile `definition`, restricted to `scope`, without running it.
    pub fn compile(&self, definition: &QueryDefinition, scope: &Scope) -> ChartResult<CompiledQuery> {
        let ctx = CompileContext::new(self.schema, &self.naming);
        let (plan, query) = QueryCompiler::with_context(ctx).compile(definition)?;
        let query = ScopeCompiler::new(ctx, self.catalog, self.oracle)
            .with_permission(&self.permission)
            .compile(definition, &plan, query, scope)?;

        let sql = query.to_sql(self.dialect);
        debug!(dialect = %self.dialect, sql = %sql, "compiled chart query");
        Ok(CompiledQuery {
            plan,
            query,
            sql,
            dialect: self.dialect,
        })
    }

    /// Compile, execute and shape the rows into chart series.
    pub fn compile_and_run(
        &self,
        definition: &QueryDefinition,
        scope: &Scope,
    ) -> ChartResult<ChartSeries> {
        let compiled = self.compile(definition, scope)?;
        let rows = self.executor.execute(&compiled).map_err(|e| {
            error!(sql = %compiled.sql, error = %e, "chart query failed");
            ChartError::Execution(e)
        })?;
        debug!(rows = rows.len(), "chart query returned");

        TupleProcessor::new(self.labels, self.custom_fields).process(definition, rows)
    }
}
