//! Correlated subqueries for calculated columns.

use super::projection::QueryProfile;
use super::{CompileContext, QueryCompiler};
use crate::domain::{Calculation, ColumnPrototype};
use crate::error::{ChartError, ChartResult};
use crate::query::{Filter, QueryDefinition};
use crate::sql::{ExprExt, Query};

/// Compiles a calculated column's nested definition one level deeper and
/// correlates it with the owning entity of the enclosing query.
pub struct SubqueryCompiler<'a> {
    ctx: CompileContext<'a>,
}

impl<'a> SubqueryCompiler<'a> {
    pub fn new(ctx: CompileContext<'a>) -> Self {
        Self { ctx }
    }

    /// Scalar subquery selecting the nested measure.
    pub fn subselect(&self, owner: &ColumnPrototype, calc: &Calculation) -> ChartResult<Query> {
        self.correlated(owner, &calc.query, QueryProfile::SubSelect)
    }

    /// Existence subquery holding `filter` as a condition on the nested measure.
    pub fn subwhere(
        &self,
        owner: &ColumnPrototype,
        calc: &Calculation,
        filter: &Filter,
    ) -> ChartResult<Query> {
        let measure = calc.query.measures.first().ok_or_else(|| {
            ChartError::plan(format!(
                "calculated column {} has no measure to filter on",
                owner.label
            ))
        })?;
        let definition = calc.query.as_ref().clone().measure_filter(Filter {
            prototype: measure.prototype.clone(),
            operation: filter.operation,
            values: filter.values.clone(),
            cuf_id: measure.cuf_id,
        });
        self.correlated(owner, &definition, QueryProfile::SubWhere)
    }

    fn correlated(
        &self,
        owner: &ColumnPrototype,
        definition: &QueryDefinition,
        profile: QueryProfile,
    ) -> ChartResult<Query> {
        let owner_entity = owner.entity.internal()?;
        let axis = match definition.axes.as_slice() {
            [axis] => axis,
            [] => {
                return Err(ChartError::plan(format!(
                    "missing correlation axis for {}",
                    owner.label
                )))
            }
            axes => {
                return Err(ChartError::plan(format!(
                    "{} needs one correlation axis, found {}",
                    owner.label,
                    axes.len()
                )))
            }
        };

        let axis_entity = axis.prototype.entity.internal()?;
        if axis_entity != owner_entity {
            return Err(ChartError::plan(format!(
                "correlation axis of {} is on {axis_entity}, expected {owner_entity}",
                owner.label
            )));
        }

        let inner = self.ctx.nested();
        let (_, query) = QueryCompiler::with_context(inner).compile_profile(definition, profile)?;
        Ok(query.filter(inner.id(owner_entity).eq(self.ctx.id(owner_entity))))
    }
}
