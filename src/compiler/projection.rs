//! SELECT, GROUP BY and ORDER BY clauses.

use super::columns::ColumnExpressions;
use super::naming::select_alias;
use super::CompileContext;
use crate::error::{ChartError, ChartResult};
use crate::query::QueryDefinition;
use crate::sql::{col, lit_int, Expr, ExprExt, OrderByExpr, Query, SelectExpr};

/// What a compiled query is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryProfile {
    /// Axes then measures, grouped and ordered by the axes.
    Main,
    /// Measures only; correlated with the enclosing query by the caller.
    SubSelect,
    /// `SELECT 1` for an existence test; the condition lives in HAVING.
    SubWhere,
}

pub struct ProjectionCompiler<'a> {
    ctx: CompileContext<'a>,
}

impl<'a> ProjectionCompiler<'a> {
    pub fn new(ctx: CompileContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn compile(
        &self,
        definition: &QueryDefinition,
        query: Query,
        profile: QueryProfile,
    ) -> ChartResult<Query> {
        match profile {
            QueryProfile::Main => self.main(definition, query),
            QueryProfile::SubSelect => {
                if definition.measures.is_empty() {
                    return Err(ChartError::plan("subquery selects no measure"));
                }
                let columns = ColumnExpressions::new(self.ctx);
                let select = definition
                    .measures
                    .iter()
                    .map(|m| columns.measure(m))
                    .collect::<ChartResult<Vec<Expr>>>()?;
                Ok(query.select(select))
            }
            QueryProfile::SubWhere => {
                if definition.measure_filters.is_empty() {
                    return Err(ChartError::plan(
                        "existence subquery has no condition on its measure",
                    ));
                }
                Ok(query.select(vec![lit_int(1)]))
            }
        }
    }

    fn main(&self, definition: &QueryDefinition, query: Query) -> ChartResult<Query> {
        let columns = ColumnExpressions::new(self.ctx);
        let mut select = Vec::with_capacity(definition.column_count());
        let mut group_by = Vec::with_capacity(definition.axes.len());
        let mut order_by = Vec::with_capacity(definition.axes.len());

        for (index, axis) in definition.axes.iter().enumerate() {
            let expr = columns.axis(axis)?;
            // Subqueries cannot be grouped on directly; group on their alias.
            let key = if expr.contains_subquery() {
                let alias = select_alias(index);
                select.push(expr.alias(&alias));
                col(&alias)
            } else {
                select.push(SelectExpr::new(expr.clone()));
                expr
            };
            order_by.push(OrderByExpr::asc(key.clone()));
            group_by.push(key);
        }

        for (offset, measure) in definition.measures.iter().enumerate() {
            let expr = columns.measure(measure)?;
            if expr.contains_subquery() {
                select.push(expr.alias(&select_alias(definition.axes.len() + offset)));
            } else {
                select.push(SelectExpr::new(expr));
            }
        }

        Ok(query.select(select).group_by(group_by).order_by(order_by))
    }
}
