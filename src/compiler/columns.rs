//! SQL expressions for axis, measure and filter columns.

use super::naming::{cuf_alias, cuf_option_alias};
use super::subquery::SubqueryCompiler;
use super::CompileContext;
use crate::domain::{Calculation, ColumnPrototype, ColumnType, DataType, QueryStrategy};
use crate::error::{ChartError, ChartResult};
use crate::query::{AxisColumn, MeasureColumn, Operation};
use crate::sql::{
    avg, bool_case, cast_date, count, count_distinct, date_bucket, lit_int, max, min, sum,
    table_col, DatePart, Expr, ExprExt,
};

/// Column of the option table holding a tag's label.
pub(crate) const TAG_LABEL_COLUMN: &str = "label";

/// Builds the value expression of a column in the current query.
pub struct ColumnExpressions<'a> {
    ctx: CompileContext<'a>,
}

impl<'a> ColumnExpressions<'a> {
    pub fn new(ctx: CompileContext<'a>) -> Self {
        Self { ctx }
    }

    /// Plain value of a column, before any axis or measure operation.
    ///
    /// Inlined calculated columns yield their nested measure expression;
    /// subquery columns yield a correlated scalar subquery.
    pub fn value(&self, prototype: &ColumnPrototype, cuf_id: Option<i64>) -> ChartResult<Expr> {
        let entity = prototype.entity.internal()?;
        match &prototype.column_type {
            ColumnType::Attribute => Ok(self.ctx.column(entity, &prototype.attribute)),
            ColumnType::Cuf => {
                let cuf_id = required_cuf_id(prototype, cuf_id)?;
                if prototype.data_type == DataType::Tag {
                    let alias = cuf_option_alias(entity, cuf_id, self.ctx.depth);
                    Ok(table_col(&alias, TAG_LABEL_COLUMN))
                } else {
                    let alias = cuf_alias(entity, cuf_id, self.ctx.depth);
                    Ok(table_col(&alias, &prototype.attribute))
                }
            }
            ColumnType::Calculated(calc) => match calc.strategy {
                QueryStrategy::Inlined => self.inlined(prototype, calc),
                QueryStrategy::Subquery => {
                    let subquery = SubqueryCompiler::new(self.ctx).subselect(prototype, calc)?;
                    Ok(Expr::from(subquery))
                }
            },
        }
    }

    fn inlined(&self, prototype: &ColumnPrototype, calc: &Calculation) -> ChartResult<Expr> {
        let nested = calc.query.measures.first().ok_or_else(|| {
            ChartError::plan(format!("inlined column {} has no measure", prototype.label))
        })?;
        if nested.operation == Operation::None {
            self.value(&nested.prototype, nested.cuf_id)
        } else {
            self.measure(nested)
        }
    }

    pub fn axis(&self, axis: &AxisColumn) -> ChartResult<Expr> {
        let prototype = &axis.prototype;
        let operation = axis.operation;

        if is_inlined_aggregate(prototype) {
            return Err(ChartError::unsupported(
                operation,
                format!("aggregated column {} used as an axis", prototype.label),
            ));
        }

        let value = self.value(prototype, axis.cuf_id)?;
        match operation {
            Operation::None => Ok(value),
            Operation::ByDay | Operation::ByWeek | Operation::ByMonth | Operation::ByYear => {
                bucketed(operation, value, prototype)
            }
            Operation::IsNull => Ok(bool_case(value.is_null())),
            Operation::NotNull => Ok(bool_case(value.is_not_null())),
            _ => Err(ChartError::unsupported(
                operation,
                format!("axis {}", prototype.label),
            )),
        }
    }

    pub fn measure(&self, measure: &MeasureColumn) -> ChartResult<Expr> {
        let prototype = &measure.prototype;
        let operation = measure.operation;
        let inlined_aggregate = is_inlined_aggregate(prototype);

        if operation == Operation::None {
            if inlined_aggregate {
                return self.value(prototype, measure.cuf_id);
            }
            return Err(ChartError::unsupported(
                operation,
                format!("measure {} without aggregation", prototype.label),
            ));
        }
        if inlined_aggregate && operation.is_aggregate() {
            return Err(ChartError::unsupported(
                operation,
                format!("aggregation over aggregated column {}", prototype.label),
            ));
        }
        if matches!(operation, Operation::Sum | Operation::Avg) && !prototype.data_type.is_numeric()
        {
            return Err(ChartError::unsupported(
                operation,
                format!("{} column {}", prototype.data_type, prototype.label),
            ));
        }

        let value = self.value(prototype, measure.cuf_id)?;
        aggregate(operation, value).ok_or_else(|| {
            ChartError::unsupported(operation, format!("measure {}", prototype.label))
        })
    }
}

/// Whether `prototype` is an inlined column whose nested measure aggregates.
pub(crate) fn is_inlined_aggregate(prototype: &ColumnPrototype) -> bool {
    prototype.calculation().is_some_and(|calc| {
        calc.strategy == QueryStrategy::Inlined
            && calc
                .query
                .measures
                .first()
                .is_some_and(|m| m.operation.is_aggregate())
    })
}

pub(crate) fn required_cuf_id(prototype: &ColumnPrototype, cuf_id: Option<i64>) -> ChartResult<i64> {
    cuf_id.ok_or_else(|| {
        ChartError::plan(format!(
            "custom field column {} has no field id",
            prototype.label
        ))
    })
}

fn aggregate(operation: Operation, value: Expr) -> Option<Expr> {
    let expr = match operation {
        Operation::Count => count(value),
        Operation::CountDistinct => count_distinct(value),
        Operation::Sum => sum(value),
        Operation::Avg => avg(value),
        Operation::Min => min(value),
        Operation::Max => max(value),
        Operation::Exists => bool_case(count(value).gt(lit_int(0))),
        _ => return None,
    };
    Some(expr)
}

fn bucketed(operation: Operation, value: Expr, prototype: &ColumnPrototype) -> ChartResult<Expr> {
    if !prototype.data_type.is_date() {
        return Err(ChartError::unsupported(
            operation,
            format!("{} column {}", prototype.data_type, prototype.label),
        ));
    }

    // Text dates are parsed first; true dates may carry a time part.
    let date = if operation == Operation::ByDay || prototype.data_type == DataType::DateAsString {
        cast_date(value)
    } else {
        value
    };

    let part = match operation {
        Operation::ByYear => DatePart::Year,
        Operation::ByMonth => DatePart::Month,
        Operation::ByWeek => DatePart::Week,
        _ => return Ok(date),
    };
    Ok(date_bucket(part, date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::TableNaming;
    use crate::domain::{ColumnCatalog, DomainSchema};
    use crate::sql::Dialect;

    fn sql(expr: &Expr) -> String {
        expr.to_sql(Dialect::Postgres)
    }

    fn column(label: &str) -> ColumnPrototype {
        ColumnCatalog::global().resolve(label).unwrap()
    }

    #[test]
    fn test_axis_date_buckets() {
        let naming = TableNaming::new();
        let columns = ColumnExpressions::new(CompileContext::new(DomainSchema::global(), &naming));

        let by_month = AxisColumn::new(column("TEST_CASE_CREATED_ON")).with_operation(Operation::ByMonth);
        assert_eq!(
            sql(&columns.axis(&by_month).unwrap()),
            "DATE_PART('year', \"test_case\".\"created_on\") * 100 + DATE_PART('month', \"test_case\".\"created_on\")"
        );

        let by_day = AxisColumn::new(column("TEST_CASE_CREATED_ON")).with_operation(Operation::ByDay);
        assert_eq!(
            sql(&columns.axis(&by_day).unwrap()),
            "CAST(\"test_case\".\"created_on\" AS DATE)"
        );

        let cuf_year = AxisColumn::new(column("CAMPAIGN_CUF_DATE"))
            .with_operation(Operation::ByYear)
            .with_cuf(3);
        assert_eq!(
            sql(&columns.axis(&cuf_year).unwrap()),
            "DATE_PART('year', CAST(\"cuf_campaign_3\".\"value\" AS DATE))"
        );
    }

    #[test]
    fn test_axis_rejects_bucket_on_non_date() {
        let naming = TableNaming::new();
        let columns = ColumnExpressions::new(CompileContext::new(DomainSchema::global(), &naming));
        let axis = AxisColumn::new(column("TEST_CASE_LABEL")).with_operation(Operation::ByWeek);
        assert!(matches!(
            columns.axis(&axis),
            Err(ChartError::UnsupportedOperation {
                operation: Operation::ByWeek,
                ..
            })
        ));
    }

    #[test]
    fn test_nullness_axis_is_a_case() {
        let naming = TableNaming::new();
        let columns = ColumnExpressions::new(CompileContext::new(DomainSchema::global(), &naming));
        let axis = AxisColumn::new(column("TEST_CASE_REFERENCE")).with_operation(Operation::IsNull);
        assert_eq!(
            sql(&columns.axis(&axis).unwrap()),
            "CASE WHEN \"test_case\".\"reference\" IS NULL THEN true ELSE false END"
        );
    }

    #[test]
    fn test_measure_rules() {
        let naming = TableNaming::new();
        let columns = ColumnExpressions::new(CompileContext::new(DomainSchema::global(), &naming));

        let issues = MeasureColumn::new(column("EXECUTION_ISSUECOUNT"), Operation::None);
        assert_eq!(
            sql(&columns.measure(&issues).unwrap()),
            "COUNT(\"issue\".\"issue_id\")"
        );

        let double = MeasureColumn::new(column("EXECUTION_ISSUECOUNT"), Operation::Sum);
        assert!(columns.measure(&double).is_err());

        let text_sum = MeasureColumn::new(column("TEST_CASE_LABEL"), Operation::Sum);
        assert!(columns.measure(&text_sum).is_err());

        let bare = MeasureColumn::new(column("TEST_CASE_ID"), Operation::None);
        assert!(columns.measure(&bare).is_err());

        let exists = MeasureColumn::new(column("EXECUTION_ID"), Operation::Exists);
        assert_eq!(
            sql(&columns.measure(&exists).unwrap()),
            "CASE WHEN COUNT(\"execution\".\"execution_id\") > 0 THEN true ELSE false END"
        );
    }

    #[test]
    fn test_custom_field_needs_id() {
        let naming = TableNaming::new();
        let columns = ColumnExpressions::new(CompileContext::new(DomainSchema::global(), &naming));
        let prototype = column("TEST_CASE_CUF_TAG");
        assert!(matches!(
            columns.value(&prototype, None),
            Err(ChartError::PlanConfiguration(_))
        ));
        assert_eq!(
            sql(&columns.value(&prototype, Some(8)).unwrap()),
            "\"cufo_test_case_8\".\"label\""
        );
    }
}
