//! WHERE and HAVING predicates.
//!
//! Filters on the same column are ORed, groups of different columns are
//! ANDed. A group lands in HAVING when its column only exists after
//! aggregation, in WHERE otherwise.

use super::columns::{is_inlined_aggregate, ColumnExpressions};
use super::subquery::SubqueryCompiler;
use super::CompileContext;
use crate::domain::{DataType, QueryStrategy};
use crate::error::{ChartError, ChartResult};
use crate::query::{Filter, MeasureColumn, Operation, QueryDefinition};
use crate::sql::{
    cast_date, disjunction, exists, lit_bool, lit_date, lit_float, lit_int, lit_str, Expr,
    ExprExt, Query,
};

/// Escape character of generated LIKE patterns; accepted by every dialect.
pub const LIKE_ESCAPE: char = '!';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clause {
    Where,
    Having,
}

pub struct FilterCompiler<'a> {
    ctx: CompileContext<'a>,
}

impl<'a> FilterCompiler<'a> {
    pub fn new(ctx: CompileContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn compile(&self, definition: &QueryDefinition, mut query: Query) -> ChartResult<Query> {
        let columns = ColumnExpressions::new(self.ctx);

        for group in group_by_column(&definition.filters) {
            let mut clause = Clause::Where;
            let mut predicates = Vec::with_capacity(group.len());
            for filter in group {
                let (target, predicate) = self.compile_filter(&columns, filter)?;
                clause = target;
                predicates.push(predicate);
            }
            if let Some(predicate) = disjunction(predicates) {
                query = match clause {
                    Clause::Where => query.filter(predicate),
                    Clause::Having => query.having(predicate),
                };
            }
        }

        for group in group_by_column(&definition.measure_filters) {
            let mut predicates = Vec::with_capacity(group.len());
            for filter in group {
                let measure = projected_measure(definition, filter)?;
                let lhs = columns.measure(measure)?;
                predicates.push(predicate(lhs, filter, aggregated_type(measure))?);
            }
            if let Some(predicate) = disjunction(predicates) {
                query = query.having(predicate);
            }
        }

        Ok(query)
    }

    fn compile_filter(
        &self,
        columns: &ColumnExpressions<'_>,
        filter: &Filter,
    ) -> ChartResult<(Clause, Expr)> {
        let prototype = &filter.prototype;

        if let Some(calc) = prototype.calculation() {
            if calc.strategy == QueryStrategy::Subquery {
                let subquery = SubqueryCompiler::new(self.ctx).subwhere(prototype, calc, filter)?;
                return Ok((Clause::Where, exists(subquery)));
            }
        }

        let clause = if is_inlined_aggregate(prototype) {
            Clause::Having
        } else {
            Clause::Where
        };
        let lhs = columns.value(prototype, filter.cuf_id)?;
        Ok((clause, predicate(lhs, filter, prototype.data_type)?))
    }
}

/// Filters grouped by column, groups and members in first-seen order.
fn group_by_column(filters: &[Filter]) -> Vec<Vec<&Filter>> {
    let mut groups: Vec<Vec<&Filter>> = Vec::new();
    for filter in filters {
        match groups
            .iter_mut()
            .find(|g| g[0].column_key() == filter.column_key())
        {
            Some(group) => group.push(filter),
            None => groups.push(vec![filter]),
        }
    }
    groups
}

fn projected_measure<'d>(
    definition: &'d QueryDefinition,
    filter: &Filter,
) -> ChartResult<&'d MeasureColumn> {
    definition
        .measures
        .iter()
        .find(|m| m.prototype.label == filter.prototype.label && m.cuf_id == filter.cuf_id)
        .ok_or_else(|| {
            ChartError::plan(format!(
                "condition on measure {} which is not selected",
                filter.prototype.label
            ))
        })
}

/// Type of a measure's value once aggregated.
fn aggregated_type(measure: &MeasureColumn) -> DataType {
    match measure.operation {
        Operation::Count | Operation::CountDistinct | Operation::Sum | Operation::Avg => {
            DataType::Numeric
        }
        Operation::Exists => DataType::Boolean,
        _ => measure.prototype.data_type,
    }
}

/// Predicate applying `filter`'s operation to `lhs`.
pub(crate) fn predicate(lhs: Expr, filter: &Filter, data_type: DataType) -> ChartResult<Expr> {
    let operation = filter.operation;
    let label = filter.prototype.label.as_str();
    let values = &filter.values;

    match operation {
        Operation::IsNull | Operation::NotNull => {
            let polarity = match values.first() {
                Some(value) => parse_bool(value, label)?,
                None => true,
            };
            if (operation == Operation::IsNull) == polarity {
                Ok(lhs.is_null())
            } else {
                Ok(lhs.is_not_null())
            }
        }
        Operation::Like => {
            let value = first_operand(filter)?;
            let pattern = format!("%{}%", escape_like(value));
            Ok(lhs.like_escape(lit_str(&pattern), LIKE_ESCAPE))
        }
        Operation::Between => match values.as_slice() {
            [low, high] => Ok(lhs.between(
                literal(low, data_type, label)?,
                literal(high, data_type, label)?,
            )),
            _ => Err(ChartError::plan(format!(
                "BETWEEN on {label} needs two operands, got {}",
                values.len()
            ))),
        },
        Operation::Equals | Operation::NotEquals | Operation::In => {
            let mut literals = literals(filter, data_type)?;
            let lhs = if data_type == DataType::Date {
                cast_date(lhs)
            } else {
                lhs
            };
            let negated = operation == Operation::NotEquals;
            if literals.len() == 1 && operation != Operation::In {
                let value = literals.remove(0);
                return Ok(if negated { lhs.ne(value) } else { lhs.eq(value) });
            }
            Ok(if negated {
                lhs.not_in_list(literals)
            } else {
                lhs.in_list(literals)
            })
        }
        Operation::Greater => Ok(lhs.gt(first_literal(filter, data_type)?)),
        Operation::GreaterEqual => Ok(lhs.gte(first_literal(filter, data_type)?)),
        Operation::Lower => Ok(lhs.lt(first_literal(filter, data_type)?)),
        Operation::LowerEqual => Ok(lhs.lte(first_literal(filter, data_type)?)),
        _ => Err(ChartError::unsupported(
            operation,
            format!("filter on {label}"),
        )),
    }
}

fn first_operand(filter: &Filter) -> ChartResult<&str> {
    filter.values.first().map(String::as_str).ok_or_else(|| {
        ChartError::plan(format!(
            "{} on {} needs an operand",
            filter.operation, filter.prototype.label
        ))
    })
}

fn first_literal(filter: &Filter, data_type: DataType) -> ChartResult<Expr> {
    literal(first_operand(filter)?, data_type, &filter.prototype.label)
}

fn literals(filter: &Filter, data_type: DataType) -> ChartResult<Vec<Expr>> {
    first_operand(filter)?;
    filter
        .values
        .iter()
        .map(|v| literal(v, data_type, &filter.prototype.label))
        .collect()
}

/// Typed SQL literal for an operand string.
pub(crate) fn literal(value: &str, data_type: DataType, label: &str) -> ChartResult<Expr> {
    match data_type {
        DataType::Numeric => {
            let trimmed = value.trim();
            if let Ok(n) = trimmed.parse::<i64>() {
                return Ok(lit_int(n));
            }
            match trimmed.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(lit_float(f)),
                _ => Err(ChartError::plan(format!(
                    "'{value}' is not a number (column {label})"
                ))),
            }
        }
        DataType::Date => {
            if !is_iso_date(value) {
                return Err(ChartError::plan(format!(
                    "'{value}' is not a YYYY-MM-DD date (column {label})"
                )));
            }
            Ok(lit_date(value))
        }
        DataType::Boolean => Ok(lit_bool(parse_bool(value, label)?)),
        DataType::BooleanAsString => Ok(lit_str(&parse_bool(value, label)?.to_string())),
        _ => Ok(lit_str(value)),
    }
}

fn parse_bool(value: &str, label: &str) -> ChartResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ChartError::plan(format!(
            "'{value}' is not a boolean (column {label})"
        ))),
    }
}

fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Escape LIKE wildcards so the operand matches literally.
pub(crate) fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}
