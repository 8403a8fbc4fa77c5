//! Turns raw result rows into chart series.

use tracing::{debug, trace};

use super::ordering::AxisOrder;
use super::{ChartSeries, Series, Tuple, Value};
use crate::domain::{DataType, InternalEntityType};
use crate::error::{ChartResult, ExecutionFailure};
use crate::query::{AxisColumn, ChartColumn, QueryDefinition};
use crate::services::{CustomFieldCatalog, CustomFieldMetadata, LabelResolver};

/// Sorts, relabels and splits rows into abscissa and series.
pub struct TupleProcessor<'a> {
    labels: &'a dyn LabelResolver,
    custom_fields: &'a dyn CustomFieldCatalog,
}

/// Code-to-label lookup for one axis.
enum Labelling {
    Verbatim,
    InfoList(InternalEntityType),
    CustomList(Option<CustomFieldMetadata>),
}

impl<'a> TupleProcessor<'a> {
    pub fn new(labels: &'a dyn LabelResolver, custom_fields: &'a dyn CustomFieldCatalog) -> Self {
        Self {
            labels,
            custom_fields,
        }
    }

    pub fn process(&self, def: &QueryDefinition, mut rows: Vec<Tuple>) -> ChartResult<ChartSeries> {
        let width = def.column_count();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() < width) {
            return Err(ExecutionFailure::new(format!(
                "row {i} has {} values, expected {width}",
                row.len()
            ))
            .into());
        }

        self.sort(&def.axes, &mut rows);

        let labelling = def
            .axes
            .iter()
            .map(|axis| self.labelling(axis))
            .collect::<ChartResult<Vec<_>>>()?;

        let colour_axis = match def.axes.len() {
            0 => None,
            1 => Some(0),
            n => Some(n - 2),
        };

        let mut out = ChartSeries {
            abscissa: Vec::with_capacity(rows.len()),
            series: def
                .measures
                .iter()
                .map(|m| Series {
                    label: m.display_label().to_string(),
                    values: Vec::with_capacity(rows.len()),
                })
                .collect(),
            colours: Vec::new(),
        };
        let colouring = colour_axis.filter(|&i| !matches!(labelling[i], Labelling::Verbatim));

        for row in rows {
            let mut values = row.into_values();
            let measures = values.split_off(def.axes.len());

            if let Some(i) = colouring {
                let colour = values[i]
                    .as_str()
                    .and_then(|code| self.colour(&labelling[i], code))
                    .unwrap_or_default();
                out.colours.push(colour);
            }

            let abscissa = values
                .into_iter()
                .zip(&labelling)
                .map(|(value, rule)| self.relabel(rule, value))
                .collect();
            out.abscissa.push(abscissa);

            for (series, value) in out.series.iter_mut().zip(measures) {
                series.values.push(value);
            }
        }

        debug!(
            rows = out.abscissa.len(),
            series = out.series.len(),
            coloured = colouring.is_some(),
            "built chart series"
        );
        Ok(out)
    }

    /// Stable sort on the axes, only when one of them has a business order.
    fn sort(&self, axes: &[AxisColumn], rows: &mut [Tuple]) {
        let orders: Vec<AxisOrder> = axes.iter().map(AxisOrder::for_axis).collect();
        if !orders.iter().any(AxisOrder::is_custom) {
            return;
        }
        trace!(?orders, "sorting rows in memory");
        rows.sort_by(|a, b| {
            orders
                .iter()
                .enumerate()
                .map(|(i, order)| {
                    let null = Value::Null;
                    order.compare(a.get(i).unwrap_or(&null), b.get(i).unwrap_or(&null))
                })
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    fn labelling(&self, axis: &AxisColumn) -> ChartResult<Labelling> {
        if axis.operation().yields_boolean() || axis.operation().is_date_bucket() {
            return Ok(Labelling::Verbatim);
        }
        Ok(match axis.prototype().data_type {
            DataType::InfoListItem => Labelling::InfoList(axis.entity()?),
            DataType::List => Labelling::CustomList(
                axis.cuf_id().and_then(|id| self.custom_fields.find_by_id(id)),
            ),
            _ => Labelling::Verbatim,
        })
    }

    fn relabel(&self, rule: &Labelling, value: Value) -> Value {
        let Some(code) = value.as_str() else {
            return value;
        };
        let label = match rule {
            Labelling::Verbatim => None,
            Labelling::InfoList(entity) => self.labels.resolve_label(*entity, code).map(|r| r.label),
            Labelling::CustomList(field) => field
                .as_ref()
                .and_then(|f| f.option(code))
                .map(|o| o.label.clone()),
        };
        label.map(Value::Text).unwrap_or(value)
    }

    fn colour(&self, rule: &Labelling, code: &str) -> Option<String> {
        match rule {
            Labelling::Verbatim => None,
            Labelling::InfoList(entity) => self.labels.resolve_label(*entity, code)?.colour,
            Labelling::CustomList(field) => field.as_ref()?.option(code)?.colour.clone(),
        }
    }
}
