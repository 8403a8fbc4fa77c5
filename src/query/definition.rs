//! Chart query definitions: axes, measures, filters and join style.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::operation::Operation;
use crate::domain::{ColumnPrototype, InternalEntityType, QueryStrategy};
use crate::error::{ChartError, ChartResult};

/// Join flavour used for natural edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinStyle {
    #[default]
    Inner,
    Left,
}

/// Common view over axes, measures and filters.
pub trait ChartColumn {
    fn prototype(&self) -> &ColumnPrototype;
    fn operation(&self) -> Operation;
    /// Custom field id, for custom field columns only.
    fn cuf_id(&self) -> Option<i64>;

    /// Entity owning the column.
    fn entity(&self) -> ChartResult<InternalEntityType> {
        self.prototype().entity.internal()
    }
}

/// A group-by column.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisColumn {
    pub prototype: ColumnPrototype,
    pub operation: Operation,
    pub cuf_id: Option<i64>,
}

impl AxisColumn {
    pub fn new(prototype: ColumnPrototype) -> Self {
        Self {
            prototype,
            operation: Operation::None,
            cuf_id: None,
        }
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    pub fn with_cuf(mut self, cuf_id: i64) -> Self {
        self.cuf_id = Some(cuf_id);
        self
    }
}

/// An aggregated column.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureColumn {
    pub prototype: ColumnPrototype,
    pub operation: Operation,
    pub cuf_id: Option<i64>,
    /// Series name; defaults to the prototype label.
    pub label: Option<String>,
}

impl MeasureColumn {
    pub fn new(prototype: ColumnPrototype, operation: Operation) -> Self {
        Self {
            prototype,
            operation,
            cuf_id: None,
            label: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_cuf(mut self, cuf_id: i64) -> Self {
        self.cuf_id = Some(cuf_id);
        self
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.prototype.label)
    }
}

/// A restriction on a column, with its literal operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub prototype: ColumnPrototype,
    pub operation: Operation,
    pub values: Vec<String>,
    pub cuf_id: Option<i64>,
}

impl Filter {
    pub fn new(prototype: ColumnPrototype, operation: Operation, values: Vec<&str>) -> Self {
        Self {
            prototype,
            operation,
            values: values.into_iter().map(String::from).collect(),
            cuf_id: None,
        }
    }

    pub fn with_cuf(mut self, cuf_id: i64) -> Self {
        self.cuf_id = Some(cuf_id);
        self
    }

    /// Filters on the same column (and custom field) are ORed together.
    pub fn column_key(&self) -> (&str, Option<i64>) {
        (&self.prototype.label, self.cuf_id)
    }
}

macro_rules! impl_chart_column {
    ($($ty:ty),*) => {
        $(impl ChartColumn for $ty {
            fn prototype(&self) -> &ColumnPrototype {
                &self.prototype
            }
            fn operation(&self) -> Operation {
                self.operation
            }
            fn cuf_id(&self) -> Option<i64> {
                self.cuf_id
            }
        })*
    };
}

impl_chart_column!(AxisColumn, MeasureColumn, Filter);

/// A declarative chart query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryDefinition {
    pub axes: Vec<AxisColumn>,
    pub measures: Vec<MeasureColumn>,
    pub filters: Vec<Filter>,
    /// Restrictions on aggregated measures, compiled into HAVING.
    pub measure_filters: Vec<Filter>,
    pub join_style: JoinStyle,
}

impl QueryDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axis(mut self, axis: AxisColumn) -> Self {
        self.axes.push(axis);
        self
    }

    pub fn measure(mut self, measure: MeasureColumn) -> Self {
        self.measures.push(measure);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn measure_filter(mut self, filter: Filter) -> Self {
        self.measure_filters.push(filter);
        self
    }

    pub fn join_style(mut self, join_style: JoinStyle) -> Self {
        self.join_style = join_style;
        self
    }

    /// Entity the plan is rooted at: the first axis, else the first measure.
    ///
    /// Hidden satellites are only reachable from their owner, so a plan
    /// never starts from one.
    pub fn root_entity(&self) -> ChartResult<InternalEntityType> {
        let first = match (self.axes.first(), self.measures.first()) {
            (Some(axis), _) => axis.entity()?,
            (None, Some(measure)) => measure.entity()?,
            (None, None) => {
                return Err(ChartError::plan("chart query has neither axis nor measure"))
            }
        };
        Ok(first.owner().unwrap_or(first))
    }

    /// Entity of the first measure, falling back to the root. A satellite
    /// is replaced by its owner, as in [`Self::root_entity`].
    pub fn measured_entity(&self) -> ChartResult<InternalEntityType> {
        match self.measures.first() {
            Some(measure) => {
                let entity = measure.entity()?;
                Ok(entity.owner().unwrap_or(entity))
            }
            None => self.root_entity(),
        }
    }

    /// Every entity the compiled query must join.
    ///
    /// Inlined calculated columns bring the entities of their nested query;
    /// subquery columns only need their owner.
    pub fn target_entities(&self) -> ChartResult<BTreeSet<InternalEntityType>> {
        let mut targets = BTreeSet::new();
        for prototype in self.prototypes() {
            collect_entities(prototype, &mut targets)?;
        }
        Ok(targets)
    }

    /// Prototypes of all columns, in axes, measures, filters order.
    pub fn prototypes(&self) -> impl Iterator<Item = &ColumnPrototype> {
        self.axes
            .iter()
            .map(|c| &c.prototype)
            .chain(self.measures.iter().map(|c| &c.prototype))
            .chain(self.filters.iter().map(|c| &c.prototype))
            .chain(self.measure_filters.iter().map(|c| &c.prototype))
    }

    /// Projected column count: axes then measures.
    pub fn column_count(&self) -> usize {
        self.axes.len() + self.measures.len()
    }
}

fn collect_entities(
    prototype: &ColumnPrototype,
    targets: &mut BTreeSet<InternalEntityType>,
) -> ChartResult<()> {
    targets.insert(prototype.entity.internal()?);
    if let Some(calc) = prototype.calculation() {
        if calc.strategy == QueryStrategy::Inlined {
            for nested in calc.query.prototypes() {
                collect_entities(nested, targets)?;
            }
        }
    }
    Ok(())
}
