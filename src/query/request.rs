//! Serialized chart query requests.
//!
//! Requests reference columns by catalog label and are resolved into a
//! [`QueryDefinition`] before planning:
//!
//! ```json
//! {
//!   "axes": [{ "column": "TEST_CASE_STATUS" }],
//!   "measures": [{ "column": "TEST_CASE_ID", "operation": "COUNT" }],
//!   "filters": [{ "column": "TEST_CASE_IMPORTANCE", "operation": "EQUALS", "values": ["HIGH"] }],
//!   "join_style": "INNER"
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::definition::{AxisColumn, Filter, JoinStyle, MeasureColumn, QueryDefinition};
use super::operation::Operation;
use crate::domain::ColumnCatalog;
use crate::error::ChartResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryRequest {
    pub axes: Vec<AxisRequest>,
    pub measures: Vec<MeasureRequest>,
    pub filters: Vec<FilterRequest>,
    pub measure_filters: Vec<FilterRequest>,
    pub join_style: JoinStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisRequest {
    pub column: String,
    #[serde(default)]
    pub operation: Operation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuf_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureRequest {
    pub column: String,
    pub operation: Operation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuf_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRequest {
    pub column: String,
    pub operation: Operation,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuf_id: Option<i64>,
}

impl QueryRequest {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Look every label up in `catalog` and build the definition.
    pub fn resolve(&self, catalog: &ColumnCatalog) -> ChartResult<QueryDefinition> {
        let mut definition = QueryDefinition::new().join_style(self.join_style);

        for axis in &self.axes {
            let mut column =
                AxisColumn::new(catalog.resolve(&axis.column)?).with_operation(axis.operation);
            column.cuf_id = axis.cuf_id;
            definition = definition.axis(column);
        }

        for measure in &self.measures {
            let mut column = MeasureColumn::new(catalog.resolve(&measure.column)?, measure.operation);
            column.cuf_id = measure.cuf_id;
            column.label = measure.label.clone();
            definition = definition.measure(column);
        }

        for filter in &self.filters {
            definition = definition.filter(filter.resolve(catalog)?);
        }

        for filter in &self.measure_filters {
            definition = definition.measure_filter(filter.resolve(catalog)?);
        }

        Ok(definition)
    }
}

impl FilterRequest {
    fn resolve(&self, catalog: &ColumnCatalog) -> ChartResult<Filter> {
        Ok(Filter {
            prototype: catalog.resolve(&self.column)?,
            operation: self.operation,
            values: self.values.clone(),
            cuf_id: self.cuf_id,
        })
    }
}
