//! Declarative chart queries and their JSON request form.

mod definition;
mod operation;
mod request;

pub use definition::{AxisColumn, ChartColumn, Filter, JoinStyle, MeasureColumn, QueryDefinition};
pub use operation::Operation;
pub use request::{AxisRequest, FilterRequest, MeasureRequest, QueryRequest};
