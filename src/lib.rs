//! # chartplan
//!
//! Plans and compiles declarative chart queries over a test-management
//! domain model into multi-dialect SQL, then shapes the rows into series.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │       QueryDefinition (axes, measures, filters)          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [planner]
//! ┌─────────────────────────────────────────────────────────┐
//! │      QueryPlan (BFS tree over the DomainSchema graph)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compiler + scope]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Query AST, rendered for the configured dialect    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [QueryExecutor, tuples]
//! ┌─────────────────────────────────────────────────────────┐
//! │              ChartSeries (abscissa, series)              │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod compiler;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod planner;
pub mod query;
pub mod scope;
pub mod services;
pub mod sql;
pub mod tuples;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::domain::{ColumnCatalog, DataType, DomainSchema, InternalEntityType};
    pub use crate::engine::{ChartEngine, CompiledQuery};
    pub use crate::error::{ChartError, ChartResult, ExecutionFailure};
    pub use crate::planner::{QueryPlan, QueryPlanBuilder};
    pub use crate::query::{
        AxisColumn, Filter, JoinStyle, MeasureColumn, Operation, QueryDefinition, QueryRequest,
    };
    pub use crate::scope::{Scope, ScopeEntityType, ScopeReference};
    pub use crate::services::{
        AuthorizationOracle, CustomFieldCatalog, LabelResolver, QueryExecutor,
    };
    pub use crate::sql::Dialect;
    pub use crate::tuples::{ChartSeries, Tuple, Value};
}

pub use engine::ChartEngine;
pub use error::{ChartError, ChartResult};
