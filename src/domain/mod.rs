//! The static test-management domain: entity kinds, their relations and
//! the catalog of chartable columns.

mod catalog;
mod column;
mod edges;
mod entity;
mod graph;

pub use catalog::ColumnCatalog;
pub use column::{
    Calculation, ColumnPrototype, ColumnType, DataType, LevelKind, QueryStrategy,
    EXECUTION_STATUSES,
};
pub use edges::{Edge, JoinKind, Navigation, EDGES};
pub use entity::{EntityRole, EntityType, InternalEntityType, SpecializedEntityType, TableMapping};
pub use graph::DomainSchema;
