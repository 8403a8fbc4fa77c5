//! Query planning: which entities to join, from which root, along which edges.

mod builder;
mod plan;

pub use builder::QueryPlanBuilder;
pub use plan::{PlanNode, QueryPlan};
