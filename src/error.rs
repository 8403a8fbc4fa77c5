//! Error types shared by every compilation stage.
//!
//! Planning and compilation failures are raised synchronously and carried
//! up to the caller with `?`; nothing is retried.

use crate::domain::{EntityRole, EntityType};
use crate::query::Operation;

/// Result type for chart query operations.
pub type ChartResult<T> = Result<T, ChartError>;

/// Errors raised while planning, compiling or running a chart query.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    /// A (type, role) pair has no node in the domain graph.
    #[error("no domain entity for {entity_type} with role {}", role.map(|r| r.to_string()).unwrap_or_else(|| "<none>".into()))]
    SchemaMapping {
        entity_type: EntityType,
        role: Option<EntityRole>,
    },

    /// The definition cannot be turned into a valid query.
    #[error("invalid chart query: {0}")]
    PlanConfiguration(String),

    /// The operation makes no sense for the column it is applied to.
    #[error("operation {operation} is not supported for {context}")]
    UnsupportedOperation {
        operation: Operation,
        context: String,
    },

    /// The external executor rejected or failed the compiled query.
    #[error(transparent)]
    Execution(#[from] ExecutionFailure),
}

impl ChartError {
    pub fn plan(message: impl Into<String>) -> Self {
        ChartError::PlanConfiguration(message.into())
    }

    pub fn unsupported(operation: Operation, context: impl Into<String>) -> Self {
        ChartError::UnsupportedOperation {
            operation,
            context: context.into(),
        }
    }
}

/// Failure reported by a [`QueryExecutor`](crate::services::QueryExecutor).
#[derive(Debug, thiserror::Error)]
#[error("chart query execution failed: {message}")]
pub struct ExecutionFailure {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ExecutionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a driver error.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
