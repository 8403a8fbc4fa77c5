//! Collaborators the engine consumes but does not implement.
//!
//! All of them are synchronous and shared across requests, hence
//! `Send + Sync`. Callers wrap I/O-bound implementations with their own
//! timeouts.

use crate::domain::InternalEntityType;
use crate::engine::CompiledQuery;
use crate::error::ExecutionFailure;
use crate::scope::ScopeEntityType;
use crate::tuples::Tuple;

/// Decides whether the current user may see a scope reference.
pub trait AuthorizationOracle: Send + Sync {
    fn has_permission(&self, id: i64, entity_type: ScopeEntityType, action: &str) -> bool;
}

/// Runs compiled queries against the datastore.
pub trait QueryExecutor: Send + Sync {
    /// Rows in result order, one value per selected column.
    fn execute(&self, query: &CompiledQuery) -> Result<Vec<Tuple>, ExecutionFailure>;
}

/// Display label and colour of a stored code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLabel {
    pub label: String,
    pub colour: Option<String>,
}

/// Resolves info list item codes into labels.
pub trait LabelResolver: Send + Sync {
    fn resolve_label(&self, entity_type: InternalEntityType, code: &str) -> Option<ResolvedLabel>;
}

/// One option of a drop-down custom field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFieldOption {
    pub code: String,
    pub label: String,
    pub colour: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFieldMetadata {
    pub id: i64,
    pub label: String,
    pub options: Vec<CustomFieldOption>,
}

impl CustomFieldMetadata {
    pub fn option(&self, code: &str) -> Option<&CustomFieldOption> {
        self.options.iter().find(|o| o.code == code)
    }
}

/// Looks custom field definitions up by id.
pub trait CustomFieldCatalog: Send + Sync {
    fn find_by_id(&self, id: i64) -> Option<CustomFieldMetadata>;
}

/// Grants everything; for tools that compile without a user.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AuthorizationOracle for AllowAll {
    fn has_permission(&self, _id: i64, _entity_type: ScopeEntityType, _action: &str) -> bool {
        true
    }
}

/// Resolves nothing; codes are kept as stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLabels;

impl LabelResolver for NoLabels {
    fn resolve_label(&self, _entity_type: InternalEntityType, _code: &str) -> Option<ResolvedLabel> {
        None
    }
}

impl CustomFieldCatalog for NoLabels {
    fn find_by_id(&self, _id: i64) -> Option<CustomFieldMetadata> {
        None
    }
}
