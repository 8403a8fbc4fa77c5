//! Visibility scopes: the projects, libraries and nodes a chart may read.

mod compiler;

pub use compiler::ScopeCompiler;

use serde::{Deserialize, Serialize};

/// Kinds of entity a scope can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScopeEntityType {
    Project,
    TestCaseLibrary,
    TestCaseFolder,
    TestCase,
    RequirementLibrary,
    RequirementFolder,
    Requirement,
    CampaignLibrary,
    CampaignFolder,
    Campaign,
    Iteration,
}

impl ScopeEntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeEntityType::Project => "PROJECT",
            ScopeEntityType::TestCaseLibrary => "TEST_CASE_LIBRARY",
            ScopeEntityType::TestCaseFolder => "TEST_CASE_FOLDER",
            ScopeEntityType::TestCase => "TEST_CASE",
            ScopeEntityType::RequirementLibrary => "REQUIREMENT_LIBRARY",
            ScopeEntityType::RequirementFolder => "REQUIREMENT_FOLDER",
            ScopeEntityType::Requirement => "REQUIREMENT",
            ScopeEntityType::CampaignLibrary => "CAMPAIGN_LIBRARY",
            ScopeEntityType::CampaignFolder => "CAMPAIGN_FOLDER",
            ScopeEntityType::Campaign => "CAMPAIGN",
            ScopeEntityType::Iteration => "ITERATION",
        }
    }
}

impl std::fmt::Display for ScopeEntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `(type, id)` pair, serialized as `{"type": "PROJECT", "id": 5}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeReference {
    #[serde(rename = "type")]
    pub entity_type: ScopeEntityType,
    pub id: i64,
}

impl ScopeReference {
    pub fn new(entity_type: ScopeEntityType, id: i64) -> Self {
        Self { entity_type, id }
    }
}

impl std::fmt::Display for ScopeReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.id)
    }
}

/// References a chart is restricted to. Empty means unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope {
    references: Vec<ScopeReference>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, entity_type: ScopeEntityType, id: i64) -> Self {
        self.references.push(ScopeReference::new(entity_type, id));
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScopeReference> {
        self.references.iter()
    }
}

impl FromIterator<ScopeReference> for Scope {
    fn from_iter<I: IntoIterator<Item = ScopeReference>>(iter: I) -> Self {
        Self {
            references: iter.into_iter().collect(),
        }
    }
}
