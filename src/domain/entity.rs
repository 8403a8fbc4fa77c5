//! Entity kinds of the test-management model and their physical mapping.

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Persisted entity kinds a chart column can be declared on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Campaign,
    Iteration,
    ItemTestPlan,
    Execution,
    Issue,
    TestCase,
    RequirementVersionCoverage,
    RequirementVersion,
    Requirement,
    TestStep,
    InfoListItem,
    Milestone,
    User,
    AutomatedTest,
    AutomatedExecutionExtender,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Campaign => "CAMPAIGN",
            EntityType::Iteration => "ITERATION",
            EntityType::ItemTestPlan => "ITEM_TEST_PLAN",
            EntityType::Execution => "EXECUTION",
            EntityType::Issue => "ISSUE",
            EntityType::TestCase => "TEST_CASE",
            EntityType::RequirementVersionCoverage => "REQUIREMENT_VERSION_COVERAGE",
            EntityType::RequirementVersion => "REQUIREMENT_VERSION",
            EntityType::Requirement => "REQUIREMENT",
            EntityType::TestStep => "TEST_STEP",
            EntityType::InfoListItem => "INFO_LIST_ITEM",
            EntityType::Milestone => "MILESTONE",
            EntityType::User => "USER",
            EntityType::AutomatedTest => "AUTOMATED_TEST",
            EntityType::AutomatedExecutionExtender => "AUTOMATED_EXECUTION_EXTENDER",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Disambiguates entity kinds that are referenced from several owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityRole {
    TestCaseNature,
    TestCaseType,
    RequirementVersionCategory,
    TestCaseMilestone,
    RequirementVersionMilestone,
    CampaignMilestone,
    ItemTestPlanAssignedUser,
}

impl EntityRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityRole::TestCaseNature => "TEST_CASE_NATURE",
            EntityRole::TestCaseType => "TEST_CASE_TYPE",
            EntityRole::RequirementVersionCategory => "REQUIREMENT_VERSION_CATEGORY",
            EntityRole::TestCaseMilestone => "TEST_CASE_MILESTONE",
            EntityRole::RequirementVersionMilestone => "REQUIREMENT_VERSION_MILESTONE",
            EntityRole::CampaignMilestone => "CAMPAIGN_MILESTONE",
            EntityRole::ItemTestPlanAssignedUser => "ITEM_TEST_PLAN_ASSIGNED_USER",
        }
    }
}

impl std::fmt::Display for EntityRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An entity kind qualified by the role it plays for its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecializedEntityType {
    pub entity_type: EntityType,
    #[serde(default)]
    pub role: Option<EntityRole>,
}

impl SpecializedEntityType {
    pub const fn plain(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            role: None,
        }
    }

    pub const fn with_role(entity_type: EntityType, role: EntityRole) -> Self {
        Self {
            entity_type,
            role: Some(role),
        }
    }

    /// Resolve the graph node this type stands for.
    pub fn internal(&self) -> ChartResult<InternalEntityType> {
        InternalEntityType::from_specialized(*self)
    }
}

/// Nodes of the domain graph.
///
/// The first nine are visible entities; the rest are hidden satellites that
/// only exist through their owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InternalEntityType {
    Campaign,
    Iteration,
    ItemTestPlan,
    Execution,
    Issue,
    TestCase,
    RequirementVersionCoverage,
    RequirementVersion,
    Requirement,
    // hidden
    TestCaseStep,
    TestCaseNature,
    TestCaseType,
    RequirementVersionCategory,
    ItemTestPlanAssignedUser,
    TestCaseMilestone,
    RequirementVersionMilestone,
    CampaignMilestone,
    AutomatedTest,
    AutomatedExecutionExtender,
}

/// Physical table backing a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableMapping {
    pub table: &'static str,
    pub id_column: &'static str,
    pub alias: &'static str,
}

const fn mapping(table: &'static str, id_column: &'static str, alias: &'static str) -> TableMapping {
    TableMapping {
        table,
        id_column,
        alias,
    }
}

impl InternalEntityType {
    pub const ALL: [InternalEntityType; 19] = [
        InternalEntityType::Campaign,
        InternalEntityType::Iteration,
        InternalEntityType::ItemTestPlan,
        InternalEntityType::Execution,
        InternalEntityType::Issue,
        InternalEntityType::TestCase,
        InternalEntityType::RequirementVersionCoverage,
        InternalEntityType::RequirementVersion,
        InternalEntityType::Requirement,
        InternalEntityType::TestCaseStep,
        InternalEntityType::TestCaseNature,
        InternalEntityType::TestCaseType,
        InternalEntityType::RequirementVersionCategory,
        InternalEntityType::ItemTestPlanAssignedUser,
        InternalEntityType::TestCaseMilestone,
        InternalEntityType::RequirementVersionMilestone,
        InternalEntityType::CampaignMilestone,
        InternalEntityType::AutomatedTest,
        InternalEntityType::AutomatedExecutionExtender,
    ];

    /// Map a (type, role) pair to its graph node.
    pub fn from_specialized(specialized: SpecializedEntityType) -> ChartResult<Self> {
        use EntityRole as R;
        use EntityType as T;

        let internal = match (specialized.entity_type, specialized.role) {
            (T::Campaign, None) => Self::Campaign,
            (T::Iteration, None) => Self::Iteration,
            (T::ItemTestPlan, None) => Self::ItemTestPlan,
            (T::Execution, None) => Self::Execution,
            (T::Issue, None) => Self::Issue,
            (T::TestCase, None) => Self::TestCase,
            (T::RequirementVersionCoverage, None) => Self::RequirementVersionCoverage,
            (T::RequirementVersion, None) => Self::RequirementVersion,
            (T::Requirement, None) => Self::Requirement,
            (T::TestStep, None) => Self::TestCaseStep,
            (T::AutomatedTest, None) => Self::AutomatedTest,
            (T::AutomatedExecutionExtender, None) => Self::AutomatedExecutionExtender,
            (T::InfoListItem, Some(R::TestCaseNature)) => Self::TestCaseNature,
            (T::InfoListItem, Some(R::TestCaseType)) => Self::TestCaseType,
            (T::InfoListItem, Some(R::RequirementVersionCategory)) => {
                Self::RequirementVersionCategory
            }
            (T::Milestone, Some(R::TestCaseMilestone)) => Self::TestCaseMilestone,
            (T::Milestone, Some(R::RequirementVersionMilestone)) => {
                Self::RequirementVersionMilestone
            }
            (T::Milestone, Some(R::CampaignMilestone)) => Self::CampaignMilestone,
            (T::User, Some(R::ItemTestPlanAssignedUser)) => Self::ItemTestPlanAssignedUser,
            (entity_type, role) => return Err(ChartError::SchemaMapping { entity_type, role }),
        };
        Ok(internal)
    }

    /// Hidden satellites have no identity outside their owner.
    pub fn is_hidden(&self) -> bool {
        !matches!(
            self,
            Self::Campaign
                | Self::Iteration
                | Self::ItemTestPlan
                | Self::Execution
                | Self::Issue
                | Self::TestCase
                | Self::RequirementVersionCoverage
                | Self::RequirementVersion
                | Self::Requirement
        )
    }

    /// Visible entity a hidden satellite hangs off.
    pub fn owner(&self) -> Option<InternalEntityType> {
        match self {
            Self::TestCaseStep
            | Self::TestCaseNature
            | Self::TestCaseType
            | Self::TestCaseMilestone
            | Self::AutomatedTest => Some(Self::TestCase),
            Self::RequirementVersionCategory | Self::RequirementVersionMilestone => {
                Some(Self::RequirementVersion)
            }
            Self::CampaignMilestone => Some(Self::Campaign),
            Self::ItemTestPlanAssignedUser => Some(Self::ItemTestPlan),
            Self::AutomatedExecutionExtender => Some(Self::Execution),
            _ => None,
        }
    }

    pub fn table_mapping(&self) -> TableMapping {
        match self {
            Self::Campaign => mapping("campaign", "cln_id", "campaign"),
            Self::Iteration => mapping("iteration", "iteration_id", "iteration"),
            Self::ItemTestPlan => mapping("iteration_test_plan_item", "item_test_plan_id", "itp"),
            Self::Execution => mapping("execution", "execution_id", "execution"),
            Self::Issue => mapping("issue", "issue_id", "issue"),
            Self::TestCase => mapping("test_case", "tcln_id", "test_case"),
            Self::RequirementVersionCoverage => {
                mapping("requirement_version_coverage", "coverage_id", "coverage")
            }
            Self::RequirementVersion => mapping("requirement_version", "res_id", "req_version"),
            Self::Requirement => mapping("requirement", "rln_id", "requirement"),
            Self::TestCaseStep => mapping("test_case_steps", "step_id", "test_step"),
            Self::TestCaseNature => mapping("info_list_item", "item_id", "tc_nature"),
            Self::TestCaseType => mapping("info_list_item", "item_id", "tc_type"),
            Self::RequirementVersionCategory => {
                mapping("info_list_item", "item_id", "rv_category")
            }
            Self::ItemTestPlanAssignedUser => mapping("core_user", "party_id", "assigned_user"),
            Self::TestCaseMilestone => mapping("milestone", "milestone_id", "tc_milestone"),
            Self::RequirementVersionMilestone => {
                mapping("milestone", "milestone_id", "rv_milestone")
            }
            Self::CampaignMilestone => mapping("milestone", "milestone_id", "camp_milestone"),
            Self::AutomatedTest => mapping("automated_test", "test_id", "automated_test"),
            Self::AutomatedExecutionExtender => {
                mapping("automated_execution_extender", "extender_id", "auto_extender")
            }
        }
    }

    /// Value stored in `custom_field_value.bound_entity_type` for this entity.
    pub fn cuf_binding(&self) -> Option<&'static str> {
        match self {
            Self::TestCase => Some("TEST_CASE"),
            Self::RequirementVersion => Some("REQUIREMENT_VERSION"),
            Self::Campaign => Some("CAMPAIGN"),
            Self::Iteration => Some("ITERATION"),
            Self::Execution => Some("EXECUTION"),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Campaign => "CAMPAIGN",
            Self::Iteration => "ITERATION",
            Self::ItemTestPlan => "ITEM_TEST_PLAN",
            Self::Execution => "EXECUTION",
            Self::Issue => "ISSUE",
            Self::TestCase => "TEST_CASE",
            Self::RequirementVersionCoverage => "REQUIREMENT_VERSION_COVERAGE",
            Self::RequirementVersion => "REQUIREMENT_VERSION",
            Self::Requirement => "REQUIREMENT",
            Self::TestCaseStep => "TEST_CASE_STEP",
            Self::TestCaseNature => "TEST_CASE_NATURE",
            Self::TestCaseType => "TEST_CASE_TYPE",
            Self::RequirementVersionCategory => "REQUIREMENT_VERSION_CATEGORY",
            Self::ItemTestPlanAssignedUser => "ITEM_TEST_PLAN_ASSIGNED_USER",
            Self::TestCaseMilestone => "TEST_CASE_MILESTONE",
            Self::RequirementVersionMilestone => "REQUIREMENT_VERSION_MILESTONE",
            Self::CampaignMilestone => "CAMPAIGN_MILESTONE",
            Self::AutomatedTest => "AUTOMATED_TEST",
            Self::AutomatedExecutionExtender => "AUTOMATED_EXECUTION_EXTENDER",
        }
    }
}

impl std::fmt::Display for InternalEntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
