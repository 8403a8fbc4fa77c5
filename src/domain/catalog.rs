//! Built-in column catalog, keyed by label.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::column::{ColumnPrototype, DataType, LevelKind, QueryStrategy};
use super::entity::{EntityRole, EntityType, SpecializedEntityType};
use crate::error::{ChartError, ChartResult};
use crate::query::{AxisColumn, JoinStyle, MeasureColumn, Operation, QueryDefinition};

static CATALOG: LazyLock<ColumnCatalog> = LazyLock::new(ColumnCatalog::builtin);

/// Label-indexed set of column prototypes, in declaration order.
#[derive(Debug, Default)]
pub struct ColumnCatalog {
    columns: Vec<ColumnPrototype>,
    by_label: HashMap<String, usize>,
}

impl ColumnCatalog {
    pub fn global() -> &'static ColumnCatalog {
        &CATALOG
    }

    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prototype, replacing any previous one with the same label.
    pub fn add(&mut self, prototype: ColumnPrototype) {
        match self.by_label.get(&prototype.label) {
            Some(&idx) => self.columns[idx] = prototype,
            None => {
                self.by_label
                    .insert(prototype.label.clone(), self.columns.len());
                self.columns.push(prototype);
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&ColumnPrototype> {
        self.by_label.get(label).map(|&idx| &self.columns[idx])
    }

    /// Owned copy of a prototype, or a configuration error naming the label.
    pub fn resolve(&self, label: &str) -> ChartResult<ColumnPrototype> {
        self.get(label)
            .cloned()
            .ok_or_else(|| ChartError::plan(format!("unknown column '{label}'")))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnPrototype> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn builtin() -> Self {
        let mut catalog = ColumnCatalog::new();
        add_attributes(&mut catalog);
        add_custom_fields(&mut catalog);
        add_calculated(&mut catalog);
        catalog
    }
}

fn plain(entity_type: EntityType) -> SpecializedEntityType {
    SpecializedEntityType::plain(entity_type)
}

fn role(entity_type: EntityType, role: EntityRole) -> SpecializedEntityType {
    SpecializedEntityType::with_role(entity_type, role)
}

fn add_attributes(catalog: &mut ColumnCatalog) {
    use DataType as D;
    use EntityType as T;

    let attributes: &[(&str, SpecializedEntityType, DataType, &str)] = &[
        // campaign
        ("CAMPAIGN_ID", plain(T::Campaign), D::Numeric, "cln_id"),
        ("CAMPAIGN_REFERENCE", plain(T::Campaign), D::String, "reference"),
        ("CAMPAIGN_LABEL", plain(T::Campaign), D::String, "name"),
        ("CAMPAIGN_SCHED_START", plain(T::Campaign), D::Date, "scheduled_start_date"),
        ("CAMPAIGN_SCHED_END", plain(T::Campaign), D::Date, "scheduled_end_date"),
        ("CAMPAIGN_ACTUAL_START", plain(T::Campaign), D::Date, "actual_start_date"),
        ("CAMPAIGN_ACTUAL_END", plain(T::Campaign), D::Date, "actual_end_date"),
        // iteration
        ("ITERATION_ID", plain(T::Iteration), D::Numeric, "iteration_id"),
        ("ITERATION_REFERENCE", plain(T::Iteration), D::String, "reference"),
        ("ITERATION_LABEL", plain(T::Iteration), D::String, "name"),
        ("ITERATION_SCHED_START", plain(T::Iteration), D::Date, "scheduled_start_date"),
        ("ITERATION_SCHED_END", plain(T::Iteration), D::Date, "scheduled_end_date"),
        ("ITERATION_ACTUAL_START", plain(T::Iteration), D::Date, "actual_start_date"),
        ("ITERATION_ACTUAL_END", plain(T::Iteration), D::Date, "actual_end_date"),
        // iteration test plan item
        ("ITEM_TEST_PLAN_ID", plain(T::ItemTestPlan), D::Numeric, "item_test_plan_id"),
        ("ITEM_TEST_PLAN_LABEL", plain(T::ItemTestPlan), D::String, "label"),
        ("ITEM_TEST_PLAN_STATUS", plain(T::ItemTestPlan), D::ExecutionStatus, "execution_status"),
        ("ITEM_TEST_PLAN_LASTEXECON", plain(T::ItemTestPlan), D::Date, "last_executed_on"),
        // execution
        ("EXECUTION_ID", plain(T::Execution), D::Numeric, "execution_id"),
        ("EXECUTION_LABEL", plain(T::Execution), D::String, "name"),
        ("EXECUTION_STATUS", plain(T::Execution), D::ExecutionStatus, "execution_status"),
        ("EXECUTION_MODE", plain(T::Execution), D::String, "execution_mode"),
        ("EXECUTION_LASTEXECON", plain(T::Execution), D::Date, "last_executed_on"),
        // issue
        ("ISSUE_ID", plain(T::Issue), D::Numeric, "issue_id"),
        ("ISSUE_REMOTE_ID", plain(T::Issue), D::String, "remote_issue_id"),
        // test case
        ("TEST_CASE_ID", plain(T::TestCase), D::Numeric, "tcln_id"),
        ("TEST_CASE_REFERENCE", plain(T::TestCase), D::String, "reference"),
        ("TEST_CASE_LABEL", plain(T::TestCase), D::String, "name"),
        ("TEST_CASE_IMPORTANCE", plain(T::TestCase), D::Level(LevelKind::TestCaseImportance), "importance"),
        ("TEST_CASE_STATUS", plain(T::TestCase), D::Level(LevelKind::TestCaseStatus), "tc_status"),
        ("TEST_CASE_EXECUTION_MODE", plain(T::TestCase), D::String, "execution_mode"),
        ("TEST_CASE_CREATED_ON", plain(T::TestCase), D::Date, "created_on"),
        ("TEST_CASE_MODIFIED_ON", plain(T::TestCase), D::Date, "last_modified_on"),
        ("TEST_CASE_NATURE", role(T::InfoListItem, EntityRole::TestCaseNature), D::InfoListItem, "code"),
        ("TEST_CASE_TYPE", role(T::InfoListItem, EntityRole::TestCaseType), D::InfoListItem, "code"),
        ("TEST_CASE_MILESTONE_ID", role(T::Milestone, EntityRole::TestCaseMilestone), D::Numeric, "milestone_id"),
        ("TEST_CASE_MILESTONE_LABEL", role(T::Milestone, EntityRole::TestCaseMilestone), D::String, "label"),
        ("TEST_CASE_MILESTONE_END_DATE", role(T::Milestone, EntityRole::TestCaseMilestone), D::Date, "end_date"),
        ("TEST_STEP_ID", plain(T::TestStep), D::Numeric, "step_id"),
        ("AUTOMATED_TEST_ID", plain(T::AutomatedTest), D::Numeric, "test_id"),
        // coverage
        ("REQUIREMENT_VERSION_COVERAGE_ID", plain(T::RequirementVersionCoverage), D::Numeric, "coverage_id"),
        // requirement version
        ("REQUIREMENT_VERSION_ID", plain(T::RequirementVersion), D::Numeric, "res_id"),
        ("REQUIREMENT_VERSION_REFERENCE", plain(T::RequirementVersion), D::String, "reference"),
        ("REQUIREMENT_VERSION_NAME", plain(T::RequirementVersion), D::String, "name"),
        ("REQUIREMENT_VERSION_CRITICALITY", plain(T::RequirementVersion), D::Level(LevelKind::RequirementCriticality), "criticality"),
        ("REQUIREMENT_VERSION_STATUS", plain(T::RequirementVersion), D::Level(LevelKind::RequirementStatus), "requirement_status"),
        ("REQUIREMENT_VERSION_VERS_NUM", plain(T::RequirementVersion), D::Numeric, "version_number"),
        ("REQUIREMENT_VERSION_CREATED_ON", plain(T::RequirementVersion), D::Date, "created_on"),
        ("REQUIREMENT_VERSION_CATEGORY", role(T::InfoListItem, EntityRole::RequirementVersionCategory), D::InfoListItem, "code"),
        ("REQUIREMENT_VERSION_MILESTONE_ID", role(T::Milestone, EntityRole::RequirementVersionMilestone), D::Numeric, "milestone_id"),
        ("REQUIREMENT_VERSION_MILESTONE_LABEL", role(T::Milestone, EntityRole::RequirementVersionMilestone), D::String, "label"),
        // requirement
        ("REQUIREMENT_ID", plain(T::Requirement), D::Numeric, "rln_id"),
        // satellites of the campaign workspace
        ("CAMPAIGN_MILESTONE_ID", role(T::Milestone, EntityRole::CampaignMilestone), D::Numeric, "milestone_id"),
        ("CAMPAIGN_MILESTONE_LABEL", role(T::Milestone, EntityRole::CampaignMilestone), D::String, "label"),
        ("ITEM_TEST_PLAN_TESTER", role(T::User, EntityRole::ItemTestPlanAssignedUser), D::String, "login"),
        ("AUTOMATED_EXECUTION_EXTENDER_ID", plain(T::AutomatedExecutionExtender), D::Numeric, "extender_id"),
    ];

    for (label, entity, data_type, attribute) in attributes {
        catalog.add(ColumnPrototype::attribute(
            label, *entity, *data_type, attribute,
        ));
    }
}

fn add_custom_fields(catalog: &mut ColumnCatalog) {
    let owners = [
        (EntityType::TestCase, "TEST_CASE"),
        (EntityType::RequirementVersion, "REQUIREMENT_VERSION"),
        (EntityType::Campaign, "CAMPAIGN"),
        (EntityType::Iteration, "ITERATION"),
        (EntityType::Execution, "EXECUTION"),
    ];
    let kinds = [
        ("TEXT", DataType::String),
        ("NUMERIC", DataType::Numeric),
        ("DATE", DataType::DateAsString),
        ("CHECKBOX", DataType::BooleanAsString),
        ("LIST", DataType::List),
        ("TAG", DataType::Tag),
    ];
    for (entity_type, prefix) in owners {
        for (suffix, data_type) in kinds {
            let label = format!("{prefix}_CUF_{suffix}");
            catalog.add(ColumnPrototype::custom_field(&label, entity_type, data_type));
        }
    }
}

/// `axis(owner id) + measure(operation on counted column)` nested query.
fn per_owner(
    catalog: &ColumnCatalog,
    owner_id: &str,
    counted: &str,
    operation: Operation,
) -> Option<QueryDefinition> {
    let owner_id = catalog.get(owner_id)?.clone();
    let counted = catalog.get(counted)?.clone();
    Some(
        QueryDefinition::new()
            .axis(AxisColumn::new(owner_id))
            .measure(MeasureColumn::new(counted, operation))
            .join_style(JoinStyle::Left),
    )
}

fn add_calculated(catalog: &mut ColumnCatalog) {
    use DataType as D;
    use EntityType as T;
    use Operation as Op;
    use QueryStrategy::{Inlined, Subquery};

    let calculated: &[(&str, EntityType, DataType, QueryStrategy, &str, &str, Operation)] = &[
        ("CAMPAIGN_ITERCOUNT", T::Campaign, D::Numeric, Subquery, "CAMPAIGN_ID", "ITERATION_ID", Op::Count),
        ("CAMPAIGN_MILCOUNT", T::Campaign, D::Numeric, Subquery, "CAMPAIGN_ID", "CAMPAIGN_MILESTONE_ID", Op::Count),
        ("ITERATION_ITPCOUNT", T::Iteration, D::Numeric, Subquery, "ITERATION_ID", "ITEM_TEST_PLAN_ID", Op::Count),
        ("ITEM_TEST_PLAN_IS_EXECUTED", T::ItemTestPlan, D::Boolean, Subquery, "ITEM_TEST_PLAN_ID", "EXECUTION_ID", Op::Exists),
        ("ITEM_TEST_PLAN_EXECOUNT", T::ItemTestPlan, D::Numeric, Subquery, "ITEM_TEST_PLAN_ID", "EXECUTION_ID", Op::Count),
        ("ITEM_TEST_PLAN_TC_IMPORTANCE", T::ItemTestPlan, D::Level(LevelKind::TestCaseImportance), Inlined, "ITEM_TEST_PLAN_ID", "TEST_CASE_IMPORTANCE", Op::None),
        ("EXECUTION_ISSUECOUNT", T::Execution, D::Numeric, Inlined, "EXECUTION_ID", "ISSUE_ID", Op::Count),
        ("EXECUTION_ISAUTO", T::Execution, D::Boolean, Subquery, "EXECUTION_ID", "AUTOMATED_EXECUTION_EXTENDER_ID", Op::Exists),
        ("TEST_CASE_STEPCOUNT", T::TestCase, D::Numeric, Subquery, "TEST_CASE_ID", "TEST_STEP_ID", Op::Count),
        ("TEST_CASE_VERSCOUNT", T::TestCase, D::Numeric, Subquery, "TEST_CASE_ID", "REQUIREMENT_VERSION_COVERAGE_ID", Op::Count),
        ("TEST_CASE_MILCOUNT", T::TestCase, D::Numeric, Subquery, "TEST_CASE_ID", "TEST_CASE_MILESTONE_ID", Op::Count),
        ("TEST_CASE_ITERCOUNT", T::TestCase, D::Numeric, Subquery, "TEST_CASE_ID", "ITERATION_ID", Op::CountDistinct),
        ("TEST_CASE_EXECOUNT", T::TestCase, D::Numeric, Subquery, "TEST_CASE_ID", "EXECUTION_ID", Op::Count),
        ("TEST_CASE_HASAUTOSCRIPT", T::TestCase, D::Boolean, Subquery, "TEST_CASE_ID", "AUTOMATED_TEST_ID", Op::Exists),
        ("REQUIREMENT_VERSION_TCCOUNT", T::RequirementVersion, D::Numeric, Subquery, "REQUIREMENT_VERSION_ID", "REQUIREMENT_VERSION_COVERAGE_ID", Op::Count),
        ("REQUIREMENT_VERSION_MILCOUNT", T::RequirementVersion, D::Numeric, Subquery, "REQUIREMENT_VERSION_ID", "REQUIREMENT_VERSION_MILESTONE_ID", Op::Count),
        ("REQUIREMENT_NB_VERSIONS", T::Requirement, D::Numeric, Subquery, "REQUIREMENT_ID", "REQUIREMENT_VERSION_ID", Op::Count),
    ];

    for (label, owner, data_type, strategy, owner_id, counted, operation) in calculated {
        let Some(query) = per_owner(catalog, owner_id, counted, *operation) else {
            tracing::warn!(
                label,
                owner_id,
                counted,
                "skipping calculated column with unknown base column"
            );
            continue;
        };
        catalog.add(ColumnPrototype::calculated(
            label,
            plain(*owner),
            *data_type,
            *strategy,
            query,
        ));
    }
}
