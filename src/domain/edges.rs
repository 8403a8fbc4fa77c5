//! Navigable relations between graph nodes.
//!
//! The table below is the single source of truth for joins. Two-way relations
//! are declared once per direction; satellites hang off their owner.

use super::entity::InternalEntityType as E;

/// How an edge is turned into SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    /// Mapped association: emitted as an inner or left join.
    Natural,
    /// No association from this side: the destination is cross joined and
    /// narrowed by `dest.fk = src.id`.
    Where,
}

/// Physical columns an edge navigates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Navigation {
    /// `src.source_column = dest.dest_column`
    ForeignKey {
        source_column: &'static str,
        dest_column: &'static str,
    },
    /// `src.<id> = link.source_key` then `link.dest_key = dest.<id>`
    LinkTable {
        table: &'static str,
        source_key: &'static str,
        dest_key: &'static str,
    },
}

/// A directed, navigable relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub src: E,
    pub dest: E,
    pub attribute: &'static str,
    pub join_kind: JoinKind,
    pub navigation: Navigation,
}

const fn fk(
    src: E,
    dest: E,
    attribute: &'static str,
    source_column: &'static str,
    dest_column: &'static str,
) -> Edge {
    Edge {
        src,
        dest,
        attribute,
        join_kind: JoinKind::Natural,
        navigation: Navigation::ForeignKey {
            source_column,
            dest_column,
        },
    }
}

const fn reversed(
    src: E,
    dest: E,
    attribute: &'static str,
    source_column: &'static str,
    dest_column: &'static str,
) -> Edge {
    Edge {
        src,
        dest,
        attribute,
        join_kind: JoinKind::Where,
        navigation: Navigation::ForeignKey {
            source_column,
            dest_column,
        },
    }
}

const fn link(
    src: E,
    dest: E,
    attribute: &'static str,
    table: &'static str,
    source_key: &'static str,
    dest_key: &'static str,
) -> Edge {
    Edge {
        src,
        dest,
        attribute,
        join_kind: JoinKind::Natural,
        navigation: Navigation::LinkTable {
            table,
            source_key,
            dest_key,
        },
    }
}

pub const EDGES: &[Edge] = &[
    // campaign workspace
    fk(E::Campaign, E::Iteration, "iterations", "cln_id", "campaign_id"),
    fk(E::Iteration, E::Campaign, "campaign", "campaign_id", "cln_id"),
    fk(E::Iteration, E::ItemTestPlan, "testPlans", "iteration_id", "iteration_id"),
    fk(E::ItemTestPlan, E::Iteration, "iteration", "iteration_id", "iteration_id"),
    fk(E::ItemTestPlan, E::Execution, "executions", "item_test_plan_id", "item_test_plan_id"),
    fk(E::Execution, E::ItemTestPlan, "testPlan", "item_test_plan_id", "item_test_plan_id"),
    fk(E::Execution, E::Issue, "issues", "execution_id", "execution_id"),
    fk(E::Issue, E::Execution, "execution", "execution_id", "execution_id"),
    // campaign <-> test case workspace
    fk(E::ItemTestPlan, E::TestCase, "referencedTestCase", "test_case_id", "tcln_id"),
    reversed(E::TestCase, E::ItemTestPlan, "referencedTestCase", "tcln_id", "test_case_id"),
    // test case <-> requirement workspace
    fk(E::TestCase, E::RequirementVersionCoverage, "requirementVersionCoverages", "tcln_id", "verifying_test_case_id"),
    fk(E::RequirementVersionCoverage, E::TestCase, "verifyingTestCase", "verifying_test_case_id", "tcln_id"),
    fk(E::RequirementVersionCoverage, E::RequirementVersion, "verifiedRequirementVersion", "verified_req_version_id", "res_id"),
    fk(E::RequirementVersion, E::RequirementVersionCoverage, "requirementVersionCoverages", "res_id", "verified_req_version_id"),
    fk(E::RequirementVersion, E::Requirement, "requirement", "requirement_id", "rln_id"),
    fk(E::Requirement, E::RequirementVersion, "versions", "rln_id", "requirement_id"),
    // satellites
    fk(E::TestCase, E::TestCaseStep, "steps", "tcln_id", "test_case_id"),
    fk(E::TestCase, E::TestCaseNature, "nature", "tc_nature", "item_id"),
    fk(E::TestCase, E::TestCaseType, "type", "tc_type", "item_id"),
    link(E::TestCase, E::TestCaseMilestone, "milestones", "milestone_test_case", "test_case_id", "milestone_id"),
    fk(E::TestCase, E::AutomatedTest, "automatedTest", "automated_test_id", "test_id"),
    fk(E::RequirementVersion, E::RequirementVersionCategory, "category", "category", "item_id"),
    link(E::RequirementVersion, E::RequirementVersionMilestone, "milestones", "milestone_req_version", "req_version_id", "milestone_id"),
    link(E::Campaign, E::CampaignMilestone, "milestones", "milestone_campaign", "campaign_id", "milestone_id"),
    fk(E::ItemTestPlan, E::ItemTestPlanAssignedUser, "user", "user_id", "party_id"),
    reversed(E::Execution, E::AutomatedExecutionExtender, "automatedExecutionExtender", "execution_id", "master_execution_id"),
    fk(E::AutomatedExecutionExtender, E::Execution, "execution", "master_execution_id", "execution_id"),
];
