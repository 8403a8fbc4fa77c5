//! Splices visibility restrictions into a compiled query.
//!
//! Entities fall into three families, each rooted at the node that carries
//! the project and library hierarchy:
//!
//! | family      | root        | library column | closure table                |
//! |-------------|-------------|----------------|------------------------------|
//! | test case   | TEST_CASE   | `tcl_id`       | `tcln_relationship_closure`  |
//! | requirement | REQUIREMENT | `rl_id`        | `rln_relationship_closure`   |
//! | campaign    | CAMPAIGN    | `cl_id`        | `cln_relationship_closure`   |
//!
//! Project and library references restrict only the families the query
//! already reads. Folder, node and iteration references narrow the query on
//! purpose and force their family to be joined.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use super::{Scope, ScopeEntityType, ScopeReference};
use crate::compiler::{CompileContext, JoinCompiler};
use crate::domain::{ColumnCatalog, InternalEntityType};
use crate::error::ChartResult;
use crate::planner::{QueryPlan, QueryPlanBuilder};
use crate::query::{JoinStyle, MeasureColumn, Operation, QueryDefinition};
use crate::services::AuthorizationOracle;
use crate::sql::{
    conjunction, disjunction, exists, lit_bool, lit_int, table_col, Expr, ExprExt, Query,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Family {
    TestCase,
    Requirement,
    Campaign,
}

impl Family {
    fn of(entity: InternalEntityType) -> Option<Family> {
        use InternalEntityType as E;
        match entity {
            E::TestCase
            | E::TestCaseStep
            | E::TestCaseNature
            | E::TestCaseType
            | E::TestCaseMilestone
            | E::AutomatedTest => Some(Family::TestCase),
            E::RequirementVersion
            | E::Requirement
            | E::RequirementVersionCategory
            | E::RequirementVersionMilestone => Some(Family::Requirement),
            E::Campaign
            | E::Iteration
            | E::ItemTestPlan
            | E::Execution
            | E::Issue
            | E::ItemTestPlanAssignedUser
            | E::CampaignMilestone
            | E::AutomatedExecutionExtender => Some(Family::Campaign),
            E::RequirementVersionCoverage => None,
        }
    }

    fn root(&self) -> InternalEntityType {
        match self {
            Family::TestCase => InternalEntityType::TestCase,
            Family::Requirement => InternalEntityType::Requirement,
            Family::Campaign => InternalEntityType::Campaign,
        }
    }

    /// Catalog column whose projection forces a join to the root.
    fn root_column(&self) -> &'static str {
        match self {
            Family::TestCase => "TEST_CASE_ID",
            Family::Requirement => "REQUIREMENT_ID",
            Family::Campaign => "CAMPAIGN_ID",
        }
    }

    fn library_column(&self) -> &'static str {
        match self {
            Family::TestCase => "tcl_id",
            Family::Requirement => "rl_id",
            Family::Campaign => "cl_id",
        }
    }

    fn closure_table(&self) -> &'static str {
        match self {
            Family::TestCase => "tcln_relationship_closure",
            Family::Requirement => "rln_relationship_closure",
            Family::Campaign => "cln_relationship_closure",
        }
    }
}

/// How a reference kind restricts the query.
enum Reach {
    /// Every family the query reads.
    Projects,
    /// The family, if the query reads it.
    Library(Family),
    /// The family, joined if needed.
    Nodes(Family),
    Iterations,
}

impl Reach {
    fn of(entity_type: ScopeEntityType) -> Reach {
        use ScopeEntityType as S;
        match entity_type {
            S::Project => Reach::Projects,
            S::TestCaseLibrary => Reach::Library(Family::TestCase),
            S::RequirementLibrary => Reach::Library(Family::Requirement),
            S::CampaignLibrary => Reach::Library(Family::Campaign),
            S::TestCaseFolder | S::TestCase => Reach::Nodes(Family::TestCase),
            S::RequirementFolder | S::Requirement => Reach::Nodes(Family::Requirement),
            S::CampaignFolder | S::Campaign => Reach::Nodes(Family::Campaign),
            S::Iteration => Reach::Iterations,
        }
    }
}

#[derive(Debug, Default)]
struct Restriction {
    projects: Vec<i64>,
    libraries: Vec<i64>,
    nodes: Vec<i64>,
    iterations: Vec<i64>,
}

pub struct ScopeCompiler<'a> {
    ctx: CompileContext<'a>,
    catalog: &'a ColumnCatalog,
    oracle: &'a dyn AuthorizationOracle,
    permission: &'a str,
}

impl<'a> ScopeCompiler<'a> {
    pub fn new(
        ctx: CompileContext<'a>,
        catalog: &'a ColumnCatalog,
        oracle: &'a dyn AuthorizationOracle,
    ) -> Self {
        Self {
            ctx,
            catalog,
            oracle,
            permission: "READ",
        }
    }

    /// Action checked against the oracle for every reference.
    pub fn with_permission(mut self, permission: &'a str) -> Self {
        self.permission = permission;
        self
    }

    /// Restrict `query`, compiled from `definition` along `plan`, to `scope`.
    pub fn compile(
        &self,
        definition: &QueryDefinition,
        plan: &QueryPlan,
        query: Query,
        scope: &Scope,
    ) -> ChartResult<Query> {
        if scope.is_empty() {
            return Ok(query);
        }

        let permitted: Vec<&ScopeReference> = scope
            .iter()
            .filter(|r| {
                let allowed = self
                    .oracle
                    .has_permission(r.id, r.entity_type, self.permission);
                if !allowed {
                    debug!(reference = %r, permission = self.permission, "dropping scope reference");
                }
                allowed
            })
            .collect();

        if permitted.is_empty() {
            warn!(
                references = scope.len(),
                "no scope reference is readable, chart will be empty"
            );
            return Ok(query.filter(lit_bool(false)));
        }

        let read: BTreeSet<Family> = plan.entities().filter_map(Family::of).collect();
        let restrictions = collect_restrictions(&permitted, &read);
        if restrictions.is_empty() {
            return Ok(query);
        }

        let query = self.force_joins(definition, plan, query, &restrictions)?;

        let predicates = restrictions
            .iter()
            .filter_map(|(family, restriction)| self.family_predicate(*family, restriction))
            .collect();
        Ok(match conjunction(predicates) {
            Some(predicate) => query.filter(predicate),
            None => query,
        })
    }

    /// Join the entities the predicates test but the query does not read.
    fn force_joins(
        &self,
        definition: &QueryDefinition,
        plan: &QueryPlan,
        query: Query,
        restrictions: &BTreeMap<Family, Restriction>,
    ) -> ChartResult<Query> {
        let mut needed = Vec::new();
        for (family, restriction) in restrictions {
            let tests_root = !restriction.projects.is_empty()
                || !restriction.libraries.is_empty()
                || !restriction.nodes.is_empty();
            if tests_root && !plan.contains(family.root()) {
                needed.push(family.root_column());
            }
            if !restriction.iterations.is_empty() && !plan.contains(InternalEntityType::Iteration) {
                needed.push("ITERATION_ID");
            }
        }
        if needed.is_empty() {
            return Ok(query);
        }

        let mut synthetic = QueryDefinition::new().join_style(JoinStyle::Inner);
        synthetic.axes = definition.axes.clone();
        for label in &needed {
            synthetic = synthetic.measure(MeasureColumn::new(
                self.catalog.resolve(label)?,
                Operation::Count,
            ));
        }

        let mut targets = synthetic.target_entities()?;
        targets.extend(plan.entities());
        let extension = QueryPlanBuilder::new(self.ctx.schema).build_from(plan.root(), &targets)?;
        debug!(columns = ?needed, plan = %extension, "forcing scope joins");

        JoinCompiler::new(self.ctx).compile(&synthetic, &extension, query)
    }

    fn family_predicate(&self, family: Family, restriction: &Restriction) -> Option<Expr> {
        let root = family.root();
        let mut alternatives = Vec::new();

        if !restriction.projects.is_empty() {
            alternatives.push(
                self.ctx
                    .column(root, "project_id")
                    .in_list(ids(&restriction.projects)),
            );
        }

        if !restriction.libraries.is_empty() {
            let projects = Query::new()
                .select(vec![table_col("project", "project_id")])
                .from(self.ctx.naming.table_ref("project", "project"))
                .filter(
                    table_col("project", family.library_column())
                        .in_list(ids(&restriction.libraries)),
                );
            alternatives.push(self.ctx.column(root, "project_id").in_subquery(projects));
        }

        if !restriction.nodes.is_empty() {
            let closure = family.closure_table();
            let path = Query::new()
                .select(vec![lit_int(1)])
                .from(self.ctx.naming.table_ref(closure, closure))
                .filter(
                    table_col(closure, "ancestor_id")
                        .in_list(ids(&restriction.nodes))
                        .and(table_col(closure, "descendant_id").eq(self.ctx.id(root))),
                );
            alternatives.push(exists(path));
        }

        if !restriction.iterations.is_empty() {
            alternatives.push(
                self.ctx
                    .id(InternalEntityType::Iteration)
                    .in_list(ids(&restriction.iterations)),
            );
        }

        disjunction(alternatives)
    }
}

fn collect_restrictions(
    permitted: &[&ScopeReference],
    read: &BTreeSet<Family>,
) -> BTreeMap<Family, Restriction> {
    let mut restrictions: BTreeMap<Family, Restriction> = BTreeMap::new();
    for reference in permitted {
        match Reach::of(reference.entity_type) {
            Reach::Projects => {
                for family in read {
                    restrictions.entry(*family).or_default().projects.push(reference.id);
                }
            }
            Reach::Library(family) => {
                if read.contains(&family) {
                    restrictions.entry(family).or_default().libraries.push(reference.id);
                }
            }
            Reach::Nodes(family) => {
                restrictions.entry(family).or_default().nodes.push(reference.id);
            }
            Reach::Iterations => {
                restrictions
                    .entry(Family::Campaign)
                    .or_default()
                    .iterations
                    .push(reference.id);
            }
        }
    }
    restrictions
}

fn ids(values: &[i64]) -> Vec<Expr> {
    values.iter().map(|id| lit_int(*id)).collect()
}
