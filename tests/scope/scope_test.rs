use chartplan::compiler::{CompileContext, QueryCompiler, TableNaming};
use chartplan::domain::{ColumnCatalog, DomainSchema};
use chartplan::query::{AxisColumn, MeasureColumn, Operation, QueryDefinition};
use chartplan::scope::{Scope, ScopeCompiler, ScopeEntityType as S};
use chartplan::services::{AllowAll, AuthorizationOracle};
use chartplan::sql::{Dialect, Query};

/// Grants a fixed action on everything except the listed ids.
struct Oracle {
    action: &'static str,
    denied: Vec<i64>,
}

impl AuthorizationOracle for Oracle {
    fn has_permission(&self, id: i64, _entity_type: S, action: &str) -> bool {
        action == self.action && !self.denied.contains(&id)
    }
}

fn axis(label: &str) -> AxisColumn {
    AxisColumn::new(ColumnCatalog::global().resolve(label).unwrap())
}

fn count(label: &str) -> MeasureColumn {
    MeasureColumn::new(ColumnCatalog::global().resolve(label).unwrap(), Operation::Count)
}

fn restricted(def: &QueryDefinition, scope: &Scope, oracle: &dyn AuthorizationOracle) -> Query {
    let naming = TableNaming::new();
    let ctx = CompileContext::new(DomainSchema::global(), &naming);
    let (plan, query) = QueryCompiler::with_context(ctx).compile(def).unwrap();
    ScopeCompiler::new(ctx, ColumnCatalog::global(), oracle)
        .compile(def, &plan, query, scope)
        .unwrap()
}

fn test_case_status() -> QueryDefinition {
    QueryDefinition::new()
        .axis(axis("TEST_CASE_STATUS"))
        .measure(count("TEST_CASE_ID"))
}

#[test]
fn test_empty_scope_leaves_query_alone() {
    let def = test_case_status();
    let query = restricted(&def, &Scope::new(), &AllowAll);
    assert!(query.where_clause.is_none());
}

#[test]
fn test_project_on_a_read_family() {
    let def = test_case_status();
    let query = restricted(&def, &Scope::new().with(S::Project, 5), &AllowAll);

    assert!(query.joins.is_empty());
    let sql = query.to_sql(Dialect::Postgres);
    assert!(sql.contains("WHERE \"test_case\".\"project_id\" IN (5)"));
}

#[test]
fn test_folder_forces_a_join_through_coverage() {
    let def = QueryDefinition::new().measure(count("REQUIREMENT_ID"));
    let query = restricted(&def, &Scope::new().with(S::TestCaseFolder, 42), &AllowAll);

    let sql = query.to_sql(Dialect::Postgres);
    assert!(sql.contains("FROM \"requirement\" AS \"requirement\""));
    assert!(sql.contains(
        "INNER JOIN \"requirement_version\" AS \"req_version\" ON \"requirement\".\"rln_id\" = \"req_version\".\"requirement_id\""
    ));
    assert!(sql.contains("INNER JOIN \"requirement_version_coverage\" AS \"coverage\""));
    assert!(sql.contains(
        "INNER JOIN \"test_case\" AS \"test_case\" ON \"coverage\".\"verifying_test_case_id\" = \"test_case\".\"tcln_id\""
    ));
    assert!(sql.contains("WHERE EXISTS (SELECT"));
    assert!(sql.contains("\"tcln_relationship_closure\".\"ancestor_id\" IN (42)"));
    assert!(sql.contains(
        "\"tcln_relationship_closure\".\"descendant_id\" = \"test_case\".\"tcln_id\""
    ));
}

#[test]
fn test_library_restricts_through_projects() {
    let def = test_case_status();
    let query = restricted(&def, &Scope::new().with(S::TestCaseLibrary, 3), &AllowAll);

    let sql = query.to_sql(Dialect::Postgres);
    assert!(sql.contains("WHERE \"test_case\".\"project_id\" IN (SELECT"));
    assert!(sql.contains("FROM \"project\" AS \"project\""));
    assert!(sql.contains("\"project\".\"tcl_id\" IN (3)"));
}

#[test]
fn test_library_of_an_unread_family_is_ignored() {
    let def = test_case_status();
    let query = restricted(&def, &Scope::new().with(S::CampaignLibrary, 2), &AllowAll);

    assert!(query.where_clause.is_none());
    assert!(query.joins.is_empty());
}

#[test]
fn test_iteration_joins_the_campaign_side() {
    let def = test_case_status();
    let query = restricted(&def, &Scope::new().with(S::Iteration, 7), &AllowAll);

    let sql = query.to_sql(Dialect::Postgres);
    assert!(sql.contains("CROSS JOIN \"iteration_test_plan_item\" AS \"itp\""));
    assert!(sql.contains("INNER JOIN \"iteration\" AS \"iteration\""));
    assert!(sql.contains("\"iteration\".\"iteration_id\" IN (7)"));
    assert!(!sql.contains("\"campaign\""));
}

#[test]
fn test_families_are_anded() {
    let def = QueryDefinition::new()
        .axis(axis("CAMPAIGN_LABEL"))
        .measure(count("TEST_CASE_ID"));
    let query = restricted(&def, &Scope::new().with(S::Project, 5), &AllowAll);

    let sql = query.to_sql(Dialect::Postgres);
    assert!(sql.contains(
        "\"test_case\".\"project_id\" IN (5) AND \"campaign\".\"project_id\" IN (5)"
    ));
}

#[test]
fn test_alternatives_of_one_family_are_ored() {
    let def = test_case_status();
    let scope = Scope::new().with(S::Project, 5).with(S::TestCaseFolder, 42);
    let query = restricted(&def, &scope, &AllowAll);

    let sql = query.to_sql(Dialect::Postgres);
    assert!(sql.contains("WHERE (\"test_case\".\"project_id\" IN (5) OR EXISTS (SELECT"));
}

#[test]
fn test_denied_references_are_dropped() {
    let def = test_case_status();
    let oracle = Oracle {
        action: "READ",
        denied: vec![6],
    };
    let scope = Scope::new().with(S::Project, 5).with(S::Project, 6);
    let query = restricted(&def, &scope, &oracle);

    let sql = query.to_sql(Dialect::Postgres);
    assert!(sql.contains("\"test_case\".\"project_id\" IN (5)"));
    assert!(!sql.contains('6'));
}

#[test]
fn test_fully_denied_scope_matches_nothing() {
    let def = test_case_status();
    let oracle = Oracle {
        action: "READ",
        denied: vec![5],
    };
    let query = restricted(&def, &Scope::new().with(S::Project, 5), &oracle);

    assert!(query.to_sql(Dialect::Postgres).contains("WHERE false"));
    assert!(query.to_sql(Dialect::MySql).contains("WHERE 0"));
}

#[test]
fn test_permission_is_configurable() {
    let def = test_case_status();
    let oracle = Oracle {
        action: "EXPORT",
        denied: vec![],
    };
    let scope = Scope::new().with(S::Project, 5);

    let naming = TableNaming::new();
    let ctx = CompileContext::new(DomainSchema::global(), &naming);
    let (plan, query) = QueryCompiler::with_context(ctx).compile(&def).unwrap();
    let compiler = ScopeCompiler::new(ctx, ColumnCatalog::global(), &oracle);

    let read = compiler.compile(&def, &plan, query.clone(), &scope).unwrap();
    assert!(read.to_sql(Dialect::Postgres).contains("WHERE false"));

    let export = compiler
        .with_permission("EXPORT")
        .compile(&def, &plan, query, &scope)
        .unwrap();
    assert!(export.to_sql(Dialect::Postgres).contains("IN (5)"));
}
