use std::collections::{BTreeSet, HashSet};

use chartplan::domain::{ColumnCatalog, DomainSchema, InternalEntityType as E, JoinKind};
use chartplan::error::ChartError;
use chartplan::planner::QueryPlanBuilder;
use chartplan::query::{AxisColumn, JoinStyle, MeasureColumn, Operation, QueryDefinition};

fn axis(label: &str) -> AxisColumn {
    AxisColumn::new(ColumnCatalog::global().resolve(label).unwrap())
}

fn count(label: &str) -> MeasureColumn {
    MeasureColumn::new(ColumnCatalog::global().resolve(label).unwrap(), Operation::Count)
}

fn builder() -> QueryPlanBuilder<'static> {
    QueryPlanBuilder::new(DomainSchema::global())
}

#[test]
fn test_single_entity_plan() {
    let def = QueryDefinition::new()
        .axis(axis("TEST_CASE_STATUS"))
        .measure(count("TEST_CASE_ID"));

    let plan = builder().build(&def).unwrap();
    assert_eq!(plan.root(), E::TestCase);
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.traverse().count(), 0);
}

#[test]
fn test_targets_appear_once_without_cycles() {
    let schema = DomainSchema::global();
    let roots = [E::Campaign, E::TestCase, E::Requirement, E::Execution];
    let all: Vec<E> = E::ALL.to_vec();

    for root in roots {
        let targets: BTreeSet<E> = all
            .iter()
            .copied()
            .filter(|t| schema.is_reachable(root, *t))
            .collect();
        let plan = builder().build_from(root, &targets).unwrap();

        let entities: Vec<E> = plan.entities().collect();
        let unique: HashSet<E> = entities.iter().copied().collect();
        assert_eq!(entities.len(), unique.len(), "duplicate node from {root}");
        for target in &targets {
            assert!(plan.contains(*target), "{target} missing from {root}");
        }
        // a tree over n nodes has n - 1 edges
        assert_eq!(plan.traverse().count(), plan.len() - 1);
    }
}

#[test]
fn test_trim_keeps_support_nodes_and_drops_dead_branches() {
    let targets = BTreeSet::from([E::Campaign, E::Execution]);
    let plan = builder().build_from(E::Campaign, &targets).unwrap();

    let entities: BTreeSet<E> = plan.entities().collect();
    assert_eq!(
        entities,
        BTreeSet::from([E::Campaign, E::Iteration, E::ItemTestPlan, E::Execution])
    );
    assert!(!plan.contains(E::Issue));
    assert!(!plan.contains(E::TestCase));
}

#[test]
fn test_left_join_reroots_at_measured_entity() {
    let def = QueryDefinition::new()
        .axis(axis("TEST_CASE_IMPORTANCE"))
        .measure(count("ITEM_TEST_PLAN_ID"))
        .join_style(JoinStyle::Left);

    let plan = builder().build(&def).unwrap();
    assert!(plan.is_reversed());
    assert_eq!(plan.root(), E::ItemTestPlan);
    assert!(plan.traverse().all(|e| e.join_kind == JoinKind::Natural));
    assert!(plan.to_string().starts_with("reversed plan\n"));
}

#[test]
fn test_left_join_on_satellite_measure_reroots_at_owner() {
    let def = QueryDefinition::new()
        .axis(axis("TEST_CASE_STATUS"))
        .measure(count("ITEM_TEST_PLAN_TESTER"))
        .join_style(JoinStyle::Left);

    assert_eq!(def.measured_entity().unwrap(), E::ItemTestPlan);

    let plan = builder().build(&def).unwrap();
    assert!(plan.is_reversed());
    assert_eq!(plan.root(), E::ItemTestPlan);
    assert!(plan.contains(E::TestCase));
    assert!(plan.contains(E::ItemTestPlanAssignedUser));
    assert!(!plan.has_where_edge());
}

#[test]
fn test_inner_join_keeps_where_edge() {
    let def = QueryDefinition::new()
        .axis(axis("TEST_CASE_IMPORTANCE"))
        .measure(count("ITEM_TEST_PLAN_ID"));

    let plan = builder().build(&def).unwrap();
    assert!(!plan.is_reversed());
    assert_eq!(plan.root(), E::TestCase);
    assert!(plan.has_where_edge());
}

#[test]
fn test_unreachable_target_is_a_plan_error() {
    let targets = BTreeSet::from([E::TestCaseNature, E::Campaign]);
    let err = builder().build_from(E::TestCaseNature, &targets).unwrap_err();

    assert!(matches!(err, ChartError::PlanConfiguration(_)));
    assert!(err.to_string().contains("cannot be reached from"));
}

#[test]
fn test_empty_definition_has_no_root() {
    let err = builder().build(&QueryDefinition::new()).unwrap_err();
    assert!(matches!(err, ChartError::PlanConfiguration(_)));
}
