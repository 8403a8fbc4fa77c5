use chartplan::compiler::{QueryCompiler, TableNaming};
use chartplan::domain::{ColumnCatalog, DomainSchema, InternalEntityType, QueryStrategy};
use chartplan::error::{ChartError, ChartResult};
use chartplan::planner::QueryPlan;
use chartplan::query::{AxisColumn, Filter, MeasureColumn, Operation, QueryDefinition};
use chartplan::sql::{Dialect, Query};

fn axis(label: &str) -> AxisColumn {
    AxisColumn::new(ColumnCatalog::global().resolve(label).unwrap())
}

fn measure(label: &str, operation: Operation) -> MeasureColumn {
    MeasureColumn::new(ColumnCatalog::global().resolve(label).unwrap(), operation)
}

fn filter(label: &str, operation: Operation, values: Vec<&str>) -> Filter {
    Filter::new(ColumnCatalog::global().resolve(label).unwrap(), operation, values)
}

fn try_compile(def: &QueryDefinition) -> ChartResult<(QueryPlan, Query)> {
    let naming = TableNaming::new();
    QueryCompiler::new(DomainSchema::global(), &naming).compile(def)
}

fn sql(def: &QueryDefinition) -> String {
    try_compile(def).unwrap().1.to_sql(Dialect::Postgres)
}

#[test]
fn test_subquery_axis_is_grouped_by_alias() {
    let def = QueryDefinition::new()
        .axis(axis("CAMPAIGN_ITERCOUNT"))
        .measure(measure("CAMPAIGN_ID", Operation::Count));

    let (plan, query) = try_compile(&def).unwrap();
    // the nested entities stay inside the subquery
    assert_eq!(plan.len(), 1);

    let sql = query.to_sql(Dialect::Postgres);
    assert!(sql.contains(") AS \"col_0_0\""));
    assert!(sql.contains("GROUP BY \"col_0_0\""));
    assert!(sql.contains("ORDER BY \"col_0_0\" ASC"));
    assert!(sql.contains("FROM \"campaign\" AS \"campaign_1\""));
    assert!(sql.contains(
        "LEFT JOIN \"iteration\" AS \"iteration_1\" ON \"campaign_1\".\"cln_id\" = \"iteration_1\".\"campaign_id\""
    ));
    assert!(sql.contains("WHERE \"campaign_1\".\"cln_id\" = \"campaign\".\"cln_id\""));
}

#[test]
fn test_subquery_filter_becomes_exists() {
    let def = QueryDefinition::new()
        .axis(axis("ITEM_TEST_PLAN_STATUS"))
        .measure(measure("ITEM_TEST_PLAN_ID", Operation::Count))
        .filter(filter("ITEM_TEST_PLAN_EXECOUNT", Operation::Greater, vec!["2"]));

    let sql = sql(&def);
    assert!(sql.contains("WHERE EXISTS (SELECT"));
    assert!(sql.contains("\"itp_1\".\"item_test_plan_id\" = \"itp\".\"item_test_plan_id\""));
    assert!(sql.contains("HAVING COUNT(\"execution_1\".\"execution_id\") > 2"));
    // the outer query never joins executions
    assert!(!sql.contains("AS \"execution\""));
}

#[test]
fn test_existence_column_as_axis() {
    let def = QueryDefinition::new()
        .axis(axis("ITEM_TEST_PLAN_IS_EXECUTED"))
        .measure(measure("ITEM_TEST_PLAN_ID", Operation::Count));

    let sql = sql(&def);
    assert!(sql.contains("CASE WHEN COUNT(\"execution_1\".\"execution_id\") > 0 THEN true ELSE false END"));
    assert!(sql.contains("GROUP BY \"col_0_0\""));
}

#[test]
fn test_inlined_aggregate_measure() {
    let def = QueryDefinition::new()
        .axis(axis("EXECUTION_STATUS"))
        .measure(measure("EXECUTION_ISSUECOUNT", Operation::None));

    let (plan, query) = try_compile(&def).unwrap();
    assert!(plan.contains(InternalEntityType::Issue));

    let sql = query.to_sql(Dialect::Postgres);
    assert!(sql.contains("COUNT(\"issue\".\"issue_id\")"));
    assert!(sql.contains(
        "JOIN \"issue\" AS \"issue\" ON \"execution\".\"execution_id\" = \"issue\".\"execution_id\""
    ));
}

#[test]
fn test_inlined_aggregate_filter_lands_in_having() {
    let def = QueryDefinition::new()
        .axis(axis("EXECUTION_STATUS"))
        .measure(measure("EXECUTION_ID", Operation::Count))
        .filter(filter("EXECUTION_ISSUECOUNT", Operation::Greater, vec!["0"]));

    let sql = sql(&def);
    assert!(sql.contains("HAVING COUNT(\"issue\".\"issue_id\") > 0"));
    assert!(!sql.contains("WHERE"));
}

#[test]
fn test_inlined_aggregate_cannot_be_an_axis() {
    let def = QueryDefinition::new()
        .axis(axis("EXECUTION_ISSUECOUNT"))
        .measure(measure("EXECUTION_ID", Operation::Count));

    let err = try_compile(&def).unwrap_err();
    assert!(matches!(err, ChartError::UnsupportedOperation { .. }));
}

#[test]
fn test_aggregating_an_aggregate_is_unsupported() {
    let def = QueryDefinition::new()
        .axis(axis("EXECUTION_STATUS"))
        .measure(measure("EXECUTION_ISSUECOUNT", Operation::Sum));

    let err = try_compile(&def).unwrap_err();
    assert!(matches!(
        err,
        ChartError::UnsupportedOperation {
            operation: Operation::Sum,
            ..
        }
    ));
}

#[test]
fn test_inlined_value_column_joins_its_entities() {
    let def = QueryDefinition::new()
        .axis(axis("ITEM_TEST_PLAN_TC_IMPORTANCE"))
        .measure(measure("ITEM_TEST_PLAN_ID", Operation::Count));

    let sql = sql(&def);
    assert!(sql.contains("FROM \"iteration_test_plan_item\" AS \"itp\""));
    assert!(sql.contains(
        "INNER JOIN \"test_case\" AS \"test_case\" ON \"itp\".\"test_case_id\" = \"test_case\".\"tcln_id\""
    ));
    assert!(sql.contains("GROUP BY \"test_case\".\"importance\""));
}

#[test]
fn test_every_calculated_column_compiles() {
    for column in ColumnCatalog::global().iter() {
        let Some(calc) = column.calculation() else {
            continue;
        };
        let owner = AxisColumn::new(calc.query.axes[0].prototype.clone());
        let aggregating = calc.query.measures[0].operation.is_aggregate();

        let def = if calc.strategy == QueryStrategy::Inlined && aggregating {
            QueryDefinition::new()
                .axis(owner)
                .measure(MeasureColumn::new(column.clone(), Operation::None))
        } else if column.data_type.is_numeric() {
            QueryDefinition::new()
                .axis(owner)
                .measure(MeasureColumn::new(column.clone(), Operation::Max))
        } else {
            QueryDefinition::new()
                .axis(AxisColumn::new(column.clone()))
                .measure(MeasureColumn::new(owner.prototype, Operation::Count))
        };
        if let Err(e) = try_compile(&def) {
            panic!("{}: {e}", column.label);
        }
    }
}
