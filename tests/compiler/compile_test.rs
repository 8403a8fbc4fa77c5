use chartplan::compiler::{QueryCompiler, TableNaming};
use chartplan::domain::{ColumnCatalog, DomainSchema};
use chartplan::error::ChartError;
use chartplan::query::{AxisColumn, Filter, JoinStyle, MeasureColumn, Operation, QueryDefinition};
use chartplan::sql::Dialect;
use insta::assert_snapshot;

fn axis(label: &str) -> AxisColumn {
    AxisColumn::new(ColumnCatalog::global().resolve(label).unwrap())
}

fn measure(label: &str, operation: Operation) -> MeasureColumn {
    MeasureColumn::new(ColumnCatalog::global().resolve(label).unwrap(), operation)
}

fn filter(label: &str, operation: Operation, values: Vec<&str>) -> Filter {
    Filter::new(ColumnCatalog::global().resolve(label).unwrap(), operation, values)
}

fn compile(def: &QueryDefinition, dialect: Dialect) -> String {
    let naming = TableNaming::new();
    let (_, query) = QueryCompiler::new(DomainSchema::global(), &naming)
        .compile(def)
        .unwrap();
    query.to_sql(dialect)
}

fn compile_err(def: &QueryDefinition) -> ChartError {
    let naming = TableNaming::new();
    QueryCompiler::new(DomainSchema::global(), &naming)
        .compile(def)
        .unwrap_err()
}

#[test]
fn test_status_count_on_a_single_table() {
    let def = QueryDefinition::new()
        .axis(axis("TEST_CASE_STATUS"))
        .measure(measure("TEST_CASE_ID", Operation::Count));

    assert_snapshot!(compile(&def, Dialect::Postgres), @r#"
    SELECT
      "test_case"."tc_status",
      COUNT("test_case"."tcln_id")
    FROM "test_case" AS "test_case"
    GROUP BY "test_case"."tc_status"
    ORDER BY "test_case"."tc_status" ASC
    "#);
}

#[test]
fn test_projection_is_axes_then_measures() {
    let def = QueryDefinition::new()
        .axis(axis("CAMPAIGN_LABEL"))
        .axis(axis("EXECUTION_STATUS"))
        .measure(measure("EXECUTION_ID", Operation::Count))
        .measure(measure("ITERATION_ID", Operation::CountDistinct));

    let naming = TableNaming::new();
    let (plan, query) = QueryCompiler::new(DomainSchema::global(), &naming)
        .compile(&def)
        .unwrap();
    assert_eq!(query.select.len(), def.column_count());
    assert_eq!(query.group_by.len(), 2);
    assert_eq!(plan.len(), 4);

    let sql = query.to_sql(Dialect::Postgres);
    let campaign = sql.find("\"campaign\".\"name\"").unwrap();
    let status = sql.find("\"execution\".\"execution_status\"").unwrap();
    let distinct = sql.find("COUNT(DISTINCT \"iteration\".\"iteration_id\")").unwrap();
    assert!(campaign < status && status < distinct);
}

#[test]
fn test_natural_joins_follow_the_plan() {
    let def = QueryDefinition::new()
        .axis(axis("CAMPAIGN_LABEL"))
        .measure(measure("EXECUTION_ID", Operation::Count));

    let sql = compile(&def, Dialect::Postgres);
    assert!(sql.contains("FROM \"campaign\" AS \"campaign\""));
    assert!(sql.contains(
        "INNER JOIN \"iteration\" AS \"iteration\" ON \"campaign\".\"cln_id\" = \"iteration\".\"campaign_id\""
    ));
    assert!(sql.contains(
        "INNER JOIN \"execution\" AS \"execution\" ON \"itp\".\"item_test_plan_id\" = \"execution\".\"item_test_plan_id\""
    ));
    assert!(!sql.contains("\"issue\""));
}

#[test]
fn test_left_style_renders_left_joins() {
    let def = QueryDefinition::new()
        .axis(axis("CAMPAIGN_LABEL"))
        .measure(measure("ITERATION_ID", Operation::Count))
        .join_style(JoinStyle::Left);

    let sql = compile(&def, Dialect::Postgres);
    assert!(sql.contains("LEFT JOIN \"iteration\" AS \"iteration\""));
    assert!(!sql.contains("INNER JOIN"));
}

#[test]
fn test_where_edge_is_a_cross_join_with_predicate() {
    let def = QueryDefinition::new()
        .axis(axis("TEST_CASE_IMPORTANCE"))
        .measure(measure("ITEM_TEST_PLAN_ID", Operation::Count));

    let sql = compile(&def, Dialect::Postgres);
    assert!(sql.contains("FROM \"test_case\" AS \"test_case\""));
    assert!(sql.contains("CROSS JOIN \"iteration_test_plan_item\" AS \"itp\""));
    assert!(sql.contains("WHERE \"itp\".\"test_case_id\" = \"test_case\".\"tcln_id\""));
}

#[test]
fn test_left_where_plan_is_rerooted() {
    let def = QueryDefinition::new()
        .axis(axis("TEST_CASE_IMPORTANCE"))
        .measure(measure("ITEM_TEST_PLAN_ID", Operation::Count))
        .join_style(JoinStyle::Left);

    let sql = compile(&def, Dialect::Postgres);
    assert!(sql.contains("FROM \"iteration_test_plan_item\" AS \"itp\""));
    assert!(sql.contains(
        "LEFT JOIN \"test_case\" AS \"test_case\" ON \"itp\".\"test_case_id\" = \"test_case\".\"tcln_id\""
    ));
    assert!(!sql.contains("CROSS JOIN"));
}

#[test]
fn test_same_column_filters_are_ored() {
    let def = QueryDefinition::new()
        .axis(axis("TEST_CASE_STATUS"))
        .measure(measure("TEST_CASE_ID", Operation::Count))
        .filter(filter("TEST_CASE_STATUS", Operation::Equals, vec!["APPROVED"]))
        .filter(filter("TEST_CASE_STATUS", Operation::Equals, vec!["OBSOLETE"]));

    let sql = compile(&def, Dialect::Postgres);
    assert!(sql.contains(
        "WHERE (\"test_case\".\"tc_status\" = 'APPROVED' OR \"test_case\".\"tc_status\" = 'OBSOLETE')"
    ));
}

#[test]
fn test_different_column_filters_are_anded() {
    let def = QueryDefinition::new()
        .axis(axis("TEST_CASE_STATUS"))
        .measure(measure("TEST_CASE_ID", Operation::Count))
        .filter(filter("TEST_CASE_STATUS", Operation::Equals, vec!["APPROVED"]))
        .filter(filter("TEST_CASE_NATURE", Operation::Equals, vec!["NAT_FUNC"]));

    let sql = compile(&def, Dialect::Postgres);
    assert!(sql.contains(
        "WHERE \"test_case\".\"tc_status\" = 'APPROVED' AND \"tc_nature\".\"code\" = 'NAT_FUNC'"
    ));
    assert!(sql.contains("INNER JOIN \"info_list_item\" AS \"tc_nature\""));
}

#[test]
fn test_in_between_and_like_filters() {
    let def = QueryDefinition::new()
        .axis(axis("CAMPAIGN_LABEL"))
        .measure(measure("CAMPAIGN_ID", Operation::Count))
        .filter(filter("CAMPAIGN_REFERENCE", Operation::In, vec!["A", "B"]))
        .filter(filter(
            "CAMPAIGN_SCHED_START",
            Operation::Between,
            vec!["2024-01-01", "2024-06-30"],
        ))
        .filter(filter("CAMPAIGN_LABEL", Operation::Like, vec!["50%_off"]));

    let sql = compile(&def, Dialect::Postgres);
    assert!(sql.contains("\"campaign\".\"reference\" IN ('A', 'B')"));
    assert!(sql.contains("BETWEEN DATE '2024-01-01' AND DATE '2024-06-30'"));
    assert!(sql.contains("LIKE '%50!%!_off%' ESCAPE '!'"));
}

#[test]
fn test_date_buckets_per_dialect() {
    let def = QueryDefinition::new()
        .axis(axis("EXECUTION_LASTEXECON").with_operation(Operation::ByYear))
        .measure(measure("EXECUTION_ID", Operation::Count));

    assert!(compile(&def, Dialect::Postgres)
        .contains("DATE_PART('year', \"execution\".\"last_executed_on\")"));
    assert!(compile(&def, Dialect::MySql).contains("YEAR(`execution`.`last_executed_on`)"));
}

#[test]
fn test_measure_filter_lands_in_having() {
    let def = QueryDefinition::new()
        .axis(axis("CAMPAIGN_LABEL"))
        .measure(measure("ITERATION_ID", Operation::Count))
        .measure_filter(filter("ITERATION_ID", Operation::Greater, vec!["3"]));

    let sql = compile(&def, Dialect::Postgres);
    assert!(sql.contains("HAVING COUNT(\"iteration\".\"iteration_id\") > 3"));
}

#[test]
fn test_measure_filter_on_unselected_measure() {
    let def = QueryDefinition::new()
        .axis(axis("CAMPAIGN_LABEL"))
        .measure(measure("ITERATION_ID", Operation::Count))
        .measure_filter(filter("CAMPAIGN_ID", Operation::Greater, vec!["3"]));

    let err = compile_err(&def);
    assert!(matches!(err, ChartError::PlanConfiguration(_)));
}

#[test]
fn test_sum_of_text_is_unsupported() {
    let def = QueryDefinition::new()
        .axis(axis("CAMPAIGN_REFERENCE"))
        .measure(measure("CAMPAIGN_LABEL", Operation::Sum));

    let err = compile_err(&def);
    assert!(matches!(
        err,
        ChartError::UnsupportedOperation {
            operation: Operation::Sum,
            ..
        }
    ));
}

#[test]
fn test_custom_field_axis() {
    let def = QueryDefinition::new()
        .axis(axis("CAMPAIGN_CUF_TEXT").with_cuf(3))
        .measure(measure("CAMPAIGN_ID", Operation::Count));

    let sql = compile(&def, Dialect::Postgres);
    assert!(sql.contains("CROSS JOIN \"custom_field_value\" AS \"cuf_campaign_3\""));
    assert!(sql.contains("\"cuf_campaign_3\".\"bound_entity_type\" = 'CAMPAIGN'"));
    assert!(sql.contains("\"cuf_campaign_3\".\"cf_id\" = 3"));
    assert!(sql.contains("GROUP BY \"cuf_campaign_3\".\"value\""));
}
