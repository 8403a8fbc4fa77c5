use chartplan::domain::{ColumnCatalog, InternalEntityType};
use chartplan::query::{AxisColumn, MeasureColumn, Operation, QueryDefinition};
use chartplan::services::{LabelResolver, NoLabels, ResolvedLabel};
use chartplan::tuples::{Tuple, TupleProcessor, Value};

fn axis(label: &str) -> AxisColumn {
    AxisColumn::new(ColumnCatalog::global().resolve(label).unwrap())
}

fn count(label: &str) -> MeasureColumn {
    MeasureColumn::new(ColumnCatalog::global().resolve(label).unwrap(), Operation::Count)
}

fn rows(values: Vec<Vec<Value>>) -> Vec<Tuple> {
    values.into_iter().map(Tuple::new).collect()
}

fn text(s: &str) -> Value {
    Value::from(s)
}

#[test]
fn test_execution_statuses_follow_business_order() {
    let def = QueryDefinition::new()
        .axis(axis("EXECUTION_STATUS"))
        .measure(count("EXECUTION_ID"));
    let input = rows(vec![
        vec![text("NOT_RUN"), Value::Int(1)],
        vec![text("READY"), Value::Int(2)],
        vec![text("BLOCKED"), Value::Int(3)],
        vec![text("SUCCESS"), Value::Int(4)],
    ]);

    let out = TupleProcessor::new(&NoLabels, &NoLabels)
        .process(&def, input)
        .unwrap();
    assert_eq!(
        out.abscissa,
        vec![
            vec![text("READY")],
            vec![text("SUCCESS")],
            vec![text("BLOCKED")],
            vec![text("NOT_RUN")],
        ]
    );
    assert_eq!(
        out.series[0].values,
        vec![Value::Int(2), Value::Int(4), Value::Int(3), Value::Int(1)]
    );
}

#[test]
fn test_first_axis_is_primary_key() {
    let def = QueryDefinition::new()
        .axis(axis("TEST_CASE_IMPORTANCE"))
        .axis(axis("TEST_CASE_STATUS"))
        .measure(count("TEST_CASE_ID"));
    let input = rows(vec![
        vec![text("LOW"), text("APPROVED"), Value::Int(1)],
        vec![text("VERY_HIGH"), text("OBSOLETE"), Value::Int(2)],
        vec![Value::Null, text("APPROVED"), Value::Int(3)],
        vec![text("VERY_HIGH"), text("WORK_IN_PROGRESS"), Value::Int(4)],
    ]);

    let out = TupleProcessor::new(&NoLabels, &NoLabels)
        .process(&def, input)
        .unwrap();
    let order: Vec<Value> = out.series[0].values.clone();
    assert_eq!(
        order,
        vec![Value::Int(3), Value::Int(4), Value::Int(2), Value::Int(1)]
    );
}

#[test]
fn test_nullness_axis_sorts_false_first() {
    let def = QueryDefinition::new()
        .axis(axis("EXECUTION_LASTEXECON").with_operation(Operation::IsNull))
        .measure(count("EXECUTION_ID"));
    let input = rows(vec![
        vec![Value::Bool(true), Value::Int(7)],
        vec![Value::Bool(false), Value::Int(3)],
    ]);

    let out = TupleProcessor::new(&NoLabels, &NoLabels)
        .process(&def, input)
        .unwrap();
    assert_eq!(
        out.abscissa,
        vec![vec![Value::Bool(false)], vec![Value::Bool(true)]]
    );
}

struct Categories;

impl LabelResolver for Categories {
    fn resolve_label(&self, entity_type: InternalEntityType, code: &str) -> Option<ResolvedLabel> {
        if entity_type != InternalEntityType::RequirementVersionCategory {
            return None;
        }
        match code {
            "CAT_FUNCTIONAL" => Some(ResolvedLabel {
                label: "Functional".into(),
                colour: Some("#1f77b4".into()),
            }),
            "CAT_SECURITY" => Some(ResolvedLabel {
                label: "Security".into(),
                colour: None,
            }),
            _ => None,
        }
    }
}

#[test]
fn test_single_axis_labels_and_colours() {
    let def = QueryDefinition::new()
        .axis(axis("REQUIREMENT_VERSION_CATEGORY"))
        .measure(count("REQUIREMENT_VERSION_ID").with_label("versions"));
    let input = rows(vec![
        vec![text("CAT_FUNCTIONAL"), Value::Int(5)],
        vec![text("CAT_SECURITY"), Value::Int(2)],
        vec![Value::Null, Value::Int(1)],
    ]);

    let out = TupleProcessor::new(&Categories, &NoLabels)
        .process(&def, input)
        .unwrap();
    assert_eq!(
        out.abscissa,
        vec![vec![text("Functional")], vec![text("Security")], vec![Value::Null]]
    );
    assert_eq!(out.colours, vec!["#1f77b4", "", ""]);
    assert_eq!(out.series[0].label, "versions");
}

#[test]
fn test_extra_values_are_ignored_but_missing_ones_fail() {
    let def = QueryDefinition::new()
        .axis(axis("CAMPAIGN_LABEL"))
        .measure(count("ITERATION_ID"));

    let wide = rows(vec![vec![text("C"), Value::Int(1), Value::Int(99)]]);
    let out = TupleProcessor::new(&NoLabels, &NoLabels)
        .process(&def, wide)
        .unwrap();
    assert_eq!(out.series.len(), 1);
    assert_eq!(out.series[0].values, vec![Value::Int(1)]);

    let short = rows(vec![vec![text("C")]]);
    assert!(TupleProcessor::new(&NoLabels, &NoLabels)
        .process(&def, short)
        .is_err());
}
