use std::sync::Mutex;

use chartplan::config::Settings;
use chartplan::domain::ColumnCatalog;
use chartplan::engine::{ChartEngine, CompiledQuery};
use chartplan::error::{ChartError, ExecutionFailure};
use chartplan::query::{QueryDefinition, QueryRequest};
use chartplan::scope::{Scope, ScopeEntityType};
use chartplan::services::{
    AllowAll, CustomFieldCatalog, CustomFieldMetadata, CustomFieldOption, QueryExecutor,
};
use chartplan::sql::Dialect;
use chartplan::tuples::{Tuple, Value};

/// Returns canned rows and remembers the SQL it was given.
struct Recording {
    rows: Vec<Tuple>,
    seen: Mutex<Vec<String>>,
}

impl Recording {
    fn new(rows: Vec<Vec<Value>>) -> Self {
        Self {
            rows: rows.into_iter().map(Tuple::new).collect(),
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl QueryExecutor for Recording {
    fn execute(&self, query: &CompiledQuery) -> Result<Vec<Tuple>, ExecutionFailure> {
        self.seen.lock().unwrap().push(query.sql.clone());
        Ok(self.rows.clone())
    }
}

struct Failing;

impl QueryExecutor for Failing {
    fn execute(&self, _query: &CompiledQuery) -> Result<Vec<Tuple>, ExecutionFailure> {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "statement timeout");
        Err(ExecutionFailure::with_source("datastore unavailable", io))
    }
}

struct Priorities;

impl CustomFieldCatalog for Priorities {
    fn find_by_id(&self, id: i64) -> Option<CustomFieldMetadata> {
        (id == 12).then(|| CustomFieldMetadata {
            id,
            label: "Priority".into(),
            options: vec![
                CustomFieldOption {
                    code: "P1".into(),
                    label: "Blocker".into(),
                    colour: Some("#d62728".into()),
                },
                CustomFieldOption {
                    code: "P2".into(),
                    label: "Normal".into(),
                    colour: None,
                },
            ],
        })
    }
}

fn request(json: &str) -> QueryDefinition {
    QueryRequest::from_json(json)
        .unwrap()
        .resolve(ColumnCatalog::global())
        .unwrap()
}

#[test]
fn test_compile_and_run_custom_list_chart() {
    let def = request(
        r#"{
            "axes": [{ "column": "TEST_CASE_CUF_LIST", "cuf_id": 12 }],
            "measures": [{ "column": "TEST_CASE_ID", "operation": "COUNT", "label": "test cases" }]
        }"#,
    );
    let executor = Recording::new(vec![
        vec![Value::from("P1"), Value::Int(4)],
        vec![Value::from("P2"), Value::Int(9)],
    ]);
    let engine = ChartEngine::new(&AllowAll, &executor)
        .with_dialect(Dialect::Postgres)
        .with_custom_fields(&Priorities);

    let scope = Scope::new().with(ScopeEntityType::Project, 1);
    let series = engine.compile_and_run(&def, &scope).unwrap();

    assert_eq!(
        series.abscissa,
        vec![vec![Value::from("Blocker")], vec![Value::from("Normal")]]
    );
    assert_eq!(series.colours, vec!["#d62728", ""]);
    assert_eq!(series.series[0].label, "test cases");
    assert_eq!(series.series[0].values, vec![Value::Int(4), Value::Int(9)]);

    let seen = executor.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("\"cuf_test_case_12\".\"value\""));
    assert!(seen[0].contains("\"test_case\".\"project_id\" IN (1)"));
}

#[test]
fn test_execution_failure_is_wrapped() {
    let def = request(r#"{ "measures": [{ "column": "CAMPAIGN_ID", "operation": "COUNT" }] }"#);
    let engine = ChartEngine::new(&AllowAll, &Failing);

    let err = engine.compile_and_run(&def, &Scope::new()).unwrap_err();
    match err {
        ChartError::Execution(failure) => {
            assert_eq!(failure.message(), "datastore unavailable");
            assert!(std::error::Error::source(&failure).is_some());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_planning_errors_never_reach_the_executor() {
    let def = request(
        r#"{
            "axes": [{ "column": "CAMPAIGN_LABEL" }],
            "measures": [{ "column": "CAMPAIGN_LABEL", "operation": "AVG" }]
        }"#,
    );
    let executor = Recording::new(vec![]);
    let engine = ChartEngine::new(&AllowAll, &executor);

    let err = engine.compile_and_run(&def, &Scope::new()).unwrap_err();
    assert!(matches!(err, ChartError::UnsupportedOperation { .. }));
    assert!(executor.seen.lock().unwrap().is_empty());
}

#[test]
fn test_settings_drive_rendering() {
    let settings = Settings::from_toml(
        r#"
[sql]
dialect = "mysql"
schema = "squash"

[sql.tables]
campaign = "tm_campaign"
"#,
    )
    .unwrap();
    let def = request(
        r#"{
            "axes": [{ "column": "CAMPAIGN_LABEL" }],
            "measures": [{ "column": "CAMPAIGN_ID", "operation": "COUNT" }]
        }"#,
    );
    let executor = Recording::new(vec![]);
    let engine = ChartEngine::new(&AllowAll, &executor)
        .configure(&settings)
        .unwrap();

    let compiled = engine.compile(&def, &Scope::new()).unwrap();
    assert_eq!(compiled.dialect, Dialect::MySql);
    assert!(compiled.sql.contains("FROM `squash`.`tm_campaign` AS `campaign`"));
    assert!(compiled.sql.contains("COUNT(`campaign`.`cln_id`)"));
}
