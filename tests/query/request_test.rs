use chartplan::domain::ColumnCatalog;
use chartplan::error::ChartError;
use chartplan::query::{JoinStyle, Operation, QueryRequest};

#[test]
fn test_full_request_resolves() {
    let request = QueryRequest::from_json(
        r#"{
            "axes": [
                { "column": "EXECUTION_LASTEXECON", "operation": "BY_MONTH" },
                { "column": "EXECUTION_CUF_TAG", "cuf_id": 4 }
            ],
            "measures": [{ "column": "EXECUTION_ID", "operation": "COUNT_DISTINCT" }],
            "filters": [
                { "column": "EXECUTION_STATUS", "operation": "IN", "values": ["FAILURE", "BLOCKED"] }
            ],
            "measure_filters": [
                { "column": "EXECUTION_ID", "operation": "GREATER", "values": ["10"] }
            ],
            "join_style": "LEFT"
        }"#,
    )
    .unwrap();

    let def = request.resolve(ColumnCatalog::global()).unwrap();
    assert_eq!(def.axes.len(), 2);
    assert_eq!(def.axes[0].operation, Operation::ByMonth);
    assert_eq!(def.axes[1].cuf_id, Some(4));
    assert_eq!(def.measures[0].operation, Operation::CountDistinct);
    assert_eq!(def.filters[0].values, vec!["FAILURE", "BLOCKED"]);
    assert_eq!(def.measure_filters.len(), 1);
    assert_eq!(def.join_style, JoinStyle::Left);
}

#[test]
fn test_unknown_column_is_a_plan_error() {
    let request = QueryRequest::from_json(r#"{ "axes": [{ "column": "NOPE" }] }"#).unwrap();
    let err = request.resolve(ColumnCatalog::global()).unwrap_err();

    assert!(matches!(err, ChartError::PlanConfiguration(_)));
    assert_eq!(err.to_string(), "invalid chart query: unknown column 'NOPE'");
}

#[test]
fn test_unknown_operation_is_rejected_by_the_parser() {
    assert!(QueryRequest::from_json(
        r#"{ "measures": [{ "column": "EXECUTION_ID", "operation": "MEDIAN" }] }"#
    )
    .is_err());
}
