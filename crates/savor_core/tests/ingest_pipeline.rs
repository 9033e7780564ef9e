use chrono::NaiveDate;
use savor_core::db::open_db_in_memory;
use savor_core::{
    convert_datetime_cols, extract_and_concat, normalize_column_name, Cell, IngestError,
    IngestService, IngestServiceError, LogKind, LogListQuery, LogRepository, SqliteLogRepository,
};
use serde_json::json;
use std::collections::BTreeSet;

#[test]
fn documented_example_flattens_then_converts() {
    let records = vec![json!({"id": "rec1", "fields": {"Time In": "2021-01-01T10:00:00"}})];

    let table = extract_and_concat(&records).unwrap();
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.cell(0, "airtable_id"), Some(&Cell::Text("rec1".to_string())));
    assert_eq!(
        table.cell(0, "time_in"),
        Some(&Cell::Text("2021-01-01T10:00:00".to_string()))
    );

    let converted = convert_datetime_cols(&table, &["time_in"]).unwrap();
    let expected = NaiveDate::from_ymd_opt(2021, 1, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    assert_eq!(converted.cell(0, "time_in"), Some(&Cell::Timestamp(expected)));
    assert_eq!(
        converted.cell(0, "time_in").and_then(Cell::as_timestamp),
        Some(expected)
    );
    assert_eq!(converted.cell(0, "airtable_id"), table.cell(0, "airtable_id"));
}

#[test]
fn output_columns_are_union_of_normalized_keys() {
    let records = vec![
        json!({"id": "r1", "fields": {"Name": "a", "Tags": ["x"]}}),
        json!({"id": "r2", "fields": {"Money": ["5"], "name": "b"}}),
        json!({"id": "r3", "fields": {"Sub Loc": ["desk"]}}),
    ];

    let table = extract_and_concat(&records).unwrap();

    assert_eq!(table.row_count(), records.len());
    let expected: BTreeSet<String> = records
        .iter()
        .flat_map(|record| record["fields"].as_object().unwrap().keys())
        .map(|key| normalize_column_name(key))
        .chain(std::iter::once("airtable_id".to_string()))
        .collect();
    let found: BTreeSet<String> = table
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    assert_eq!(found, expected);
}

#[test]
fn malformed_input_returns_structural_error() {
    let err = extract_and_concat(&[json!({"no_id": 1})]).unwrap_err();
    assert!(matches!(err, IngestError::MalformedRecord { index: 0, .. }));
}

#[test]
fn service_loads_export_pages_end_to_end() {
    let conn = open_db_in_memory().unwrap();
    let service = IngestService::new(SqliteLogRepository::new(&conn));
    let export = json!([
        {
            "records": [
                {"id": "recM1", "createdTime": "2021-06-01T07:00:00.000Z", "fields": {
                    "Name": "stretch",
                    "Time In": "2021-06-01T07:00:00.000Z",
                    "Time Out": "2021-06-01T07:10:00.000Z",
                    "Duration": 600,
                    "Physical": ["stiff back"],
                    "Project Log": "recP9"
                }}
            ],
            "offset": "itrNext"
        },
        {
            "records": [
                {"id": "recM2", "fields": {"Name": "water", "Dose": ["500ml"]}}
            ]
        }
    ])
    .to_string();

    let report = service.ingest_export(LogKind::Moment, &export).unwrap();

    assert_eq!(report.kind, LogKind::Moment);
    assert_eq!(report.rows_loaded, 2);
    assert!(!report.batch_id.is_nil());
    assert_eq!(report.skipped_columns, vec!["airtable_id"]);
    let moments = service.repo().list_moments(&LogListQuery::default()).unwrap();
    assert_eq!(moments.len(), 2);
    assert_eq!(moments[0].name.as_deref(), Some("stretch"));
    assert_eq!(moments[0].duration, Some(600));
    assert_eq!(
        moments[0].time_out,
        NaiveDate::from_ymd_opt(2021, 6, 1).unwrap().and_hms_opt(7, 10, 0)
    );
    assert_eq!(moments[1].dose, vec!["500ml"]);
    assert_eq!(moments[1].time_in, None);
}

#[test]
fn failing_batch_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLogRepository::new(&conn);
    let service = IngestService::new(&repo);
    let records = vec![
        json!({"id": "recP1", "fields": {"Time In": "2021-01-01T10:00:00"}}),
        json!({"id": "recP2", "fields": {"Time In": "after lunch"}}),
    ];

    let err = service.ingest_records(LogKind::Project, &records).unwrap_err();

    match err {
        IngestServiceError::Ingest(IngestError::InvalidDatetime { column, row, .. }) => {
            assert_eq!(column, "time_in");
            assert_eq!(row, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(repo.count(LogKind::Project).unwrap(), 0);
}

#[test]
fn invalid_export_json_is_reported() {
    let conn = open_db_in_memory().unwrap();
    let service = IngestService::new(SqliteLogRepository::new(&conn));

    let err = service.ingest_export(LogKind::Engagement, "{not json").unwrap_err();
    assert!(matches!(err, IngestServiceError::InvalidJson(_)));

    let err = service.ingest_export(LogKind::Engagement, "42").unwrap_err();
    assert!(matches!(
        err,
        IngestServiceError::Ingest(IngestError::MalformedExport(_))
    ));
}

#[test]
fn repeated_batches_append_rows() {
    let conn = open_db_in_memory().unwrap();
    let service = IngestService::new(SqliteLogRepository::new(&conn));
    let records = vec![json!({"id": "recP1", "fields": {"Location": "Park"}})];

    service.ingest_records(LogKind::Project, &records).unwrap();
    service.ingest_records(LogKind::Project, &records).unwrap();

    assert_eq!(service.repo().count(LogKind::Project).unwrap(), 2);
}

#[test]
fn single_empty_engagement_record_is_loaded() {
    let conn = open_db_in_memory().unwrap();
    let service = IngestService::new(SqliteLogRepository::new(&conn));
    let records = vec![json!({"id": "rec3", "fields": {}})];

    let report = service.ingest_records(LogKind::Engagement, &records).unwrap();

    assert_eq!(report.rows_loaded, 1);
    assert!(report.columns.is_empty());
    assert_eq!(report.skipped_columns, vec!["airtable_id"]);
    assert_eq!(service.repo().count(LogKind::Engagement).unwrap(), 1);
}
