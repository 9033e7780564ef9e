//! Flattening of `{id, fields}` records into a table.
//!
//! # Invariants
//! - Output has one row per input record, in input order.
//! - `airtable_id` is always the first column.
//! - Field columns appear in first-seen order; records missing a field hold
//!   `Cell::Null` there.

use super::names::normalize_column_name;
use super::{IngestError, IngestResult};
use crate::table::{Cell, Table};
use log::{debug, warn};
use serde_json::{Map, Value};

/// Column holding the renamed record identifier.
pub const AIRTABLE_ID_COLUMN: &str = "airtable_id";

/// Flattens exported records into one table.
///
/// Each record must be an object with a string `id` and an object `fields`.
/// Field names are normalized with `normalize_column_name`; values are kept
/// as-is (see `Cell::from`) and typed later.
///
/// # Errors
/// - `IngestError::MalformedRecord` for the first record without the
///   expected shape. No table is returned in that case.
pub fn extract_and_concat(records: &[Value]) -> IngestResult<Table> {
    // Validate the whole batch before building anything.
    let shaped = records
        .iter()
        .enumerate()
        .map(|(index, record)| record_parts(index, record))
        .collect::<IngestResult<Vec<_>>>()?;

    let mut table = Table::with_rows(shaped.len());
    let ids = table.column_mut_or_insert(AIRTABLE_ID_COLUMN);
    for (cell, (id, _)) in ids.iter_mut().zip(&shaped) {
        *cell = Cell::Text((*id).to_string());
    }

    for (row, (id, fields)) in shaped.into_iter().enumerate() {
        let mut seen_in_record: Vec<String> = Vec::with_capacity(fields.len());
        for (raw_name, value) in fields {
            let name = normalize_column_name(raw_name);
            if name == AIRTABLE_ID_COLUMN {
                warn!(
                    "event=ingest_extract module=ingest status=skip reason=reserved_column row={} record={}",
                    row, id
                );
                continue;
            }
            if seen_in_record.contains(&name) {
                warn!(
                    "event=ingest_extract module=ingest status=overwrite reason=duplicate_column column={} row={} record={}",
                    name, row, id
                );
            } else {
                seen_in_record.push(name.clone());
            }
            table.column_mut_or_insert(&name)[row] = Cell::from(value.clone());
        }
    }

    debug!(
        "event=ingest_extract module=ingest status=ok rows={} columns={}",
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

/// Collects records from an export document.
///
/// Accepted shapes:
/// - an array of records,
/// - one page object `{"records": [...], "offset": "..."}`,
/// - an array of page objects.
///
/// Records themselves are not validated here; `extract_and_concat` does that.
pub fn records_from_export(document: &Value) -> IngestResult<Vec<Value>> {
    match document {
        Value::Object(page) => page_records(page).map(<[Value]>::to_vec),
        Value::Array(items) => {
            let all_pages = !items.is_empty() && items.iter().all(is_page);
            if !all_pages {
                return Ok(items.clone());
            }
            let mut records = Vec::new();
            for item in items {
                if let Value::Object(page) = item {
                    records.extend_from_slice(page_records(page)?);
                }
            }
            Ok(records)
        }
        other => Err(IngestError::MalformedExport(format!(
            "expected an array or a page object, got {}",
            json_kind(other)
        ))),
    }
}

fn record_parts(index: usize, record: &Value) -> IngestResult<(&str, &Map<String, Value>)> {
    let malformed = |reason: &str| IngestError::MalformedRecord {
        index,
        reason: reason.to_string(),
    };

    let object = record
        .as_object()
        .ok_or_else(|| malformed("record is not an object"))?;
    let id = match object.get("id") {
        Some(Value::String(id)) => id.as_str(),
        Some(_) => return Err(malformed("`id` is not a string")),
        None => return Err(malformed("missing `id`")),
    };
    let fields = match object.get("fields") {
        Some(Value::Object(fields)) => fields,
        Some(_) => return Err(malformed("`fields` is not an object")),
        None => return Err(malformed("missing `fields`")),
    };
    Ok((id, fields))
}

fn is_page(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|object| object.contains_key("records") && !object.contains_key("fields"))
}

fn page_records(page: &Map<String, Value>) -> IngestResult<&[Value]> {
    match page.get("records") {
        Some(Value::Array(records)) => Ok(records.as_slice()),
        Some(other) => Err(IngestError::MalformedExport(format!(
            "`records` must be an array, got {}",
            json_kind(other)
        ))),
        None => Err(IngestError::MalformedExport(
            "page object has no `records`".to_string(),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{extract_and_concat, records_from_export, AIRTABLE_ID_COLUMN};
    use crate::ingest::IngestError;
    use crate::table::Cell;
    use serde_json::json;

    #[test]
    fn single_record_is_renamed_and_normalized() {
        let records = vec![json!({"id": "rec1", "fields": {"Time In": "2021-01-01T10:00:00"}})];

        let table = extract_and_concat(&records).unwrap();

        assert_eq!(table.row_count(), 1);
        assert_eq!(table.column_names(), vec![AIRTABLE_ID_COLUMN, "time_in"]);
        assert_eq!(table.cell(0, "airtable_id").unwrap().as_text(), Some("rec1"));
        assert_eq!(
            table.cell(0, "time_in").unwrap().as_text(),
            Some("2021-01-01T10:00:00")
        );
    }

    #[test]
    fn empty_fields_yield_only_airtable_id() {
        let records = vec![json!({"id": "rec2", "fields": {}})];

        let table = extract_and_concat(&records).unwrap();

        assert_eq!(table.column_names(), vec![AIRTABLE_ID_COLUMN]);
        assert_eq!(table.cell(0, "airtable_id").unwrap().as_text(), Some("rec2"));
    }

    #[test]
    fn missing_fields_are_padded_with_null() {
        let records = vec![
            json!({"id": "recA", "fields": {"Name": "walk"}}),
            json!({"id": "recB", "fields": {"Tags": ["outside", "slow"]}}),
        ];

        let table = extract_and_concat(&records).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_names(), vec!["airtable_id", "name", "tags"]);
        assert!(table.cell(0, "tags").unwrap().is_null());
        assert!(table.cell(1, "name").unwrap().is_null());
        assert_eq!(
            table.cell(1, "tags").unwrap(),
            &Cell::List(vec!["outside".to_string(), "slow".to_string()])
        );
    }

    #[test]
    fn malformed_record_fails_without_table() {
        let records = vec![
            json!({"id": "ok", "fields": {}}),
            json!({"no_id": 1}),
        ];

        let err = extract_and_concat(&records).unwrap_err();

        assert_eq!(
            err,
            IngestError::MalformedRecord {
                index: 1,
                reason: "missing `id`".to_string(),
            }
        );
    }

    #[test]
    fn non_object_fields_and_ids_are_structural_errors() {
        let bad_fields = extract_and_concat(&[json!({"id": "r", "fields": [1]})]).unwrap_err();
        assert!(bad_fields.to_string().contains("`fields` is not an object"));

        let bad_id = extract_and_concat(&[json!({"id": 7, "fields": {}})]).unwrap_err();
        assert!(bad_id.to_string().contains("`id` is not a string"));

        let not_object = extract_and_concat(&[json!("rec1")]).unwrap_err();
        assert!(matches!(not_object, IngestError::MalformedRecord { index: 0, .. }));
    }

    #[test]
    fn reserved_field_name_does_not_replace_record_id() {
        let records = vec![json!({"id": "rec9", "fields": {"Airtable ID": "other"}})];

        let table = extract_and_concat(&records).unwrap();

        assert_eq!(table.column_names(), vec!["airtable_id"]);
        assert_eq!(table.cell(0, "airtable_id").unwrap().as_text(), Some("rec9"));
    }

    #[test]
    fn empty_batch_keeps_airtable_id_column() {
        let table = extract_and_concat(&[]).unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_names(), vec!["airtable_id"]);
    }

    #[test]
    fn export_pages_are_flattened_in_order() {
        let document = json!([
            {"records": [{"id": "r1", "fields": {}}], "offset": "itr1"},
            {"records": [{"id": "r2", "fields": {}}, {"id": "r3", "fields": {}}]}
        ]);

        let records = records_from_export(&document).unwrap();

        let ids: Vec<&str> = records.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["r1", "r2", "r3"]);
    }

    #[test]
    fn export_accepts_single_page_and_plain_list() {
        let page = json!({"records": [{"id": "r1", "fields": {}}]});
        assert_eq!(records_from_export(&page).unwrap().len(), 1);

        let plain = json!([{"id": "r1", "fields": {}}, {"id": "r2", "fields": {}}]);
        assert_eq!(records_from_export(&plain).unwrap().len(), 2);
    }

    #[test]
    fn export_rejects_scalars_and_bad_pages() {
        let err = records_from_export(&json!("records")).unwrap_err();
        assert!(matches!(err, IngestError::MalformedExport(_)));

        let err = records_from_export(&json!({"records": {"id": "r1"}})).unwrap_err();
        assert!(err.to_string().contains("`records` must be an array"));

        let err = records_from_export(&json!({"offset": "x"})).unwrap_err();
        assert!(err.to_string().contains("no `records`"));
    }
}
