//! Timestamp coercion for ingested tables.
//!
//! # Invariants
//! - The input table is only borrowed; conversion returns a new table.
//! - Only candidate columns present in the table are touched.
//! - Converting an already converted column is a no-op.

use super::{IngestError, IngestResult};
use crate::table::{Cell, Table};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::debug;

/// Timestamp columns shared by all three log tables.
pub const DEFAULT_DATETIME_COLUMNS: &[&str] = &["time_in", "time_out", "created", "modified"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Returns a copy of `table` with each present candidate column parsed into
/// `Cell::Timestamp`.
///
/// Candidates missing from the table are skipped. `Null` cells and blank
/// text stay `Null`.
///
/// # Errors
/// - `IngestError::InvalidDatetime` for the first cell that is neither
///   null, a timestamp, nor text accepted by `parse_timestamp`.
pub fn convert_datetime_cols<S: AsRef<str>>(table: &Table, candidates: &[S]) -> IngestResult<Table> {
    let mut converted = table.clone();
    let mut touched = 0usize;

    for candidate in candidates {
        let name = candidate.as_ref();
        let Some(cells) = converted.column_mut(name) else {
            continue;
        };
        for (row, cell) in cells.iter_mut().enumerate() {
            *cell = to_timestamp_cell(name, row, cell)?;
        }
        touched += 1;
    }

    debug!(
        "event=ingest_datetime module=ingest status=ok candidates={} converted={}",
        candidates.len(),
        touched
    );
    Ok(converted)
}

/// Parses one timestamp string.
///
/// Accepts RFC 3339 with an offset (normalized to UTC), ISO-like local
/// timestamps with `T` or space separators and optional seconds/fraction,
/// and bare `YYYY-MM-DD` dates (midnight).
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Some(with_offset.naive_utc());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn to_timestamp_cell(column: &str, row: usize, cell: &Cell) -> IngestResult<Cell> {
    match cell {
        Cell::Null | Cell::Timestamp(_) => Ok(cell.clone()),
        Cell::Text(text) if text.trim().is_empty() => Ok(Cell::Null),
        Cell::Text(text) => parse_timestamp(text)
            .map(Cell::Timestamp)
            .ok_or_else(|| IngestError::InvalidDatetime {
                column: column.to_string(),
                row,
                value: text.clone(),
            }),
        other => Err(IngestError::InvalidDatetime {
            column: column.to_string(),
            row,
            value: format!("<{}>", other.kind_name()),
        }),
    }
}
