//! Ingestion transform for spreadsheet exports.
//!
//! # Responsibility
//! - Flatten raw `{id, fields}` records into one `Table`.
//! - Coerce designated columns into timestamps.
//!
//! # Invariants
//! - Transforms are pure: no I/O, no shared state, inputs are only borrowed.
//! - A batch either converts completely or fails with no partial table.
//!
//! # See also
//! - crate::service::ingest_service

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod datetime;
pub mod extract;
pub mod names;

pub use datetime::{convert_datetime_cols, parse_timestamp, DEFAULT_DATETIME_COLUMNS};
pub use extract::{extract_and_concat, records_from_export, AIRTABLE_ID_COLUMN};
pub use names::normalize_column_name;

pub type IngestResult<T> = Result<T, IngestError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// Input does not have the `{id, fields}` record shape.
    MalformedRecord { index: usize, reason: String },
    /// Export document is neither a record list nor a page of records.
    MalformedExport(String),
    /// A datetime candidate holds a value that is not a timestamp.
    InvalidDatetime {
        column: String,
        row: usize,
        value: String,
    },
}

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedRecord { index, reason } => {
                write!(f, "malformed record at index {index}: {reason}")
            }
            Self::MalformedExport(message) => write!(f, "malformed export: {message}"),
            Self::InvalidDatetime { column, row, value } => write!(
                f,
                "cannot parse `{value}` as timestamp in column `{column}` (row {row})"
            ),
        }
    }
}

impl Error for IngestError {}
