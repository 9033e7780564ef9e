//! Ingest use-case service.
//!
//! # Responsibility
//! - Chain extract, datetime coercion and bulk load for one batch.
//! - Tag every batch with a `batch_id` for log correlation.
//!
//! # Invariants
//! - A failing batch leaves the target table unchanged.
//! - Logs carry counts and column names only, never field values.

use crate::ingest::{
    convert_datetime_cols, extract_and_concat, records_from_export, IngestError,
    DEFAULT_DATETIME_COLUMNS,
};
use crate::repo::log_repo::{LoadSummary, LogRepository, RepoError};
use crate::schema::LogKind;
use log::{error, info};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

/// Service error for ingest use-cases.
#[derive(Debug)]
pub enum IngestServiceError {
    /// Input could not be parsed as JSON.
    InvalidJson(String),
    /// Transform failure (record shape or datetime parsing).
    Ingest(IngestError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for IngestServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(message) => write!(f, "invalid export json: {message}"),
            Self::Ingest(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for IngestServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidJson(_) => None,
            Self::Ingest(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<IngestError> for IngestServiceError {
    fn from(value: IngestError) -> Self {
        Self::Ingest(value)
    }
}

impl From<RepoError> for IngestServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl IngestServiceError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidJson(_) => "invalid_json",
            Self::Ingest(IngestError::MalformedRecord { .. }) => "malformed_record",
            Self::Ingest(IngestError::MalformedExport(_)) => "malformed_export",
            Self::Ingest(IngestError::InvalidDatetime { .. }) => "invalid_datetime",
            Self::Repo(RepoError::InvalidData(_)) => "invalid_data",
            Self::Repo(RepoError::Db(_)) => "db_error",
        }
    }
}

/// Summary of one loaded batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub batch_id: Uuid,
    pub kind: LogKind,
    pub rows_loaded: usize,
    /// Columns written to the log table.
    pub columns: Vec<String>,
    /// Extracted columns the log table has no place for.
    pub skipped_columns: Vec<String>,
}

/// Use-case service for loading spreadsheet exports into the log tables.
pub struct IngestService<R: LogRepository> {
    repo: R,
}

impl<R: LogRepository> IngestService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Borrow the underlying repository, e.g. for read-back.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Extracts, converts and loads one batch of `{id, fields}` records.
    ///
    /// # Contract
    /// - Datetime candidates are `DEFAULT_DATETIME_COLUMNS`.
    /// - Any transform or load error fails the whole batch.
    pub fn ingest_records(
        &self,
        kind: LogKind,
        records: &[Value],
    ) -> Result<IngestReport, IngestServiceError> {
        let batch_id = Uuid::new_v4();
        let started_at = Instant::now();
        info!(
            "event=ingest_batch module=service status=start batch_id={} table={} records={}",
            batch_id,
            kind.table_name(),
            records.len()
        );

        match self.run_batch(kind, records) {
            Ok(summary) => {
                info!(
                    "event=ingest_batch module=service status=ok batch_id={} table={} rows={} skipped_columns={} duration_ms={}",
                    batch_id,
                    kind.table_name(),
                    summary.rows,
                    summary.skipped_columns.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(IngestReport {
                    batch_id,
                    kind,
                    rows_loaded: summary.rows,
                    columns: summary.written_columns,
                    skipped_columns: summary.skipped_columns,
                })
            }
            Err(err) => {
                error!(
                    "event=ingest_batch module=service status=error batch_id={} table={} error_code={} duration_ms={}",
                    batch_id,
                    kind.table_name(),
                    err.code(),
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    /// Parses an export document and loads its records.
    ///
    /// See `records_from_export` for the accepted document shapes.
    pub fn ingest_export(
        &self,
        kind: LogKind,
        json: &str,
    ) -> Result<IngestReport, IngestServiceError> {
        let document: Value = serde_json::from_str(json)
            .map_err(|err| IngestServiceError::InvalidJson(err.to_string()))?;
        let records = records_from_export(&document)?;
        self.ingest_records(kind, &records)
    }

    fn run_batch(
        &self,
        kind: LogKind,
        records: &[Value],
    ) -> Result<LoadSummary, IngestServiceError> {
        let extracted = extract_and_concat(records)?;
        let converted = convert_datetime_cols(&extracted, DEFAULT_DATETIME_COLUMNS)?;
        Ok(self.repo.load_table(kind, &converted)?)
    }
}
