//! Core of the Savor life-log pipeline.
//!
//! Declares the `project_log`/`engage_log`/`moment_log` schema, flattens
//! spreadsheet exports into tables and loads them into SQLite.

pub mod db;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schema;
pub mod service;
pub mod table;

pub use ingest::{
    convert_datetime_cols, extract_and_concat, normalize_column_name, records_from_export,
    IngestError, IngestResult, DEFAULT_DATETIME_COLUMNS,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::engagement::Engagement;
pub use model::moment::Moment;
pub use model::project::Project;
pub use repo::log_repo::{
    LoadSummary, LogListQuery, LogRepository, RepoError, RepoResult, SqliteLogRepository,
};
pub use schema::{ColumnDef, ColumnType, LogKind, TableDef};
pub use service::ingest_service::{IngestReport, IngestService, IngestServiceError};
pub use table::{Cell, Table};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
