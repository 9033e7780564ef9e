//! Life-log repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Bulk-load ingested tables into `project_log`, `engage_log`, `moment_log`.
//! - Read persisted rows back as typed records.
//!
//! # Invariants
//! - A load writes every row of the batch or none of them.
//! - Each cell is coerced to its column's `ColumnType` before any SQL runs
//!   for that row; mismatches abort the batch.
//! - Read paths reject malformed persisted values instead of masking them.

use crate::db::DbError;
use crate::model::engagement::Engagement;
use crate::model::moment::Moment;
use crate::model::project::Project;
use crate::schema::{ColumnDef, ColumnType, LogKind, TableDef};
use crate::table::{Cell, Table};
use chrono::NaiveDateTime;
use log::{debug, info};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Text layout of persisted `DateTime` columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const I64_MIN_F64: f64 = -9_223_372_036_854_775_808.0;
const I64_MAX_EXCLUSIVE_F64: f64 = 9_223_372_036_854_775_808.0;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A cell cannot be stored in (or a stored value read from) its column.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid log data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Pagination for list reads. Rows are ordered by `id`.
#[derive(Debug, Clone, Default)]
pub struct LogListQuery {
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Outcome of one bulk load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows: usize,
    /// Table columns written, in table order.
    pub written_columns: Vec<String>,
    /// Table columns with no counterpart in the target log table.
    pub skipped_columns: Vec<String>,
}

/// Repository interface over the three log tables.
pub trait LogRepository {
    fn load_table(&self, kind: LogKind, table: &Table) -> RepoResult<LoadSummary>;
    fn count(&self, kind: LogKind) -> RepoResult<u64>;
    fn list_projects(&self, query: &LogListQuery) -> RepoResult<Vec<Project>>;
    fn list_engagements(&self, query: &LogListQuery) -> RepoResult<Vec<Engagement>>;
    fn list_moments(&self, query: &LogListQuery) -> RepoResult<Vec<Moment>>;
    fn find_project_by_airtable_id(&self, airtable_id: &str) -> RepoResult<Option<Project>>;
}

impl<T: LogRepository + ?Sized> LogRepository for &T {
    fn load_table(&self, kind: LogKind, table: &Table) -> RepoResult<LoadSummary> {
        (**self).load_table(kind, table)
    }

    fn count(&self, kind: LogKind) -> RepoResult<u64> {
        (**self).count(kind)
    }

    fn list_projects(&self, query: &LogListQuery) -> RepoResult<Vec<Project>> {
        (**self).list_projects(query)
    }

    fn list_engagements(&self, query: &LogListQuery) -> RepoResult<Vec<Engagement>> {
        (**self).list_engagements(query)
    }

    fn list_moments(&self, query: &LogListQuery) -> RepoResult<Vec<Moment>> {
        (**self).list_moments(query)
    }

    fn find_project_by_airtable_id(&self, airtable_id: &str) -> RepoResult<Option<Project>> {
        (**self).find_project_by_airtable_id(airtable_id)
    }
}

/// SQLite-backed log repository.
pub struct SqliteLogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLogRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn select_rows<T>(
        &self,
        def: &TableDef,
        filter: Option<(&str, Value)>,
        query: &LogListQuery,
        parse: fn(&Row<'_>) -> RepoResult<T>,
    ) -> RepoResult<Vec<T>> {
        let mut sql = format!("SELECT {} FROM {}", def.column_names().join(", "), def.name);
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some((column, value)) = filter {
            sql.push_str(&format!(" WHERE {column} = ?"));
            bind_values.push(value);
        }

        sql.push_str(" ORDER BY id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse(row)?);
        }
        Ok(records)
    }
}

impl LogRepository for SqliteLogRepository<'_> {
    fn load_table(&self, kind: LogKind, table: &Table) -> RepoResult<LoadSummary> {
        let def = kind.table();
        let mut targets: Vec<&'static ColumnDef> = Vec::new();
        let mut skipped_columns = Vec::new();
        for name in table.column_names() {
            match def.column(name) {
                Some(column) => targets.push(column),
                None => skipped_columns.push(name.to_string()),
            }
        }

        if !skipped_columns.is_empty() {
            debug!(
                "event=log_load module=repo status=skip table={} columns={}",
                def.name,
                skipped_columns.join(",")
            );
        }

        if table.row_count() > 0 {
            // Every record gets a row, even with no column mapped.
            let sql = if targets.is_empty() {
                format!("INSERT INTO {} DEFAULT VALUES;", def.name)
            } else {
                let column_list = targets
                    .iter()
                    .map(|column| column.name)
                    .collect::<Vec<_>>()
                    .join(", ");
                let placeholders = (1..=targets.len())
                    .map(|index| format!("?{index}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "INSERT INTO {} ({column_list}) VALUES ({placeholders});",
                    def.name
                )
            };

            let tx = self.conn.unchecked_transaction()?;
            {
                let mut stmt = tx.prepare(&sql)?;
                for row in 0..table.row_count() {
                    let values = targets
                        .iter()
                        .map(|column| match table.cell(row, column.name) {
                            Some(cell) => cell_to_sql(def.name, column, row, cell),
                            None => Ok(Value::Null),
                        })
                        .collect::<RepoResult<Vec<Value>>>()?;
                    stmt.execute(params_from_iter(values))?;
                }
            }
            tx.commit()?;
        }

        info!(
            "event=log_load module=repo status=ok table={} rows={} columns={} skipped={}",
            def.name,
            table.row_count(),
            targets.len(),
            skipped_columns.len()
        );

        Ok(LoadSummary {
            rows: table.row_count(),
            written_columns: targets.iter().map(|column| column.name.to_string()).collect(),
            skipped_columns,
        })
    }

    fn count(&self, kind: LogKind) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", kind.table_name()),
            [],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
    }

    fn list_projects(&self, query: &LogListQuery) -> RepoResult<Vec<Project>> {
        self.select_rows(LogKind::Project.table(), None, query, parse_project_row)
    }

    fn list_engagements(&self, query: &LogListQuery) -> RepoResult<Vec<Engagement>> {
        self.select_rows(LogKind::Engagement.table(), None, query, parse_engagement_row)
    }

    fn list_moments(&self, query: &LogListQuery) -> RepoResult<Vec<Moment>> {
        self.select_rows(LogKind::Moment.table(), None, query, parse_moment_row)
    }

    fn find_project_by_airtable_id(&self, airtable_id: &str) -> RepoResult<Option<Project>> {
        let query = LogListQuery {
            limit: Some(1),
            offset: 0,
        };
        let mut found = self.select_rows(
            LogKind::Project.table(),
            Some(("airtable_id", Value::Text(airtable_id.to_string()))),
            &query,
            parse_project_row,
        )?;
        Ok(found.pop())
    }
}

/// Coerces one cell into the SQL value stored for `column`.
fn cell_to_sql(table: &str, column: &ColumnDef, row: usize, cell: &Cell) -> RepoResult<Value> {
    let mismatch = |expected: &str| {
        RepoError::InvalidData(format!(
            "{table}.{} row {row}: expected {expected}, got {}",
            column.name,
            cell.kind_name()
        ))
    };

    if cell.is_null() {
        return Ok(Value::Null);
    }

    match column.ty {
        ColumnType::Integer => match cell {
            Cell::Integer(value) => Ok(Value::Integer(*value)),
            Cell::Float(value) => {
                let rounded = value.round();
                // `as` saturates; reject anything it would clamp.
                if (I64_MIN_F64..I64_MAX_EXCLUSIVE_F64).contains(&rounded) {
                    Ok(Value::Integer(rounded as i64))
                } else {
                    Err(mismatch("integer"))
                }
            }
            Cell::Text(text) => text
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| mismatch("integer")),
            _ => Err(mismatch("integer")),
        },
        ColumnType::String | ColumnType::Text => Ok(Value::Text(cell_to_text(cell))),
        ColumnType::DateTime => match cell {
            Cell::Timestamp(value) => Ok(Value::Text(value.format(TIMESTAMP_FORMAT).to_string())),
            _ => Err(mismatch("timestamp (convert datetime columns before loading)")),
        },
        ColumnType::StringList => {
            let items = match cell {
                Cell::List(items) => items.clone(),
                Cell::Json(serde_json::Value::Array(items)) => items
                    .iter()
                    .map(|item| match item {
                        serde_json::Value::String(text) => text.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
                Cell::Json(_) => return Err(mismatch("list of strings")),
                scalar => vec![cell_to_text(scalar)],
            };
            serde_json::to_string(&items)
                .map(Value::Text)
                .map_err(|err| RepoError::InvalidData(err.to_string()))
        }
    }
}

fn cell_to_text(cell: &Cell) -> String {
    match cell {
        Cell::Null => String::new(),
        Cell::Bool(value) => value.to_string(),
        Cell::Integer(value) => value.to_string(),
        Cell::Float(value) => value.to_string(),
        Cell::Text(value) => value.clone(),
        Cell::List(items) => items.join(", "),
        Cell::Json(value) => value.to_string(),
        Cell::Timestamp(value) => value.format(TIMESTAMP_FORMAT).to_string(),
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    Ok(Project {
        id: row.get("id")?,
        airtable_id: row.get("airtable_id")?,
        time_in: timestamp(row, "time_in")?,
        notes: row.get("notes")?,
        location: row.get("location")?,
        engage_log: string_list(row, "engage_log")?,
        time_out: timestamp(row, "time_out")?,
        duration: row.get("duration")?,
        created: timestamp(row, "created")?,
        modified: timestamp(row, "modified")?,
    })
}

fn parse_engagement_row(row: &Row<'_>) -> RepoResult<Engagement> {
    Ok(Engagement {
        id: row.get("id")?,
        name: row.get("name")?,
        time_in: timestamp(row, "time_in")?,
        mental: string_list(row, "mental")?,
        physical: string_list(row, "physical")?,
        tags: string_list(row, "tags")?,
        subloc: string_list(row, "subloc")?,
        mental_note: row.get("mental_note")?,
        physical_note: row.get("physical_note")?,
        moment_log: string_list(row, "moment_log")?,
        who: string_list(row, "who")?,
        dose: string_list(row, "dose")?,
        project_location: row.get("project_location")?,
        location: row.get("location")?,
        money: string_list(row, "money")?,
        todo: string_list(row, "todo")?,
        idea: string_list(row, "idea")?,
        time_out: timestamp(row, "time_out")?,
        duration: row.get("duration")?,
        created: timestamp(row, "created")?,
        modified: timestamp(row, "modified")?,
        project_log: row.get("project_log")?,
        id_num: row.get("id_num")?,
        wishlist: string_list(row, "wishlist")?,
    })
}

fn parse_moment_row(row: &Row<'_>) -> RepoResult<Moment> {
    Ok(Moment {
        id: row.get("id")?,
        name: row.get("name")?,
        time_in: timestamp(row, "time_in")?,
        time_out: timestamp(row, "time_out")?,
        duration: row.get("duration")?,
        title: row.get("title")?,
        physical: string_list(row, "physical")?,
        physical_note: row.get("physical_note")?,
        dose: string_list(row, "dose")?,
        mental: string_list(row, "mental")?,
        subloc: string_list(row, "subloc")?,
        mental_note: row.get("mental_note")?,
        tags: string_list(row, "tags")?,
        todo: string_list(row, "todo")?,
        money: string_list(row, "money")?,
        who: string_list(row, "who")?,
        idea: string_list(row, "idea")?,
        created: timestamp(row, "created")?,
        modified: timestamp(row, "modified")?,
        project_log: row.get("project_log")?,
        id_num: row.get("id_num")?,
        wishlist: string_list(row, "wishlist")?,
    })
}

fn timestamp(row: &Row<'_>, column: &str) -> RepoResult<Option<NaiveDateTime>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT)
            .map(Some)
            .map_err(|_| {
                RepoError::InvalidData(format!("invalid timestamp `{text}` in column {column}"))
            }),
        None => Ok(None),
    }
}

fn string_list(row: &Row<'_>, column: &str) -> RepoResult<Vec<String>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => serde_json::from_str::<Vec<String>>(&text).map_err(|_| {
            RepoError::InvalidData(format!("invalid string list in column {column}"))
        }),
        None => Ok(Vec::new()),
    }
}
