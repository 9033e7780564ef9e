//! Declarative column layout for the three life-log tables.
//!
//! # Responsibility
//! - Describe `project_log`, `engage_log` and `moment_log` column by column.
//! - Give the loader and the read paths one shared source of column types.
//!
//! # Invariants
//! - Every table has an integer `id` primary key as its first column.
//! - Column order matches the migration SQL that creates the table.
//!
//! # See also
//! - db/migrations/0002_extended_logs.sql

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use self::ColumnType::{DateTime, Integer, String as Str, StringList, Text};

/// Storage type of one log column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    /// Short text (names, locations, references).
    String,
    /// Long free-form text (notes).
    Text,
    /// Naive timestamp, persisted as `YYYY-MM-DD HH:MM:SS[.f]`.
    DateTime,
    /// Denormalized list of strings, persisted as a JSON array.
    StringList,
}

impl ColumnType {
    /// SQLite declared type used by migrations for this column type.
    pub fn sql_type(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::String | Self::Text | Self::DateTime | Self::StringList => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub primary_key: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|column| column.name).collect()
    }
}

const fn pk(name: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        ty: ColumnType::Integer,
        primary_key: true,
    }
}

const fn col(name: &'static str, ty: ColumnType) -> ColumnDef {
    ColumnDef {
        name,
        ty,
        primary_key: false,
    }
}

pub const PROJECT_LOG: TableDef = TableDef {
    name: "project_log",
    columns: &[
        pk("id"),
        col("airtable_id", Str),
        col("time_in", DateTime),
        col("notes", Text),
        col("location", Str),
        col("engage_log", StringList),
        col("time_out", DateTime),
        col("duration", Integer),
        col("created", DateTime),
        col("modified", DateTime),
    ],
};

pub const ENGAGE_LOG: TableDef = TableDef {
    name: "engage_log",
    columns: &[
        pk("id"),
        col("name", Str),
        col("time_in", DateTime),
        col("mental", StringList),
        col("physical", StringList),
        col("tags", StringList),
        col("subloc", StringList),
        col("mental_note", Text),
        col("physical_note", Text),
        col("moment_log", StringList),
        col("who", StringList),
        col("dose", StringList),
        col("project_location", Str),
        col("location", Str),
        col("money", StringList),
        col("todo", StringList),
        col("idea", StringList),
        col("time_out", DateTime),
        col("duration", Integer),
        col("created", DateTime),
        col("modified", DateTime),
        col("project_log", Str),
        col("id_num", Integer),
        col("wishlist", StringList),
    ],
};

pub const MOMENT_LOG: TableDef = TableDef {
    name: "moment_log",
    columns: &[
        pk("id"),
        col("name", Str),
        col("time_in", DateTime),
        col("time_out", DateTime),
        col("duration", Integer),
        col("title", Str),
        col("physical", StringList),
        col("physical_note", Text),
        col("dose", StringList),
        col("mental", StringList),
        col("subloc", StringList),
        col("mental_note", Text),
        col("tags", StringList),
        col("todo", StringList),
        col("money", StringList),
        col("who", StringList),
        col("idea", StringList),
        col("created", DateTime),
        col("modified", DateTime),
        col("project_log", Str),
        col("id_num", Integer),
        col("wishlist", StringList),
    ],
};

/// The three record kinds of the life log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    Project,
    Engagement,
    Moment,
}

impl LogKind {
    pub const ALL: [LogKind; 3] = [Self::Project, Self::Engagement, Self::Moment];

    pub fn table(self) -> &'static TableDef {
        match self {
            Self::Project => &PROJECT_LOG,
            Self::Engagement => &ENGAGE_LOG,
            Self::Moment => &MOMENT_LOG,
        }
    }

    pub fn table_name(self) -> &'static str {
        self.table().name
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Engagement => "engagement",
            Self::Moment => "moment",
        }
    }
}

impl Display for LogKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLogKind(pub std::string::String);

impl Display for UnknownLogKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown log kind `{}`; expected project|engagement|moment",
            self.0
        )
    }
}

impl Error for UnknownLogKind {}

impl FromStr for LogKind {
    type Err = UnknownLogKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "project" | "project_log" => Ok(Self::Project),
            "engagement" | "engage" | "engage_log" => Ok(Self::Engagement),
            "moment" | "moment_log" => Ok(Self::Moment),
            other => Err(UnknownLogKind(other.to_string())),
        }
    }
}
