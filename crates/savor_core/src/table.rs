//! Column-oriented in-memory table used between ingest and load.
//!
//! # Responsibility
//! - Hold raw field values per named column without committing to types.
//! - Give loaders and tests cheap access by column name and row index.
//!
//! # Invariants
//! - Every column holds exactly `row_count` cells.
//! - Column names are unique within one table.

use chrono::NaiveDateTime;
use serde_json::Value;

/// One value of a table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Field absent for this record, or explicit JSON `null`.
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
    /// Anything without a tabular shape (objects, mixed arrays).
    Json(Value),
    Timestamp(NaiveDateTime),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Timestamp(value) => Some(*value),
            _ => None,
        }
    }

    /// Short type label used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Json(_) => "json",
            Self::Timestamp(_) => "timestamp",
        }
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(flag),
            Value::Number(number) => match number.as_i64() {
                Some(int) => Self::Integer(int),
                None => number.as_f64().map_or(Self::Json(Value::Number(number)), Self::Float),
            },
            Value::String(text) => Self::Text(text),
            Value::Array(items) if items.iter().all(Value::is_string) => Self::List(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(text) => Some(text),
                        _ => None,
                    })
                    .collect(),
            ),
            other => Self::Json(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Column {
    name: String,
    cells: Vec<Cell>,
}

/// Ordered set of equally long named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Creates an empty table with a fixed number of rows and no columns.
    pub fn with_rows(row_count: usize) -> Self {
        Self {
            columns: Vec::new(),
            row_count,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.position(name)
            .map(|index| self.columns[index].cells.as_slice())
    }

    pub fn cell(&self, row: usize, name: &str) -> Option<&Cell> {
        self.column(name).and_then(|cells| cells.get(row))
    }

    /// Returns `(column, cell)` pairs of one row in column order.
    pub fn row(&self, index: usize) -> Option<Vec<(&str, &Cell)>> {
        if index >= self.row_count {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|column| (column.name.as_str(), &column.cells[index]))
                .collect(),
        )
    }

    /// Returns the column, appending a null-filled one when missing.
    pub(crate) fn column_mut_or_insert(&mut self, name: &str) -> &mut Vec<Cell> {
        let index = match self.position(name) {
            Some(index) => index,
            None => {
                self.columns.push(Column {
                    name: name.to_string(),
                    cells: vec![Cell::Null; self.row_count],
                });
                self.columns.len() - 1
            }
        };
        &mut self.columns[index].cells
    }

    pub(crate) fn column_mut(&mut self, name: &str) -> Option<&mut Vec<Cell>> {
        let index = self.position(name)?;
        Some(&mut self.columns[index].cells)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }
}
