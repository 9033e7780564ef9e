//! Stored-layout checks against `crate::schema`.

use super::{DbError, DbResult};
use crate::schema::LogKind;
use rusqlite::Connection;

/// Returns the column names of `table` in declaration order.
///
/// An unknown table yields an empty list.
pub fn table_columns(conn: &Connection, table: &str) -> DbResult<Vec<String>> {
    Ok(column_layout(conn, table)?
        .into_iter()
        .map(|(name, _)| name)
        .collect())
}

/// Checks that every log table exists with exactly the declared columns
/// and declared SQL types.
pub fn verify_schema(conn: &Connection) -> DbResult<()> {
    for kind in LogKind::ALL {
        let def = kind.table();
        let found = column_layout(conn, def.name)?
            .into_iter()
            .map(|(name, ty)| format!("{name} {ty}"))
            .collect::<Vec<_>>();
        let expected = def
            .columns
            .iter()
            .map(|column| format!("{} {}", column.name, column.ty.sql_type()))
            .collect::<Vec<_>>();
        if found != expected {
            return Err(DbError::SchemaMismatch {
                table: def.name,
                expected,
                found,
            });
        }
    }
    Ok(())
}

fn column_layout(conn: &Connection, table: &str) -> DbResult<Vec<(String, String)>> {
    let mut stmt =
        conn.prepare("SELECT name, upper(type) FROM pragma_table_info(?1) ORDER BY cid;")?;
    let columns = stmt
        .query_map([table], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}
