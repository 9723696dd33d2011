//! Database connection management
//!
//! Catalogs are only ever read; connections are opened read-only.

#![allow(clippy::result_large_err)]

use crate::errors::{catalog_not_found, from_rusqlite, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// Open a catalog file read-only
///
/// # Errors
///
/// - `NotFound`: `path` does not exist
/// - `Persistence`: SQLite refused to open the file
pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(catalog_not_found(path));
    }
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| from_rusqlite(e).with_entity_id(path.display().to_string()))
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Whether `table` exists in the connected database
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )
        .map_err(from_rusqlite)?;
    Ok(count > 0)
}

/// Column names of `table`, empty when the table does not exist
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1)")
        .map_err(from_rusqlite)?;
    let columns = stmt
        .query_map([table], |row| row.get::<_, String>(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catdiff_core::ExErrorKind;

    #[test]
    fn test_open_missing_file_is_not_found() {
        let err = open_read_only("/no/such/catalog.lrcat").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }

    #[test]
    fn test_table_introspection() {
        let conn = open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (a INTEGER, b TEXT);")
            .unwrap();
        assert!(table_exists(&conn, "t").unwrap());
        assert!(!table_exists(&conn, "u").unwrap());
        assert_eq!(table_columns(&conn, "t").unwrap(), vec!["a", "b"]);
        assert!(table_columns(&conn, "u").unwrap().is_empty());
    }

    #[test]
    fn test_read_only_connection_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.lrcat");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE t (a INTEGER);").unwrap();
        }
        let conn = open_read_only(&path).unwrap();
        assert!(conn.execute("INSERT INTO t VALUES (1)", []).is_err());
    }
}
