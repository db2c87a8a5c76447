//! hover_results queries.

use codenav_core::errors::StorageError;
use codenav_core::types::IndexId;
use rusqlite::{params, Connection, OptionalExtension};

use crate::to_storage_err;

pub fn insert_hover_result(
    conn: &Connection,
    index_id: IndexId,
    contents: &str,
) -> Result<i64, StorageError> {
    let mut stmt = conn
        .prepare_cached("INSERT INTO hover_results (index_id, contents) VALUES (?1, ?2)")
        .map_err(to_storage_err)?;
    stmt.execute(params![index_id, contents])
        .map_err(to_storage_err)?;
    Ok(conn.last_insert_rowid())
}

pub fn get_hover_contents(conn: &Connection, hover_id: i64) -> Result<Option<String>, StorageError> {
    conn.query_row(
        "SELECT contents FROM hover_results WHERE id = ?1",
        params![hover_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(to_storage_err)
}
