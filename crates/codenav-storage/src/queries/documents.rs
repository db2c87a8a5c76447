//! documents queries.

use codenav_core::errors::StorageError;
use codenav_core::types::IndexId;
use rusqlite::{params, Connection};

use crate::to_storage_err;

pub fn insert_document(
    conn: &Connection,
    index_id: IndexId,
    uri: &str,
    language_id: Option<&str>,
) -> Result<i64, StorageError> {
    let mut stmt = conn
        .prepare_cached("INSERT INTO documents (index_id, uri, language_id) VALUES (?1, ?2, ?3)")
        .map_err(to_storage_err)?;
    stmt.execute(params![index_id, uri, language_id])
        .map_err(to_storage_err)?;
    Ok(conn.last_insert_rowid())
}

/// URIs of every document in a run, sorted.
pub fn list_document_uris(conn: &Connection, index_id: IndexId) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT uri FROM documents WHERE index_id = ?1 ORDER BY uri")
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![index_id], |row| row.get(0))
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}
