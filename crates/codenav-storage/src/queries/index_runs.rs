//! index_runs CRUD queries.

use codenav_core::errors::StorageError;
use codenav_core::types::{IndexId, IndexMeta};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::to_storage_err;

/// One ingested dump.
#[derive(Debug, Clone, Serialize)]
pub struct IndexRunRecord {
    pub id: IndexId,
    pub repo: Option<String>,
    pub commit: Option<String>,
    pub project_root: Option<String>,
    pub lsif_version: Option<String>,
    pub created_at: i64,
}

const SELECT_COLUMNS: &str =
    "SELECT id, repo, commit_sha, project_root, lsif_version, created_at FROM index_runs";

fn map_row(row: &Row<'_>) -> rusqlite::Result<IndexRunRecord> {
    Ok(IndexRunRecord {
        id: row.get(0)?,
        repo: row.get(1)?,
        commit: row.get(2)?,
        project_root: row.get(3)?,
        lsif_version: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Insert a new run. `created_at` falls back to the database clock.
pub fn insert_index_run(conn: &Connection, meta: &IndexMeta) -> Result<IndexId, StorageError> {
    conn.execute(
        "INSERT INTO index_runs (repo, commit_sha, created_at)
         VALUES (?1, ?2, COALESCE(?3, unixepoch()))",
        params![meta.repo, meta.commit, meta.created_at],
    )
    .map_err(to_storage_err)?;
    Ok(conn.last_insert_rowid())
}

/// Record what the dump's `metaData` vertex says about itself.
pub fn set_index_run_metadata(
    conn: &Connection,
    index_id: IndexId,
    project_root: Option<&str>,
    lsif_version: Option<&str>,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE index_runs
         SET project_root = COALESCE(?1, project_root),
             lsif_version = COALESCE(?2, lsif_version)
         WHERE id = ?3",
        params![project_root, lsif_version, index_id],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

pub fn get_index_run(
    conn: &Connection,
    index_id: IndexId,
) -> Result<Option<IndexRunRecord>, StorageError> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
    let mut stmt = conn.prepare_cached(&sql).map_err(to_storage_err)?;
    stmt.query_row(params![index_id], map_row)
        .optional()
        .map_err(to_storage_err)
}

/// All runs, newest first.
pub fn list_index_runs(conn: &Connection) -> Result<Vec<IndexRunRecord>, StorageError> {
    let sql = format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC");
    let mut stmt = conn.prepare_cached(&sql).map_err(to_storage_err)?;
    let rows = stmt.query_map([], map_row).map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

pub fn count_index_runs(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM index_runs", [], |row| row.get(0))
        .map_err(to_storage_err)
}
