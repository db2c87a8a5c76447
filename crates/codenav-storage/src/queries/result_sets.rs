//! result_sets queries.
//!
//! Bucket fields are plain single-assignment updates: when a producer emits the
//! same `textDocument/*` edge twice for one result set, the later write wins.

use codenav_core::errors::StorageError;
use codenav_core::types::{BucketKind, IndexId};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::to_storage_err;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSetRecord {
    pub id: i64,
    pub definitions_result_id: Option<i64>,
    pub references_result_id: Option<i64>,
    pub type_definition_result_id: Option<i64>,
    pub implementation_result_id: Option<i64>,
    pub hover_id: Option<i64>,
    pub moniker_id: Option<i64>,
}

impl ResultSetRecord {
    pub fn bucket(&self, kind: BucketKind) -> Option<i64> {
        match kind {
            BucketKind::Definitions => self.definitions_result_id,
            BucketKind::References => self.references_result_id,
            BucketKind::TypeDefinition => self.type_definition_result_id,
            BucketKind::Implementation => self.implementation_result_id,
        }
    }
}

fn bucket_column(kind: BucketKind) -> &'static str {
    match kind {
        BucketKind::Definitions => "definitions_result_id",
        BucketKind::References => "references_result_id",
        BucketKind::TypeDefinition => "type_definition_result_id",
        BucketKind::Implementation => "implementation_result_id",
    }
}

pub fn insert_result_set(conn: &Connection, index_id: IndexId) -> Result<i64, StorageError> {
    conn.prepare_cached("INSERT INTO result_sets (index_id) VALUES (?1)")
        .and_then(|mut stmt| stmt.execute(params![index_id]))
        .map_err(to_storage_err)?;
    Ok(conn.last_insert_rowid())
}

/// Point one bucket field of a result set at a stream-local result id.
pub fn set_bucket(
    conn: &Connection,
    result_set_id: i64,
    kind: BucketKind,
    bucket_id: i64,
) -> Result<(), StorageError> {
    let sql = format!(
        "UPDATE result_sets SET {} = ?1 WHERE id = ?2",
        bucket_column(kind)
    );
    conn.prepare_cached(&sql)
        .and_then(|mut stmt| stmt.execute(params![bucket_id, result_set_id]))
        .map_err(to_storage_err)?;
    Ok(())
}

pub fn set_hover(conn: &Connection, result_set_id: i64, hover_id: i64) -> Result<(), StorageError> {
    conn.prepare_cached("UPDATE result_sets SET hover_id = ?1 WHERE id = ?2")
        .and_then(|mut stmt| stmt.execute(params![hover_id, result_set_id]))
        .map_err(to_storage_err)?;
    Ok(())
}

pub fn set_moniker(
    conn: &Connection,
    result_set_id: i64,
    moniker_id: i64,
) -> Result<(), StorageError> {
    conn.prepare_cached("UPDATE result_sets SET moniker_id = ?1 WHERE id = ?2")
        .and_then(|mut stmt| stmt.execute(params![moniker_id, result_set_id]))
        .map_err(to_storage_err)?;
    Ok(())
}

pub fn get_result_set(
    conn: &Connection,
    result_set_id: i64,
) -> Result<Option<ResultSetRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, definitions_result_id, references_result_id,
                    type_definition_result_id, implementation_result_id,
                    hover_id, moniker_id
             FROM result_sets WHERE id = ?1",
        )
        .map_err(to_storage_err)?;

    stmt.query_row(params![result_set_id], |row| {
        Ok(ResultSetRecord {
            id: row.get(0)?,
            definitions_result_id: row.get(1)?,
            references_result_id: row.get(2)?,
            type_definition_result_id: row.get(3)?,
            implementation_result_id: row.get(4)?,
            hover_id: row.get(5)?,
            moniker_id: row.get(6)?,
        })
    })
    .optional()
    .map_err(to_storage_err)
}
