//! Per-run row counts.

use codenav_core::errors::StorageError;
use codenav_core::types::IndexId;
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::to_storage_err;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub documents: i64,
    pub ranges: i64,
    pub result_sets: i64,
    pub monikers: i64,
    pub hover_results: i64,
    pub packages: i64,
    pub definitions_items: i64,
    pub references_items: i64,
    pub occurrences: i64,
}

pub fn index_stats(conn: &Connection, index_id: IndexId) -> Result<IndexStats, StorageError> {
    conn.query_row(
        "SELECT
            (SELECT COUNT(*) FROM documents WHERE index_id = ?1),
            (SELECT COUNT(*) FROM ranges r JOIN documents d ON d.id = r.document_id
                WHERE d.index_id = ?1),
            (SELECT COUNT(*) FROM result_sets WHERE index_id = ?1),
            (SELECT COUNT(*) FROM monikers WHERE index_id = ?1),
            (SELECT COUNT(*) FROM hover_results WHERE index_id = ?1),
            (SELECT COUNT(*) FROM package_information WHERE index_id = ?1),
            (SELECT COUNT(*) FROM definitions_items WHERE index_id = ?1),
            (SELECT COUNT(*) FROM references_items WHERE index_id = ?1),
            (SELECT COUNT(*) FROM occurrences WHERE index_id = ?1)",
        params![index_id],
        |row| {
            Ok(IndexStats {
                documents: row.get(0)?,
                ranges: row.get(1)?,
                result_sets: row.get(2)?,
                monikers: row.get(3)?,
                hover_results: row.get(4)?,
                packages: row.get(5)?,
                definitions_items: row.get(6)?,
                references_items: row.get(7)?,
                occurrences: row.get(8)?,
            })
        },
    )
    .map_err(to_storage_err)
}
