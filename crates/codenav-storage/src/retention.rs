//! Index-run removal.
//!
//! Deleting an index run cascades through every table scoped to it. Symbols
//! are global, so once no moniker links to a symbol it is pruned too; the
//! FTS triggers remove it from the search index in the same statement.

use codenav_core::errors::StorageError;
use codenav_core::types::IndexId;
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::to_storage_err;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub index_id: IndexId,
    pub symbols_pruned: usize,
}

/// Delete one run and everything scoped to it.
///
/// Runs inside a single transaction. Returns `NotFound` if the run is absent.
pub fn delete_index_run(conn: &Connection, index_id: IndexId) -> Result<DeletionReport, StorageError> {
    // RAII transaction: rolls back on drop unless committed.
    let tx = conn.unchecked_transaction().map_err(to_storage_err)?;

    let deleted = tx
        .execute("DELETE FROM index_runs WHERE id = ?1", params![index_id])
        .map_err(to_storage_err)?;
    if deleted == 0 {
        return Err(StorageError::NotFound {
            entity: "index run",
            id: index_id,
        });
    }

    let symbols_pruned = crate::queries::symbols::prune_orphan_symbols(&tx)?;

    tx.commit().map_err(to_storage_err)?;

    tracing::info!(index_id, symbols_pruned, "deleted index run");
    Ok(DeletionReport {
        index_id,
        symbols_pruned,
    })
}
