//! Occurrence derivation: flatten item buckets into (symbol, location, role).
//!
//! Every insert is `INSERT OR IGNORE` against the occurrence primary key, so
//! re-running the pass on an unchanged graph adds nothing. Passes run in a
//! fixed order (definitions, references, implementations, types); when one
//! location is reachable under several roles, the first pass to reach it
//! decides the role.

use codenav_core::errors::StorageError;
use codenav_core::types::IndexId;
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::to_storage_err;

/// Rows inserted by one derivation run, per role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DerivationStats {
    pub definitions: usize,
    pub references: usize,
    pub implementations: usize,
    pub types: usize,
}

impl DerivationStats {
    pub fn total(&self) -> usize {
        self.definitions + self.references + self.implementations + self.types
    }
}

const DERIVE_DEFINITIONS: &str = "
    INSERT OR IGNORE INTO occurrences (index_id, symbol_id, document_id, range_id, role)
    SELECT DISTINCT di.index_id, ms.symbol_id, di.document_id, di.range_id, 'definition'
    FROM definitions_items di
    JOIN result_sets rs
      ON rs.index_id = di.index_id AND rs.definitions_result_id = di.result_id
    JOIN moniker_symbols ms ON ms.moniker_id = rs.moniker_id
    WHERE di.index_id = ?1";

const DERIVE_REFERENCES: &str = "
    INSERT OR IGNORE INTO occurrences (index_id, symbol_id, document_id, range_id, role)
    SELECT DISTINCT ri.index_id, ms.symbol_id, ri.document_id, ri.range_id,
           CASE WHEN ri.is_definition = 1 THEN 'definition' ELSE 'reference' END
    FROM references_items ri
    JOIN result_sets rs
      ON rs.index_id = ri.index_id AND rs.references_result_id = ri.result_id
    JOIN moniker_symbols ms ON ms.moniker_id = rs.moniker_id
    WHERE ri.index_id = ?1";

const DERIVE_IMPLEMENTATIONS: &str = "
    INSERT OR IGNORE INTO occurrences (index_id, symbol_id, document_id, range_id, role)
    SELECT DISTINCT ri.index_id, ms.symbol_id, ri.document_id, ri.range_id, 'implementation'
    FROM references_items ri
    JOIN result_sets rs
      ON rs.index_id = ri.index_id AND rs.implementation_result_id = ri.result_id
    JOIN moniker_symbols ms ON ms.moniker_id = rs.moniker_id
    WHERE ri.index_id = ?1";

const DERIVE_TYPES: &str = "
    INSERT OR IGNORE INTO occurrences (index_id, symbol_id, document_id, range_id, role)
    SELECT DISTINCT ri.index_id, ms.symbol_id, ri.document_id, ri.range_id, 'type'
    FROM references_items ri
    JOIN result_sets rs
      ON rs.index_id = ri.index_id AND rs.type_definition_result_id = ri.result_id
    JOIN moniker_symbols ms ON ms.moniker_id = rs.moniker_id
    WHERE ri.index_id = ?1";

/// Insert any missing occurrence rows for one run.
pub fn derive_occurrences(conn: &Connection, index_id: IndexId) -> Result<DerivationStats, StorageError> {
    let run = |sql: &str| {
        conn.execute(sql, params![index_id])
            .map_err(to_storage_err)
    };

    let stats = DerivationStats {
        definitions: run(DERIVE_DEFINITIONS)?,
        references: run(DERIVE_REFERENCES)?,
        implementations: run(DERIVE_IMPLEMENTATIONS)?,
        types: run(DERIVE_TYPES)?,
    };

    tracing::info!(
        index_id,
        definitions = stats.definitions,
        references = stats.references,
        implementations = stats.implementations,
        types = stats.types,
        "derived occurrences"
    );
    Ok(stats)
}

/// Drop and re-derive every occurrence row for one run.
///
/// Callers wrap this in a transaction so readers never see the empty state.
pub fn rebuild_occurrences(conn: &Connection, index_id: IndexId) -> Result<DerivationStats, StorageError> {
    let removed = conn
        .execute("DELETE FROM occurrences WHERE index_id = ?1", params![index_id])
        .map_err(to_storage_err)?;
    tracing::debug!(index_id, removed, "cleared occurrences for rebuild");
    derive_occurrences(conn, index_id)
}
