//! symbols queries and full-text symbol search.

use codenav_core::errors::StorageError;
use codenav_core::types::IndexId;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::to_storage_err;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolRecord {
    pub id: i64,
    pub scheme: String,
    pub identifier: String,
    pub qualified_name: String,
    pub kind: Option<String>,
}

/// A search hit with its occurrence count in the queried run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolMatch {
    pub symbol: SymbolRecord,
    pub occurrence_count: i64,
}

/// Display name for a moniker identifier.
///
/// `::`-separated paths are kept whole. Otherwise the text after the last
/// `:` is used, which drops a leading document or module prefix
/// (`"src/a.ts:foo.bar"` becomes `"foo.bar"`).
pub fn derive_qualified_name(identifier: &str) -> &str {
    if identifier.contains("::") {
        return identifier;
    }
    match identifier.rsplit_once(':') {
        Some((_, tail)) if !tail.is_empty() => tail,
        _ => identifier,
    }
}

/// Insert the symbol for `(scheme, identifier)` if absent and return its id.
pub fn upsert_symbol(
    conn: &Connection,
    scheme: &str,
    identifier: &str,
    kind: Option<&str>,
) -> Result<i64, StorageError> {
    conn.prepare_cached(
        "INSERT INTO symbols (scheme, identifier, qualified_name, kind)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (scheme, identifier) DO NOTHING",
    )
    .and_then(|mut stmt| {
        stmt.execute(params![
            scheme,
            identifier,
            derive_qualified_name(identifier),
            kind
        ])
    })
    .map_err(to_storage_err)?;

    conn.prepare_cached("SELECT id FROM symbols WHERE scheme = ?1 AND identifier = ?2")
        .and_then(|mut stmt| stmt.query_row(params![scheme, identifier], |row| row.get(0)))
        .map_err(to_storage_err)
}

pub fn get_symbol(conn: &Connection, symbol_id: i64) -> Result<Option<SymbolRecord>, StorageError> {
    conn.query_row(
        "SELECT id, scheme, identifier, qualified_name, kind FROM symbols WHERE id = ?1",
        params![symbol_id],
        |row| {
            Ok(SymbolRecord {
                id: row.get(0)?,
                scheme: row.get(1)?,
                identifier: row.get(2)?,
                qualified_name: row.get(3)?,
                kind: row.get(4)?,
            })
        },
    )
    .optional()
    .map_err(to_storage_err)
}

/// Run an FTS5 `MATCH` expression against symbol names.
///
/// Occurrence counts are scoped to `index_id`; symbols with no occurrences in
/// that run are still returned with a count of 0. Ordered by qualified name.
pub fn search_symbols(
    conn: &Connection,
    index_id: IndexId,
    fts_query: &str,
    limit: usize,
) -> Result<Vec<SymbolMatch>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT s.id, s.scheme, s.identifier, s.qualified_name, s.kind,
                    COALESCE(oc.cnt, 0)
             FROM symbol_fts
             JOIN symbols s ON s.id = symbol_fts.rowid
             LEFT JOIN (
                 SELECT symbol_id, COUNT(*) AS cnt
                 FROM occurrences
                 WHERE index_id = ?2
                 GROUP BY symbol_id
             ) oc ON oc.symbol_id = s.id
             WHERE symbol_fts MATCH ?1
             ORDER BY s.qualified_name ASC, s.id ASC
             LIMIT ?3",
        )
        .map_err(to_storage_err)?;

    let rows = stmt
        .query_map(params![fts_query, index_id, limit as i64], |row| {
            Ok(SymbolMatch {
                symbol: SymbolRecord {
                    id: row.get(0)?,
                    scheme: row.get(1)?,
                    identifier: row.get(2)?,
                    qualified_name: row.get(3)?,
                    kind: row.get(4)?,
                },
                occurrence_count: row.get(5)?,
            })
        })
        .map_err(to_storage_err)?;

    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

/// Delete symbols no moniker links to any more.
pub fn prune_orphan_symbols(conn: &Connection) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM symbols
         WHERE NOT EXISTS (SELECT 1 FROM moniker_symbols ms WHERE ms.symbol_id = symbols.id)",
        [],
    )
    .map_err(to_storage_err)
}
