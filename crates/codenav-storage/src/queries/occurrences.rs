//! occurrences read queries. Writes live in `materialized::occurrences`.

use codenav_core::errors::StorageError;
use codenav_core::types::{IndexId, Location, OccurrenceRole, Span};
use rusqlite::{params, types::Type, Connection};
use serde::Serialize;

use crate::to_storage_err;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccurrenceRecord {
    pub symbol_id: i64,
    pub role: OccurrenceRole,
    pub location: Location,
}

/// Occurrences of one symbol in one run, optionally filtered by role,
/// ordered by document then position.
pub fn occurrences_for_symbol(
    conn: &Connection,
    index_id: IndexId,
    symbol_id: i64,
    role: Option<OccurrenceRole>,
) -> Result<Vec<OccurrenceRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT o.symbol_id, o.role, d.uri,
                    r.start_line, r.start_character, r.end_line, r.end_character
             FROM occurrences o
             JOIN documents d ON d.id = o.document_id
             JOIN ranges r ON r.id = o.range_id
             WHERE o.index_id = ?1 AND o.symbol_id = ?2
               AND (?3 IS NULL OR o.role = ?3)
             ORDER BY d.uri, r.start_line, r.start_character",
        )
        .map_err(to_storage_err)?;

    let rows = stmt
        .query_map(params![index_id, symbol_id, role.map(|r| r.as_str())], |row| {
            let role_text: String = row.get(1)?;
            let role = role_text.parse::<OccurrenceRole>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(1, Type::Text, e.into())
            })?;
            Ok(OccurrenceRecord {
                symbol_id: row.get(0)?,
                role,
                location: Location {
                    uri: row.get(2)?,
                    range: Span::from_coords(row.get(3)?, row.get(4)?, row.get(5)?, row.get(6)?),
                },
            })
        })
        .map_err(to_storage_err)?;

    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

pub fn count_occurrences(conn: &Connection, index_id: IndexId) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM occurrences WHERE index_id = ?1",
        params![index_id],
        |row| row.get(0),
    )
    .map_err(to_storage_err)
}
