//! ranges queries, including innermost-range lookup by position.

use codenav_core::errors::StorageError;
use codenav_core::types::{IndexId, Position, Span};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::to_storage_err;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeRecord {
    pub id: i64,
    pub document_id: i64,
    pub span: Span,
    pub result_set_id: Option<i64>,
}

pub fn insert_range(
    conn: &Connection,
    document_id: i64,
    span: &Span,
    result_set_id: Option<i64>,
) -> Result<i64, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO ranges (document_id, start_line, start_character,
                                 end_line, end_character, result_set_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(to_storage_err)?;
    stmt.execute(params![
        document_id,
        span.start.line,
        span.start.character,
        span.end.line,
        span.end.character,
        result_set_id,
    ])
    .map_err(to_storage_err)?;
    Ok(conn.last_insert_rowid())
}

pub fn set_range_result_set(
    conn: &Connection,
    range_id: i64,
    result_set_id: i64,
) -> Result<(), StorageError> {
    conn.prepare_cached("UPDATE ranges SET result_set_id = ?1 WHERE id = ?2")
        .and_then(|mut stmt| stmt.execute(params![result_set_id, range_id]))
        .map_err(to_storage_err)?;
    Ok(())
}

/// Find the smallest range in `uri` covering `position`.
///
/// Coverage is half-open, `start <= position < end`, compared on
/// (line, character). Among covering ranges the one with the smallest line
/// span wins, then the smallest character span, then the lowest id.
pub fn find_innermost_range(
    conn: &Connection,
    index_id: IndexId,
    uri: &str,
    position: Position,
) -> Result<Option<RangeRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT r.id, r.document_id, r.start_line, r.start_character,
                    r.end_line, r.end_character, r.result_set_id
             FROM ranges r
             JOIN documents d ON d.id = r.document_id
             WHERE d.index_id = ?1 AND d.uri = ?2
               AND r.start_line <= ?3 AND r.end_line >= ?3
               AND (r.start_line < ?3 OR r.start_character <= ?4)
               AND (r.end_line > ?3 OR r.end_character > ?4)
             ORDER BY (r.end_line - r.start_line) ASC,
                      (r.end_character - r.start_character) ASC,
                      r.id ASC
             LIMIT 1",
        )
        .map_err(to_storage_err)?;

    stmt.query_row(
        params![index_id, uri, position.line, position.character],
        |row| {
            Ok(RangeRecord {
                id: row.get(0)?,
                document_id: row.get(1)?,
                span: Span::from_coords(row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?),
                result_set_id: row.get(6)?,
            })
        },
    )
    .optional()
    .map_err(to_storage_err)
}

pub fn count_ranges_for_document(conn: &Connection, document_id: i64) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM ranges WHERE document_id = ?1",
        params![document_id],
        |row| row.get(0),
    )
    .map_err(to_storage_err)
}
