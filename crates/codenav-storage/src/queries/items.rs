//! definitions_items and references_items queries.
//!
//! Items are keyed by (index_id, result_id) where result_id is the bucket id
//! a result set points at. Lookups return locations in store order.

use codenav_core::errors::StorageError;
use codenav_core::types::{IndexId, Location, Span};
use rusqlite::{params, Connection, Row};

use crate::to_storage_err;

fn map_location(row: &Row<'_>) -> rusqlite::Result<Location> {
    Ok(Location {
        uri: row.get(0)?,
        range: Span::from_coords(row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?),
    })
}

pub fn insert_definition_item(
    conn: &Connection,
    index_id: IndexId,
    result_id: i64,
    document_id: i64,
    range_id: i64,
) -> Result<(), StorageError> {
    conn.prepare_cached(
        "INSERT INTO definitions_items (index_id, result_id, document_id, range_id)
         VALUES (?1, ?2, ?3, ?4)",
    )
    .and_then(|mut stmt| stmt.execute(params![index_id, result_id, document_id, range_id]))
    .map_err(to_storage_err)?;
    Ok(())
}

pub fn insert_reference_item(
    conn: &Connection,
    index_id: IndexId,
    result_id: i64,
    document_id: i64,
    range_id: i64,
    is_definition: bool,
) -> Result<(), StorageError> {
    conn.prepare_cached(
        "INSERT INTO references_items (index_id, result_id, document_id, range_id, is_definition)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .and_then(|mut stmt| {
        stmt.execute(params![index_id, result_id, document_id, range_id, is_definition])
    })
    .map_err(to_storage_err)?;
    Ok(())
}

/// Locations in a definitions bucket.
pub fn definition_locations(
    conn: &Connection,
    index_id: IndexId,
    result_id: i64,
) -> Result<Vec<Location>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT d.uri, r.start_line, r.start_character, r.end_line, r.end_character
             FROM definitions_items di
             JOIN documents d ON d.id = di.document_id
             JOIN ranges r ON r.id = di.range_id
             WHERE di.index_id = ?1 AND di.result_id = ?2
             ORDER BY di.id",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![index_id, result_id], map_location)
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

/// Locations in a references bucket. Definition-flagged items are dropped
/// unless `include_definitions` is set.
pub fn reference_locations(
    conn: &Connection,
    index_id: IndexId,
    result_id: i64,
    include_definitions: bool,
) -> Result<Vec<Location>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT d.uri, r.start_line, r.start_character, r.end_line, r.end_character
             FROM references_items ri
             JOIN documents d ON d.id = ri.document_id
             JOIN ranges r ON r.id = ri.range_id
             WHERE ri.index_id = ?1 AND ri.result_id = ?2
               AND (?3 OR ri.is_definition = 0)
             ORDER BY ri.id",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![index_id, result_id, include_definitions], map_location)
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

/// Locations in a bucket regardless of which item table holds them.
/// Type-definition and implementation buckets land in either table
/// depending on the producer's `property` choice.
pub fn bucket_locations(
    conn: &Connection,
    index_id: IndexId,
    result_id: i64,
) -> Result<Vec<Location>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT d.uri, r.start_line, r.start_character, r.end_line, r.end_character
             FROM (
                 SELECT 0 AS src, id, document_id, range_id FROM definitions_items
                 WHERE index_id = ?1 AND result_id = ?2
                 UNION ALL
                 SELECT 1 AS src, id, document_id, range_id FROM references_items
                 WHERE index_id = ?1 AND result_id = ?2
             ) it
             JOIN documents d ON d.id = it.document_id
             JOIN ranges r ON r.id = it.range_id
             ORDER BY it.src, it.id",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![index_id, result_id], map_location)
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}
