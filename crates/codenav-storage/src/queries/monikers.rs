//! monikers and moniker_symbols queries.

use codenav_core::errors::StorageError;
use codenav_core::types::IndexId;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use super::packages::PackageRecord;
use crate::to_storage_err;

/// A moniker with its resolved symbol and optional package provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonikerRecord {
    pub id: i64,
    pub scheme: String,
    pub identifier: String,
    pub kind: Option<String>,
    pub symbol_id: Option<i64>,
    pub package: Option<PackageRecord>,
}

pub fn insert_moniker(
    conn: &Connection,
    index_id: IndexId,
    scheme: &str,
    identifier: &str,
    kind: Option<&str>,
    package_id: Option<i64>,
) -> Result<i64, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO monikers (index_id, scheme, identifier, kind, package_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .map_err(to_storage_err)?;
    stmt.execute(params![index_id, scheme, identifier, kind, package_id])
        .map_err(to_storage_err)?;
    Ok(conn.last_insert_rowid())
}

pub fn set_moniker_package(
    conn: &Connection,
    moniker_id: i64,
    package_id: i64,
) -> Result<(), StorageError> {
    conn.prepare_cached("UPDATE monikers SET package_id = ?1 WHERE id = ?2")
        .and_then(|mut stmt| stmt.execute(params![package_id, moniker_id]))
        .map_err(to_storage_err)?;
    Ok(())
}

/// Link a moniker to its canonical symbol. A moniker has at most one symbol.
pub fn link_moniker_symbol(
    conn: &Connection,
    moniker_id: i64,
    symbol_id: i64,
) -> Result<(), StorageError> {
    conn.prepare_cached("INSERT INTO moniker_symbols (moniker_id, symbol_id) VALUES (?1, ?2)")
        .and_then(|mut stmt| stmt.execute(params![moniker_id, symbol_id]))
        .map_err(to_storage_err)?;
    Ok(())
}

pub fn get_moniker(conn: &Connection, moniker_id: i64) -> Result<Option<MonikerRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT m.id, m.scheme, m.identifier, m.kind, ms.symbol_id,
                    p.id, p.name, p.version, p.manager
             FROM monikers m
             LEFT JOIN moniker_symbols ms ON ms.moniker_id = m.id
             LEFT JOIN package_information p ON p.id = m.package_id
             WHERE m.id = ?1",
        )
        .map_err(to_storage_err)?;

    stmt.query_row(params![moniker_id], |row| {
        let package_id: Option<i64> = row.get(5)?;
        let package = match package_id {
            Some(id) => Some(PackageRecord {
                id,
                name: row.get(6)?,
                version: row.get(7)?,
                manager: row.get(8)?,
            }),
            None => None,
        };
        Ok(MonikerRecord {
            id: row.get(0)?,
            scheme: row.get(1)?,
            identifier: row.get(2)?,
            kind: row.get(3)?,
            symbol_id: row.get(4)?,
            package,
        })
    })
    .optional()
    .map_err(to_storage_err)
}
