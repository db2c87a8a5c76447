//! package_information queries.

use codenav_core::errors::StorageError;
use codenav_core::types::IndexId;
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::to_storage_err;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageRecord {
    pub id: i64,
    pub name: String,
    pub version: Option<String>,
    pub manager: Option<String>,
}

pub fn insert_package(
    conn: &Connection,
    index_id: IndexId,
    name: &str,
    version: Option<&str>,
    manager: Option<&str>,
) -> Result<i64, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO package_information (index_id, name, version, manager)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(to_storage_err)?;
    stmt.execute(params![index_id, name, version, manager])
        .map_err(to_storage_err)?;
    Ok(conn.last_insert_rowid())
}
