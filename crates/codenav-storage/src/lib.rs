//! codenav-storage: SQLite persistence for ingested code-intelligence graphs.
//!
//! One serialized writer, round-robin readers over WAL, versioned migrations,
//! row-level queries per table, and the derived occurrence table.

pub mod connection;
pub mod materialized;
pub mod migrations;
pub mod queries;
pub mod retention;

pub use connection::writer::with_immediate_transaction;
pub use connection::DatabaseManager;

use codenav_core::errors::StorageError;

/// Fold a rusqlite error into `StorageError`, keeping lock contention distinct.
pub fn to_storage_err(e: rusqlite::Error) -> StorageError {
    match &e {
        rusqlite::Error::SqliteFailure(inner, _)
            if matches!(
                inner.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ) =>
        {
            StorageError::Busy {
                message: e.to_string(),
            }
        }
        _ => StorageError::SqliteError {
            message: e.to_string(),
        },
    }
}
