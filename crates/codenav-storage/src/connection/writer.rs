//! Write transaction helper.

use codenav_core::errors::StorageError;
use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::to_storage_err;

/// Execute a write operation inside a `BEGIN IMMEDIATE` transaction.
///
/// The write lock is taken at transaction start, so a concurrent writer
/// surfaces as `SQLITE_BUSY` here instead of mid-transaction. If `f` returns
/// an error the transaction is rolled back when it drops.
pub fn with_immediate_transaction<F, T, E>(conn: &Connection, f: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<StorageError>,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(to_storage_err)?;

    let result = f(&tx)?;

    tx.commit().map_err(to_storage_err)?;

    Ok(result)
}
