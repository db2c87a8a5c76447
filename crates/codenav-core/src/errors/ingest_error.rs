//! Ingestion errors.
//!
//! Only fatal conditions live here. Malformed lines and dangling references
//! are counted in the ingest report instead.

use super::error_code::{self, CodenavErrorCode};
use super::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The input stream itself failed to yield a line.
    #[error("failed to read stream at line {line}: {message}")]
    Io { line: usize, message: String },

    /// A write failed while applying a record; the whole run was rolled back.
    #[error("ingest failed at line {line} ({context}): {source}")]
    Storage {
        line: usize,
        context: String,
        #[source]
        source: StorageError,
    },

    /// Opening, committing, or otherwise managing the ingest transaction failed.
    #[error("ingest transaction failed: {0}")]
    Transaction(#[from] StorageError),

    /// The post-commit occurrence pass failed. The ingested graph is kept.
    #[error("occurrence derivation failed for index {index_id}: {source}")]
    Derivation {
        index_id: i64,
        #[source]
        source: StorageError,
    },
}

impl CodenavErrorCode for IngestError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => error_code::INGEST_IO,
            Self::Storage { source, .. } | Self::Transaction(source) => match source {
                StorageError::Busy { .. } => error_code::DB_BUSY,
                _ => error_code::INGEST_FAILED,
            },
            Self::Derivation { .. } => error_code::DERIVATION_FAILED,
        }
    }
}
