//! Query errors. A query that finds nothing returns an empty result, not an error.

use super::error_code::{self, CodenavErrorCode};
use super::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("invalid query: {message}")]
    InvalidQuery { message: String },
}

impl CodenavErrorCode for QueryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Storage(e) => e.error_code(),
            Self::InvalidQuery { .. } => error_code::INVALID_QUERY,
        }
    }
}
