//! Stable machine-readable error codes.

/// Implemented by every codenav error enum so host layers can branch on a
/// code string instead of parsing messages.
pub trait CodenavErrorCode {
    /// Returns the error code string (e.g. `"STORAGE_ERROR"`).
    fn error_code(&self) -> &'static str;

    /// Returns `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const DB_BUSY: &str = "DB_BUSY";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const INGEST_IO: &str = "INGEST_IO";
pub const INGEST_FAILED: &str = "INGEST_FAILED";
pub const DERIVATION_FAILED: &str = "DERIVATION_FAILED";
pub const INVALID_QUERY: &str = "INVALID_QUERY";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
