//! Error handling for codenav.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod error_code;
pub mod ingest_error;
pub mod query_error;
pub mod storage_error;

pub use config_error::ConfigError;
pub use error_code::CodenavErrorCode;
pub use ingest_error::IngestError;
pub use query_error::QueryError;
pub use storage_error::StorageError;
