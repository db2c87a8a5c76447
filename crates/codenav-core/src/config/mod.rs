//! Configuration system.
//! TOML-based, layered resolution: env > project > user > defaults.

pub mod codenav_config;
pub mod ingest_config;
pub mod query_config;
pub mod storage_config;

pub use codenav_config::CodenavConfig;
pub use ingest_config::IngestConfig;
pub use query_config::QueryConfig;
pub use storage_config::StorageConfig;
