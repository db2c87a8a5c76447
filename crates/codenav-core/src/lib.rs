//! codenav-core: shared types, error enums, configuration, and tracing setup
//! for the offline code-intelligence store.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod types;
