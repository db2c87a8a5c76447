//! codenav-ingest: consume a line-delimited vertex/edge stream and persist it
//! as one index run, atomically.

pub mod ingestor;
pub mod record;
pub mod remap;
pub mod report;

pub use ingestor::{ingest, Ingestor};
pub use report::IngestReport;
