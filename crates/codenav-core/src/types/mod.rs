//! Domain types shared by the storage, ingest, and query crates.

pub mod index;
pub mod position;
pub mod roles;

pub use index::{IndexId, IndexMeta};
pub use position::{Location, Position, Span};
pub use roles::{BucketKind, OccurrenceRole};
