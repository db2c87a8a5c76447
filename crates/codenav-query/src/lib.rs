//! codenav-query: navigation over committed index runs.
//!
//! Every operation is a read-only, single-shot query scoped to one index run.
//! A miss (no covering range, no bucket, no items) is an empty result.

pub mod navigator;
pub mod search;

pub use navigator::Navigator;
pub use search::build_fts_query;

pub use codenav_storage::queries::index_runs::IndexRunRecord;
pub use codenav_storage::queries::monikers::MonikerRecord;
pub use codenav_storage::queries::occurrences::OccurrenceRecord;
pub use codenav_storage::queries::stats::IndexStats;
pub use codenav_storage::queries::symbols::SymbolMatch;
pub use codenav_storage::retention::DeletionReport;
