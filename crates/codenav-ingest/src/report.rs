//! Outcome of one ingest.

use codenav_core::errors::StorageError;
use codenav_core::types::IndexId;
use codenav_storage::materialized::occurrences::DerivationStats;

/// Counts and non-fatal problems from one ingest.
///
/// A report is only produced when the graph committed. Derivation runs after
/// commit; its outcome is reported here without affecting the committed run.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub index_id: IndexId,
    pub lines: usize,
    pub vertices: usize,
    pub edges: usize,
    /// Lines that were not valid JSON or not a decodable record.
    pub malformed_lines: usize,
    /// Records with a label this engine does not store.
    pub ignored_records: usize,
    /// Edge endpoints that named an unknown or unmaterialized vertex.
    pub dangling_references: usize,
    /// Range vertices never claimed by a `contains` edge.
    pub dropped_ranges: usize,
    pub derivation: Option<DerivationStats>,
    pub derivation_error: Option<StorageError>,
}

impl IngestReport {
    pub fn new(index_id: IndexId) -> Self {
        Self {
            index_id,
            ..Self::default()
        }
    }

    /// True when nothing was skipped, dropped, or failed.
    pub fn is_clean(&self) -> bool {
        self.malformed_lines == 0
            && self.dangling_references == 0
            && self.dropped_ranges == 0
            && self.derivation_error.is_none()
    }
}
