//! Per-ingest id remapping from stream-local ids to storage ids.
//!
//! Owned by one ingest call and dropped when it returns, so concurrent
//! ingests of different dumps never share state.

use codenav_core::types::{BucketKind, Span};
use rustc_hash::FxHashMap;

/// A range vertex seen in the stream but not yet claimed by a `contains` edge.
#[derive(Debug, Clone, Copy)]
pub struct PendingRange {
    pub span: Span,
    /// Storage id of the result set named by a `next` edge seen while pending.
    pub result_set_id: Option<i64>,
}

/// A range row that has been written.
#[derive(Debug, Clone, Copy)]
pub struct StoredRange {
    pub id: i64,
    pub document_id: i64,
    pub result_set_id: Option<i64>,
}

#[derive(Debug, Default)]
pub struct IdMaps {
    pub documents: FxHashMap<i64, i64>,
    pub result_sets: FxHashMap<i64, i64>,
    pub monikers: FxHashMap<i64, i64>,
    pub hover_results: FxHashMap<i64, i64>,
    pub packages: FxHashMap<i64, i64>,
    pub pending_ranges: FxHashMap<i64, PendingRange>,
    pub ranges: FxHashMap<i64, StoredRange>,
    /// Bucket kinds learned from result vertices and `textDocument/*` edges.
    pub buckets: FxHashMap<i64, BucketKind>,
}

impl IdMaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a `range` or `resultSet` stream id to a result-set storage id.
    /// Ranges resolve through their `next` link, whether pending or stored.
    pub fn resolve_result_set(&self, stream_id: i64) -> Option<i64> {
        if let Some(&id) = self.result_sets.get(&stream_id) {
            return Some(id);
        }
        if let Some(stored) = self.ranges.get(&stream_id) {
            return stored.result_set_id;
        }
        self.pending_ranges
            .get(&stream_id)
            .and_then(|pending| pending.result_set_id)
    }

    /// Record the kind of a bucket. The first kind learned for an id sticks.
    pub fn note_bucket(&mut self, bucket_id: i64, kind: BucketKind) {
        self.buckets.entry(bucket_id).or_insert(kind);
    }

    pub fn bucket_kind(&self, bucket_id: i64) -> Option<BucketKind> {
        self.buckets.get(&bucket_id).copied()
    }
}
