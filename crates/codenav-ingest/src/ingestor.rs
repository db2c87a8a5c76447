//! The graph ingestor.
//!
//! One linear pass over the stream inside one `BEGIN IMMEDIATE` transaction.
//! Later records depend on state built by earlier ones (a `contains` edge
//! needs its ranges buffered, an `item` edge needs its ranges stored), so the
//! pass is strictly sequential. Forward references that never resolve are
//! skipped, never retried.
//!
//! Occurrence derivation runs after commit as a separate transaction.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use codenav_core::config::IngestConfig;
use codenav_core::errors::{IngestError, StorageError};
use codenav_core::types::{BucketKind, IndexId, IndexMeta};
use codenav_storage::materialized::occurrences::{
    derive_occurrences, rebuild_occurrences, DerivationStats,
};
use codenav_storage::queries::{
    documents, hover, index_runs, items, monikers, packages, ranges, result_sets, symbols,
};
use codenav_storage::{with_immediate_transaction, DatabaseManager};
use rusqlite::Connection;

use crate::record::{hover_text, parse_line, Edge, Element, ItemEdge, OneEdge, Vertex};
use crate::remap::{IdMaps, PendingRange, StoredRange};
use crate::report::IngestReport;

/// Ingest a stream with default settings. See [`Ingestor::ingest`].
pub fn ingest<R: BufRead>(
    db: &DatabaseManager,
    reader: R,
    meta: &IndexMeta,
) -> Result<IngestReport, IngestError> {
    Ingestor::new(db).ingest(reader, meta)
}

pub struct Ingestor<'a> {
    db: &'a DatabaseManager,
    config: IngestConfig,
}

impl<'a> Ingestor<'a> {
    pub fn new(db: &'a DatabaseManager) -> Self {
        Self::with_config(db, IngestConfig::default())
    }

    pub fn with_config(db: &'a DatabaseManager, config: IngestConfig) -> Self {
        Self { db, config }
    }

    /// Persist one dump as a new index run.
    ///
    /// On a fatal error the transaction rolls back and no trace of the run
    /// remains. Malformed lines and dangling references are counted in the
    /// report. A derivation failure is recorded in the report; the committed
    /// graph is kept and [`Ingestor::derive`] can be retried.
    pub fn ingest<R: BufRead>(&self, reader: R, meta: &IndexMeta) -> Result<IngestReport, IngestError> {
        let progress_every = self.config.effective_progress_every();

        let mut report = self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                let index_id = index_runs::insert_index_run(tx, meta).map_err(|source| {
                    IngestError::Storage {
                        line: 0,
                        context: "index run".to_string(),
                        source,
                    }
                })?;
                let mut graph = GraphWriter::new(tx, index_id);
                graph.consume(reader, progress_every)?;
                Ok::<_, IngestError>(graph.finish())
            })
        })?;

        tracing::info!(
            index_id = report.index_id,
            lines = report.lines,
            vertices = report.vertices,
            edges = report.edges,
            malformed = report.malformed_lines,
            dangling = report.dangling_references,
            dropped_ranges = report.dropped_ranges,
            "ingested index run"
        );

        if self.config.effective_derive_occurrences() {
            match self.run_derivation(report.index_id, false) {
                Ok(stats) => report.derivation = Some(stats),
                Err(e) => {
                    tracing::error!(index_id = report.index_id, error = %e, "occurrence derivation failed");
                    report.derivation_error = Some(e);
                }
            }
        }

        Ok(report)
    }

    /// Open `path` and ingest it.
    pub fn ingest_path(&self, path: &Path, meta: &IndexMeta) -> Result<IngestReport, IngestError> {
        let file = File::open(path).map_err(|e| IngestError::Io {
            line: 0,
            message: format!("{}: {e}", path.display()),
        })?;
        self.ingest(BufReader::new(file), meta)
    }

    /// Insert missing occurrence rows for a committed run. Safe to repeat.
    pub fn derive(&self, index_id: IndexId) -> Result<DerivationStats, IngestError> {
        self.run_derivation(index_id, false)
            .map_err(|source| IngestError::Derivation { index_id, source })
    }

    /// Replace every occurrence row for a committed run.
    pub fn rebuild(&self, index_id: IndexId) -> Result<DerivationStats, IngestError> {
        self.run_derivation(index_id, true)
            .map_err(|source| IngestError::Derivation { index_id, source })
    }

    fn run_derivation(&self, index_id: IndexId, rebuild: bool) -> Result<DerivationStats, StorageError> {
        self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                if rebuild {
                    rebuild_occurrences(tx, index_id)
                } else {
                    derive_occurrences(tx, index_id)
                }
            })
        })
    }
}

/// Applies records to the store for one run. Lives for one ingest call.
struct GraphWriter<'c> {
    conn: &'c Connection,
    index_id: IndexId,
    maps: IdMaps,
    report: IngestReport,
}

impl<'c> GraphWriter<'c> {
    fn new(conn: &'c Connection, index_id: IndexId) -> Self {
        Self {
            conn,
            index_id,
            maps: IdMaps::new(),
            report: IngestReport::new(index_id),
        }
    }

    fn consume<R: BufRead>(&mut self, mut reader: R, progress_every: usize) -> Result<(), IngestError> {
        let mut buf = Vec::new();
        let mut line_no = 0;
        loop {
            buf.clear();
            let read = reader.read_until(b'\n', &mut buf).map_err(|e| IngestError::Io {
                line: line_no + 1,
                message: e.to_string(),
            })?;
            if read == 0 {
                break;
            }
            line_no += 1;
            self.report.lines += 1;

            let text = buf.trim_ascii();
            if text.is_empty() {
                continue;
            }

            // Undecodable bytes are a malformed line like any other bad JSON.
            let element = match parse_line(text) {
                Ok(element) => element,
                Err(e) => {
                    tracing::warn!(line = line_no, error = %e, "skipping malformed line");
                    self.report.malformed_lines += 1;
                    continue;
                }
            };

            let context = element.describe();
            self.apply(element).map_err(|source| IngestError::Storage {
                line: line_no,
                context: context.to_string(),
                source,
            })?;

            if line_no % progress_every == 0 {
                tracing::debug!(
                    index_id = self.index_id,
                    line = line_no,
                    pending_ranges = self.maps.pending_ranges.len(),
                    "ingest progress"
                );
            }
        }
        Ok(())
    }

    fn finish(mut self) -> IngestReport {
        self.report.dropped_ranges = self.maps.pending_ranges.len();
        if self.report.dropped_ranges > 0 {
            tracing::debug!(
                index_id = self.index_id,
                dropped = self.report.dropped_ranges,
                "discarding ranges never claimed by a contains edge"
            );
        }
        self.report
    }

    fn apply(&mut self, element: Element) -> Result<(), StorageError> {
        match element {
            Element::Vertex(vertex) => {
                self.report.vertices += 1;
                self.apply_vertex(vertex)
            }
            Element::Edge(edge) => {
                self.report.edges += 1;
                self.apply_edge(edge)
            }
        }
    }

    fn apply_vertex(&mut self, vertex: Vertex) -> Result<(), StorageError> {
        let conn = self.conn;
        let index_id = self.index_id;

        match vertex {
            Vertex::MetaData(meta) => {
                index_runs::set_index_run_metadata(
                    conn,
                    index_id,
                    meta.project_root.as_deref(),
                    meta.version.as_deref(),
                )?;
            }
            Vertex::Document(doc) => {
                let id = documents::insert_document(conn, index_id, &doc.uri, doc.language_id.as_deref())?;
                self.maps.documents.insert(doc.id, id);
            }
            Vertex::Range(range) => {
                // No owning document is known yet; wait for a contains edge.
                self.maps.pending_ranges.insert(
                    range.id,
                    PendingRange {
                        span: range.span(),
                        result_set_id: None,
                    },
                );
            }
            Vertex::ResultSet(rs) => {
                let id = result_sets::insert_result_set(conn, index_id)?;
                self.maps.result_sets.insert(rs.id, id);
            }
            Vertex::HoverResult(h) => {
                let id = hover::insert_hover_result(conn, index_id, &hover_text(&h.result))?;
                self.maps.hover_results.insert(h.id, id);
            }
            Vertex::PackageInformation(p) => {
                let id = packages::insert_package(
                    conn,
                    index_id,
                    &p.name,
                    p.version.as_deref(),
                    p.manager.as_deref(),
                )?;
                self.maps.packages.insert(p.id, id);
            }
            Vertex::Moniker(m) => {
                let package_id = m
                    .package_information_id
                    .and_then(|p| self.maps.packages.get(&p).copied());
                let id = monikers::insert_moniker(
                    conn,
                    index_id,
                    &m.scheme,
                    &m.identifier,
                    m.kind.as_deref(),
                    package_id,
                )?;
                let symbol_id = symbols::upsert_symbol(conn, &m.scheme, &m.identifier, m.kind.as_deref())?;
                monikers::link_moniker_symbol(conn, id, symbol_id)?;
                self.maps.monikers.insert(m.id, id);
            }
            Vertex::DefinitionResult(b) => self.maps.note_bucket(b.id, BucketKind::Definitions),
            Vertex::ReferenceResult(b) => self.maps.note_bucket(b.id, BucketKind::References),
            Vertex::TypeDefinitionResult(b) => {
                self.maps.note_bucket(b.id, BucketKind::TypeDefinition)
            }
            Vertex::ImplementationResult(b) => {
                self.maps.note_bucket(b.id, BucketKind::Implementation)
            }
            Vertex::Other => self.report.ignored_records += 1,
        }
        Ok(())
    }

    fn apply_edge(&mut self, edge: Edge) -> Result<(), StorageError> {
        let bucket_kind = edge.bucket_kind();
        match edge {
            Edge::Contains(e) => {
                let Some(&document_id) = self.maps.documents.get(&e.out_v) else {
                    self.dangling("contains", e.out_v);
                    return Ok(());
                };
                for range_id in e.in_vs {
                    let Some(pending) = self.maps.pending_ranges.remove(&range_id) else {
                        self.dangling("contains", range_id);
                        continue;
                    };
                    let id = ranges::insert_range(self.conn, document_id, &pending.span, pending.result_set_id)?;
                    self.maps.ranges.insert(
                        range_id,
                        StoredRange {
                            id,
                            document_id,
                            result_set_id: pending.result_set_id,
                        },
                    );
                }
            }
            Edge::Next(e) => self.apply_next(&e)?,
            Edge::Moniker(e) => {
                let (Some(rs), Some(&moniker_id)) = (
                    self.resolve_result_set(e.out_v),
                    self.maps.monikers.get(&e.in_v),
                ) else {
                    self.dangling("moniker", e.out_v);
                    return Ok(());
                };
                result_sets::set_moniker(self.conn, rs, moniker_id)?;
            }
            Edge::Hover(e) => {
                let (Some(rs), Some(&hover_id)) = (
                    self.resolve_result_set(e.out_v),
                    self.maps.hover_results.get(&e.in_v),
                ) else {
                    self.dangling("textDocument/hover", e.out_v);
                    return Ok(());
                };
                result_sets::set_hover(self.conn, rs, hover_id)?;
            }
            Edge::PackageInformation(e) => {
                let (Some(&moniker_id), Some(&package_id)) = (
                    self.maps.monikers.get(&e.out_v),
                    self.maps.packages.get(&e.in_v),
                ) else {
                    self.dangling("packageInformation", e.out_v);
                    return Ok(());
                };
                monikers::set_moniker_package(self.conn, moniker_id, package_id)?;
            }
            Edge::Item(item) => self.apply_item(&item)?,
            Edge::Definition(e)
            | Edge::References(e)
            | Edge::TypeDefinition(e)
            | Edge::Implementation(e) => {
                if let Some(kind) = bucket_kind {
                    self.apply_bucket(kind, &e)?;
                }
            }
            Edge::Other => self.report.ignored_records += 1,
        }
        Ok(())
    }

    /// `next`: range -> resultSet. Links on a still-buffered range are kept on
    /// the buffer entry and written when the range materializes.
    fn apply_next(&mut self, e: &OneEdge) -> Result<(), StorageError> {
        let Some(&result_set_id) = self.maps.result_sets.get(&e.in_v) else {
            self.dangling("next", e.in_v);
            return Ok(());
        };
        if let Some(pending) = self.maps.pending_ranges.get_mut(&e.out_v) {
            pending.result_set_id = Some(result_set_id);
        } else if let Some(stored) = self.maps.ranges.get_mut(&e.out_v) {
            ranges::set_range_result_set(self.conn, stored.id, result_set_id)?;
            stored.result_set_id = Some(result_set_id);
        } else if self.maps.result_sets.contains_key(&e.out_v) {
            // resultSet -> resultSet chains are not followed.
            self.report.ignored_records += 1;
        } else {
            self.dangling("next", e.out_v);
        }
        Ok(())
    }

    fn apply_bucket(&mut self, kind: BucketKind, e: &OneEdge) -> Result<(), StorageError> {
        self.maps.note_bucket(e.in_v, kind);
        let Some(rs) = self.resolve_result_set(e.out_v) else {
            self.dangling(kind.edge_label(), e.out_v);
            return Ok(());
        };
        result_sets::set_bucket(self.conn, rs, kind, e.in_v)
    }

    /// `item`: bucket -> ranges.
    ///
    /// The target table follows the bucket kind when one is known: a
    /// definitions bucket always fills definitions_items, and inside a
    /// references bucket `property: "definitions"` flags a definition
    /// occurrence. For buckets of unknown kind `property: "definitions"`
    /// selects definitions_items and anything else (`references`,
    /// `declarations`, none) is a plain reference.
    ///
    /// The flag is what lets `find_references` drop the definition site
    /// unless `include_definitions` is set.
    fn apply_item(&mut self, item: &ItemEdge) -> Result<(), StorageError> {
        let bucket = item.out_v;
        let to_definitions = match self.maps.bucket_kind(bucket) {
            Some(BucketKind::Definitions) => true,
            Some(BucketKind::References) => false,
            _ => item.is_definitions(),
        };
        let flagged_definition = !to_definitions && item.is_definitions();

        for range_id in item.targets() {
            let Some(stored) = self.maps.ranges.get(&range_id).copied() else {
                self.dangling("item", range_id);
                continue;
            };
            if to_definitions {
                items::insert_definition_item(self.conn, self.index_id, bucket, stored.document_id, stored.id)?;
            } else {
                items::insert_reference_item(
                    self.conn,
                    self.index_id,
                    bucket,
                    stored.document_id,
                    stored.id,
                    flagged_definition,
                )?;
            }
        }
        Ok(())
    }

    fn resolve_result_set(&self, stream_id: i64) -> Option<i64> {
        self.maps.resolve_result_set(stream_id)
    }

    fn dangling(&mut self, label: &str, stream_id: i64) {
        self.report.dangling_references += 1;
        tracing::debug!(index_id = self.index_id, label, stream_id, "unresolved edge endpoint, skipping");
    }
}
