//! Navigator: the query API over a committed store.
//!
//! Position queries share one path: innermost covering range, then its
//! result set, then the bucket or link the operation asks for. Any missing
//! hop ends the query with an empty result.

use codenav_core::config::QueryConfig;
use codenav_core::errors::QueryError;
use codenav_core::types::{BucketKind, IndexId, Location, OccurrenceRole, Position};
use codenav_storage::queries::result_sets::ResultSetRecord;
use codenav_storage::queries::{
    hover, index_runs, items, monikers, occurrences, ranges, result_sets, stats, symbols,
};
use codenav_storage::{retention, DatabaseManager};
use rusqlite::Connection;
use tracing::debug;

use crate::search::build_fts_query;
use crate::{DeletionReport, IndexRunRecord, IndexStats, MonikerRecord, OccurrenceRecord, SymbolMatch};

pub struct Navigator<'a> {
    db: &'a DatabaseManager,
    config: QueryConfig,
}

impl<'a> Navigator<'a> {
    pub fn new(db: &'a DatabaseManager) -> Self {
        Self::with_config(db, QueryConfig::default())
    }

    pub fn with_config(db: &'a DatabaseManager, config: QueryConfig) -> Self {
        Self { db, config }
    }

    /// Locations in the definitions bucket of the symbol at `position`.
    pub fn goto_definition(
        &self,
        index_id: IndexId,
        uri: &str,
        position: Position,
    ) -> Result<Vec<Location>, QueryError> {
        self.db.with_reader(|conn| {
            let Some(bucket) = bucket_at(conn, index_id, uri, position, BucketKind::Definitions)? else {
                return Ok(Vec::new());
            };
            Ok(items::definition_locations(conn, index_id, bucket)?)
        })
    }

    /// Locations in the references bucket of the symbol at `position`, in
    /// store order. Definition-flagged items are included only on request.
    pub fn find_references(
        &self,
        index_id: IndexId,
        uri: &str,
        position: Position,
        include_definitions: bool,
    ) -> Result<Vec<Location>, QueryError> {
        self.db.with_reader(|conn| {
            let Some(bucket) = bucket_at(conn, index_id, uri, position, BucketKind::References)? else {
                return Ok(Vec::new());
            };
            Ok(items::reference_locations(conn, index_id, bucket, include_definitions)?)
        })
    }

    pub fn goto_type_definition(
        &self,
        index_id: IndexId,
        uri: &str,
        position: Position,
    ) -> Result<Vec<Location>, QueryError> {
        self.bucket_query(index_id, uri, position, BucketKind::TypeDefinition)
    }

    pub fn goto_implementation(
        &self,
        index_id: IndexId,
        uri: &str,
        position: Position,
    ) -> Result<Vec<Location>, QueryError> {
        self.bucket_query(index_id, uri, position, BucketKind::Implementation)
    }

    /// Hover text for the symbol at `position`.
    pub fn hover(
        &self,
        index_id: IndexId,
        uri: &str,
        position: Position,
    ) -> Result<Option<String>, QueryError> {
        self.db.with_reader(|conn| {
            let hover_id = result_set_at(conn, index_id, uri, position)?.and_then(|rs| rs.hover_id);
            match hover_id {
                Some(id) => Ok(hover::get_hover_contents(conn, id)?),
                None => Ok(None),
            }
        })
    }

    /// Moniker, symbol link, and package of the symbol at `position`.
    pub fn moniker_at(
        &self,
        index_id: IndexId,
        uri: &str,
        position: Position,
    ) -> Result<Option<MonikerRecord>, QueryError> {
        self.db.with_reader(|conn| {
            let moniker_id = result_set_at(conn, index_id, uri, position)?.and_then(|rs| rs.moniker_id);
            match moniker_id {
                Some(id) => Ok(monikers::get_moniker(conn, id)?),
                None => Ok(None),
            }
        })
    }

    /// Symbols whose name matches `query` by token prefix, ordered by
    /// qualified name, with occurrence counts from `index_id`.
    ///
    /// `limit` defaults to the configured search limit and is capped at the
    /// configured maximum. A zero limit is rejected.
    pub fn search_symbols(
        &self,
        index_id: IndexId,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<SymbolMatch>, QueryError> {
        if limit == Some(0) {
            return Err(QueryError::InvalidQuery {
                message: "search limit must be greater than zero".to_string(),
            });
        }
        let Some(fts_query) = build_fts_query(query) else {
            return Ok(Vec::new());
        };
        let limit = self.config.clamp_limit(limit);
        debug!(index_id, fts_query = %fts_query, limit, "symbol search");

        self.db
            .with_reader(|conn| Ok(symbols::search_symbols(conn, index_id, &fts_query, limit)?))
    }

    /// Derived occurrences of one symbol in one run, optionally by role.
    pub fn symbol_occurrences(
        &self,
        index_id: IndexId,
        symbol_id: i64,
        role: Option<OccurrenceRole>,
    ) -> Result<Vec<OccurrenceRecord>, QueryError> {
        self.db.with_reader(|conn| {
            Ok(occurrences::occurrences_for_symbol(conn, index_id, symbol_id, role)?)
        })
    }

    // --- Run management ---

    pub fn list_index_runs(&self) -> Result<Vec<IndexRunRecord>, QueryError> {
        self.db
            .with_reader(|conn| Ok(index_runs::list_index_runs(conn)?))
    }

    pub fn get_index_run(&self, index_id: IndexId) -> Result<Option<IndexRunRecord>, QueryError> {
        self.db
            .with_reader(|conn| Ok(index_runs::get_index_run(conn, index_id)?))
    }

    pub fn index_stats(&self, index_id: IndexId) -> Result<IndexStats, QueryError> {
        self.db
            .with_reader(|conn| Ok(stats::index_stats(conn, index_id)?))
    }

    /// Delete a run and everything scoped to it. Fails with `NotFound` for
    /// an unknown run.
    pub fn delete_index_run(&self, index_id: IndexId) -> Result<DeletionReport, QueryError> {
        self.db
            .with_writer(|conn| Ok(retention::delete_index_run(conn, index_id)?))
    }

    fn bucket_query(
        &self,
        index_id: IndexId,
        uri: &str,
        position: Position,
        kind: BucketKind,
    ) -> Result<Vec<Location>, QueryError> {
        self.db.with_reader(|conn| {
            let Some(bucket) = bucket_at(conn, index_id, uri, position, kind)? else {
                return Ok(Vec::new());
            };
            Ok(items::bucket_locations(conn, index_id, bucket)?)
        })
    }
}

/// The result set of the innermost range covering `position`.
fn result_set_at(
    conn: &Connection,
    index_id: IndexId,
    uri: &str,
    position: Position,
) -> Result<Option<ResultSetRecord>, QueryError> {
    let Some(range) = ranges::find_innermost_range(conn, index_id, uri, position)? else {
        debug!(index_id, uri, line = position.line, character = position.character, "no covering range");
        return Ok(None);
    };
    let Some(result_set_id) = range.result_set_id else {
        return Ok(None);
    };
    Ok(result_sets::get_result_set(conn, result_set_id)?)
}

fn bucket_at(
    conn: &Connection,
    index_id: IndexId,
    uri: &str,
    position: Position,
    kind: BucketKind,
) -> Result<Option<i64>, QueryError> {
    Ok(result_set_at(conn, index_id, uri, position)?.and_then(|rs| rs.bucket(kind)))
}
