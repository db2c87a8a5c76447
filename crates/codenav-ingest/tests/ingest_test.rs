//! End-to-end ingestion into a migrated store.

use std::io::{self, BufReader, Read};
use std::path::PathBuf;

use codenav_core::config::IngestConfig;
use codenav_core::errors::{CodenavErrorCode, IngestError, StorageError};
use codenav_core::types::{BucketKind, IndexMeta, OccurrenceRole, Position};
use codenav_ingest::{ingest, Ingestor};
use codenav_storage::queries::{
    hover, index_runs, items, monikers, occurrences, ranges, result_sets, stats, symbols,
};
use codenav_storage::DatabaseManager;
use rusqlite::Connection;
use serde_json::{json, Value};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures/dumps")
        .join(name)
}

fn to_stream(records: &[Value]) -> String {
    records
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn v(id: i64, label: &str, extra: Value) -> Value {
    let mut obj = json!({"id": id, "type": "vertex", "label": label});
    merge(&mut obj, extra);
    obj
}

fn e(id: i64, label: &str, extra: Value) -> Value {
    let mut obj = json!({"id": id, "type": "edge", "label": label});
    merge(&mut obj, extra);
    obj
}

fn merge(target: &mut Value, extra: Value) {
    if let (Some(t), Value::Object(x)) = (target.as_object_mut(), extra) {
        t.extend(x);
    }
}

fn range(id: i64, sl: u32, sc: u32, el: u32, ec: u32) -> Value {
    v(
        id,
        "range",
        json!({"start": {"line": sl, "character": sc}, "end": {"line": el, "character": ec}}),
    )
}

/// The storage id of the range covering `(line, character)` in `uri`.
fn range_at(conn: &Connection, index_id: i64, uri: &str, line: u32, character: u32) -> Option<ranges::RangeRecord> {
    ranges::find_innermost_range(conn, index_id, uri, Position { line, character }).unwrap()
}

#[test]
fn test_round_trip_definition() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let stream = to_stream(&[
        v(1, "document", json!({"uri": "file:///a.ts"})),
        range(2, 0, 0, 0, 5),
        v(3, "resultSet", json!({})),
        v(4, "moniker", json!({"scheme": "ts", "identifier": "foo"})),
        e(5, "moniker", json!({"outV": 3, "inV": 4})),
        e(6, "contains", json!({"outV": 1, "inVs": [2]})),
        e(7, "next", json!({"outV": 2, "inV": 3})),
        e(8, "textDocument/definition", json!({"outV": 3, "inV": 42})),
        e(9, "item", json!({"outV": 42, "inVs": [2], "property": "definitions"})),
    ]);

    let report = ingest(&db, stream.as_bytes(), &IndexMeta::new()).unwrap();
    assert!(report.is_clean(), "{report:?}");
    assert_eq!(report.vertices, 4);
    assert_eq!(report.edges, 5);

    db.with_reader(|conn| {
        let hit = range_at(conn, report.index_id, "file:///a.ts", 0, 2).unwrap();
        let rs = result_sets::get_result_set(conn, hit.result_set_id.unwrap())?.unwrap();
        assert_eq!(rs.bucket(BucketKind::Definitions), Some(42));

        let locs = items::definition_locations(conn, report.index_id, 42)?;
        assert_eq!(locs.len(), 1);
        assert_eq!(locs[0].uri, "file:///a.ts");
        assert_eq!(locs[0].range, hit.span);
        Ok::<_, StorageError>(())
    })
    .unwrap();
}

#[test]
fn test_fixture_dump_counts() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let meta = IndexMeta::new().with_repo("work").with_commit("abc123");
    let report = Ingestor::new(&db)
        .ingest_path(&fixture("basic.jsonl"), &meta)
        .unwrap();

    assert_eq!(report.lines, 28);
    assert_eq!(report.vertices, 13);
    assert_eq!(report.edges, 15);
    assert_eq!(report.malformed_lines, 0);
    // The `project` vertex.
    assert_eq!(report.ignored_records, 1);
    // `contains` from the project vertex to its documents.
    assert_eq!(report.dangling_references, 1);
    assert_eq!(report.dropped_ranges, 0);

    let derivation = report.derivation.unwrap();
    assert_eq!(derivation.definitions, 1);
    assert_eq!(derivation.references, 2);

    let (run, counts) = db
        .with_reader(|conn| {
            let run = index_runs::get_index_run(conn, report.index_id)?.unwrap();
            let counts = stats::index_stats(conn, report.index_id)?;
            Ok::<_, StorageError>((run, counts))
        })
        .unwrap();

    assert_eq!(run.repo.as_deref(), Some("work"));
    assert_eq!(run.commit.as_deref(), Some("abc123"));
    assert_eq!(run.project_root.as_deref(), Some("file:///work"));
    assert_eq!(run.lsif_version.as_deref(), Some("0.5.0"));

    assert_eq!(counts.documents, 2);
    assert_eq!(counts.ranges, 3);
    assert_eq!(counts.result_sets, 1);
    assert_eq!(counts.monikers, 1);
    assert_eq!(counts.hover_results, 1);
    assert_eq!(counts.packages, 1);
    assert_eq!(counts.definitions_items, 1);
    assert_eq!(counts.references_items, 3);
    assert_eq!(counts.occurrences, 3);
}

#[test]
fn test_unclaimed_range_is_dropped() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let stream = to_stream(&[
        v(1, "document", json!({"uri": "file:///a.ts"})),
        range(2, 0, 0, 0, 5),
        range(3, 1, 0, 1, 5),
        e(4, "contains", json!({"outV": 1, "inVs": [2]})),
        e(5, "item", json!({"outV": 9, "inVs": [3]})),
    ]);

    let report = ingest(&db, stream.as_bytes(), &IndexMeta::new()).unwrap();
    assert_eq!(report.dropped_ranges, 1);
    // The item edge names the unclaimed range.
    assert_eq!(report.dangling_references, 1);

    let counts = db
        .with_reader(|conn| stats::index_stats(conn, report.index_id))
        .unwrap();
    assert_eq!(counts.ranges, 1);
    assert_eq!(counts.references_items, 0);
}

#[test]
fn test_contains_for_unknown_document_is_skipped() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let stream = to_stream(&[
        range(1, 0, 0, 0, 5),
        e(2, "contains", json!({"outV": 77, "inVs": [1]})),
    ]);

    let report = ingest(&db, stream.as_bytes(), &IndexMeta::new()).unwrap();
    assert_eq!(report.dangling_references, 1);
    assert_eq!(report.dropped_ranges, 1);
}

#[test]
fn test_malformed_lines_are_skipped() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let stream = [
        json!({"id": 1, "type": "vertex", "label": "document", "uri": "file:///a.ts"}).to_string(),
        "{not json".to_string(),
        String::new(),
        json!({"id": 2, "type": "mystery", "label": "document"}).to_string(),
        json!({"id": 3, "type": "vertex", "label": "range"}).to_string(),
        json!({"id": 4, "type": "vertex", "label": "document", "uri": "file:///b.ts"}).to_string(),
    ]
    .join("\n");

    let report = ingest(&db, stream.as_bytes(), &IndexMeta::new()).unwrap();
    assert_eq!(report.lines, 6);
    assert_eq!(report.malformed_lines, 3);
    assert_eq!(report.vertices, 2);
    assert!(!report.is_clean());

    let counts = db
        .with_reader(|conn| stats::index_stats(conn, report.index_id))
        .unwrap();
    assert_eq!(counts.documents, 2);
}

#[test]
fn test_non_utf8_line_is_malformed() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let mut stream = Vec::new();
    stream.extend_from_slice(
        json!({"id": 1, "type": "vertex", "label": "document", "uri": "file:///a.ts"})
            .to_string()
            .as_bytes(),
    );
    stream.push(b'\n');
    stream.extend_from_slice(b"{\"id\":2,\"type\":\"vertex\",\"label\":\"hoverResult\",\"result\":{\"contents\":\"\xff\xfe\"}}\n");
    stream.extend_from_slice(
        json!({"id": 3, "type": "vertex", "label": "document", "uri": "file:///b.ts"})
            .to_string()
            .as_bytes(),
    );

    let report = ingest(&db, stream.as_slice(), &IndexMeta::new()).unwrap();
    assert_eq!(report.lines, 3);
    assert_eq!(report.malformed_lines, 1);
    assert_eq!(report.vertices, 2);

    let counts = db
        .with_reader(|conn| stats::index_stats(conn, report.index_id))
        .unwrap();
    assert_eq!(counts.documents, 2);
}

/// Yields `data`, then fails.
struct FailingReader {
    data: io::Cursor<Vec<u8>>,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.data.read(buf)?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "stream cut"));
        }
        Ok(n)
    }
}

#[test]
fn test_stream_failure_rolls_back_run() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let good = to_stream(&[v(1, "document", json!({"uri": "file:///a.ts"}))]);
    let first = ingest(&db, good.as_bytes(), &IndexMeta::new()).unwrap();

    let mut partial = to_stream(&[
        v(1, "document", json!({"uri": "file:///b.ts"})),
        range(2, 0, 0, 0, 1),
        e(3, "contains", json!({"outV": 1, "inVs": [2]})),
    ]);
    partial.push('\n');
    let reader = BufReader::new(FailingReader {
        data: io::Cursor::new(partial.into_bytes()),
    });

    let err = ingest(&db, reader, &IndexMeta::new()).unwrap_err();
    match &err {
        IngestError::Io { line, .. } => assert_eq!(*line, 4),
        other => panic!("expected Io, got {other:?}"),
    }
    assert_eq!(err.error_code(), "INGEST_IO");

    let runs = db
        .with_reader(|conn| index_runs::list_index_runs(conn))
        .unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].id, first.index_id);

    let counts = db
        .with_reader(|conn| stats::index_stats(conn, first.index_id))
        .unwrap();
    assert_eq!(counts.documents, 1);
}

#[test]
fn test_reference_bucket_flags_definition_items() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let stream = to_stream(&[
        v(1, "document", json!({"uri": "file:///a.ts"})),
        v(2, "resultSet", json!({})),
        range(3, 0, 4, 0, 7),
        range(4, 5, 0, 5, 3),
        e(5, "contains", json!({"outV": 1, "inVs": [3, 4]})),
        e(6, "next", json!({"outV": 3, "inV": 2})),
        e(7, "next", json!({"outV": 4, "inV": 2})),
        v(8, "referenceResult", json!({})),
        e(9, "textDocument/references", json!({"outV": 2, "inV": 8})),
        e(10, "item", json!({"outV": 8, "inVs": [3], "property": "definitions"})),
        e(11, "item", json!({"outV": 8, "inVs": [4]})),
    ]);

    let report = ingest(&db, stream.as_bytes(), &IndexMeta::new()).unwrap();
    assert!(report.is_clean(), "{report:?}");

    db.with_reader(|conn| {
        let without = items::reference_locations(conn, report.index_id, 8, false)?;
        assert_eq!(without.len(), 1);
        assert_eq!(without[0].range.start, Position { line: 5, character: 0 });

        let with = items::reference_locations(conn, report.index_id, 8, true)?;
        assert_eq!(with.len(), 2);
        assert!(items::definition_locations(conn, report.index_id, 8)?.is_empty());
        Ok::<_, StorageError>(())
    })
    .unwrap();
}

#[test]
fn test_item_property_routes_unknown_buckets() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let stream = to_stream(&[
        v(1, "document", json!({"uri": "file:///a.ts"})),
        range(2, 0, 0, 0, 1),
        range(3, 1, 0, 1, 1),
        range(4, 2, 0, 2, 1),
        e(5, "contains", json!({"outV": 1, "inVs": [2, 3, 4]})),
        e(6, "item", json!({"outV": 50, "inV": 2, "property": "definitions"})),
        e(7, "item", json!({"outV": 51, "inVs": [3], "property": "declarations"})),
        e(8, "item", json!({"outV": 51, "inVs": [4], "property": "references"})),
    ]);

    let report = ingest(&db, stream.as_bytes(), &IndexMeta::new()).unwrap();

    db.with_reader(|conn| {
        assert_eq!(items::definition_locations(conn, report.index_id, 50)?.len(), 1);
        assert_eq!(items::reference_locations(conn, report.index_id, 51, false)?.len(), 2);
        Ok::<_, StorageError>(())
    })
    .unwrap();
}

#[test]
fn test_definition_bucket_items_without_property() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let stream = to_stream(&[
        v(1, "document", json!({"uri": "file:///a.ts"})),
        v(2, "resultSet", json!({})),
        range(3, 0, 0, 0, 3),
        e(4, "contains", json!({"outV": 1, "inVs": [3]})),
        e(5, "next", json!({"outV": 3, "inV": 2})),
        v(6, "definitionResult", json!({})),
        e(7, "textDocument/definition", json!({"outV": 2, "inV": 6})),
        e(8, "item", json!({"outV": 6, "inVs": [3], "document": 1})),
    ]);

    let report = ingest(&db, stream.as_bytes(), &IndexMeta::new()).unwrap();
    let counts = db
        .with_reader(|conn| stats::index_stats(conn, report.index_id))
        .unwrap();
    assert_eq!(counts.definitions_items, 1);
    assert_eq!(counts.references_items, 0);
}

#[test]
fn test_bucket_edge_from_range_follows_next_link() {
    let db = DatabaseManager::open_in_memory().unwrap();
    // `next` arrives while the range is still buffered.
    let stream = to_stream(&[
        v(1, "document", json!({"uri": "file:///a.ts"})),
        v(2, "resultSet", json!({})),
        range(3, 0, 0, 0, 3),
        e(4, "next", json!({"outV": 3, "inV": 2})),
        e(5, "textDocument/references", json!({"outV": 3, "inV": 60})),
        e(6, "contains", json!({"outV": 1, "inVs": [3]})),
        e(7, "textDocument/implementation", json!({"outV": 3, "inV": 61})),
        e(8, "textDocument/typeDefinition", json!({"outV": 99, "inV": 62})),
    ]);

    let report = ingest(&db, stream.as_bytes(), &IndexMeta::new()).unwrap();
    assert_eq!(report.dangling_references, 1);

    db.with_reader(|conn| {
        let hit = range_at(conn, report.index_id, "file:///a.ts", 0, 0).unwrap();
        let rs = result_sets::get_result_set(conn, hit.result_set_id.unwrap())?.unwrap();
        assert_eq!(rs.references_result_id, Some(60));
        assert_eq!(rs.implementation_result_id, Some(61));
        assert_eq!(rs.type_definition_result_id, None);
        Ok::<_, StorageError>(())
    })
    .unwrap();
}

#[test]
fn test_later_bucket_edge_wins() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let stream = to_stream(&[
        v(1, "resultSet", json!({})),
        e(2, "textDocument/definition", json!({"outV": 1, "inV": 10})),
        e(3, "textDocument/definition", json!({"outV": 1, "inV": 11})),
    ]);

    ingest(&db, stream.as_bytes(), &IndexMeta::new()).unwrap();
    let rs = db
        .with_reader(|conn| {
            let id: i64 = conn
                .query_row("SELECT id FROM result_sets", [], |row| row.get(0))
                .map_err(codenav_storage::to_storage_err)?;
            result_sets::get_result_set(conn, id)
        })
        .unwrap()
        .unwrap();
    assert_eq!(rs.definitions_result_id, Some(11));
}

#[test]
fn test_hover_and_moniker_links() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let report = Ingestor::new(&db)
        .ingest_path(&fixture("basic.jsonl"), &IndexMeta::new())
        .unwrap();

    db.with_reader(|conn| {
        let hit = range_at(conn, report.index_id, "file:///work/b.ts", 7, 3).unwrap();
        let rs = result_sets::get_result_set(conn, hit.result_set_id.unwrap())?.unwrap();

        let text = hover::get_hover_contents(conn, rs.hover_id.unwrap())?.unwrap();
        assert_eq!(
            text,
            "```typescript\nfunction greet(name: string): string\n```\n\nSays hello."
        );

        let moniker = monikers::get_moniker(conn, rs.moniker_id.unwrap())?.unwrap();
        assert_eq!(moniker.scheme, "tsc");
        assert_eq!(moniker.identifier, "a:greet");
        let package = moniker.package.unwrap();
        assert_eq!(package.name, "work");
        assert_eq!(package.manager.as_deref(), Some("npm"));
        assert_eq!(package.version.as_deref(), Some("1.2.0"));

        let symbol = symbols::get_symbol(conn, moniker.symbol_id.unwrap())?.unwrap();
        assert_eq!(symbol.qualified_name, "greet");
        Ok::<_, StorageError>(())
    })
    .unwrap();
}

#[test]
fn test_moniker_vertex_package_id() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let stream = to_stream(&[
        v(1, "packageInformation", json!({"name": "left-pad", "version": "1.3.0"})),
        v(2, "moniker", json!({"scheme": "npm", "identifier": "left-pad:pad", "packageInformationId": 1})),
        v(3, "resultSet", json!({})),
        e(4, "moniker", json!({"outV": 3, "inV": 2})),
    ]);

    ingest(&db, stream.as_bytes(), &IndexMeta::new()).unwrap();
    let moniker = db
        .with_reader(|conn| {
            let id: i64 = conn
                .query_row("SELECT id FROM monikers", [], |row| row.get(0))
                .map_err(codenav_storage::to_storage_err)?;
            monikers::get_moniker(conn, id)
        })
        .unwrap()
        .unwrap();
    assert_eq!(moniker.package.unwrap().name, "left-pad");
}

#[test]
fn test_occurrence_roles_and_rederive() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let ingestor = Ingestor::new(&db);
    let report = ingestor
        .ingest_path(&fixture("basic.jsonl"), &IndexMeta::new())
        .unwrap();

    let symbol_id = db
        .with_reader(|conn| {
            conn.query_row(
                "SELECT id FROM symbols WHERE identifier = 'a:greet'",
                [],
                |row| row.get::<_, i64>(0),
            )
            .map_err(codenav_storage::to_storage_err)
        })
        .unwrap();

    let occs = db
        .with_reader(|conn| occurrences::occurrences_for_symbol(conn, report.index_id, symbol_id, None))
        .unwrap();
    let roles: Vec<_> = occs.iter().map(|o| o.role).collect();
    assert_eq!(
        roles,
        vec![
            OccurrenceRole::Definition,
            OccurrenceRole::Reference,
            OccurrenceRole::Reference
        ]
    );

    let again = ingestor.derive(report.index_id).unwrap();
    assert_eq!(again.total(), 0);

    let rebuilt = ingestor.rebuild(report.index_id).unwrap();
    assert_eq!(rebuilt.total(), 3);

    let count = db
        .with_reader(|conn| occurrences::count_occurrences(conn, report.index_id))
        .unwrap();
    assert_eq!(count, 3);
}

#[test]
fn test_derivation_can_be_deferred() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let config = IngestConfig {
        derive_occurrences: Some(false),
        progress_every: Some(1),
    };
    let ingestor = Ingestor::with_config(&db, config);
    let report = ingestor
        .ingest_path(&fixture("basic.jsonl"), &IndexMeta::new())
        .unwrap();
    assert!(report.derivation.is_none());

    let before = db
        .with_reader(|conn| occurrences::count_occurrences(conn, report.index_id))
        .unwrap();
    assert_eq!(before, 0);

    let stats = ingestor.derive(report.index_id).unwrap();
    assert_eq!(stats.total(), 3);
}

#[test]
fn test_derivation_failure_is_reported_and_repairable() {
    let db = DatabaseManager::open_in_memory().unwrap();
    db.with_writer(|conn| {
        conn.execute_batch(
            "CREATE TRIGGER block_occurrences BEFORE INSERT ON occurrences
             BEGIN SELECT RAISE(ABORT, 'blocked'); END;",
        )
        .map_err(codenav_storage::to_storage_err)
    })
    .unwrap();

    let stream = to_stream(&[
        v(1, "document", json!({"uri": "file:///a.ts"})),
        range(2, 0, 0, 0, 5),
        v(3, "resultSet", json!({})),
        v(4, "moniker", json!({"scheme": "ts", "identifier": "foo"})),
        e(5, "moniker", json!({"outV": 3, "inV": 4})),
        e(6, "contains", json!({"outV": 1, "inVs": [2]})),
        e(7, "next", json!({"outV": 2, "inV": 3})),
        e(8, "textDocument/definition", json!({"outV": 3, "inV": 42})),
        e(9, "item", json!({"outV": 42, "inVs": [2], "property": "definitions"})),
    ]);
    let ingestor = Ingestor::new(&db);
    let report = ingestor.ingest(stream.as_bytes(), &IndexMeta::new()).unwrap();
    assert!(report.derivation.is_none());
    assert!(report.derivation_error.is_some());

    db.with_reader(|conn| {
        let runs = index_runs::list_index_runs(conn)?;
        assert_eq!(runs.len(), 1);
        assert!(range_at(conn, report.index_id, "file:///a.ts", 0, 2).is_some());
        assert_eq!(occurrences::count_occurrences(conn, report.index_id)?, 0);
        Ok::<_, StorageError>(())
    })
    .unwrap();

    db.with_writer(|conn| {
        conn.execute_batch("DROP TRIGGER block_occurrences;")
            .map_err(codenav_storage::to_storage_err)
    })
    .unwrap();

    let stats = ingestor.derive(report.index_id).unwrap();
    assert!(stats.total() > 0);
    let count = db
        .with_reader(|conn| occurrences::count_occurrences(conn, report.index_id))
        .unwrap();
    assert_eq!(count as usize, stats.total());
}

#[test]
fn test_missing_file_is_io_error() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let err = Ingestor::new(&db)
        .ingest_path(&fixture("does-not-exist.jsonl"), &IndexMeta::new())
        .unwrap_err();
    assert!(matches!(err, IngestError::Io { line: 0, .. }));
}

#[test]
fn test_runs_share_symbols_but_not_graph() {
    let dir = tempfile::TempDir::new().unwrap();
    let db = DatabaseManager::open(&dir.path().join("codenav.db")).unwrap();
    let ingestor = Ingestor::new(&db);

    let first = ingestor
        .ingest_path(&fixture("basic.jsonl"), &IndexMeta::new().with_commit("one"))
        .unwrap();
    let second = ingestor
        .ingest_path(&fixture("basic.jsonl"), &IndexMeta::new().with_commit("two"))
        .unwrap();
    assert_ne!(first.index_id, second.index_id);

    db.with_reader(|conn| {
        assert_eq!(index_runs::count_index_runs(conn)?, 2);
        let symbol_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM symbols", [], |row| row.get(0))
            .map_err(codenav_storage::to_storage_err)?;
        assert_eq!(symbol_count, 1);

        for id in [first.index_id, second.index_id] {
            let counts = stats::index_stats(conn, id)?;
            assert_eq!(counts.ranges, 3);
            assert_eq!(counts.occurrences, 3);
            assert!(range_at(conn, id, "file:///work/a.ts", 2, 1).is_some());
        }
        Ok::<_, StorageError>(())
    })
    .unwrap();
}
