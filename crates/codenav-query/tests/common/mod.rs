//! Stream builders and store setup shared by the query tests.
#![allow(dead_code)]

use std::path::PathBuf;

use codenav_core::types::IndexMeta;
use codenav_storage::DatabaseManager;
use serde_json::{json, Value};

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures/dumps")
        .join(name)
}

pub fn vertex(id: i64, label: &str, extra: Value) -> Value {
    record(id, "vertex", label, extra)
}

pub fn edge(id: i64, label: &str, extra: Value) -> Value {
    record(id, "edge", label, extra)
}

fn record(id: i64, kind: &str, label: &str, extra: Value) -> Value {
    let mut obj = json!({"id": id, "type": kind, "label": label});
    if let (Some(target), Value::Object(fields)) = (obj.as_object_mut(), extra) {
        target.extend(fields);
    }
    obj
}

pub fn range(id: i64, sl: u32, sc: u32, el: u32, ec: u32) -> Value {
    vertex(
        id,
        "range",
        json!({"start": {"line": sl, "character": sc}, "end": {"line": el, "character": ec}}),
    )
}

/// Ingest `records` as one run and return its id.
pub fn ingest_records(db: &DatabaseManager, records: &[Value]) -> i64 {
    let stream = records
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    codenav_ingest::ingest(db, stream.as_bytes(), &IndexMeta::new())
        .unwrap()
        .index_id
}

pub fn ingest_fixture(db: &DatabaseManager, name: &str) -> i64 {
    codenav_ingest::Ingestor::new(db)
        .ingest_path(&fixture(name), &IndexMeta::new())
        .unwrap()
        .index_id
}
