//! Innermost-range resolution agrees with a brute-force scan.

#[path = "../common/mod.rs"]
mod common;

use codenav_core::types::{Position, Span};
use codenav_query::Navigator;
use codenav_storage::DatabaseManager;
use proptest::prelude::*;
use serde_json::{json, Value};

use common::{edge, ingest_records, range, vertex};

const URI: &str = "file:///p.rs";

fn span_strategy() -> impl Strategy<Value = Span> {
    (0u32..6, 0u32..10, 0u32..3, 1u32..8).prop_map(|(sl, sc, dl, w)| {
        if dl == 0 {
            Span::from_coords(sl, sc, sl, sc + w)
        } else {
            Span::from_coords(sl, sc, sl + dl, w)
        }
    })
}

/// One range per span, each with its own result set and hover text `r{i}`.
fn dump(spans: &[Span]) -> Vec<Value> {
    let mut records = vec![vertex(1, "document", json!({"uri": URI}))];
    let mut next_id = 2;
    let mut id = || {
        next_id += 1;
        next_id
    };
    let mut range_ids = Vec::new();
    for (i, s) in spans.iter().enumerate() {
        let (r, rs, h) = (id(), id(), id());
        records.push(range(r, s.start.line, s.start.character, s.end.line, s.end.character));
        records.push(vertex(rs, "resultSet", json!({})));
        records.push(vertex(h, "hoverResult", json!({"result": {"contents": format!("r{i}")}})));
        records.push(edge(id(), "next", json!({"outV": r, "inV": rs})));
        records.push(edge(id(), "textDocument/hover", json!({"outV": rs, "inV": h})));
        range_ids.push(r);
    }
    records.push(edge(id(), "contains", json!({"outV": 1, "inVs": range_ids})));
    records
}

/// Index of the covering span with the smallest (line span, character span),
/// earliest first on ties.
fn brute_force(spans: &[Span], p: Position) -> Option<usize> {
    spans
        .iter()
        .enumerate()
        .filter(|(_, s)| s.start <= p && p < s.end)
        .min_by_key(|(i, s)| (s.line_span(), s.character_span(), *i))
        .map(|(i, _)| i)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn innermost_matches_brute_force(
        spans in prop::collection::vec(span_strategy(), 1..12),
        probes in prop::collection::vec((0u32..9, 0u32..16), 1..20),
    ) {
        let db = DatabaseManager::open_in_memory().unwrap();
        let index_id = ingest_records(&db, &dump(&spans));
        let nav = Navigator::new(&db);

        for (line, character) in probes {
            let p = Position { line, character };
            let got = nav.hover(index_id, URI, p).unwrap();
            let want = brute_force(&spans, p).map(|i| format!("r{i}"));
            prop_assert_eq!(got, want, "position {:?} spans {:?}", p, spans);
        }
    }

    #[test]
    fn covering_range_contains_position(
        spans in prop::collection::vec(span_strategy(), 1..8),
        line in 0u32..9,
        character in 0u32..16,
    ) {
        let db = DatabaseManager::open_in_memory().unwrap();
        let index_id = ingest_records(&db, &dump(&spans));
        let nav = Navigator::new(&db);
        let p = Position { line, character };

        if let Some(text) = nav.hover(index_id, URI, p).unwrap() {
            let i: usize = text[1..].parse().unwrap();
            prop_assert!(spans[i].contains(p));
        } else {
            prop_assert!(spans.iter().all(|s| !s.contains(p)));
        }
    }
}
