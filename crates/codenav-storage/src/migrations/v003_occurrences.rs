//! V003 migration: derived occurrence table.
//!
//! One row per (index, symbol, document, range). Rebuilt from the item tables
//! by `materialized::occurrences`; never written by ingestion.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS occurrences (
    index_id INTEGER NOT NULL REFERENCES index_runs(id) ON DELETE CASCADE,
    symbol_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
    document_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    range_id INTEGER NOT NULL REFERENCES ranges(id) ON DELETE CASCADE,
    role TEXT NOT NULL CHECK (role IN ('definition', 'reference', 'implementation', 'type')),
    PRIMARY KEY (index_id, symbol_id, document_id, range_id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_occurrences_document ON occurrences(document_id);
CREATE INDEX IF NOT EXISTS idx_occurrences_range ON occurrences(range_id);
CREATE INDEX IF NOT EXISTS idx_occurrences_symbol ON occurrences(symbol_id);
"#;
