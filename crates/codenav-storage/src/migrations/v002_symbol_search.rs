//! V002 migration: FTS5 index over symbol names with sync triggers.
//!
//! External-content table over `symbols`; the triggers keep it consistent on
//! insert, update, and delete.

pub const MIGRATION_SQL: &str = r#"
CREATE VIRTUAL TABLE IF NOT EXISTS symbol_fts USING fts5(
    qualified_name,
    identifier,
    content='symbols',
    content_rowid='id',
    tokenize='unicode61 tokenchars _'
);

CREATE TRIGGER IF NOT EXISTS symbol_fts_insert AFTER INSERT ON symbols BEGIN
    INSERT INTO symbol_fts(rowid, qualified_name, identifier)
    VALUES (new.id, new.qualified_name, new.identifier);
END;

CREATE TRIGGER IF NOT EXISTS symbol_fts_delete AFTER DELETE ON symbols BEGIN
    INSERT INTO symbol_fts(symbol_fts, rowid, qualified_name, identifier)
    VALUES ('delete', old.id, old.qualified_name, old.identifier);
END;

CREATE TRIGGER IF NOT EXISTS symbol_fts_update AFTER UPDATE ON symbols BEGIN
    INSERT INTO symbol_fts(symbol_fts, rowid, qualified_name, identifier)
    VALUES ('delete', old.id, old.qualified_name, old.identifier);
    INSERT INTO symbol_fts(rowid, qualified_name, identifier)
    VALUES (new.id, new.qualified_name, new.identifier);
END;

-- Backfill symbols written before this migration.
INSERT INTO symbol_fts(symbol_fts) VALUES ('rebuild');
"#;
