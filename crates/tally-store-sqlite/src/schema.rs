//! SQL schema for the Tally SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per named collection (a spreadsheet tab).
CREATE TABLE IF NOT EXISTS collections (
    name        TEXT PRIMARY KEY,
    header_json TEXT NOT NULL,   -- JSON array of column names
    created_at  TEXT NOT NULL    -- RFC 3339 UTC
);

-- Data rows beneath the header, in append order.
CREATE TABLE IF NOT EXISTS rows (
    collection TEXT    NOT NULL REFERENCES collections(name) ON DELETE CASCADE,
    position   INTEGER NOT NULL,
    cells_json TEXT    NOT NULL,  -- JSON array of cell text
    PRIMARY KEY (collection, position)
);

PRAGMA user_version = 1;
";
