//! `SQLite` schema definitions for flightcheck.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the key-value table.
pub const CREATE_KV_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create an index on `updated_at` for status queries.
pub const CREATE_UPDATED_AT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_kv_updated_at ON kv(updated_at DESC)
";

/// SQL statement to create the metadata table for schema bookkeeping.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_KV_TABLE,
    CREATE_UPDATED_AT_INDEX,
    CREATE_METADATA_TABLE,
];
