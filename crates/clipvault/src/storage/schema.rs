//! `SQLite` schema definitions for clipvault.
//!
//! SQL statements for creating the items table and indexes, plus versioned
//! schema initialization.

use rusqlite::Connection;

use crate::error::Result;

/// The current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// SQL statement to create the items table.
pub const CREATE_ITEMS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS items (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    content_type TEXT NOT NULL,
    fingerprint TEXT NOT NULL,
    created_at TEXT NOT NULL,
    last_seen_at TEXT NOT NULL,
    pinned INTEGER NOT NULL DEFAULT 0
)
";

/// Index on `last_seen_at` for recency-ordered listing.
pub const CREATE_LAST_SEEN_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_items_last_seen ON items(last_seen_at DESC)
";

/// Index on `fingerprint` for upsert-by-fingerprint lookups.
pub const CREATE_FINGERPRINT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_items_fingerprint ON items(fingerprint)
";

/// Index on `pinned` for eviction and pin listing.
pub const CREATE_PINNED_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_items_pinned ON items(pinned DESC)
";

/// SQL statement to create the metadata table for key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_ITEMS_TABLE,
    CREATE_LAST_SEEN_INDEX,
    CREATE_FINGERPRINT_INDEX,
    CREATE_PINNED_INDEX,
    CREATE_METADATA_TABLE,
];

/// Initialize the database schema.
///
/// Creates all tables and indexes if they don't exist and records the schema
/// version. Idempotent.
///
/// # Errors
///
/// Returns an error if schema creation fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, CURRENT_VERSION.to_string()),
    )?;
    Ok(())
}
