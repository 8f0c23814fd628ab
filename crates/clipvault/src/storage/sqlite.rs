//! Durable `SQLite`-backed store.
//!
//! Uses WAL journaling with `synchronous=NORMAL`: a small update-loss window
//! on crash is accepted in exchange for responsiveness on every capture.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::item::{ContentType, Item};

use super::schema;
use super::{format_timestamp, parse_timestamp, PutMode, Store};

/// Durable store for captured items.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a store database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// and initializes the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // WAL + relaxed durability; see module docs
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        schema::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        schema::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Find the live row holding the given fingerprint, if any.
    fn find_by_fingerprint(&self, fingerprint: &str) -> Result<Option<Item>> {
        let result = self
            .conn
            .query_row(
                r"
                SELECT id, content, content_type, fingerprint, created_at, last_seen_at, pinned
                FROM items WHERE fingerprint = ?1 LIMIT 1
                ",
                [fingerprint],
                Self::row_to_item,
            )
            .optional()?;
        Ok(result)
    }

    /// Convert a database row to an [`Item`].
    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<Item> {
        let created_at: String = row.get(4)?;
        let last_seen_at: String = row.get(5)?;
        let content_type: String = row.get(2)?;
        let pinned: i64 = row.get(6)?;

        Ok(Item {
            id: row.get(0)?,
            content: row.get(1)?,
            content_type: ContentType::from_str_lossy(&content_type),
            fingerprint: row.get(3)?,
            created_at: parse_timestamp(&created_at),
            last_seen_at: parse_timestamp(&last_seen_at),
            pinned: pinned != 0,
        })
    }
}

impl Store for SqliteStore {
    fn put(&self, mut item: Item, mode: PutMode) -> Result<Item> {
        if item.content.is_empty() {
            return Err(Error::MissingField { field: "content" });
        }

        match mode {
            PutMode::Insert => {
                if !item.fingerprint.is_empty() {
                    if let Some(existing) = self.find_by_fingerprint(&item.fingerprint)? {
                        debug!(
                            id = %existing.id,
                            "fingerprint already present, refreshing existing row"
                        );
                        self.conn.execute(
                            r"
                            UPDATE items SET content = ?1, content_type = ?2, last_seen_at = ?3
                            WHERE id = ?4
                            ",
                            params![
                                item.content,
                                item.content_type.as_str(),
                                format_timestamp(item.last_seen_at),
                                existing.id,
                            ],
                        )?;
                        item.id = existing.id;
                        item.created_at = existing.created_at;
                        item.pinned = existing.pinned;
                        return Ok(item);
                    }
                }

                if item.id.is_empty() {
                    item.id = uuid::Uuid::new_v4().to_string();
                }
                self.conn.execute(
                    r"
                    INSERT INTO items (id, content, content_type, fingerprint, created_at, last_seen_at, pinned)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    ",
                    params![
                        item.id,
                        item.content,
                        item.content_type.as_str(),
                        item.fingerprint,
                        format_timestamp(item.created_at),
                        format_timestamp(item.last_seen_at),
                        i64::from(item.pinned),
                    ],
                )?;
                Ok(item)
            }

            PutMode::Merge => {
                if item.id.is_empty() {
                    return Err(Error::MissingField { field: "id" });
                }
                let existing = self
                    .conn
                    .query_row(
                        "SELECT created_at, pinned FROM items WHERE id = ?1",
                        [&item.id],
                        |row| {
                            let created_at: String = row.get(0)?;
                            let pinned: i64 = row.get(1)?;
                            Ok((created_at, pinned != 0))
                        },
                    )
                    .optional()?
                    .ok_or_else(|| Error::NotFound {
                        id: item.id.clone(),
                    })?;

                self.conn.execute(
                    r"
                    UPDATE items SET content = ?1, content_type = ?2, fingerprint = ?3, last_seen_at = ?4
                    WHERE id = ?5
                    ",
                    params![
                        item.content,
                        item.content_type.as_str(),
                        item.fingerprint,
                        format_timestamp(item.last_seen_at),
                        item.id,
                    ],
                )?;
                item.created_at = parse_timestamp(&existing.0);
                item.pinned = existing.1;
                Ok(item)
            }
        }
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<Item>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, content, content_type, fingerprint, created_at, last_seen_at, pinned
            FROM items ORDER BY last_seen_at DESC LIMIT ?1
            ",
        )?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let items = stmt
            .query_map([limit_i64], Self::row_to_item)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(items)
    }

    fn set_pinned(&self, id: &str, pinned: bool) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE items SET pinned = ?1 WHERE id = ?2",
            params![i64::from(pinned), id],
        )?;
        if affected == 0 {
            return Err(Error::NotFound { id: id.to_string() });
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let affected = self.conn.execute("DELETE FROM items WHERE id = ?1", [id])?;
        if affected == 0 {
            return Err(Error::NotFound { id: id.to_string() });
        }
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
