//! Storage layer for clipvault.
//!
//! Defines the persistence contract and two implementations that must behave
//! identically: a durable `SQLite` store and a volatile in-memory store. The
//! contract's central correctness requirement is that upsert-by-fingerprint,
//! recency ordering, and pin/delete/count are observably the same in both;
//! the shared test suite at the bottom of this module runs against each.

pub mod memory;
pub mod schema;
pub mod sqlite;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::Result;
use crate::item::Item;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// How a [`Store::put`] should treat the incoming item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutMode {
    /// Insert a new row, or — when the fingerprint is non-empty and already
    /// belongs to a live row — refresh that row instead (the cross-session
    /// dedupe mechanism). Preserves `id`, `created_at`, and `pinned` of the
    /// existing row and moves it to the front of recency order.
    Insert,

    /// Update an existing row identified by `id`: `content`, `content_type`,
    /// `fingerprint`, `last_seen_at`. Preserves `created_at` and `pinned`.
    Merge,
}

/// The persistence contract both backends honor.
pub trait Store {
    /// Persist an item. Returns the stored item with its assigned or
    /// preserved identity fields filled in.
    ///
    /// # Errors
    ///
    /// Returns a validation error for missing required fields (durable
    /// backend) or a backend I/O error on storage failure. Neither is
    /// retried internally.
    fn put(&self, item: Item, mode: PutMode) -> Result<Item>;

    /// List up to `limit` items ordered by `last_seen_at` descending.
    ///
    /// # Errors
    ///
    /// Returns a backend I/O error on storage failure.
    fn list_recent(&self, limit: usize) -> Result<Vec<Item>>;

    /// Pin or unpin the item with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if no such item exists.
    fn set_pinned(&self, id: &str, pinned: bool) -> Result<()>;

    /// Delete the item with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if no such item exists.
    fn delete(&self, id: &str) -> Result<()>;

    /// Count all live items.
    ///
    /// # Errors
    ///
    /// Returns a backend I/O error on storage failure.
    fn count(&self) -> Result<usize>;

    /// The store's clock. Capture timestamps come from here so tests can
    /// observe a single time source.
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<S: Store + ?Sized> Store for &S {
    fn put(&self, item: Item, mode: PutMode) -> Result<Item> {
        (**self).put(item, mode)
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<Item>> {
        (**self).list_recent(limit)
    }

    fn set_pinned(&self, id: &str, pinned: bool) -> Result<()> {
        (**self).set_pinned(id, pinned)
    }

    fn delete(&self, id: &str) -> Result<()> {
        (**self).delete(id)
    }

    fn count(&self) -> Result<usize> {
        (**self).count()
    }

    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Format a timestamp as fixed-width RFC 3339 nanosecond text.
///
/// Fixed width keeps lexicographic order equal to chronological order, which
/// the `SQLite` backend relies on for `ORDER BY last_seen_at`.
#[must_use]
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a stored timestamp, falling back to now on malformed text.
#[must_use]
pub fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(
        |_| {
            tracing::warn!(value = %s, "unparseable stored timestamp");
            Utc::now()
        },
        |dt| dt.with_timezone(&Utc),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ContentType;
    use chrono::Duration;

    fn item_at(content: &str, fp: &str, ts: DateTime<Utc>) -> Item {
        Item {
            id: String::new(),
            content: content.to_string(),
            content_type: ContentType::Text,
            fingerprint: fp.to_string(),
            created_at: ts,
            last_seen_at: ts,
            pinned: false,
        }
    }

    #[test]
    fn test_timestamp_round_trip() {
        let now = Utc::now();
        let text = format_timestamp(now);
        assert_eq!(parse_timestamp(&text), now);
    }

    #[test]
    fn test_timestamp_text_sorts_chronologically() {
        let base = Utc::now();
        let earlier = format_timestamp(base);
        let later = format_timestamp(base + Duration::nanoseconds(1));
        assert!(earlier < later);
    }

    #[test]
    fn test_parse_timestamp_garbage_falls_back() {
        let before = Utc::now();
        let parsed = parse_timestamp("not a timestamp");
        assert!(parsed >= before);
    }

    /// Shared contract suite: every assertion here must hold for both
    /// backends.
    fn run_contract_suite<S: Store>(store: &S) {
        let t0 = Utc::now();

        // insert assigns an id
        let a = store
            .put(item_at("alpha", "fp-a", t0), PutMode::Insert)
            .unwrap();
        assert!(!a.id.is_empty());
        assert_eq!(store.count().unwrap(), 1);

        // a second distinct fingerprint is a second row
        let b = store
            .put(item_at("beta", "fp-b", t0 + Duration::seconds(1)), PutMode::Insert)
            .unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.count().unwrap(), 2);

        // recency order is last_seen_at descending
        let listed = store.list_recent(10).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, b.id);
        assert_eq!(listed[1].id, a.id);

        // upsert-by-fingerprint: same fingerprint collapses into the first
        // row, preserving id/created_at/pinned and refreshing the rest
        store.set_pinned(&a.id, true).unwrap();
        let t2 = t0 + Duration::seconds(2);
        let mut reinsert = item_at("alpha again", "fp-a", t2);
        reinsert.content_type = ContentType::Code;
        let merged = store.put(reinsert, PutMode::Insert).unwrap();
        assert_eq!(merged.id, a.id);
        assert_eq!(merged.created_at, a.created_at);
        assert!(merged.pinned);
        assert_eq!(merged.content, "alpha again");
        assert_eq!(merged.content_type, ContentType::Code);
        assert_eq!(merged.last_seen_at, t2);
        assert_eq!(store.count().unwrap(), 2);

        // and the upserted row moved to the front of recency order
        let listed = store.list_recent(10).unwrap();
        assert_eq!(listed[0].id, a.id);
        assert_eq!(listed[1].id, b.id);

        // empty fingerprints never deduplicate
        let e1 = store
            .put(item_at("no fp 1", "", t0 + Duration::seconds(3)), PutMode::Insert)
            .unwrap();
        let e2 = store
            .put(item_at("no fp 2", "", t0 + Duration::seconds(4)), PutMode::Insert)
            .unwrap();
        assert_ne!(e1.id, e2.id);
        assert_eq!(store.count().unwrap(), 4);

        // merge updates fields by id, preserving created_at/pinned
        let t5 = t0 + Duration::seconds(5);
        let mut patch = item_at("alpha patched", "fp-a2", t5);
        patch.id = a.id.clone();
        let patched = store.put(patch, PutMode::Merge).unwrap();
        assert_eq!(patched.id, a.id);
        assert_eq!(patched.created_at, a.created_at);
        assert!(patched.pinned);
        assert_eq!(patched.fingerprint, "fp-a2");
        let listed = store.list_recent(1).unwrap();
        assert_eq!(listed[0].content, "alpha patched");

        // unpin, delete, and the not-found cases
        store.set_pinned(&a.id, false).unwrap();
        assert!(!store.list_recent(1).unwrap()[0].pinned);
        store.delete(&e2.id).unwrap();
        assert_eq!(store.count().unwrap(), 3);
        assert!(store.delete(&e2.id).unwrap_err().is_not_found());
        assert!(store
            .set_pinned("no-such-id", true)
            .unwrap_err()
            .is_not_found());

        // limit semantics
        assert!(store.list_recent(0).unwrap().is_empty());
        assert_eq!(store.list_recent(2).unwrap().len(), 2);
        assert_eq!(store.list_recent(100).unwrap().len(), 3);
    }

    #[test]
    fn test_contract_memory() {
        let store = MemoryStore::new();
        run_contract_suite(&store);
    }

    #[test]
    fn test_contract_sqlite() {
        let store = SqliteStore::open_in_memory().unwrap();
        run_contract_suite(&store);
    }
}
