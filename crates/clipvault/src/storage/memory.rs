//! Volatile in-memory store.
//!
//! Used for tests and ephemeral sessions. A single reader/writer lock spans
//! the whole data+index structure so readers never observe a
//! partially-applied put.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::item::Item;

use super::{PutMode, Store};

#[derive(Debug, Default)]
struct Inner {
    seq: u64,
    by_id: HashMap<String, Item>,
    /// Dedupe index: fingerprint -> id. The empty sentinel is never indexed.
    by_fingerprint: HashMap<String, String>,
    /// Item ids, newest first.
    order: Vec<String>,
}

impl Inner {
    fn move_to_front(&mut self, id: &str) {
        if let Some(pos) = self.order.iter().position(|x| x == id) {
            self.order.remove(pos);
        }
        self.order.insert(0, id.to_string());
    }
}

/// Volatile store for captured items.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn put(&self, mut item: Item, mode: PutMode) -> Result<Item> {
        let mut inner = self.inner.write().expect("store lock poisoned");

        if mode == PutMode::Merge {
            if let Some(existing) = inner.by_id.get(&item.id).cloned() {
                if existing.fingerprint != item.fingerprint
                    && !existing.fingerprint.is_empty()
                {
                    inner.by_fingerprint.remove(&existing.fingerprint);
                }
                item.created_at = existing.created_at;
                item.pinned = existing.pinned;
                if !item.fingerprint.is_empty() {
                    inner
                        .by_fingerprint
                        .insert(item.fingerprint.clone(), item.id.clone());
                }
                inner.by_id.insert(item.id.clone(), item.clone());
                let id = item.id.clone();
                inner.move_to_front(&id);
                return Ok(item);
            }
            // fall through to insert semantics for unknown ids
        }

        if mode == PutMode::Insert && !item.fingerprint.is_empty() {
            if let Some(id) = inner.by_fingerprint.get(&item.fingerprint).cloned() {
                if let Some(existing) = inner.by_id.get(&id).cloned() {
                    item.id = existing.id;
                    item.created_at = existing.created_at;
                    item.pinned = existing.pinned;
                    inner.by_id.insert(item.id.clone(), item.clone());
                    let id = item.id.clone();
                    inner.move_to_front(&id);
                    return Ok(item);
                }
            }
        }

        if item.id.is_empty() {
            inner.seq += 1;
            item.id = format!("mem-{}", inner.seq);
        }
        if !item.fingerprint.is_empty() {
            inner
                .by_fingerprint
                .insert(item.fingerprint.clone(), item.id.clone());
        }
        inner.by_id.insert(item.id.clone(), item.clone());
        let id = item.id.clone();
        inner.move_to_front(&id);
        Ok(item)
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<Item>> {
        let inner = self.inner.read().expect("store lock poisoned");

        let limit = limit.min(inner.order.len());
        let mut out = Vec::with_capacity(limit);
        for id in inner.order.iter().take(limit) {
            if let Some(item) = inner.by_id.get(id) {
                out.push(item.clone());
            }
        }
        Ok(out)
    }

    fn set_pinned(&self, id: &str, pinned: bool) -> Result<()> {
        let mut inner = self.inner.write().expect("store lock poisoned");

        match inner.by_id.get_mut(id) {
            Some(item) => {
                item.pinned = pinned;
                Ok(())
            }
            None => Err(Error::NotFound { id: id.to_string() }),
        }
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.write().expect("store lock poisoned");

        let Some(item) = inner.by_id.remove(id) else {
            return Err(Error::NotFound { id: id.to_string() });
        };
        if !item.fingerprint.is_empty() {
            inner.by_fingerprint.remove(&item.fingerprint);
        }
        inner.order.retain(|x| x != id);
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        let inner = self.inner.read().expect("store lock poisoned");
        Ok(inner.by_id.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ContentType;
    use chrono::Utc;

    fn test_item(content: &str, fingerprint: &str) -> Item {
        let now = Utc::now();
        Item {
            id: String::new(),
            content: content.to_string(),
            content_type: ContentType::Text,
            fingerprint: fingerprint.to_string(),
            created_at: now,
            last_seen_at: now,
            pinned: false,
        }
    }

    #[test]
    fn test_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let a = store.put(test_item("a", "fa"), PutMode::Insert).unwrap();
        let b = store.put(test_item("b", "fb"), PutMode::Insert).unwrap();
        assert_eq!(a.id, "mem-1");
        assert_eq!(b.id, "mem-2");
    }

    #[test]
    fn test_accepts_empty_content() {
        // required-field validation is the durable backend's job
        let store = MemoryStore::new();
        let stored = store.put(test_item("", ""), PutMode::Insert).unwrap();
        assert!(!stored.id.is_empty());
    }

    #[test]
    fn test_merge_unknown_id_inserts() {
        let store = MemoryStore::new();
        let mut item = test_item("text", "fp");
        item.id = "fresh".to_string();
        let stored = store.put(item, PutMode::Merge).unwrap();
        assert_eq!(stored.id, "fresh");
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_merge_reindexes_fingerprint() {
        let store = MemoryStore::new();
        let stored = store.put(test_item("a", "old-fp"), PutMode::Insert).unwrap();

        let mut patch = test_item("a2", "new-fp");
        patch.id = stored.id.clone();
        store.put(patch, PutMode::Merge).unwrap();

        // the old fingerprint no longer collapses inserts
        let other = store.put(test_item("b", "old-fp"), PutMode::Insert).unwrap();
        assert_ne!(other.id, stored.id);
        assert_eq!(store.count().unwrap(), 2);

        // the new fingerprint does
        let upserted = store.put(test_item("a3", "new-fp"), PutMode::Insert).unwrap();
        assert_eq!(upserted.id, stored.id);
    }

    #[test]
    fn test_delete_removes_fingerprint_index() {
        let store = MemoryStore::new();
        let stored = store.put(test_item("a", "fp"), PutMode::Insert).unwrap();
        store.delete(&stored.id).unwrap();

        let again = store.put(test_item("a", "fp"), PutMode::Insert).unwrap();
        assert_ne!(again.id, stored.id);
        assert_eq!(store.count().unwrap(), 1);
    }
}
