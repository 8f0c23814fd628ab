//! Capture pipeline for clipvault.
//!
//! Turns raw text into a stored, deduplicated, classified item:
//! normalize, privacy-filter, fingerprint, classify, persist, then enforce
//! retention.

use tracing::{debug, trace};

use crate::detect::detect_type;
use crate::error::Result;
use crate::fingerprint::fingerprint;
use crate::item::Item;
use crate::normalize::normalize;
use crate::privacy::PrivacyFilter;
use crate::storage::{PutMode, Store};

/// Default maximum number of retained items.
pub const DEFAULT_MAX_ITEMS: usize = 5000;

/// Extra rows scanned past `max_items` when looking for eviction candidates.
/// Bounds the cost of retention per capture; an item older than the window
/// may occasionally outlive one inside it.
const RETENTION_SCAN_MARGIN: usize = 200;

/// Capture behavior configuration.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Retention ceiling. Pinned items may push the live count above this.
    pub max_items: usize,
    /// Skip a capture whose fingerprint equals the immediately preceding
    /// accepted capture's.
    pub dedupe_consecutive: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            dedupe_consecutive: true,
        }
    }
}

/// Orchestrates the capture pipeline against a [`Store`].
///
/// The consecutive-dedupe state is scoped to this instance and assumes
/// sequential, single-caller invocation; concurrent callers must serialize
/// externally or the guard degrades to best-effort.
#[derive(Debug)]
pub struct CaptureService<S> {
    store: S,
    privacy: Option<PrivacyFilter>,
    config: CaptureConfig,
    /// Fingerprint of the most recent accepted capture in this session.
    last_fingerprint: Option<String>,
}

impl<S: Store> CaptureService<S> {
    /// Create a capture service. A zero `max_items` falls back to the
    /// default ceiling.
    pub fn new(store: S, privacy: Option<PrivacyFilter>, mut config: CaptureConfig) -> Self {
        if config.max_items == 0 {
            config.max_items = DEFAULT_MAX_ITEMS;
        }
        Self {
            store,
            privacy,
            config,
            last_fingerprint: None,
        }
    }

    /// Process one piece of raw text through the capture pipeline.
    ///
    /// Returns `Ok(Some(item))` when the text was stored, `Ok(None)` when it
    /// was filtered out (empty, privacy-ignored, or a consecutive
    /// duplicate) — being filtered is not an error.
    ///
    /// # Errors
    ///
    /// Propagates store errors unchanged.
    pub fn process_text(&mut self, raw: &str) -> Result<Option<Item>> {
        let normalized = normalize(raw);
        if normalized.is_empty() {
            trace!("skipping empty capture");
            return Ok(None);
        }

        if let Some(filter) = &self.privacy {
            if filter.should_ignore(&normalized) {
                debug!("capture ignored by privacy filter");
                return Ok(None);
            }
        }

        let fp = fingerprint(&normalized);
        if self.config.dedupe_consecutive
            && !fp.is_empty()
            && self.last_fingerprint.as_deref() == Some(fp.as_str())
        {
            trace!("skipping consecutive duplicate");
            return Ok(None);
        }

        let now = self.store.now();
        let item = Item {
            id: String::new(),
            content_type: detect_type(&normalized),
            content: normalized,
            fingerprint: fp.clone(),
            created_at: now,
            last_seen_at: now,
            pinned: false,
        };

        // cross-history dedupe happens inside the store
        let stored = self.store.put(item, PutMode::Insert)?;
        self.last_fingerprint = Some(fp);

        self.enforce_retention()?;

        Ok(Some(stored))
    }

    /// Evict the oldest non-pinned items until the recent window fits the
    /// configured ceiling.
    ///
    /// Scans at most `max_items + RETENTION_SCAN_MARGIN` rows. Individual
    /// delete failures (e.g. an item already gone) are skipped, not
    /// propagated; persistent failure can leave the store over its ceiling.
    ///
    /// # Errors
    ///
    /// Propagates the listing error, if any.
    pub fn enforce_retention(&self) -> Result<()> {
        let window = self
            .store
            .list_recent(self.config.max_items + RETENTION_SCAN_MARGIN)?;
        if window.len() <= self.config.max_items {
            return Ok(());
        }

        let mut over = window.len() - self.config.max_items;
        for item in window.iter().rev() {
            if over == 0 {
                break;
            }
            if item.pinned || item.id.is_empty() {
                continue;
            }
            match self.store.delete(&item.id) {
                Ok(()) => over -= 1,
                Err(e) => {
                    debug!(id = %item.id, error = %e, "eviction delete failed, skipping");
                }
            }
        }
        Ok(())
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn service(max_items: usize) -> CaptureService<MemoryStore> {
        CaptureService::new(
            MemoryStore::new(),
            None,
            CaptureConfig {
                max_items,
                dedupe_consecutive: true,
            },
        )
    }

    #[test]
    fn test_ignores_empty_input() {
        let mut svc = service(10);
        let got = svc.process_text("   \n\t ").unwrap();
        assert!(got.is_none());
        assert_eq!(svc.store().count().unwrap(), 0);
    }

    #[test]
    fn test_privacy_filter_drops_content() {
        let pf = PrivacyFilter::new(vec!["token=".to_string()], false).unwrap();
        let mut svc = CaptureService::new(MemoryStore::new(), Some(pf), CaptureConfig::default());

        let got = svc.process_text("my token=abc").unwrap();
        assert!(got.is_none());
        assert_eq!(svc.store().count().unwrap(), 0);
    }

    #[test]
    fn test_consecutive_dedupe() {
        let mut svc = service(10);

        let first = svc.process_text("hello  world").unwrap();
        let second = svc.process_text("hello world").unwrap();

        assert!(first.is_some());
        assert!(second.is_none(), "whitespace variant should dedupe");
        assert_eq!(svc.store().count().unwrap(), 1);
    }

    #[test]
    fn test_dedupe_resets_on_different_content() {
        let mut svc = service(10);

        assert!(svc.process_text("alpha").unwrap().is_some());
        assert!(svc.process_text("beta").unwrap().is_some());
        // alpha is no longer the last accepted fingerprint, so it is captured
        // again — and collapses onto its original row in the store
        let again = svc.process_text("alpha").unwrap().unwrap();
        assert_eq!(svc.store().count().unwrap(), 2);

        let first = svc
            .store()
            .list_recent(10)
            .unwrap()
            .into_iter()
            .find(|i| i.content == "alpha")
            .unwrap();
        assert_eq!(first.id, again.id);
    }

    #[test]
    fn test_filtered_capture_does_not_update_dedupe_state() {
        let pf = PrivacyFilter::new(vec!["secret".to_string()], false).unwrap();
        let mut svc = CaptureService::new(MemoryStore::new(), Some(pf), CaptureConfig::default());

        assert!(svc.process_text("hello").unwrap().is_some());
        assert!(svc.process_text("secret stuff").unwrap().is_none());
        // still deduped against "hello", the last *accepted* capture
        assert!(svc.process_text("hello").unwrap().is_none());
    }

    #[test]
    fn test_cross_history_upsert_preserves_identity() {
        let mut svc = service(10);

        let first = svc.process_text("alpha").unwrap().unwrap();
        svc.process_text("beta").unwrap();
        let merged = svc.process_text("alpha").unwrap().unwrap();

        assert_eq!(merged.id, first.id);
        assert_eq!(merged.created_at, first.created_at);
        assert!(merged.last_seen_at >= first.last_seen_at);
        assert_eq!(svc.store().count().unwrap(), 2);
    }

    #[test]
    fn test_retention_evicts_oldest_non_pinned() {
        let mut svc = service(2);

        svc.process_text("one").unwrap();
        svc.process_text("two").unwrap();

        // pin the oldest
        let items = svc.store().list_recent(10).unwrap();
        assert_eq!(items.len(), 2);
        let oldest = items.last().unwrap().clone();
        assert_eq!(oldest.content, "one");
        svc.store().set_pinned(&oldest.id, true).unwrap();

        // third capture evicts "two", the oldest non-pinned
        svc.process_text("three").unwrap();

        let items = svc.store().list_recent(10).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().any(|i| i.content == "one"));
        assert!(items.iter().any(|i| i.content == "three"));
    }

    #[test]
    fn test_all_pinned_may_exceed_ceiling() {
        use crate::item::{ContentType, Item};

        let svc = service(2);

        // three pinned rows, one over the ceiling
        for content in ["one", "two", "three"] {
            let now = svc.store().now();
            let item = Item {
                id: String::new(),
                content: content.to_string(),
                content_type: ContentType::Text,
                fingerprint: fingerprint(content),
                created_at: now,
                last_seen_at: now,
                pinned: false,
            };
            let stored = svc.store().put(item, PutMode::Insert).unwrap();
            svc.store().set_pinned(&stored.id, true).unwrap();
        }

        // no eviction candidates: over-ceiling is an accepted state
        svc.enforce_retention().unwrap();
        assert_eq!(svc.store().count().unwrap(), 3);
    }

    #[test]
    fn test_zero_max_items_falls_back_to_default() {
        let svc = CaptureService::new(
            MemoryStore::new(),
            None,
            CaptureConfig {
                max_items: 0,
                dedupe_consecutive: true,
            },
        );
        assert_eq!(svc.config.max_items, DEFAULT_MAX_ITEMS);
    }

    #[test]
    fn test_detects_type_on_capture() {
        let mut svc = service(10);
        let item = svc
            .process_text("https://example.com/path")
            .unwrap()
            .unwrap();
        assert_eq!(item.content_type, crate::item::ContentType::Url);
    }
}
