//! Ranked recall over recent history.
//!
//! A linear scan of a recency-bounded window, not a search engine: each item
//! is scored against the query, non-matches are dropped, and the rest are
//! ordered by score with recency as the tie-break.

use chrono::{DateTime, Duration, Utc};

use crate::error::Result;
use crate::item::Item;
use crate::storage::Store;

/// Default number of recent items examined per query.
pub const DEFAULT_SCAN_LIMIT: usize = 80;

/// Default number of ranked results returned.
pub const DEFAULT_OUT_LIMIT: usize = 20;

/// Query options. Zero limits fall back to the defaults; `now` overrides the
/// recency reference point (for tests).
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Bound on items examined.
    pub scan_limit: usize,
    /// Bound on items returned.
    pub out_limit: usize,
    /// Recency reference; defaults to the wall clock.
    pub now: Option<DateTime<Utc>>,
}

/// Read-only ranked search over a [`Store`]. Never mutates it.
#[derive(Debug)]
pub struct SearchService<S> {
    store: S,
}

impl<S: Store> SearchService<S> {
    /// Create a search service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Rank recent items against a substring query.
    ///
    /// An empty (after trim) query returns an empty result, not an error.
    ///
    /// # Errors
    ///
    /// Propagates store errors unchanged.
    pub fn query(&self, q: &str, opts: SearchOptions) -> Result<Vec<Item>> {
        let scan_limit = if opts.scan_limit == 0 {
            DEFAULT_SCAN_LIMIT
        } else {
            opts.scan_limit
        };
        let out_limit = if opts.out_limit == 0 {
            DEFAULT_OUT_LIMIT
        } else {
            opts.out_limit
        };
        let now = opts.now.unwrap_or_else(Utc::now);

        let q = q.trim().to_lowercase();
        if q.is_empty() {
            return Ok(Vec::new());
        }

        let items = self.store.list_recent(scan_limit)?;

        let mut scored: Vec<(i64, Item)> = Vec::with_capacity(items.len());
        for item in items {
            let content = item.content.to_lowercase();

            let match_score = score_match(&content, &q);
            if match_score == 0 {
                continue;
            }

            let mut score = match_score;

            if item.pinned {
                score += 5000;
            }

            score += recency_bonus(now - item.last_seen_at);

            scored.push((score, item));
        }

        scored.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then_with(|| b.1.last_seen_at.cmp(&a.1.last_seen_at))
        });

        scored.truncate(out_limit);
        Ok(scored.into_iter().map(|(_, item)| item).collect())
    }
}

/// Base match score: exact strongest, then prefix, then substring with
/// earlier occurrences slightly better (floor at 1000). Zero means no match.
fn score_match(content: &str, q: &str) -> i64 {
    if content == q {
        return 3000;
    }
    if content.starts_with(q) {
        return 2000;
    }
    if let Some(idx) = content.find(q) {
        let idx = i64::try_from(idx).unwrap_or(i64::MAX);
        return 1000 + (200 - idx).max(0);
    }
    0
}

/// Tiered bonus for recently-seen items.
fn recency_bonus(age: Duration) -> i64 {
    if age < Duration::minutes(10) {
        400
    } else if age < Duration::hours(1) {
        250
    } else if age < Duration::hours(24) {
        120
    } else if age < Duration::days(7) {
        40
    } else {
        0
    }
}
