//! JSON export of stored history.
//!
//! Records carry the stable external field names and UTC nanosecond
//! timestamps, so exports are comparable across backends and runs.

use std::io::Write;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::item::{ContentType, Item};
use crate::storage::{format_timestamp, Store};

/// One exported history record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    /// Store-assigned item id.
    pub id: String,
    /// Detected content kind.
    #[serde(rename = "type")]
    pub content_type: ContentType,
    /// Normalized content.
    pub content: String,
    /// Hex dedupe fingerprint.
    pub fingerprint: String,
    /// First-insert timestamp, RFC 3339 nanosecond UTC text.
    pub created_at: String,
    /// Last-capture timestamp, RFC 3339 nanosecond UTC text.
    pub last_seen_at: String,
    /// Whether the item is pinned.
    pub pinned: bool,
}

impl From<Item> for ExportRecord {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            content_type: item.content_type,
            content: item.content,
            fingerprint: item.fingerprint,
            created_at: format_timestamp(item.created_at),
            last_seen_at: format_timestamp(item.last_seen_at),
            pinned: item.pinned,
        }
    }
}

/// Filters applied to an export.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Maximum records to export; 0 means everything.
    pub limit: usize,
    /// Only export pinned items.
    pub pinned_only: bool,
    /// Only export items of this content type.
    pub content_type: Option<ContentType>,
    /// Only export items last seen within the past N hours.
    pub since_hours: Option<u64>,
    /// Recency reference; defaults to the wall clock.
    pub now: Option<DateTime<Utc>>,
}

/// Collect export records, newest first.
///
/// # Errors
///
/// Propagates store errors unchanged.
pub fn collect<S: Store>(store: &S, opts: &ExportOptions) -> Result<Vec<ExportRecord>> {
    let total = store.count()?;
    let items = store.list_recent(total)?;
    let now = opts.now.unwrap_or_else(Utc::now);

    // clamp so absurd --since-hours values can't overflow the timestamp math
    let cutoff = opts.since_hours.map(|h| {
        let hours = i64::try_from(h).unwrap_or(i64::MAX).min(1_000_000);
        now - Duration::hours(hours)
    });

    let mut records: Vec<ExportRecord> = items
        .into_iter()
        .filter(|item| !opts.pinned_only || item.pinned)
        .filter(|item| opts.content_type.map_or(true, |ct| item.content_type == ct))
        .filter(|item| cutoff.map_or(true, |c| item.last_seen_at >= c))
        .map(ExportRecord::from)
        .collect();

    if opts.limit > 0 {
        records.truncate(opts.limit);
    }
    Ok(records)
}

/// Write records as pretty-printed JSON.
///
/// # Errors
///
/// Returns a JSON or I/O error if writing fails.
pub fn write_json<W: Write>(writer: &mut W, records: &[ExportRecord]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, records)?;
    writer.write_all(b"\n")?;
    Ok(())
}
