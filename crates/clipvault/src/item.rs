//! Core item types for clipvault.
//!
//! This module defines the single persisted entity: a captured, normalized,
//! classified clipboard snippet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The detected kind of a snippet's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Plain text (the fallback classification).
    Text,
    /// An absolute URL with scheme and host.
    Url,
    /// Shell-command-looking text.
    Command,
    /// Source-code-looking text.
    Code,
}

impl ContentType {
    /// The stable textual form stored in the database and export files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Url => "url",
            Self::Command => "command",
            Self::Code => "code",
        }
    }

    /// Parse the stored textual form back into a content type.
    ///
    /// Unknown values fall back to `Text` so old rows stay readable.
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "url" => Self::Url,
            "command" => Self::Command,
            "code" => Self::Code,
            _ => Self::Text,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A captured clipboard snippet.
///
/// Identity for deduplication is the `fingerprint`; the `id` is assigned by
/// the store on first insert and is stable for the item's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Opaque identity assigned by the store. Empty before first insert.
    pub id: String,

    /// Normalized, length-bounded text content.
    pub content: String,

    /// Detected content kind.
    pub content_type: ContentType,

    /// Hash of `content` used as the dedupe key. The empty string is a
    /// sentinel meaning "do not deduplicate".
    pub fingerprint: String,

    /// When this logical item was first inserted. Never changes.
    pub created_at: DateTime<Utc>,

    /// When this item was last captured or merged.
    pub last_seen_at: DateTime<Utc>,

    /// Pinned items are exempt from retention eviction.
    pub pinned: bool,
}

impl Item {
    /// Check if the item content is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
