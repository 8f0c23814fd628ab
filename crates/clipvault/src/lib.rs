//! `clipvault` - Clipboard history with dedup, privacy filtering, and ranked recall
//!
//! This library records clipboard-like text snippets, normalizes and
//! classifies them, deduplicates them by content fingerprint, bounds history
//! size with pin-aware retention, and supports ranked substring search over
//! recent history.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod capture;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod export;
pub mod fingerprint;
pub mod item;
pub mod logging;
pub mod normalize;
pub mod privacy;
pub mod search;
pub mod storage;
pub mod watch;

pub use capture::{CaptureConfig, CaptureService};
pub use config::Config;
pub use error::{Error, Result};
pub use item::{ContentType, Item};
pub use logging::init_logging;
pub use privacy::PrivacyFilter;
pub use search::{SearchOptions, SearchService};
pub use storage::{MemoryStore, PutMode, SqliteStore, Store};
