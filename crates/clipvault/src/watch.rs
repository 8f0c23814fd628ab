//! System clipboard watching.
//!
//! The watcher is a small capability with two variants: an active polling
//! implementation and an "unsupported" stub that reports a distinct error
//! instead of silently doing nothing. The variant is chosen once at startup
//! from configuration, never by conditional compilation at call sites.
//!
//! Change notifications travel on a capacity-1 channel: if the consumer has
//! not drained the pending notification yet, a redundant one is dropped. The
//! consumer reads the clipboard text itself when it gets around to the
//! notification, so dropped notifications lose nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clipboard_rs::{Clipboard, ClipboardContext};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::interval;
use tracing::{debug, trace};

use crate::config::WatchConfig;
use crate::error::{Error, Result};

/// A cloneable handle used to stop a running watcher cooperatively.
#[derive(Debug, Clone, Default)]
pub struct WatchHandle {
    stop_signal: Arc<AtomicBool>,
}

impl WatchHandle {
    /// Create a new handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal the watcher to stop.
    pub fn stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Check if the stop signal has been sent.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.stop_signal.load(Ordering::SeqCst)
    }
}

/// The clipboard watching capability.
#[async_trait]
pub trait ClipboardWatcher: Send + Sync {
    /// Read the current clipboard text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClipboardRead`] if the clipboard cannot be accessed,
    /// or [`Error::WatchUnsupported`] for the stub variant.
    fn read_text(&self) -> Result<String>;

    /// Start watching for clipboard changes.
    ///
    /// Returns the capacity-1 notification channel. The background task stops
    /// when the handle is signalled or the receiver is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WatchUnsupported`] for the stub variant.
    async fn watch(&self, handle: WatchHandle) -> Result<mpsc::Receiver<()>>;
}

/// Offer a notification without blocking, dropping it if one is pending.
///
/// Returns `false` when the receiver is gone and the watcher should stop.
fn offer_notice(tx: &mpsc::Sender<()>) -> bool {
    match tx.try_send(()) {
        Ok(()) | Err(TrySendError::Full(())) => true,
        Err(TrySendError::Closed(())) => false,
    }
}

/// Read the clipboard once. A fresh context per read keeps the poll task
/// free of non-`Send` state across await points.
fn read_clipboard_once() -> Result<String> {
    let ctx = ClipboardContext::new().map_err(|e| Error::clipboard_read(e.to_string()))?;
    match ctx.get_text() {
        Ok(text) => Ok(text),
        // non-text clipboard content is "nothing to read", not a failure
        Err(_) => Ok(String::new()),
    }
}

/// Watches the system clipboard by polling on a fixed interval.
#[derive(Debug)]
pub struct PollingWatcher {
    poll_interval: Duration,
}

impl PollingWatcher {
    /// Create a watcher polling at the given interval.
    #[must_use]
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }
}

#[async_trait]
impl ClipboardWatcher for PollingWatcher {
    fn read_text(&self) -> Result<String> {
        read_clipboard_once()
    }

    async fn watch(&self, handle: WatchHandle) -> Result<mpsc::Receiver<()>> {
        let (tx, rx) = mpsc::channel(1);
        let poll_interval = self.poll_interval;

        tokio::spawn(async move {
            let mut ticker = interval(poll_interval);
            let mut last_hash: Option<String> = None;

            loop {
                ticker.tick().await;
                if handle.should_stop() || tx.is_closed() {
                    debug!("clipboard watcher stopping");
                    break;
                }

                let text = match read_clipboard_once() {
                    Ok(text) => text,
                    Err(e) => {
                        trace!(error = %e, "clipboard poll failed");
                        continue;
                    }
                };
                if text.is_empty() {
                    continue;
                }

                let hash = blake3::hash(text.as_bytes()).to_hex().to_string();
                if last_hash.as_deref() == Some(hash.as_str()) {
                    continue;
                }
                last_hash = Some(hash);

                trace!("clipboard changed");
                if !offer_notice(&tx) {
                    break;
                }
            }
        });

        Ok(rx)
    }
}

/// Stub watcher for platforms or configurations without clipboard access.
#[derive(Debug, Default)]
pub struct UnsupportedWatcher;

#[async_trait]
impl ClipboardWatcher for UnsupportedWatcher {
    fn read_text(&self) -> Result<String> {
        Err(Error::WatchUnsupported)
    }

    async fn watch(&self, _handle: WatchHandle) -> Result<mpsc::Receiver<()>> {
        Err(Error::WatchUnsupported)
    }
}

/// Choose the watcher variant for this process from configuration.
#[must_use]
pub fn select_watcher(config: &WatchConfig) -> Box<dyn ClipboardWatcher> {
    if config.enabled {
        Box::new(PollingWatcher::new(Duration::from_millis(
            config.poll_interval_ms,
        )))
    } else {
        Box::new(UnsupportedWatcher)
    }
}
