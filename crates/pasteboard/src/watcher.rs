//! Clipboard watcher - background thread that polls for content changes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::source::PasteboardSource;

/// Default polling interval. Polling trades a little latency for change
/// detection that works across process boundaries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Callback type for detected clipboard changes. Receives the trimmed text.
pub type ChangeCallback = Arc<dyn Fn(String) + Send + Sync + 'static>;

/// Background poller for clipboard changes.
///
/// Fires the callback exactly once per detected change carrying a non-empty
/// text payload; changes with no text representation or whitespace-only
/// text are consumed silently.
pub struct ClipboardWatcher {
    running: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl Default for ClipboardWatcher {
    fn default() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }
}

impl ClipboardWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start polling with the default interval.
    pub fn start<S>(&mut self, source: S, callback: ChangeCallback)
    where
        S: PasteboardSource + 'static,
    {
        self.start_with_interval(source, callback, DEFAULT_POLL_INTERVAL);
    }

    /// Start polling with a custom interval.
    pub fn start_with_interval<S>(
        &mut self,
        mut source: S,
        callback: ChangeCallback,
        interval: Duration,
    ) where
        S: PasteboardSource + 'static,
    {
        if self.running.load(Ordering::SeqCst) {
            tracing::warn!("ClipboardWatcher already running");
            return;
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);

        // Seed before the thread starts so any change from here on is seen.
        let mut last_count = source.change_count();

        let handle = std::thread::spawn(move || {
            tracing::info!("ClipboardWatcher started with interval {:?}", interval);

            while running.load(Ordering::SeqCst) {
                let count = source.change_count();
                if count != last_count {
                    // The change is consumed whether or not it carries text.
                    last_count = count;

                    if let Some(text) = source.read_text() {
                        let trimmed = text.trim();
                        if !trimmed.is_empty() {
                            tracing::debug!(chars = trimmed.len(), "clipboard change detected");
                            callback(trimmed.to_string());
                        }
                    }
                }

                std::thread::sleep(interval);
            }

            tracing::info!("ClipboardWatcher stopped");
        });

        self.handle = Some(handle);
    }

    /// Stop the watcher. Joins the polling thread, so no callback fires
    /// after this returns, including a sampling cycle already in flight.
    /// Idempotent.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Check if the watcher is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for ClipboardWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
