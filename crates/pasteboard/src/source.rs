//! Clipboard read/write seam and its `arboard`-backed implementation.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use clipstash_history::ClipboardWriter;

#[derive(Debug, thiserror::Error)]
pub enum PasteboardError {
    #[error("failed to access clipboard: {0}")]
    Access(String),

    #[error("failed to write clipboard: {0}")]
    Write(String),
}

/// Read half of the system clipboard as seen by the watcher.
///
/// `change_count` mirrors the pasteboard change counters that desktop
/// platforms keep per clipboard generation: an opaque value that advances
/// whenever the content changes, cheap to sample in a poll loop.
pub trait PasteboardSource: Send {
    /// Opaque counter that advances whenever the clipboard content changes.
    fn change_count(&mut self) -> u64;

    /// Current text payload, `None` when the clipboard holds no text.
    fn read_text(&mut self) -> Option<String>;
}

/// System clipboard backed by `arboard`.
///
/// `arboard` exposes content but no generation counter, so the counter is
/// derived by hashing the current text and bumping on every observed
/// difference. Construction seeds the hash from the current content so text
/// already on the clipboard at startup is not replayed as a change.
pub struct SystemPasteboard {
    clipboard: arboard::Clipboard,
    last_hash: u64,
    count: u64,
}

impl SystemPasteboard {
    pub fn new() -> Result<Self, PasteboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| PasteboardError::Access(e.to_string()))?;
        let last_hash = hash_of(clipboard.get_text().ok().as_deref());
        Ok(Self {
            clipboard,
            last_hash,
            count: 0,
        })
    }
}

fn hash_of(text: Option<&str>) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

impl PasteboardSource for SystemPasteboard {
    fn change_count(&mut self) -> u64 {
        let hash = hash_of(self.clipboard.get_text().ok().as_deref());
        if hash != self.last_hash {
            self.last_hash = hash;
            self.count += 1;
        }
        self.count
    }

    fn read_text(&mut self) -> Option<String> {
        self.clipboard.get_text().ok().filter(|s| !s.is_empty())
    }
}

impl ClipboardWriter for SystemPasteboard {
    type Error = PasteboardError;

    fn write_text(&mut self, text: &str) -> Result<(), PasteboardError> {
        self.clipboard
            .set_text(text)
            .map_err(|e| PasteboardError::Write(e.to_string()))
    }
}
