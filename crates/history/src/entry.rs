//! Clipboard history entry model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of characters a preview keeps before truncating.
const PREVIEW_MAX_CHARS: usize = 50;

/// A single clipboard history entry.
///
/// `id`, `content` and `timestamp` are fixed for the entry's lifetime; only
/// `pinned` is ever mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub pinned: bool,
}

impl Entry {
    /// Create a new unpinned entry stamped with the current time.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            timestamp: Utc::now(),
            pinned: false,
        }
    }

    /// Trimmed content truncated for list display.
    pub fn preview(&self) -> String {
        let trimmed = self.content.trim();
        if trimmed.chars().count() > PREVIEW_MAX_CHARS {
            let head: String = trimmed.chars().take(PREVIEW_MAX_CHARS).collect();
            format!("{head}...")
        } else {
            trimmed.to_string()
        }
    }

    /// Coarse human-readable age of this entry relative to `now`.
    ///
    /// Pure in both instants so display code and tests share one clock-free
    /// implementation.
    pub fn relative_time(&self, now: DateTime<Utc>) -> String {
        let secs = (now - self.timestamp).num_seconds().max(0);
        if secs < 60 {
            "just now".to_string()
        } else if secs < 3_600 {
            format!("{}m ago", secs / 60)
        } else if secs < 86_400 {
            format!("{}h ago", secs / 3_600)
        } else if secs < 172_800 {
            "yesterday".to_string()
        } else {
            format!("{}d ago", secs / 86_400)
        }
    }
}
