//! Clipboard history domain: the entry model and the manager that owns the
//! collection.
//!
//! The manager is the sole mutator of the history. Everything it needs from
//! the outside world comes in through traits ([`HistoryRepository`],
//! [`ClipboardWriter`]) so the domain stays free of disk and platform
//! concerns and can be tested with in-memory doubles.

mod entry;
mod manager;

pub use entry::Entry;
pub use manager::{ClipboardWriter, HistoryManager, HistoryRepository};
