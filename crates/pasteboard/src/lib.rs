//! System clipboard access and change watching.
//!
//! The platform exposes no reliable cross-process change notification, so
//! changes are detected by polling an opaque change counter (see
//! [`PasteboardSource`]) and reading the text representation when the
//! counter advances.

mod source;
mod watcher;

pub use source::{PasteboardError, PasteboardSource, SystemPasteboard};
pub use watcher::{ChangeCallback, ClipboardWatcher, DEFAULT_POLL_INTERVAL};
