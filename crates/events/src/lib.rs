//! Published-state contracts between the core and the presentation layer.
//!
//! The core never talks to a concrete UI. It publishes typed events through
//! the [`EventSink`] trait; the presentation layer implements the trait and
//! renders whatever the events carry. Keeping the contracts in one crate
//! prevents drift between producer and consumer.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Event published by the core for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UiEvent {
    /// The history collection changed (insert, delete, pin, eviction, clear).
    ///
    /// Carries counts only; the UI reads the collection itself when it needs
    /// entry data.
    HistoryChanged { total: usize, pinned: usize },
    /// The toggle-visibility shortcut fired; the UI should show or hide
    /// itself.
    ToggleVisibility,
}

impl UiEvent {
    /// Stable topic name for transports that route by string key.
    pub fn topic(&self) -> &'static str {
        match self {
            UiEvent::HistoryChanged { .. } => topics::HISTORY_CHANGED,
            UiEvent::ToggleVisibility => topics::TOGGLE_VISIBILITY,
        }
    }
}

/// Topic names as constants to prevent typos.
pub mod topics {
    /// History collection changed.
    pub const HISTORY_CHANGED: &str = "history:changed";
    /// Toggle-visibility shortcut fired.
    pub const TOGGLE_VISIBILITY: &str = "ui:toggle_visibility";
}

/// Outbound event channel from the core to the presentation layer.
pub trait EventSink: Send + Sync {
    /// Deliver one event. Implementations must not block the caller.
    fn emit(&self, event: &UiEvent);
}

/// Shared sink reference.
pub type EventSinkRef = Arc<dyn EventSink>;

/// Sink that records every event, for test inspection.
#[derive(Default)]
pub struct CapturingSink {
    events: Mutex<Vec<UiEvent>>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events captured so far, in emission order.
    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().expect("event buffer poisoned").clone()
    }

    /// Events matching a topic name.
    pub fn events_for(&self, topic: &str) -> Vec<UiEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.topic() == topic)
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().expect("event buffer poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().expect("event buffer poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for CapturingSink {
    fn emit(&self, event: &UiEvent) {
        self.events
            .lock()
            .expect("event buffer poisoned")
            .push(event.clone());
    }
}

/// Sink that discards every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &UiEvent) {}
}
