//! Daemon wiring and the serialized execution context.
//!
//! One channel, one loop: the watcher thread, the hotkey listener thread,
//! settings observers and the signal handler all *enqueue* actions; only
//! the loop below touches the history manager. Actions execute in
//! submission order with no batching.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clipstash_events::{EventSink, UiEvent};
use clipstash_history::HistoryManager;
use clipstash_hotkeys::{
    DeviceKeyState, HotKeyCombo, HotKeyId, HotKeyRouter, Keycode, Modifiers, PressCallback,
};
use clipstash_pasteboard::{ChangeCallback, ClipboardWatcher, SystemPasteboard};
use clipstash_settings::SettingsStore;
use clipstash_storage::HistoryFile;

pub struct DaemonConfig {
    pub poll_interval: Duration,
    pub history_file: Option<PathBuf>,
    pub settings_file: Option<PathBuf>,
}

/// Work item for the serialized context.
enum Action {
    /// The watcher observed a clipboard change.
    Captured(String),
    /// A registered hotkey was pressed on the listener thread.
    HotKey(HotKeyId),
    /// Forwarded to the presentation layer.
    ToggleVisibility,
    ClearHistory,
    /// The item limit setting changed.
    SetItemLimit(usize),
    Shutdown,
}

/// Sink that surfaces published events in the daemon log. A UI process
/// subscribes here instead.
struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: &UiEvent) {
        tracing::info!(topic = event.topic(), ?event, "published");
    }
}

pub fn run(config: DaemonConfig) -> anyhow::Result<()> {
    let (tx, rx) = crossbeam_channel::unbounded::<Action>();

    // Settings, with the item-limit observer feeding the context.
    let mut settings = match config.settings_file {
        Some(path) => SettingsStore::at(path),
        None => SettingsStore::in_default_location()?,
    };
    let limit_tx = tx.clone();
    settings.subscribe(move |limit| {
        let _ = limit_tx.send(Action::SetItemLimit(limit));
    });

    // History manager over the persisted collection.
    let repository = match config.history_file {
        Some(path) => HistoryFile::at(path),
        None => HistoryFile::in_default_location()?,
    };
    let events = Arc::new(LogSink);
    let mut manager = HistoryManager::new(
        repository,
        SystemPasteboard::new()?,
        events.clone(),
        settings.item_limit(),
    );

    // Global shortcuts. A failed registration disables that shortcut for
    // the process lifetime; everything else keeps working.
    let press_tx = tx.clone();
    let on_press: PressCallback = Arc::new(move |id| {
        let _ = press_tx.send(Action::HotKey(id));
    });
    let mut router = HotKeyRouter::new(DeviceKeyState::new(), on_press);

    let toggle_tx = tx.clone();
    match router.register(
        HotKeyCombo::new(Keycode::V, Modifiers::command_shift()),
        move || {
            let _ = toggle_tx.send(Action::ToggleVisibility);
        },
    ) {
        Ok(id) => tracing::info!(id, "toggle-visibility shortcut registered (Cmd+Shift+V)"),
        Err(e) => tracing::warn!("toggle-visibility shortcut disabled: {e}"),
    }

    let clear_tx = tx.clone();
    match router.register(
        HotKeyCombo::new(Keycode::C, Modifiers::command_shift()),
        move || {
            let _ = clear_tx.send(Action::ClearHistory);
        },
    ) {
        Ok(id) => tracing::info!(id, "clear-history shortcut registered (Cmd+Shift+C)"),
        Err(e) => tracing::warn!("clear-history shortcut disabled: {e}"),
    }

    // Clipboard watcher.
    let capture_tx = tx.clone();
    let on_change: ChangeCallback = Arc::new(move |text| {
        let _ = capture_tx.send(Action::Captured(text));
    });
    let mut watcher = ClipboardWatcher::new();
    watcher.start_with_interval(SystemPasteboard::new()?, on_change, config.poll_interval);

    // Clean shutdown on SIGINT/SIGTERM.
    let mut signals = signal_hook::iterator::Signals::new([
        signal_hook::consts::SIGINT,
        signal_hook::consts::SIGTERM,
    ])?;
    let signal_tx = tx.clone();
    std::thread::spawn(move || {
        if signals.forever().next().is_some() {
            let _ = signal_tx.send(Action::Shutdown);
        }
    });

    tracing::info!(entries = manager.len(), "clipstash daemon running");

    for action in rx.iter() {
        match action {
            Action::Captured(text) => manager.add_item(&text),
            Action::HotKey(id) => router.dispatch(id),
            Action::ToggleVisibility => events.emit(&UiEvent::ToggleVisibility),
            Action::ClearHistory => manager.clear_all(),
            Action::SetItemLimit(limit) => manager.enforce_limit(limit),
            Action::Shutdown => break,
        }
    }

    watcher.stop();
    router.unregister_all();
    tracing::info!("clipstash daemon stopped");
    Ok(())
}
