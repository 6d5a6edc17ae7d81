//! Key-state listener thread with rising-edge detection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use device_query::{DeviceQuery, DeviceState, Keycode};

use crate::router::{HotKeyId, PressCallback, Registration};

/// Polling interval for key state.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Source of the currently pressed keys.
///
/// Production uses [`DeviceKeyState`]; tests script the state.
pub trait KeyStateProvider: Send {
    fn pressed_keys(&self) -> Vec<Keycode>;
}

/// Key state read from the OS via `device_query`.
pub struct DeviceKeyState {
    device: DeviceState,
}

impl DeviceKeyState {
    pub fn new() -> Self {
        Self {
            device: DeviceState::new(),
        }
    }
}

impl Default for DeviceKeyState {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyStateProvider for DeviceKeyState {
    fn pressed_keys(&self) -> Vec<Keycode> {
        self.device.get_keys()
    }
}

/// Handle to the listener thread.
pub(crate) struct ListenerHandle {
    running: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl ListenerHandle {
    /// Stop and join the thread; no press callback fires after this returns.
    pub(crate) fn stop(mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Spawn the listener thread over a shared registration table.
///
/// Each registered combination is edge-detected independently: the callback
/// fires once per press, on this thread, carrying only the combination id.
pub(crate) fn spawn<P>(
    provider: P,
    registrations: Arc<Mutex<Vec<Registration>>>,
    on_press: PressCallback,
) -> ListenerHandle
where
    P: KeyStateProvider + 'static,
{
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    let handle = std::thread::spawn(move || {
        tracing::debug!("hotkey listener started");
        let mut was_pressed: HashMap<HotKeyId, bool> = HashMap::new();

        while running_clone.load(Ordering::SeqCst) {
            let keys = provider.pressed_keys();

            for registration in registrations
                .lock()
                .expect("registration table poisoned")
                .iter()
            {
                let pressed = registration.combo.is_pressed(&keys);
                let was = was_pressed.insert(registration.id, pressed).unwrap_or(false);

                if pressed && !was {
                    tracing::trace!(id = registration.id, "global hotkey pressed");
                    on_press(registration.id);
                }
            }

            std::thread::sleep(POLL_INTERVAL);
        }

        tracing::debug!("hotkey listener stopped");
    });

    ListenerHandle {
        running,
        handle: Some(handle),
    }
}
