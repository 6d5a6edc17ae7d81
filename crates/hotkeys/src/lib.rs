//! Global hot key registration and routing.
//!
//! IMPLEMENTATION NOTE:
//! Key state is *polled* from a dedicated listener thread instead of
//! installing an OS event hook. Hook libraries call input-source APIs that
//! are not thread-safe on macOS and crash when driven from a background
//! thread; polling at 50ms detects human key presses (usually >100ms) with
//! negligible CPU.
//!
//! The listener thread never runs handlers. It reports presses as small
//! integer ids through a callback; the application forwards the id into its
//! serialized context and calls [`HotKeyRouter::dispatch`] there, so
//! handlers never race each other or the history state.

mod combo;
mod listener;
mod platform;
mod router;

pub use combo::{HotKeyCombo, Modifiers};
pub use device_query::Keycode;
pub use listener::{DeviceKeyState, KeyStateProvider};
pub use router::{HotKeyId, HotKeyRouter, PressCallback};

#[derive(Debug, thiserror::Error)]
pub enum HotKeyError {
    /// The OS denied access to global key state (missing accessibility
    /// permission). The combination stays unregistered for the process
    /// lifetime.
    #[error("global key access denied by the OS")]
    AccessDenied,

    /// `unregister_all` already ran; the listener is gone for the process
    /// lifetime.
    #[error("hotkey router already torn down")]
    TornDown,
}
