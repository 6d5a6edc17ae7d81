//! Hot key router: id arena, registration table and dispatch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::combo::HotKeyCombo;
use crate::listener::{self, KeyStateProvider, ListenerHandle};
use crate::{platform, HotKeyError};

/// Process-unique identifier for a registered combination.
pub type HotKeyId = u32;

/// Callback invoked on the listener thread with the pressed combination's
/// id. It must only hand the id off (e.g. into a channel), never do work.
pub type PressCallback = Arc<dyn Fn(HotKeyId) + Send + Sync + 'static>;

type Handler = Box<dyn Fn() + Send>;

/// One registered combination in the listener's poll set.
pub(crate) struct Registration {
    pub(crate) id: HotKeyId,
    pub(crate) combo: HotKeyCombo,
}

/// Registers global key combinations and routes presses to handlers.
///
/// Handlers live in an arena keyed by id; the registration table is a
/// separate list shared with the listener thread, so `unregister_all` tears
/// everything down in one sweep. A combination whose registration fails
/// stays unregistered for the process lifetime; there is no retry.
pub struct HotKeyRouter<P> {
    provider: Option<P>,
    handlers: HashMap<HotKeyId, Handler>,
    registrations: Arc<Mutex<Vec<Registration>>>,
    listener: Option<ListenerHandle>,
    on_press: PressCallback,
    next_id: HotKeyId,
}

impl<P> HotKeyRouter<P>
where
    P: KeyStateProvider + 'static,
{
    pub fn new(provider: P, on_press: PressCallback) -> Self {
        Self {
            provider: Some(provider),
            handlers: HashMap::new(),
            registrations: Arc::new(Mutex::new(Vec::new())),
            listener: None,
            on_press,
            next_id: 1,
        }
    }

    /// Register a combination and store its handler under a fresh id.
    ///
    /// The listener thread starts with the first successful registration.
    /// The handler runs only through [`dispatch`](Self::dispatch), never on
    /// the listener thread.
    pub fn register(
        &mut self,
        combo: HotKeyCombo,
        handler: impl Fn() + Send + 'static,
    ) -> Result<HotKeyId, HotKeyError> {
        let id = self.next_id;
        self.next_id += 1;

        if !platform::ensure_global_key_access() {
            return Err(HotKeyError::AccessDenied);
        }
        if self.listener.is_none() {
            let Some(provider) = self.provider.take() else {
                return Err(HotKeyError::TornDown);
            };
            self.listener = Some(listener::spawn(
                provider,
                Arc::clone(&self.registrations),
                Arc::clone(&self.on_press),
            ));
        }

        self.registrations
            .lock()
            .expect("registration table poisoned")
            .push(Registration { id, combo });
        self.handlers.insert(id, Box::new(handler));
        tracing::debug!(id, ?combo, "registered global hotkey");
        Ok(id)
    }

    /// Invoke the handler registered under `id`, if any.
    ///
    /// Call this from the serialized context only; ids the arena does not
    /// know are ignored.
    pub fn dispatch(&self, id: HotKeyId) {
        match self.handlers.get(&id) {
            Some(handler) => handler(),
            None => tracing::debug!(id, "hotkey event for unknown id"),
        }
    }

    /// Release every registration and stop the listener thread.
    ///
    /// Joins the thread, so no press callback fires after this returns.
    /// Idempotent and safe to call when nothing was registered.
    pub fn unregister_all(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.stop();
        }
        self.registrations
            .lock()
            .expect("registration table poisoned")
            .clear();
        self.handlers.clear();
    }
}

impl<P> Drop for HotKeyRouter<P> {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.stop();
        }
    }
}
