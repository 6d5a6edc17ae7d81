//! Key combination model and press matching.

use device_query::Keycode;

/// Modifier mask for a combination.
///
/// `command` is the platform primary modifier (Command on macOS, Super
/// elsewhere); `option` is Alt outside macOS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub command: bool,
    pub shift: bool,
    pub option: bool,
    pub control: bool,
}

impl Modifiers {
    /// The Command+Shift mask used by the built-in shortcuts.
    pub fn command_shift() -> Self {
        Self {
            command: true,
            shift: true,
            ..Self::default()
        }
    }

    fn satisfied_by(&self, pressed: &[Keycode]) -> bool {
        let down = |candidates: &[Keycode]| candidates.iter().any(|k| pressed.contains(k));

        self.command == down(&[Keycode::LMeta, Keycode::RMeta])
            && self.shift == down(&[Keycode::LShift, Keycode::RShift])
            && self.option == down(&[Keycode::LAlt, Keycode::RAlt])
            && self.control == down(&[Keycode::LControl, Keycode::RControl])
    }
}

/// A global key combination: one terminal key plus a modifier mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotKeyCombo {
    pub key: Keycode,
    pub modifiers: Modifiers,
}

impl HotKeyCombo {
    pub fn new(key: Keycode, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Whether the current key state holds this combination down.
    ///
    /// The modifier check is exact: extra modifiers held alongside the
    /// combination do not match, so Cmd+Shift+V is distinct from
    /// Cmd+Opt+Shift+V.
    pub(crate) fn is_pressed(&self, pressed: &[Keycode]) -> bool {
        pressed.contains(&self.key) && self.modifiers.satisfied_by(pressed)
    }
}
