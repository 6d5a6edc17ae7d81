//! Platform gate for reading global key state.

/// Check whether the process may observe global key state.
///
/// On macOS this requires the Accessibility permission; a denied check
/// prompts the user by opening the relevant System Settings pane and
/// reports failure (the grant only takes effect after the user acts).
/// Other platforms impose no gate.
pub(crate) fn ensure_global_key_access() -> bool {
    #[cfg(target_os = "macos")]
    {
        if macos::is_process_trusted() {
            return true;
        }
        tracing::warn!("accessibility permission not granted; opening System Settings");
        macos::open_accessibility_settings();
        false
    }
    #[cfg(not(target_os = "macos"))]
    {
        true
    }
}

#[cfg(target_os = "macos")]
mod macos {
    use std::process::Command;

    pub(super) fn is_process_trusted() -> bool {
        unsafe {
            extern "C" {
                fn AXIsProcessTrusted() -> bool;
            }
            AXIsProcessTrusted()
        }
    }

    pub(super) fn open_accessibility_settings() {
        let _ = Command::new("open")
            .arg("x-apple.systempreferences:com.apple.preference.security?Privacy_Accessibility")
            .spawn();
    }
}
