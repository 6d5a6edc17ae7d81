//! Observable user settings.
//!
//! The core observes `item_limit` only. The remaining fields are persisted
//! on behalf of the presentation layer (launch-at-login, appearance) and
//! never read by the core.
//!
//! The store is an explicit observable: interested parties subscribe a
//! callback and are notified with every new item limit. Observers run on
//! the caller's thread; the daemon's observer forwards the value into its
//! serialized context instead of acting directly.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("settings parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("settings serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no user config directory available")]
    NoConfigDir,
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// Default bound on the number of history entries.
pub const DEFAULT_ITEM_LIMIT: usize = 100;

/// File name of the settings document inside the config directory.
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Appearance preference, consumed only by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Appearance {
    #[default]
    System,
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bound on the number of history entries. Must be at least 1.
    pub item_limit: usize,
    pub launch_at_login: bool,
    pub appearance: Appearance,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            item_limit: DEFAULT_ITEM_LIMIT,
            launch_at_login: false,
            appearance: Appearance::System,
        }
    }
}

type LimitObserver = Box<dyn Fn(usize) + Send>;

/// Settings store with change observation.
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
    observers: Vec<LimitObserver>,
}

impl SettingsStore {
    /// Store under the per-user config directory
    /// (`<config_dir>/clipstash/settings.toml`).
    pub fn in_default_location() -> Result<Self> {
        let dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(Self::at(dir.join("clipstash").join(SETTINGS_FILE_NAME)))
    }

    /// Store at an explicit path, loading whatever is there.
    ///
    /// A missing file means defaults; an unparseable file is recoverable
    /// and degrades to defaults (logged).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = load_or_default(&path);
        Self {
            path,
            settings,
            observers: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn item_limit(&self) -> usize {
        self.settings.item_limit
    }

    /// Register an observer invoked with every new item limit.
    pub fn subscribe(&mut self, observer: impl Fn(usize) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Persist a new item limit and notify every observer.
    ///
    /// Values below 1 are clamped to 1.
    pub fn set_item_limit(&mut self, limit: usize) -> Result<()> {
        let limit = limit.max(1);
        self.settings.item_limit = limit;
        self.save()?;
        for observer in &self.observers {
            observer(limit);
        }
        Ok(())
    }

    /// Persist the launch-at-login flag (presentation-layer field).
    pub fn set_launch_at_login(&mut self, enabled: bool) -> Result<()> {
        self.settings.launch_at_login = enabled;
        self.save()
    }

    /// Persist the appearance preference (presentation-layer field).
    pub fn set_appearance(&mut self, appearance: Appearance) -> Result<()> {
        self.settings.appearance = appearance;
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(&self.settings)?;
        fs::write(&self.path, toml)?;
        Ok(())
    }
}

fn load_or_default(path: &Path) -> Settings {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Settings::default(),
        Err(e) => {
            tracing::warn!("failed to read settings: {e}; using defaults");
            return Settings::default();
        }
    };

    let mut settings: Settings = match toml::from_str(&raw) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("failed to parse settings: {e}; using defaults");
            return Settings::default();
        }
    };

    if settings.item_limit == 0 {
        tracing::warn!("item_limit 0 is out of range; clamping to 1");
        settings.item_limit = 1;
    }
    settings
}
