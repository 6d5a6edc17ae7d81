//! Durable storage for the clipboard history.
//!
//! The whole collection persists as one JSON document; every save replaces
//! the document through a sibling temp file and an atomic rename, so a
//! reader never observes a partial file. Timestamps serialize as RFC 3339
//! (timezone-independent) through the entry model's serde derives.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clipstash_history::{Entry, HistoryRepository};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no user data directory available")]
    NoDataDir,
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// File name of the history document inside the application data directory.
pub const HISTORY_FILE_NAME: &str = "history.json";

/// History document on disk, implementing [`HistoryRepository`].
pub struct HistoryFile {
    path: PathBuf,
}

impl HistoryFile {
    /// Store under the per-user application data directory
    /// (`<data_dir>/clipstash/history.json`).
    pub fn in_default_location() -> Result<Self> {
        let dir = dirs::data_dir().ok_or(StorageError::NoDataDir)?;
        Ok(Self::at(dir.join("clipstash").join(HISTORY_FILE_NAME)))
    }

    /// Store at an explicit path (tests, CLI override).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl HistoryRepository for HistoryFile {
    type Error = StorageError;

    fn save(&self, entries: &[Entry]) -> Result<()> {
        let json = serde_json::to_vec_pretty(entries)?;
        self.write_atomic(&json)?;
        tracing::debug!(count = entries.len(), path = %self.path.display(), "history saved");
        Ok(())
    }

    fn load(&self) -> Result<Vec<Entry>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            // First run: no document yet.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            // Absence of the store is not an error.
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
