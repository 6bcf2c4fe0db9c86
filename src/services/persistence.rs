//! Last-duration persistence

use std::{fs, path::PathBuf};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::PersistenceError;

/// Default location of the save file, relative to the working directory
pub const DEFAULT_SAVE_FILE: &str = "last_timer.json";

/// On-disk record of the most recently started duration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastTimerRecord {
    #[serde(default)]
    pub last_timer: u64,
}

/// Reads and writes the last-duration file
#[derive(Debug, Clone)]
pub struct LastTimerStore {
    path: PathBuf,
}

impl LastTimerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Overwrite the file with `total_seconds`
    pub fn try_save(&self, total_seconds: u64) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(&LastTimerRecord { last_timer: total_seconds })?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Read the stored duration. `Ok(None)` when no file exists yet.
    pub fn try_load(&self) -> Result<Option<u64>, PersistenceError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let record: LastTimerRecord = serde_json::from_str(&content)?;
        Ok(Some(record.last_timer))
    }

    /// Save, logging and swallowing any failure
    pub fn save(&self, total_seconds: u64) {
        match self.try_save(total_seconds) {
            Ok(()) => debug!("Saved last timer {}s to {}", total_seconds, self.path.display()),
            Err(e) => warn!("Failed to save last timer to {}: {}", self.path.display(), e),
        }
    }

    /// Load, falling back to 0 on a missing or unreadable file
    pub fn load(&self) -> u64 {
        match self.try_load() {
            Ok(Some(seconds)) => {
                info!("Loaded last timer: {}s", seconds);
                seconds
            }
            Ok(None) => {
                debug!("No save file at {}, starting from 0", self.path.display());
                0
            }
            Err(e) => {
                warn!("Failed to load last timer from {}: {}", self.path.display(), e);
                0
            }
        }
    }
}
