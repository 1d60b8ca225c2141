use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::entities::SavedContext;
use crate::error::StorageError;

/// Key the preset list is stored under.
pub const PRESETS_KEY: &str = "quadslator_contexts";

/// Wholesale persistence for the saved-context list.
///
/// Implementations never merge: `save_all` replaces whatever was stored.
pub trait PresetStore {
    /// Read the stored list. Absent storage is an empty list, not an error.
    fn load(&self) -> Result<Vec<SavedContext>, StorageError>;

    /// Replace the stored list with `presets`.
    fn save_all(&self, presets: &[SavedContext]) -> Result<(), StorageError>;
}

/// Keeps the preset list as a JSON array in `<dir>/quadslator_contexts.json`.
#[derive(Debug, Clone)]
pub struct JsonFilePresetStore {
    path: PathBuf,
}

impl JsonFilePresetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store rooted in a data directory, using the fixed key as file stem.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(format!("{PRESETS_KEY}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_error(&self, reason: impl ToString) -> StorageError {
        StorageError::Read {
            key: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    fn write_error(&self, reason: impl ToString) -> StorageError {
        StorageError::Write {
            key: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl PresetStore for JsonFilePresetStore {
    fn load(&self) -> Result<Vec<SavedContext>, StorageError> {
        if !self.path.exists() {
            debug!("No saved contexts at {}", self.path.display());
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.read_error(e))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let presets: Vec<SavedContext> =
            serde_json::from_str(&content).map_err(|e| self.read_error(e))?;
        debug!("Loaded {} saved contexts", presets.len());

        Ok(presets)
    }

    fn save_all(&self, presets: &[SavedContext]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }

        let content = serde_json::to_string(presets).map_err(|e| self.write_error(e))?;

        // Readers only ever see the old or the new file.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, content).map_err(|e| self.write_error(e))?;
        fs::rename(&staging, &self.path).map_err(|e| self.write_error(e))?;

        info!(
            "Saved {} contexts to: {}",
            presets.len(),
            self.path.display()
        );
        Ok(())
    }
}
