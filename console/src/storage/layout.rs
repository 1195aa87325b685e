//! Storage layout configuration

use std::path::PathBuf;

use crate::filesys::file::JsonFile;
use crate::filter::state::HierarchicalFilterState;
use crate::storage::settings::Settings;

/// Environment variable overriding the base directory
pub const HOME_ENV_VAR: &str = "STAGEHAND_HOME";

/// Storage layout for the console
#[derive(Debug, Clone)]
pub struct StorageLayout {
    /// Base directory for all storage
    pub base_dir: PathBuf,
}

impl StorageLayout {
    /// Create a new storage layout
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Get the settings file
    pub fn settings_file(&self) -> JsonFile<Settings> {
        JsonFile::new(self.base_dir.join("settings.json"))
    }

    /// Last filter selection made from the command line
    pub fn filter_file(&self) -> JsonFile<HierarchicalFilterState> {
        JsonFile::new(self.base_dir.join("filter.json"))
    }

    /// Get the logs directory
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        if let Some(dir) = std::env::var_os(HOME_ENV_VAR) {
            return Self::new(dir);
        }

        let base_dir = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".stagehand");

        Self::new(base_dir)
    }
}
