//! Typed JSON files

use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tracing::debug;

use crate::errors::ConsoleError;

/// A JSON document of type `T` stored at a fixed path
#[derive(Debug, Clone)]
pub struct JsonFile<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFile<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T: DeserializeOwned> JsonFile<T> {
    /// Read the document; `None` when the file does not exist
    pub async fn load(&self) -> Result<Option<T>, ConsoleError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let value = serde_json::from_str(&contents).map_err(|e| {
            ConsoleError::ConfigError(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(Some(value))
    }
}

impl<T: DeserializeOwned + Default> JsonFile<T> {
    pub async fn load_or_default(&self) -> Result<T, ConsoleError> {
        Ok(self.load().await?.unwrap_or_default())
    }
}

impl<T: Serialize> JsonFile<T> {
    /// Write the document through a sibling temp file so readers never see half of it
    pub async fn save(&self, value: &T) -> Result<(), ConsoleError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_vec_pretty(value)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!("Saved {}", self.path.display());
        Ok(())
    }
}
