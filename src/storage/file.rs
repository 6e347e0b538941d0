// file.rs
use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

use crate::error::StorageError;

/// Keeps the document as a JSON file. Saves go through a temporary file
/// and a rename so a failed write never leaves a half-written document.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        staging.into()
    }
}

#[async_trait]
impl super::DocumentStore for FileStore {
    async fn load(&self) -> Result<Option<Value>, StorageError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, document: &Value) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(document)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let staging = self.staging_path();
        fs::write(&staging, &bytes).await?;
        fs::rename(&staging, &self.path).await?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "state document written");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
