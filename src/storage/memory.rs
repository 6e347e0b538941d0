// memory.rs
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::StorageError;

#[derive(Default)]
pub struct MemoryStore {
    document: RwLock<Option<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl super::DocumentStore for MemoryStore {
    async fn load(&self) -> Result<Option<Value>, StorageError> {
        Ok(self.document.read().await.clone())
    }

    async fn save(&self, document: &Value) -> Result<(), StorageError> {
        *self.document.write().await = Some(document.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self.document.write().await = None;
        Ok(())
    }
}
