// storage/mod.rs
mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StorageError;
use serde_json::Value;

/// Persistence backend for the bridge state document.
///
/// A backend holds at most one document. Every `save` replaces it whole.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn load(&self) -> Result<Option<Value>, StorageError>;
    async fn save(&self, document: &Value) -> Result<(), StorageError>;
    async fn clear(&self) -> Result<(), StorageError>;
}
