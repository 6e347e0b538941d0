// whitelist.rs
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info};

use crate::{error::CacheError, storage::DocumentStore};

/// Usernames allowed to use the API, mirrored from `config.whitelist`.
///
/// A refresh swaps in a whole new set, so readers see either the old or
/// the new snapshot.
pub struct WhitelistCache {
    store: Arc<dyn DocumentStore>,
    users: RwLock<Arc<HashSet<String>>>,
}

impl WhitelistCache {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            users: RwLock::new(Arc::new(HashSet::new())),
        }
    }

    pub async fn refresh(&self) -> Result<(), CacheError> {
        let document = match self.store.load().await {
            Ok(Some(document)) => document,
            Ok(None) => {
                error!("no state object found in store");
                return Err(CacheError::MissingState);
            }
            Err(e) => {
                error!(error = %e, "whitelist refresh failed");
                return Err(e.into());
            }
        };

        let users: HashSet<String> = document
            .get("config")
            .and_then(|config| config.get("whitelist"))
            .and_then(Value::as_object)
            .map(|whitelist| whitelist.keys().cloned().collect())
            .unwrap_or_default();

        info!(users = users.len(), "whitelist cache refreshed");
        *self.users.write() = Arc::new(users);
        Ok(())
    }

    pub fn is_authorized(&self, username: &str) -> bool {
        self.users.read().contains(username)
    }

    pub fn snapshot(&self) -> Arc<HashSet<String>> {
        Arc::clone(&self.users.read())
    }
}
