// state/mod.rs
//! The bridge state document and the operations allowed to change it.
//!
//! Every mutation loads the whole document, changes it in memory, runs the
//! light validation and writes the whole document back. Mutations are
//! serialized behind one writer lock; reads go straight to the backend.

pub mod path;
pub mod validation;
mod whitelist;

pub use whitelist::WhitelistCache;

use metrics::counter;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    error::{AppError, StorageError},
    models::WhitelistEntry,
    storage::DocumentStore,
    utils,
};

/// Highest numeric suffix tried when a light name is taken.
const MAX_NAME_SUFFIX: u32 = 14;

pub struct BridgeStore {
    backend: Arc<dyn DocumentStore>,
    whitelist: WhitelistCache,
    writer: Mutex<()>,
}

impl BridgeStore {
    pub fn new(backend: Arc<dyn DocumentStore>) -> Self {
        let whitelist = WhitelistCache::new(Arc::clone(&backend));
        Self {
            backend,
            whitelist,
            writer: Mutex::new(()),
        }
    }

    pub fn whitelist(&self) -> &WhitelistCache {
        &self.whitelist
    }

    pub async fn get_full_state(&self) -> Result<Value, AppError> {
        self.load().await
    }

    pub async fn get_state_path(&self, path: &str) -> Result<Value, AppError> {
        let document = self.load().await?;
        match path::resolve(&document, path) {
            Some(value) => Ok(value.clone()),
            None => {
                error!(path, "invalid path");
                Err(AppError::InvalidPath(path.to_string()))
            }
        }
    }

    /// Registers `devicetype` under a fresh username and returns it once the
    /// write and the whitelist refresh have both succeeded.
    pub async fn create_user(&self, devicetype: &str) -> Result<String, AppError> {
        let _guard = self.writer.lock().await;
        let mut document = self.load().await?;

        let username = Uuid::now_v7().to_string();
        let now = utils::bridge_timestamp();
        let entry = WhitelistEntry {
            last_use_date: now.clone(),
            create_date: now,
            name: devicetype.to_string(),
        };

        let whitelist = object_child(&mut document, "config")
            .and_then(|config| object_child(config, "whitelist"))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| AppError::InvalidPath("config.whitelist".to_string()))?;
        whitelist.insert(
            username.clone(),
            serde_json::to_value(&entry).map_err(StorageError::from)?,
        );

        self.persist(&document).await?;
        self.whitelist.refresh().await?;

        counter!("bridge_mutations_total", "op" => "create_user").increment(1);
        info!(%username, devicetype, "user created");
        Ok(username)
    }

    /// Renames a light, numbering the name when another light already has it.
    pub async fn rename_light(&self, light_id: &str, requested: &str) -> Result<String, AppError> {
        let _guard = self.writer.lock().await;
        let mut document = self.load().await?;

        let final_name = {
            let lights = document
                .get("lights")
                .and_then(Value::as_object)
                .filter(|lights| lights.get(light_id).is_some_and(Value::is_object))
                .ok_or_else(|| AppError::InvalidLight(light_id.to_string()))?;
            let taken: HashSet<&str> = lights
                .iter()
                .filter(|(id, _)| id.as_str() != light_id)
                .filter_map(|(_, light)| light.get("name").and_then(Value::as_str))
                .collect();
            unique_name(requested, &taken)
        };

        let light = light_mut(&mut document, light_id)?;
        light.insert("name".to_string(), Value::String(final_name.clone()));

        self.persist(&document).await?;

        counter!("bridge_mutations_total", "op" => "rename_light").increment(1);
        info!(light_id, name = %final_name, "light renamed");
        Ok(final_name)
    }

    /// Overwrites the given keys of a light's state. The merged document
    /// must pass validation or nothing is written.
    pub async fn set_light_state(
        &self,
        light_id: &str,
        patch: Map<String, Value>,
    ) -> Result<Map<String, Value>, AppError> {
        let _guard = self.writer.lock().await;
        let mut document = self.load().await?;

        let light = light_mut(&mut document, light_id)?;
        let state = light
            .entry("state")
            .or_insert_with(|| Value::Object(Map::new()));
        if !state.is_object() {
            *state = Value::Object(Map::new());
        }
        if let Some(state) = state.as_object_mut() {
            for (key, value) in &patch {
                state.insert(key.clone(), value.clone());
            }
        }

        self.persist(&document).await?;

        counter!("bridge_mutations_total", "op" => "set_light_state").increment(1);
        info!(light_id, fields = patch.len(), "light state updated");
        Ok(patch)
    }

    /// Replaces the document with `seed` and rebuilds the whitelist cache.
    pub async fn reset(&self, seed: &Value) -> Result<Value, AppError> {
        let _guard = self.writer.lock().await;
        check(seed)?;
        self.backend.clear().await.inspect_err(|e| {
            error!(error = %e, "failed to remove state");
        })?;
        self.write(seed).await?;
        self.whitelist.refresh().await?;

        counter!("bridge_mutations_total", "op" => "reset").increment(1);
        info!("state reset from seed");
        Ok(seed.clone())
    }

    /// Seeds an empty backend. Returns whether a seed was written.
    pub async fn seed_if_empty(&self, seed: &Value) -> Result<bool, AppError> {
        if self.backend.load().await?.is_some() {
            return Ok(false);
        }
        self.reset(seed).await?;
        Ok(true)
    }

    async fn load(&self) -> Result<Value, AppError> {
        match self.backend.load().await {
            Ok(Some(document)) => Ok(document),
            Ok(None) => {
                error!("no state object found in store");
                Err(AppError::NotFound)
            }
            Err(e) => {
                error!(error = %e, "failed to load state");
                Err(e.into())
            }
        }
    }

    async fn persist(&self, document: &Value) -> Result<(), AppError> {
        check(document)?;
        self.write(document).await
    }

    async fn write(&self, document: &Value) -> Result<(), AppError> {
        self.backend.save(document).await.inspect_err(|e| {
            error!(error = %e, "failed to save state");
        })?;
        info!("successfully saved state");
        Ok(())
    }
}

/// Validation hook run before anything reaches the backend.
fn check(document: &Value) -> Result<(), AppError> {
    validation::validate_lights(document.get("lights").unwrap_or(&Value::Null)).map_err(|failures| {
        counter!("bridge_validation_failures_total").increment(1);
        warn!(fields = ?failures, "state rejected by validation");
        AppError::Validation(failures)
    })
}

fn light_mut<'a>(document: &'a mut Value, light_id: &str) -> Result<&'a mut Map<String, Value>, AppError> {
    document
        .get_mut("lights")
        .and_then(|lights| lights.get_mut(light_id))
        .and_then(Value::as_object_mut)
        .ok_or_else(|| AppError::InvalidLight(light_id.to_string()))
}

/// The object under `key`, created (or replaced) when absent or not an object.
fn object_child<'a>(node: &'a mut Value, key: &str) -> Option<&'a mut Value> {
    let child = node
        .as_object_mut()?
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));
    if !child.is_object() {
        *child = Value::Object(Map::new());
    }
    Some(child)
}

/// `requested`, or `requested N` for the first N in 1..=14 not in `taken`.
/// Past the last suffix the final candidate is returned even if taken.
pub fn unique_name(requested: &str, taken: &HashSet<&str>) -> String {
    let mut candidate = requested.to_string();
    let mut suffix = 1;
    while taken.contains(candidate.as_str()) && suffix <= MAX_NAME_SUFFIX {
        candidate = format!("{requested} {suffix}");
        suffix += 1;
    }
    candidate
}
