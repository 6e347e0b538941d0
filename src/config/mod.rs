// config/mod.rs
use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub bootstrap: BootstrapSettings,
    pub metrics: MetricsSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
}

#[derive(Debug, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// Location of the state document when the file backend is used.
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct BootstrapSettings {
    /// JSON document used by `/bootstrap`; the built-in seed when unset.
    #[serde(default)]
    pub seed_path: Option<String>,
    pub seed_on_empty: bool,
}

#[derive(Debug, Deserialize)]
pub struct MetricsSettings {
    pub enabled: bool,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct LogSettings {
    pub level: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::with_name("config/config").required(false))
            .add_source(Environment::with_prefix("BRIDGE").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Settings from an inline TOML document layered over the defaults.
    #[cfg(test)]
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.address", "0.0.0.0:8080")?
            .set_default("storage.backend", "memory")?
            .set_default("storage.path", "data/bridge_state.json")?
            .set_default("bootstrap.seed_on_empty", true)?
            .set_default("metrics.enabled", false)?
            .set_default("metrics.port", 9000_i64)?
            .set_default("log.level", "info")
    }
}
