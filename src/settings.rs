use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::types::ConfigError;

const DEFAULT_CONFIG_FILE: &str = "lokanta";
const ENV_PREFIX: &str = "LOKANTA";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub admin: AdminCredentials,
    pub booking: BookingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub allowed_origin: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, allowed_origin: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
    pub redis_uri: String,
    pub redis_prefix: String,
    /// Upper bound on opening a redis connection. Each store operation opens
    /// its own connection on the store actor's only thread.
    pub redis_connect_timeout_ms: u64,
}

impl StorageSettings {
    pub fn redis_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.redis_connect_timeout_ms)
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            data_dir: PathBuf::from("./data"),
            redis_uri: "redis://127.0.0.1/".into(),
            redis_prefix: "lokanta".into(),
            redis_connect_timeout_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self { username: "admin".into(), password: "admin".into() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BookingSettings {
    /// Re-check capacity inside the same store operation that commits a
    /// booking. When off, creation trusts the client's earlier check.
    pub atomic_capacity: bool,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self { atomic_capacity: true }
    }
}

impl Settings {
    /// Defaults, then `lokanta.toml` (or `$LOKANTA_CONFIG`) if present, then
    /// `LOKANTA_<SECTION>__<KEY>` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let file = env::var("LOKANTA_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
        info!(%file, "loading configuration");

        let settings: Settings = config::Config::builder()
            .add_source(config::File::with_name(&file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin.username.is_empty() || self.admin.password.is_empty() {
            return Err(ConfigError::Invalid("admin credentials must not be empty".into()));
        }
        if self.storage.backend == StorageBackend::Redis && self.storage.redis_uri.is_empty() {
            return Err(ConfigError::Invalid("storage.redis_uri is required for redis".into()));
        }
        if self.storage.redis_connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid("storage.redis_connect_timeout_ms must be positive".into()));
        }

        Ok(())
    }
}
