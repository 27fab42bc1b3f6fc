//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `coredata.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

use coredata_adapter_directory_http::DirectoryConfig;
use coredata_adapter_mqtt::MqttConfig;
use coredata_app::settings::CoreSettings;
use coredata_app::side_effects::DEFAULT_QUEUE_CAPACITY;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Ingestion and query policy.
    pub core: CoreConfig,
    /// Side-effect bus sizing.
    pub side_effects: SideEffectsConfig,
    /// Device metadata service.
    pub metadata: DirectoryConfig,
    /// Downstream event publication.
    pub publisher: PublisherConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Policy flags handed to every service as [`CoreSettings`].
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub persist_data: bool,
    pub validate_readings_on_ingest: bool,
    pub metadata_check_strict: bool,
    pub update_device_last_connected: bool,
    pub update_service_last_connected: bool,
    pub read_max_limit: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SideEffectsConfig {
    /// Pending messages held per queue before emitters wait.
    pub queue_capacity: usize,
}

/// Downstream publisher configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Publish accepted events over MQTT.
    pub enabled: bool,
    pub mqtt: MqttConfig,
}

impl Config {
    /// Load configuration from `coredata.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("coredata.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("COREDATA_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("COREDATA_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("COREDATA_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("COREDATA_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("COREDATA_METADATA_URL") {
            self.metadata.base_url = val;
        }
        if let Ok(val) = std::env::var("COREDATA_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.core.read_max_limit == 0 {
            return Err(ConfigError::Validation(
                "core.read_max_limit must be non-zero".to_string(),
            ));
        }
        if self.metadata.base_url.is_empty() {
            return Err(ConfigError::Validation(
                "metadata.base_url must be set".to_string(),
            ));
        }
        if self.publisher.enabled && self.publisher.mqtt.topic.is_empty() {
            return Err(ConfigError::Validation(
                "publisher.mqtt.topic must be set when publishing is enabled".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// The immutable policy value the services are built with.
    #[must_use]
    pub fn core_settings(&self) -> CoreSettings {
        CoreSettings {
            persist_data: self.core.persist_data,
            validate_readings_on_ingest: self.core.validate_readings_on_ingest,
            metadata_check_strict: self.core.metadata_check_strict,
            update_device_last_connected: self.core.update_device_last_connected,
            update_service_last_connected: self.core.update_service_last_connected,
            read_max_limit: self.core.read_max_limit,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 48080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:coredata.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "coredatad=info,coredata=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        let defaults = CoreSettings::default();
        Self {
            persist_data: defaults.persist_data,
            validate_readings_on_ingest: defaults.validate_readings_on_ingest,
            metadata_check_strict: defaults.metadata_check_strict,
            update_device_last_connected: defaults.update_device_last_connected,
            update_service_last_connected: defaults.update_service_last_connected,
            read_max_limit: defaults.read_max_limit,
        }
    }
}

impl Default for SideEffectsConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
