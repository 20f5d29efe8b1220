//! API server configuration.
//!
//! Loaded with the `config` crate, lowest precedence first:
//! 1. Built-in defaults
//! 2. TOML file at `$VETA_CONFIG` (default `config/veta.toml`), if present
//! 3. `VETA_*` environment variables (`VETA_HTTP_PORT=8080`, ...)

use serde::Deserialize;

/// Config file used when `VETA_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/veta.toml";

/// API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// HTTP listen port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Pool size
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Fallback log filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_http_port() -> u16 {
    3000
}

fn default_database_path() -> String {
    "./veta.db".to_string()
}

fn default_db_max_connections() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            http_port: default_http_port(),
            database_path: default_database_path(),
            db_max_connections: default_db_max_connections(),
            log_level: default_log_level(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from `$VETA_CONFIG` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("VETA_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load configuration from an explicit file path and the environment.
    /// A missing file is not an error.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::new(path, config::FileFormat::Toml).required(false))
            .add_source(config::Environment::with_prefix("VETA").try_parsing(true))
            .build()?;

        let config: ApiConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.http_port == 0 {
            return Err(ConfigError::InvalidValue("http_port".to_string()));
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("db_max_connections".to_string()));
        }
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("database_path".to_string()));
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
