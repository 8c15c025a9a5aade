//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::decode::{DecodePolicy, DecoderOptions};
use crate::query::{ExecutorConfig, IdScheme, SingleBoundPolicy};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Document store connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_database_name")]
    pub name: String,

    #[serde(default = "default_measurements_collection")]
    pub measurements_collection: String,

    #[serde(default = "default_sensors_collection")]
    pub sensors_collection: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database_name() -> String {
    "sensor_resource".to_string()
}

fn default_measurements_collection() -> String {
    "sensor_resource_measurements".to_string()
}

fn default_sensors_collection() -> String {
    "sensor_resource_sensors".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            name: default_database_name(),
            measurements_collection: default_measurements_collection(),
            sensors_collection: default_sensors_collection(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// Query pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_query_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub id_scheme: IdScheme,

    #[serde(default)]
    pub single_bound: SingleBoundPolicy,

    #[serde(default)]
    pub decode_failures: DecodePolicy,

    #[serde(default)]
    pub lenient_timestamps: bool,
}

fn default_query_timeout() -> u64 {
    30
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_query_timeout(),
            id_scheme: IdScheme::default(),
            single_bound: SingleBoundPolicy::default(),
            decode_failures: DecodePolicy::default(),
            lenient_timestamps: false,
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "sensor_queries=info,tower_http=info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from the first existing default location, or the environment
    /// alone when there is none
    ///
    /// An existing file that fails to load is returned as an error.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_first(default_locations())
    }

    fn load_first(candidates: impl IntoIterator<Item = PathBuf>) -> Result<Self, ConfigError> {
        match first_existing(candidates) {
            Some(path) => Self::load_with_env(&path),
            None => Ok(Self::from_env()),
        }
    }

    /// First existing config file among the default locations
    pub fn default_path() -> Option<PathBuf> {
        first_existing(default_locations())
    }

    /// Settings for the query executor
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            measurements_collection: self.database.measurements_collection.clone(),
            sensors_collection: self.database.sensors_collection.clone(),
            timeout: Duration::from_secs(self.query.timeout_secs),
            id_scheme: self.query.id_scheme,
            single_bound: self.query.single_bound,
            decode_policy: self.query.decode_failures,
            decoder: DecoderOptions {
                lenient_timestamps: self.query.lenient_timestamps,
            },
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Database overrides
        if let Some(uri) = var("MONGODB_URI") {
            self.database.uri = uri;
        }
        if let Some(name) = var("MONGODB_DATABASE") {
            self.database.name = name;
        }

        // Query overrides
        if let Some(timeout) = var("SENSOR_QUERIES_QUERY_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.query.timeout_secs = t;
            }
        }

        // API overrides
        if let Some(host) = var("SENSOR_QUERIES_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("SENSOR_QUERIES_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Logging overrides
        if let Some(level) = var("SENSOR_QUERIES_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("SENSOR_QUERIES_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

fn default_locations() -> Vec<PathBuf> {
    [
        dirs::config_dir().map(|p| p.join("sensor-queries").join("config.toml")),
        Some(PathBuf::from("/etc/sensor-queries/config.toml")),
        Some(PathBuf::from("./config.toml")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn first_existing(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|path| path.exists())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Sensor Queries Configuration
#
# Environment variables override these settings:
# - MONGODB_URI
# - MONGODB_DATABASE
# - SENSOR_QUERIES_QUERY_TIMEOUT_SECS
# - SENSOR_QUERIES_API_HOST
# - SENSOR_QUERIES_API_PORT
# - SENSOR_QUERIES_LOG_LEVEL
# - SENSOR_QUERIES_LOG_FORMAT

[database]
# MongoDB connection string
uri = "mongodb://localhost:27017"

# Database holding the sensor collections
name = "sensor_resource"

# Collection of measurement documents
measurements_collection = "sensor_resource_measurements"

# Collection of sensor metadata documents
sensors_collection = "sensor_resource_sensors"

# Connect and server selection timeout (seconds)
connect_timeout_secs = 10

[query]
# Deadline for one query, store round trip and decoding included (seconds)
timeout_secs = 30

# Encoding of stored sensor ids: "object_id", "opaque" or "either" (both)
id_scheme = "object_id"

# Requests with only one of from/to: "ignore" (no time filter) or "half_open"
single_bound = "ignore"

# Undecodable documents: "skip" (report and continue) or "abort" (fail the query)
decode_failures = "skip"

# Decode missing or unreadable timestamps as 1970-01-01T00:00:00Z instead of failing
lenient_timestamps = false

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8080

# Allowed CORS origins (empty = allow any)
cors_origins = []

[logging]
# Log filter: trace, debug, info, warn, error, or a full EnvFilter directive
level = "sensor_queries=info,tower_http=info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();

        assert_eq!(config.database.uri, "mongodb://localhost:27017");
        assert_eq!(config.database.measurements_collection, "sensor_resource_measurements");
        assert_eq!(config.query.timeout_secs, 30);
        assert_eq!(config.query.id_scheme, IdScheme::ObjectId);
        assert_eq!(config.query.single_bound, SingleBoundPolicy::Ignore);
        assert_eq!(config.query.decode_failures, DecodePolicy::Skip);
        assert!(!config.query.lenient_timestamps);
        assert_eq!(config.api.port, 8080);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[database]\nname = \"farm\"\n\n[query]\nid_scheme = \"opaque\"\ndecode_failures = \"abort\""
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.database.name, "farm");
        assert_eq!(config.database.uri, "mongodb://localhost:27017");
        assert_eq!(config.query.id_scheme, IdScheme::Opaque);
        assert_eq!(config.query.decode_failures, DecodePolicy::Abort);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[query]\nsingle_bound = \"sometimes\"").unwrap();

        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            Config::load(Path::new("/nonexistent/config.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_first_existing_location() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let present = dir.path().join("config.toml");
        std::fs::write(&present, "[database]\nname = \"farm\"\n").unwrap();

        assert_eq!(
            first_existing(vec![missing.clone(), present.clone()]),
            Some(present)
        );
        assert_eq!(first_existing(vec![missing]), None);
    }

    #[test]
    fn test_broken_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("config.toml");
        std::fs::write(&broken, "[database\nuri = ").unwrap();

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            Config::load_first(vec![missing.clone(), broken]),
            Err(ConfigError::Parse { .. })
        ));
        assert!(Config::load_first(vec![missing]).is_ok());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("MONGODB_URI", "mongodb://db.internal:27017"),
            ("MONGODB_DATABASE", "farm"),
            ("SENSOR_QUERIES_QUERY_TIMEOUT_SECS", "5"),
            ("SENSOR_QUERIES_API_PORT", "not-a-port"),
            ("SENSOR_QUERIES_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.uri, "mongodb://db.internal:27017");
        assert_eq!(config.database.name, "farm");
        assert_eq!(config.query.timeout_secs, 5);
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_executor_config() {
        let mut config = Config::default();
        config.query.timeout_secs = 12;
        config.query.lenient_timestamps = true;

        let executor = config.executor_config();

        assert_eq!(executor.timeout, Duration::from_secs(12));
        assert_eq!(executor.sensors_collection, "sensor_resource_sensors");
        assert!(executor.decoder.lenient_timestamps);
    }
}
