//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP / WebSocket listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the built map client; not served when unset
    #[serde(default)]
    pub static_dir: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parse the listen address
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.addr()
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(self.addr()))
    }
}

/// Peer tracking and fan-out tuning
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_max_peers")]
    pub max_peers: usize,

    /// Events buffered per peer before deliveries to it are dropped
    #[serde(default = "default_outbox_capacity")]
    pub outbox_capacity: usize,

    #[serde(default = "default_write_timeout")]
    pub write_timeout_ms: u64,

    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,

    /// Silence after which a peer is considered gone
    #[serde(default = "default_client_timeout")]
    pub client_timeout_secs: u64,

    /// Send known peer locations to newly connected peers
    #[serde(default)]
    pub initial_sync: bool,
}

fn default_max_peers() -> usize {
    10_000
}

fn default_outbox_capacity() -> usize {
    64
}

fn default_write_timeout() -> u64 {
    5000 // 5 seconds
}

fn default_heartbeat_interval() -> u64 {
    10
}

fn default_client_timeout() -> u64 {
    30
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_peers: default_max_peers(),
            outbox_capacity: default_outbox_capacity(),
            write_timeout_ms: default_write_timeout(),
            heartbeat_interval_secs: default_heartbeat_interval(),
            client_timeout_secs: default_client_timeout(),
            initial_sync: false,
        }
    }
}

impl RelayConfig {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        // tokio::time::interval panics on a zero period
        Duration::from_secs(self.heartbeat_interval_secs.max(1))
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs)
    }

    /// Reject settings that would make the relay unusable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.outbox_capacity == 0 {
            return Err(ConfigError::Invalid(
                "relay.outbox_capacity must be at least 1".to_string(),
            ));
        }
        if self.client_timeout() <= self.heartbeat_interval() {
            return Err(ConfigError::Invalid(
                "relay.client_timeout_secs must exceed relay.heartbeat_interval_secs".to_string(),
            ));
        }
        Ok(())
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
    "info".to_string()
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

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })?;
        config.relay.validate()?;
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

    /// Default config file locations, in lookup order
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("meridian").join("config.toml"));
        }
        paths.push(PathBuf::from("/etc/meridian/config.toml"));
        paths.push(PathBuf::from("./config.toml"));
        paths
    }

    /// Load from default locations or environment
    ///
    /// Returns the config together with the file it came from, if any.
    pub fn load_default() -> Result<(Self, Option<PathBuf>), ConfigError> {
        Self::load_first(&Self::default_paths())
    }

    /// Load the first existing file in `paths`
    ///
    /// A file that exists but fails to load is an error, never skipped
    /// in favour of a later path or the built-in defaults.
    pub fn load_first(paths: &[PathBuf]) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match paths.iter().find(|path| path.exists()) {
            Some(path) => Ok((Self::load_with_env(path)?, Some(path.clone()))),
            None => Ok((Self::from_env(), None)),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (the process environment in production)
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Server overrides; PORT is what most hosting platforms inject
        if let Some(host) = lookup("MERIDIAN_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("MERIDIAN_PORT").or_else(|| lookup("PORT")) {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Some(dir) = lookup("MERIDIAN_STATIC_DIR") {
            self.server.static_dir = Some(dir);
        }

        // Relay overrides
        if let Some(flag) = lookup("MERIDIAN_INITIAL_SYNC") {
            self.relay.initial_sync = parse_flag(&flag);
        }

        // Logging overrides
        if let Some(level) = lookup("MERIDIAN_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("MERIDIAN_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Meridian Configuration
#
# Environment variables override these settings:
# - MERIDIAN_HOST
# - MERIDIAN_PORT (or PORT)
# - MERIDIAN_STATIC_DIR
# - MERIDIAN_INITIAL_SYNC
# - MERIDIAN_LOG_LEVEL
# - MERIDIAN_LOG_FORMAT

[server]
# Listen host
host = "0.0.0.0"

# Listen port
port = 3000

# Directory with the built map client (index.html is served for unknown paths)
# static_dir = "./client/dist"

[relay]
# Maximum number of connected peers
max_peers = 10000

# Events buffered per peer before further deliveries to it are dropped
outbox_capacity = 64

# Abandon a socket write after this long (ms)
write_timeout_ms = 5000

# How often to ping each peer (seconds)
heartbeat_interval_secs = 10

# Disconnect peers silent for this long (seconds)
client_timeout_secs = 30

# Send known peer locations to newly connected peers
initial_sync = false

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
