//! # Configuration Management
//!
//! Centralized configuration for the peer protocol library.
//!
//! This module holds the wire constants and the structured settings for the
//! codec, the transport adapter, outbound connections and logging.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment overrides via `from_env()`

use crate::core::codec::{DecodeOptions, Framing, VersionPolicy};
use crate::error::{ProtocolError, Result};
use crate::utils::timeout;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// Current protocol version
pub const PROTOCOL_VERSION: u8 = 1;

/// Size of the fixed header: length(2) + version(1)
pub const HEADER_LEN: usize = 3;

/// Size of the body vector for types that carry one
pub const VECTOR_LEN: usize = 16;

/// Smallest decodable input: length(2) + version(1) + type(1)
pub const MIN_PACKET_LEN: usize = HEADER_LEN + 1;

/// Largest body the 16-bit length field can describe
pub const MAX_BODY_LEN: usize = u16::MAX as usize;

/// Largest complete packet on the wire
pub const MAX_PACKET_LEN: usize = HEADER_LEN + MAX_BODY_LEN;

/// Default number of bytes requested per transport read
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4096;

/// Main configuration structure that contains all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct NetworkConfig {
    /// Decoder behaviour
    #[serde(default)]
    pub codec: CodecConfig,

    /// Transport adapter configuration
    #[serde(default)]
    pub transport: TransportConfig,

    /// Outbound connection configuration
    #[serde(default)]
    pub client: ClientConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl NetworkConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("PEER_PROTOCOL_ADDRESS") {
            config.client.address = addr;
        }

        if let Ok(size) = std::env::var("PEER_PROTOCOL_READ_BUFFER_SIZE") {
            if let Ok(val) = size.parse::<usize>() {
                config.transport.read_buffer_size = val;
            }
        }

        if let Ok(timeout) = std::env::var("PEER_PROTOCOL_READ_TIMEOUT_MS") {
            if let Ok(val) = timeout.parse::<u64>() {
                config.transport.read_timeout = Duration::from_millis(val);
            }
        }

        if let Ok(timeout) = std::env::var("PEER_PROTOCOL_WRITE_TIMEOUT_MS") {
            if let Ok(val) = timeout.parse::<u64>() {
                config.transport.write_timeout = Duration::from_millis(val);
            }
        }

        if let Ok(strict) = std::env::var("PEER_PROTOCOL_STRICT_FRAMING") {
            if let Ok(val) = strict.parse::<bool>() {
                config.codec.strict_framing = val;
            }
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        errors.extend(self.transport.validate());
        errors.extend(self.client.validate());
        errors.extend(self.logging.validate());

        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Decoder configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CodecConfig {
    /// Reject bytes left over after the declared packet length
    pub strict_framing: bool,

    /// Reject packets whose version differs from `PROTOCOL_VERSION`
    pub enforce_version: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            strict_framing: true,
            enforce_version: true,
        }
    }
}

impl CodecConfig {
    /// Decode options described by this configuration
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            framing: if self.strict_framing {
                Framing::Strict
            } else {
                Framing::Streaming
            },
            version_policy: if self.enforce_version {
                VersionPolicy::Current
            } else {
                VersionPolicy::Any
            },
        }
    }
}

/// Transport adapter configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportConfig {
    /// Initial read buffer capacity of a configured connection
    pub read_buffer_size: usize,

    /// Deadline for a single receive
    #[serde(with = "duration_serde")]
    pub read_timeout: Duration,

    /// Deadline for a single send
    #[serde(with = "duration_serde")]
    pub write_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            read_timeout: timeout::DEFAULT_TIMEOUT,
            write_timeout: timeout::DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Validate transport configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.read_buffer_size < MIN_PACKET_LEN {
            errors.push(format!(
                "Read buffer size too small: {} bytes (minimum: {MIN_PACKET_LEN})",
                self.read_buffer_size
            ));
        } else if self.read_buffer_size > MAX_PACKET_LEN {
            errors.push(format!(
                "Read buffer size too large: {} bytes (maximum: {MAX_PACKET_LEN})",
                self.read_buffer_size
            ));
        }

        if self.read_timeout.as_millis() < 10 {
            errors.push("Read timeout too short (minimum: 10ms)".to_string());
        } else if self.read_timeout.as_secs() > 300 {
            errors.push("Read timeout too long (maximum: 300s)".to_string());
        }

        if self.write_timeout.as_millis() < 10 {
            errors.push("Write timeout too short (minimum: 10ms)".to_string());
        } else if self.write_timeout.as_secs() > 300 {
            errors.push("Write timeout too long (maximum: 300s)".to_string());
        }

        errors
    }
}

/// Outbound connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Peer address
    pub address: String,

    /// Timeout for connection attempts
    #[serde(with = "duration_serde")]
    pub connection_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: String::from("127.0.0.1:7946"),
            connection_timeout: timeout::DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Validate client configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.address.is_empty() {
            errors.push("Peer address cannot be empty".to_string());
        } else if self.address.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!(
                "Invalid peer address format: '{}' (expected format: '10.0.0.1:7946')",
                self.address
            ));
        }

        if self.connection_timeout.as_millis() < 100 {
            errors.push("Connection timeout too short (minimum: 100ms)".to_string());
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("peer-protocol"),
            log_level: Level::INFO,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for Duration serialization/deserialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = duration.as_millis() as u64;
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
