//! Client configuration

use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default address of the DogStatsD agent
pub const DEFAULT_ADDRESS: &str = "localhost:8125";

/// Default size of the frame buffer (largest UDP payload over IPv4)
pub const DEFAULT_BUFFER_SIZE: usize = 65507;

/// Default interval between two flushes
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Address of the DogStatsD agent
    #[serde(default = "default_address")]
    pub address: String,
    /// Capacity of the frame buffer in bytes
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// How often the engine state is read and forwarded
    #[serde(
        default = "default_flush_interval",
        rename = "flush_interval_ms",
        with = "duration_ms"
    )]
    pub flush_interval: Duration,
}

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

fn default_flush_interval() -> Duration {
    DEFAULT_FLUSH_INTERVAL
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            buffer_size: default_buffer_size(),
            flush_interval: default_flush_interval(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration pointing at `address`
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    /// Set the frame buffer capacity
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Set the flush interval
    pub fn with_flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval = flush_interval;
        self
    }

    /// Replace empty or zero settings with their defaults
    pub fn normalized(mut self) -> Self {
        if self.address.trim().is_empty() {
            self.address = default_address();
        }
        if self.buffer_size == 0 {
            self.buffer_size = default_buffer_size();
        }
        if self.flush_interval.is_zero() {
            self.flush_interval = default_flush_interval();
        }
        self
    }

    /// Check that the address looks like `host:port`
    pub fn validate(&self) -> ClientResult<()> {
        let port = self
            .address
            .rsplit_once(':')
            .map(|(_, port)| port)
            .ok_or_else(|| ClientError::Config(format!("address {:?} has no port", self.address)))?;

        port.parse::<u16>()
            .map_err(|_| ClientError::Config(format!("address {:?} has an invalid port", self.address)))?;
        Ok(())
    }

    /// Parse a JSON configuration, defaulting missing fields
    pub fn from_json_str(json: &str) -> ClientResult<Self> {
        let config: ClientConfig = serde_json::from_str(json)?;
        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading client configuration from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.address, "localhost:8125");
        assert_eq!(config.buffer_size, 65507);
        assert_eq!(config.flush_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_normalized_fills_zero_values() {
        let config = ClientConfig {
            address: String::new(),
            buffer_size: 0,
            flush_interval: Duration::ZERO,
        }
        .normalized();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_normalized_keeps_explicit_values() {
        let config = ClientConfig::new("10.0.0.1:9125")
            .with_buffer_size(1432)
            .with_flush_interval(Duration::from_millis(250))
            .normalized();
        assert_eq!(config.address, "10.0.0.1:9125");
        assert_eq!(config.buffer_size, 1432);
        assert_eq!(config.flush_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_validate() {
        assert!(ClientConfig::default().validate().is_ok());
        assert!(ClientConfig::new("[::1]:8125").validate().is_ok());
        assert!(matches!(
            ClientConfig::new("localhost").validate(),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::new("localhost:http").validate(),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn test_from_json_defaults_missing_fields() {
        let config = ClientConfig::from_json_str(r#"{ "flush_interval_ms": 500 }"#).unwrap();
        assert_eq!(config.address, DEFAULT_ADDRESS);
        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
        assert_eq!(config.flush_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_from_json_zero_interval_is_defaulted() {
        let config = ClientConfig::from_json_str(r#"{ "flush_interval_ms": 0, "buffer_size": 0 }"#).unwrap();
        assert_eq!(config.flush_interval, DEFAULT_FLUSH_INTERVAL);
        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn test_from_json_rejects_bad_address() {
        let result = ClientConfig::from_json_str(r#"{ "address": "no-port" }"#);
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let config = ClientConfig::new("127.0.0.1:9000").with_flush_interval(Duration::from_millis(1500));
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"flush_interval_ms\":1500"));
        let back = ClientConfig::from_json_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{ "address": "127.0.0.1:18125", "buffer_size": 1024 }"#)
            .unwrap();

        let config = ClientConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.address, "127.0.0.1:18125");
        assert_eq!(config.buffer_size, 1024);
        assert_eq!(config.flush_interval, DEFAULT_FLUSH_INTERVAL);
    }

    #[test]
    fn test_from_json_file_missing() {
        let result = ClientConfig::from_json_file("/nonexistent/statsfwd.json");
        assert!(matches!(result, Err(ClientError::Io(_))));
    }
}
