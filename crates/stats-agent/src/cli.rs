//! CLI argument parsing for statsfwd

use clap::Parser;
use stats_datadog::{ClientConfig, ClientResult};
use std::path::PathBuf;
use std::time::Duration;

/// Forward in-process metrics to a DogStatsD agent
#[derive(Parser, Debug, Clone)]
#[command(name = "statsfwd")]
#[command(about = "Forward in-process metrics to a DogStatsD agent")]
#[command(version)]
pub struct Cli {
    /// JSON configuration file (optional, defaults are used if not specified)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// DogStatsD agent address, overrides the configuration file
    #[arg(long)]
    pub address: Option<String>,

    /// Frame buffer size in bytes, overrides the configuration file
    #[arg(long)]
    pub buffer_size: Option<usize>,

    /// Flush interval in milliseconds, overrides the configuration file
    #[arg(long)]
    pub flush_interval_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Generate synthetic metrics until interrupted
    #[arg(long, default_value_t = false)]
    pub demo: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Build the client configuration from the file and the overrides
    pub fn client_config(&self) -> ClientResult<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_json_file(path)?,
            None => ClientConfig::default(),
        };

        if let Some(address) = &self.address {
            config.address = address.clone();
        }
        if let Some(buffer_size) = self.buffer_size {
            config.buffer_size = buffer_size;
        }
        if let Some(ms) = self.flush_interval_ms {
            config.flush_interval = Duration::from_millis(ms);
        }

        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }
}
