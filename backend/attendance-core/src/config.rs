// src/config.rs
use serde::Deserialize;

use crate::error::FilterConfigError;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Server Configuration
    #[serde(default = "default_server_host")]
    pub server_host: String,
    #[serde(default = "default_server_port")]
    pub server_port: u16,

    // Record generation / dashboard defaults
    #[serde(default = "default_mock_record_count")]
    pub mock_record_count: usize,
    /// Upper bound on the record count a caller may request.
    #[serde(default = "default_max_record_count")]
    pub max_record_count: usize,
    #[serde(default = "default_window_days")]
    pub default_window_days: i64,
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    3000
}

fn default_mock_record_count() -> usize {
    7
}

fn default_max_record_count() -> usize {
    10_000
}

fn default_window_days() -> i64 {
    365
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: default_server_host(),
            server_port: default_server_port(),
            mock_record_count: default_mock_record_count(),
            max_record_count: default_max_record_count(),
            default_window_days: default_window_days(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        // Parse environment variables into Config struct
        envy::from_env::<Config>()
    }

    /// Falls back to `mock_record_count` when nothing was requested.
    pub fn record_count(&self, requested: Option<usize>) -> Result<usize, FilterConfigError> {
        match requested.unwrap_or(self.mock_record_count) {
            count if count > self.max_record_count => Err(FilterConfigError::CountTooLarge {
                requested: count,
                max: self.max_record_count,
            }),
            count => Ok(count),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
