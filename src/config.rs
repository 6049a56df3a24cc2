//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast on malformed values. In local dev,
//! call `dotenvy::dotenv().ok()` before `from_env`.

use std::time::Duration;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    /// Stage idle re-poll interval.
    pub poll_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let poll_ms = match std::env::var("POLL_INTERVAL_MS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| Error::Config(format!("POLL_INTERVAL_MS is not a number: {raw}")))?,
            Err(_) => 500,
        };

        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            poll_interval: Duration::from_millis(poll_ms),
        })
    }
}
