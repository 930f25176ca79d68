//! Service configuration
//!
//! Layered with the `config` crate: built-in defaults, then `FEED_*`
//! environment variables. The provider credential is read from
//! `ALPHAVANTAGE_API_KEY`.
//!
//! Live series always carry at least `DEFAULT_MIN_POINTS` points, so a
//! lower `min_points` is rejected at load time.

use crate::feed::{FeedSettings, DEFAULT_MIN_POINTS, DEFAULT_RECORD_LIMIT};
use crate::sources::alphavantage::AlphaVantageClient;
use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, Map, Source};
use serde::Deserialize;
use std::time::Duration;

/// Environment variable holding the provider credential
pub const API_KEY_VAR: &str = "ALPHAVANTAGE_API_KEY";

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub api_key: String,
    pub base_url: String,
    pub record_limit: usize,
    pub min_points: usize,
    pub timeout_secs: u64,
    pub port: u16,
}

impl FeedConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Load from a snapshot of environment variables
    pub fn from_vars(vars: Map<String, String>) -> Result<Self, ConfigError> {
        let mut builder = Self::builder()?;

        // Platform-injected PORT replaces the default; FEED_PORT still wins
        if let Some(port) = vars.get("PORT") {
            builder = builder.set_default("port", port.as_str())?;
        }
        let api_key = vars.get(API_KEY_VAR).cloned();

        let config: Self = builder
            .add_source(
                Environment::with_prefix("FEED")
                    .try_parsing(true)
                    .source(Some(vars)),
            )
            .set_override_option("api_key", api_key)?
            .build()?
            .try_deserialize()?;
        config.validate()
    }

    /// Load from defaults plus an arbitrary source
    pub fn from_source<S>(source: S) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let config: Self = Self::builder()?.add_source(source).build()?.try_deserialize()?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.min_points < DEFAULT_MIN_POINTS {
            return Err(ConfigError::Message(format!(
                "min_points must be at least {}, got {}",
                DEFAULT_MIN_POINTS, self.min_points
            )));
        }
        if self.record_limit < self.min_points {
            return Err(ConfigError::Message(format!(
                "record_limit ({}) must not be below min_points ({})",
                self.record_limit, self.min_points
            )));
        }
        Ok(self)
    }

    fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("api_key", "demo")?
            .set_default("base_url", AlphaVantageClient::DEFAULT_BASE_URL)?
            .set_default("record_limit", DEFAULT_RECORD_LIMIT as u64)?
            .set_default("min_points", DEFAULT_MIN_POINTS as u64)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("port", DEFAULT_PORT as u64)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn feed_settings(&self) -> FeedSettings {
        FeedSettings {
            record_limit: self.record_limit,
            min_points: self.min_points,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_key: "demo".to_string(),
            base_url: AlphaVantageClient::DEFAULT_BASE_URL.to_string(),
            record_limit: DEFAULT_RECORD_LIMIT,
            min_points: DEFAULT_MIN_POINTS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            port: DEFAULT_PORT,
        }
    }
}
