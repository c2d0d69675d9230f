//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all client settings.
//! Every section is optional; an empty file yields a client pointed at a
//! local authority on port 5000.
//!
//! # Example
//!
//! ```no_run
//! use arbwatch::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use url::Url;

use super::authority::{AuthorityConfig, HttpConfig};
use super::logging::LoggingConfig;
use super::reconnection::ReconnectionConfig;
use super::sync::{SyncConfig, MAX_LIMIT};
use crate::domain::{SortKey, ViewParams};
use crate::error::{ConfigError, Result};

/// Main client configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    /// Authority endpoints.
    #[serde(default)]
    pub authority: AuthorityConfig,

    /// Request/response transport tuning.
    #[serde(default)]
    pub http: HttpConfig,

    /// Push channel reconnect schedule.
    #[serde(default)]
    pub reconnection: ReconnectionConfig,

    /// Initial view parameters and loop tuning.
    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `path` when it exists, otherwise fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file fails to load.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Override the initial view parameters and re-validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the overrides are invalid.
    #[allow(clippy::result_large_err)]
    pub fn with_view(mut self, min_profit: Option<Decimal>, sort: Option<SortKey>) -> Result<Self> {
        if let Some(threshold) = min_profit {
            self.sync.min_profit_threshold = threshold;
        }
        if let Some(sort_key) = sort {
            self.sync.sort = sort_key.to_string();
        }
        self.validate()?;
        Ok(self)
    }

    /// Validate configuration values.
    ///
    /// Checks that the authority URL is usable and values are within
    /// acceptable ranges.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule as a [`ConfigError`].
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        self.authority.base()?;

        if self.http.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.http.retry_max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry_max_attempts",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }

        if self.reconnection.initial_delay_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "initial_delay_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.reconnection.max_delay_ms < self.reconnection.initial_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "max_delay_ms",
                reason: "must be >= initial_delay_ms".to_string(),
            }
            .into());
        }
        if self.reconnection.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "backoff_multiplier",
                reason: "must be >= 1.0".to_string(),
            }
            .into());
        }

        if self.sync.limit == 0 || self.sync.limit > MAX_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "limit",
                reason: format!("must be between 1 and {MAX_LIMIT}"),
            }
            .into());
        }
        if self.sync.min_profit_threshold < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "min_profit_threshold",
                reason: "must be 0 or greater".to_string(),
            }
            .into());
        }
        if self.sync.sort.parse::<SortKey>().is_err() {
            return Err(ConfigError::InvalidValue {
                field: "sort",
                reason: format!(
                    "unknown sort key '{}', expected profit, net_profit, liquidity or recent",
                    self.sync.sort
                ),
            }
            .into());
        }
        if self.sync.command_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "command_capacity",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Initial view parameters from `[sync]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sort key or threshold is invalid.
    pub fn view_params(&self) -> Result<ViewParams> {
        Ok(self.sync.view_params()?)
    }

    /// Request/response API root.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn api_url(&self) -> Result<Url> {
        self.authority.api_url()
    }

    /// Push endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn ws_url(&self) -> Result<Url> {
        self.authority.ws_url()
    }

    /// Initialize logging from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
