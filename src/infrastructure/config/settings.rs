//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings.
//! Configuration is loaded from a TOML file; `LOSERPOOL_DATABASE` overrides
//! the database path.
//!
//! # Example
//!
//! ```no_run
//! use loserpool::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use super::logging::LoggingConfig;
use super::season::{DefaultsConfig, SeasonConfig};
use crate::adapter::outbound::espn::FeedConfig;
use crate::error::{ConfigError, Result};

/// Environment variable overriding [`Config::database`].
pub const DATABASE_ENV: &str = "LOSERPOOL_DATABASE";

const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to SQLite database file.
    ///
    /// Defaults to "loserpool.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Season calendar.
    #[serde(default)]
    pub season: SeasonConfig,

    /// Schedule and odds feed.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Default pick policy.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

fn default_database_path() -> String {
    "loserpool.db".to_string()
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the content is
    /// malformed, or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(database) = lookup(DATABASE_ENV).filter(|v| !v.trim().is_empty()) {
            self.database = database;
        }
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }
        self.season.clock()?;

        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("must be one of {}", LOG_FORMATS.join(", ")),
            }
            .into());
        }

        Url::parse(&self.feed.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "feed.base_url",
            reason: e.to_string(),
        })?;
        if self.feed.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "feed.timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.feed.retry_max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "feed.retry_max_attempts",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.feed.sync_budget_ms < self.feed.timeout_ms {
            return Err(ConfigError::InvalidValue {
                field: "feed.sync_budget_ms",
                reason: "must be >= feed.timeout_ms".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
