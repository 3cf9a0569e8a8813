//! Season calendar configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::SeasonClock;
use crate::error::{ConfigError, Result};

/// `[season]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonConfig {
    /// First day of preseason week 1 (UTC), e.g. `2026-08-06`.
    pub start_date: Option<NaiveDate>,
}

impl SeasonConfig {
    /// Build the season clock.
    ///
    /// # Errors
    /// [`ConfigError::MissingField`] when `start_date` is not set.
    pub fn clock(&self) -> Result<SeasonClock> {
        let start = self.start_date.ok_or(ConfigError::MissingField {
            field: "season.start_date",
        })?;
        Ok(SeasonClock::new(start))
    }
}

/// `[defaults]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub policy: crate::domain::DefaultPickPolicy,
}
