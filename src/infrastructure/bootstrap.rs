//! Composition root: configuration to a ready [`Operator`].

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::adapter::outbound::espn::EspnClient;
use crate::adapter::outbound::sqlite::database::connection;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::operator::{Operator, OperatorSettings};
use crate::port::outbound::clock::SystemClock;

/// Open the database, run migrations, and wire the operator against the
/// configured feed and the system clock.
///
/// # Errors
/// Returns an error if the season is not configured or the database cannot
/// be opened.
pub fn build_operator(config: &Config) -> Result<Operator> {
    let settings = OperatorSettings {
        season_clock: config.season.clock()?,
        default_policy: config.defaults.policy,
        sync_budget: Duration::from_millis(config.feed.sync_budget_ms),
    };
    let pool = connection::open(&config.database)?;
    info!(database = %config.database, "Database ready");

    let source = Arc::new(EspnClient::from_config(&config.feed)?);
    Ok(Operator::new(settings, pool, source, Arc::new(SystemClock)))
}
