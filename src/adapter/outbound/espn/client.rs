//! ESPN scoreboard client.
//!
//! Fetches one week of NFL games with odds. Timeouts and connect failures
//! are retried with a fixed backoff; anything that still fails at the
//! transport level surfaces as [`SyncError::TransientSource`] so the caller
//! can retry the whole sync later without touching stored data.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

use super::dto::ScoreboardResponse;
use super::settings::FeedConfig;
use crate::domain::{Phase, ScheduledGame, WeekSlot};
use crate::error::{ConfigError, Error, Result, SyncError};
use crate::port::outbound::schedule::ScheduleSource;

/// ESPN's postseason has a Pro Bowl week between the conference
/// championships and the Super Bowl.
const ESPN_SUPER_BOWL_WEEK: u8 = 5;

/// HTTP client for the ESPN NFL scoreboard.
pub struct EspnClient {
    http: HttpClient,
    base_url: String,
    season: Option<i32>,
    retry_max_attempts: u32,
    retry_backoff_ms: u64,
}

impl EspnClient {
    /// Build a client with the configured timeouts.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] if the base URL does not parse
    /// or the HTTP client cannot be built.
    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|err| ConfigError::InvalidValue {
            field: "feed.base_url",
            reason: err.to_string(),
        })?;

        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(|err| ConfigError::InvalidValue {
                field: "feed",
                reason: format!("failed to build HTTP client: {err}"),
            })?;

        Ok(Self {
            http,
            base_url,
            season: config.season,
            retry_max_attempts: config.retry_max_attempts,
            retry_backoff_ms: config.retry_backoff_ms,
        })
    }

    /// ESPN `(seasontype, week)` for an internal slot.
    #[must_use]
    pub fn feed_week(slot: WeekSlot) -> (u8, u8) {
        match slot.phase() {
            Phase::Preseason => (1, slot.week()),
            Phase::Regular => (2, slot.week()),
            Phase::Postseason if slot.week() == Phase::Postseason.max_week() => {
                (3, ESPN_SUPER_BOWL_WEEK)
            }
            Phase::Postseason => (3, slot.week()),
        }
    }

    /// Scoreboard URL for `slot`.
    ///
    /// # Errors
    /// Returns [`Error::Url`] if the configured base URL is invalid.
    pub fn scoreboard_url(&self, slot: WeekSlot) -> Result<Url> {
        let (season_type, week) = Self::feed_week(slot);
        let mut url = Url::parse(&format!("{}/scoreboard", self.base_url))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("seasontype", &season_type.to_string())
                .append_pair("week", &week.to_string())
                .append_pair("limit", "100");
            if let Some(season) = self.season {
                query.append_pair("dates", &season.to_string());
            }
        }
        Ok(url)
    }

    async fn get_with_retry(&self, url: &Url) -> Result<ScoreboardResponse> {
        let mut attempt = 0;
        let max_attempts = self.retry_max_attempts.max(1);

        loop {
            attempt += 1;
            let response = match self.http.get(url.clone()).send().await {
                Ok(response) => response,
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(Self::transient(&err));
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                    continue;
                }
            };

            let response = match response.error_for_status() {
                Ok(response) => response,
                Err(err) if err.status().is_some_and(|s| s.is_server_error()) => {
                    if attempt >= max_attempts {
                        return Err(Self::transient(&err));
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            match response.json::<ScoreboardResponse>().await {
                Ok(parsed) => return Ok(parsed),
                Err(err) if err.is_decode() => {
                    return Err(Error::Parse(format!("scoreboard response: {err}")));
                }
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(Self::transient(&err));
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                }
            }
        }
    }

    fn should_retry(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }

    fn transient(err: &reqwest::Error) -> Error {
        SyncError::TransientSource {
            reason: err.to_string(),
        }
        .into()
    }

    async fn backoff(&self, attempt: u32, max_attempts: u32, err: &reqwest::Error) {
        warn!(
            attempt,
            max_attempts,
            error = %err,
            "Scoreboard request failed, retrying"
        );
        if self.retry_backoff_ms > 0 {
            sleep(Duration::from_millis(self.retry_backoff_ms)).await;
        }
    }
}

#[async_trait]
impl ScheduleSource for EspnClient {
    async fn fetch_week(&self, slot: WeekSlot) -> Result<Vec<ScheduledGame>> {
        let url = self.scoreboard_url(slot)?;
        info!(url = %url, slot = %slot, "Fetching scoreboard");

        let response = self.get_with_retry(&url).await?;
        let mut games = Vec::with_capacity(response.events.len());
        for event in &response.events {
            match event.to_game() {
                Ok(game) => games.push(game),
                Err(reason) => warn!(event_id = %event.id, reason = %reason, "Skipping feed event"),
            }
        }

        debug!(slot = %slot, count = games.len(), "Fetched games");
        Ok(games)
    }

    fn source_name(&self) -> &'static str {
        "ESPN"
    }
}
