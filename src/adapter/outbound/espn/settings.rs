//! Schedule feed configuration.

use serde::{Deserialize, Serialize};

/// `[feed]` section: where the scoreboard lives and how hard to try.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Scoreboard API root, without the trailing `/scoreboard`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Season year passed as `dates`. The feed's current season when unset.
    #[serde(default)]
    pub season: Option<i32>,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Maximum number of attempts for transient failures.
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,
    /// Backoff between retries in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Wall-clock budget for one whole week sync in milliseconds.
    #[serde(default = "default_sync_budget_ms")]
    pub sync_budget_ms: u64,
}

fn default_base_url() -> String {
    "https://site.api.espn.com/apis/site/v2/sports/football/nfl".into()
}

const fn default_timeout_ms() -> u64 {
    5000
}

const fn default_connect_timeout_ms() -> u64 {
    2000
}

const fn default_retry_max_attempts() -> u32 {
    3
}

const fn default_retry_backoff_ms() -> u64 {
    250
}

const fn default_sync_budget_ms() -> u64 {
    30_000
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            season: None,
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            sync_budget_ms: default_sync_budget_ms(),
        }
    }
}
