use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Allocation rule violations. None of these leave state behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("matchup {matchup_id} is locked: kicked off at {kickoff}")]
    Locked {
        matchup_id: String,
        kickoff: DateTime<Utc>,
    },

    #[error("pick '{pick}' is eliminated and cannot be changed")]
    EliminatedPick { pick: String },

    #[error("batch of {requested} picks rejected, failed: {}", failed.join(", "))]
    PartialBatchFailure {
        requested: usize,
        failed: Vec<String>,
    },
}

/// Schedule synchronization failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("sync conflict for {game}: {reason}")]
    Conflict { game: String, reason: String },

    #[error("schedule source unavailable: {reason}")]
    TransientSource { reason: String },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Whether retrying the same operation later may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Sync(SyncError::TransientSource { .. }))
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Database(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
