//! Domain validation errors for core domain types.
//!
//! This module defines errors that occur when a request or a stored value
//! violates a domain rule. They never carry a state change with them: a
//! caller that receives one can assume nothing was written.
//!
//! # Examples
//!
//! ```
//! use loserpool::domain::error::DomainError;
//! use loserpool::domain::{Phase, WeekSlot};
//!
//! let result = WeekSlot::new(Phase::Regular, 19);
//! assert!(matches!(result, Err(DomainError::WeekOutOfRange { .. })));
//! ```

use thiserror::Error;

use super::season::Phase;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The week number is outside the allow-list for the phase.
    #[error("week {week} is out of range for {phase} (1..={max})")]
    WeekOutOfRange {
        /// Phase the week was requested for.
        phase: Phase,
        /// The rejected week number.
        week: u8,
        /// Highest valid week in the phase.
        max: u8,
    },

    /// A stored or requested slot name is not in the allow-list.
    #[error("unknown week slot '{0}'")]
    UnknownSlot(String),

    /// A phase label could not be parsed.
    #[error("unknown phase '{0}'")]
    UnknownPhase(String),

    /// A status label could not be parsed.
    #[error("unknown {kind} status '{value}'")]
    UnknownStatus {
        /// Which entity the status belongs to.
        kind: &'static str,
        /// The rejected label.
        value: String,
    },

    /// The requested matchup does not exist.
    #[error("matchup {0} not found")]
    UnknownMatchup(String),

    /// The team is neither the away nor the home side of the matchup.
    #[error("team '{team}' is not playing in matchup {matchup_id}")]
    TeamNotInMatchup {
        /// Requested team name.
        team: String,
        /// Matchup that was targeted.
        matchup_id: String,
    },

    /// The matchup is scheduled for a different week than the one being allocated.
    #[error("matchup {matchup_id} belongs to {matchup_slot}, current week is {current_slot}")]
    MatchupOutsideWeek {
        /// Matchup that was targeted.
        matchup_id: String,
        /// Slot the matchup is scheduled in.
        matchup_slot: String,
        /// Slot the caller resolved as current.
        current_slot: String,
    },

    /// The pick does not exist for the given owner.
    #[error("pick '{pick}' not found for user {user_id}")]
    UnknownPick {
        /// Display name of the pick.
        pick: String,
        /// Requesting user.
        user_id: String,
    },

    /// The pick has no allocation in the requested slot.
    #[error("pick '{pick}' has no allocation in {slot}")]
    NotAllocated {
        /// Display name of the pick.
        pick: String,
        /// Slot that was checked.
        slot: String,
    },

    /// An allocation request named no picks.
    #[error("no picks named in request")]
    EmptyBatch,

    /// A grant must materialize at least one pick.
    #[error("picks count must be positive, got {0}")]
    NonPositivePicksCount(i64),

    /// An external game failed basic sanity checks.
    #[error("invalid game {game}: {reason}")]
    InvalidGame {
        /// Human readable game label.
        game: String,
        /// Why it was rejected.
        reason: String,
    },
}
