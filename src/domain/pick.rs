//! Picks and their weekly allocations.
//!
//! A pick survives a week when the team it was allocated to does not win.
//! Allocations are stored per (pick, week slot), so a pick can hold at most
//! one token for any given week.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{MatchupId, PickId, UserId};
use super::slot::WeekSlot;

/// Pick lifecycle: `pending -> active -> eliminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickStatus {
    Pending,
    Active,
    Eliminated,
}

impl PickStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Eliminated => "eliminated",
        }
    }
}

impl fmt::Display for PickStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PickStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "eliminated" => Ok(Self::Eliminated),
            other => Err(DomainError::UnknownStatus {
                kind: "pick",
                value: other.to_string(),
            }),
        }
    }
}

/// The (matchup, team) pair a pick is riding for one week.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllocationToken {
    pub matchup_id: MatchupId,
    pub team: String,
}

impl AllocationToken {
    pub fn new(matchup_id: MatchupId, team: impl Into<String>) -> Self {
        Self {
            matchup_id,
            team: team.into(),
        }
    }

    /// Legacy `matchupId_team` encoding.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{}_{}", self.matchup_id, self.team)
    }
}

impl fmt::Display for AllocationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// A token recorded in one week slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub slot: WeekSlot,
    pub token: AllocationToken,
    /// Set when the default assigner chose the team.
    pub is_default: bool,
    pub allocated_at: DateTime<Utc>,
}

/// One unit of entry into the pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pick {
    pub id: PickId,
    pub owner: UserId,
    pub number: i32,
    pub display_name: String,
    pub status: PickStatus,
    /// Always 1 once materialized.
    pub count: i32,
    pub allocations: Vec<Allocation>,
}

impl Pick {
    /// Display name for the `number`-th pick of a user.
    #[must_use]
    pub fn display_name_for(number: i32) -> String {
        format!("Pick {number}")
    }

    #[must_use]
    pub fn allocation(&self, slot: WeekSlot) -> Option<&Allocation> {
        self.allocations.iter().find(|a| a.slot == slot)
    }

    #[must_use]
    pub fn token(&self, slot: WeekSlot) -> Option<&AllocationToken> {
        self.allocation(slot).map(|a| &a.token)
    }

    #[must_use]
    pub fn is_eliminated(&self) -> bool {
        self.status == PickStatus::Eliminated
    }
}
