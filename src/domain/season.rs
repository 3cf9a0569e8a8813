//! Season phases and the clock that derives the current week.
//!
//! The [`SeasonClock`] is the single source of truth for "which week is it".
//! It maps elapsed time since the configured season start onto the three
//! NFL phases:
//!
//! ```text
//! week index  0..3    -> PRE 1..3
//! week index  3..21   -> REG 1..18
//! week index 21..     -> POST 1..4 (clamped at the final week)
//! ```
//!
//! Times before the season start resolve to preseason week 1.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::slot::WeekSlot;

/// Number of preseason weeks.
pub const PRESEASON_WEEKS: u8 = 3;
/// Number of regular-season weeks.
pub const REGULAR_SEASON_WEEKS: u8 = 18;
/// Number of postseason weeks (wild card through the final).
pub const POSTSEASON_WEEKS: u8 = 4;

/// NFL season phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "PRE", alias = "pre", alias = "preseason")]
    Preseason,
    #[serde(rename = "REG", alias = "reg", alias = "regular")]
    Regular,
    #[serde(rename = "POST", alias = "post", alias = "postseason")]
    Postseason,
}

impl Phase {
    /// Number of weeks in this phase.
    #[must_use]
    pub const fn max_week(self) -> u8 {
        match self {
            Self::Preseason => PRESEASON_WEEKS,
            Self::Regular => REGULAR_SEASON_WEEKS,
            Self::Postseason => POSTSEASON_WEEKS,
        }
    }

    /// Upper-case code, e.g. `REG`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Preseason => "PRE",
            Self::Regular => "REG",
            Self::Postseason => "POST",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Phase {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pre" | "preseason" => Ok(Self::Preseason),
            "reg" | "regular" => Ok(Self::Regular),
            "post" | "postseason" => Ok(Self::Postseason),
            _ => Err(DomainError::UnknownPhase(s.to_string())),
        }
    }
}

/// Resolved (phase, week) for a moment in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeasonState {
    pub phase: Phase,
    pub week: u8,
    pub slot: WeekSlot,
}

impl SeasonState {
    /// Build the state for a validated slot.
    #[must_use]
    pub fn from_slot(slot: WeekSlot) -> Self {
        Self {
            phase: slot.phase(),
            week: slot.week(),
            slot,
        }
    }

    #[must_use]
    pub fn is_preseason(&self) -> bool {
        self.phase == Phase::Preseason
    }

    #[must_use]
    pub fn is_regular_season(&self) -> bool {
        self.phase == Phase::Regular
    }

    #[must_use]
    pub fn is_postseason(&self) -> bool {
        self.phase == Phase::Postseason
    }

    /// Human readable week label.
    #[must_use]
    pub fn label(&self) -> String {
        match (self.phase, self.week) {
            (Phase::Preseason, week) => format!("Preseason Week {week}"),
            (Phase::Regular, week) => format!("Week {week}"),
            (Phase::Postseason, 1) => "Wild Card Round".to_string(),
            (Phase::Postseason, 2) => "Divisional Round".to_string(),
            (Phase::Postseason, 3) => "Conference Championships".to_string(),
            (Phase::Postseason, _) => "Super Bowl".to_string(),
        }
    }
}

/// A resolved week together with its allocation deadline.
#[derive(Debug, Clone, Serialize)]
pub struct WeekContext {
    pub season: SeasonState,
    /// Earliest kickoff among the week's matchups, if any are known.
    pub deadline: Option<DateTime<Utc>>,
    /// Whether the week was pinned by a tester override.
    pub pinned: bool,
    /// Whether the deadline had passed when the context was resolved.
    pub locked: bool,
}

impl WeekContext {
    /// True once the first game of the week has kicked off.
    #[must_use]
    pub fn deadline_passed(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}

/// Derives the current week from wall-clock time and the season start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonClock {
    start: DateTime<Utc>,
}

impl SeasonClock {
    /// Clock whose preseason week 1 begins at midnight UTC on `start_date`.
    #[must_use]
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            start: Utc.from_utc_datetime(&start_date.and_time(NaiveTime::default())),
        }
    }

    /// Resolve the season state at `now`.
    ///
    /// Pure and monotonic: a later `now` never yields an earlier slot.
    #[must_use]
    pub fn resolve(&self, now: DateTime<Utc>) -> SeasonState {
        let elapsed_days = (now - self.start).num_days().max(0);
        let index = elapsed_days / 7;
        SeasonState::from_slot(Self::slot_for_index(index))
    }

    fn slot_for_index(index: i64) -> WeekSlot {
        let pre = i64::from(PRESEASON_WEEKS);
        let reg = i64::from(REGULAR_SEASON_WEEKS);
        let post = i64::from(POSTSEASON_WEEKS);

        let (phase, week) = if index < pre {
            (Phase::Preseason, index + 1)
        } else if index < pre + reg {
            (Phase::Regular, index - pre + 1)
        } else {
            (Phase::Postseason, (index - pre - reg + 1).min(post))
        };

        WeekSlot::clamped(phase, week)
    }
}
