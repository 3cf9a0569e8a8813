//! Week slots: the allow-listed keys under which weekly allocations live.
//!
//! A [`WeekSlot`] can only be built from a phase/week pair that passes the
//! bound check, or parsed from one of the pre-enumerated names in
//! [`SLOT_NAMES`]. Storage code never formats a slot name itself; it always
//! goes through [`WeekSlot::as_str`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::DomainError;
use super::season::{Phase, POSTSEASON_WEEKS, PRESEASON_WEEKS, REGULAR_SEASON_WEEKS};

/// Every valid slot name, in season order.
pub const SLOT_NAMES: [&str; 25] = [
    "pre1", "pre2", "pre3", "reg1", "reg2", "reg3", "reg4", "reg5", "reg6", "reg7", "reg8",
    "reg9", "reg10", "reg11", "reg12", "reg13", "reg14", "reg15", "reg16", "reg17", "reg18",
    "post1", "post2", "post3", "post4",
];

/// A validated (phase, week) pair naming one weekly allocation slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeekSlot {
    phase: Phase,
    week: u8,
}

impl WeekSlot {
    /// Resolve the slot for a phase and week number.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::WeekOutOfRange`] when `week` is 0 or larger
    /// than the number of weeks in `phase`.
    pub fn new(phase: Phase, week: u8) -> Result<Self, DomainError> {
        let max = phase.max_week();
        if week == 0 || week > max {
            return Err(DomainError::WeekOutOfRange { phase, week, max });
        }
        Ok(Self { phase, week })
    }

    /// Slot for `week`, clamped into the valid range of `phase`.
    #[must_use]
    pub fn clamped(phase: Phase, week: i64) -> Self {
        let max = i64::from(phase.max_week());
        let week = week.clamp(1, max) as u8;
        Self { phase, week }
    }

    /// Iterate over every slot in season order.
    pub fn all() -> impl Iterator<Item = WeekSlot> {
        (0..SLOT_NAMES.len()).filter_map(Self::from_index)
    }

    fn from_index(index: usize) -> Option<Self> {
        let pre = usize::from(PRESEASON_WEEKS);
        let reg = usize::from(REGULAR_SEASON_WEEKS);
        let post = usize::from(POSTSEASON_WEEKS);
        let (phase, week) = if index < pre {
            (Phase::Preseason, index + 1)
        } else if index < pre + reg {
            (Phase::Regular, index - pre + 1)
        } else if index < pre + reg + post {
            (Phase::Postseason, index - pre - reg + 1)
        } else {
            return None;
        };
        let week = u8::try_from(week).ok()?;
        Some(Self { phase, week })
    }

    fn index(self) -> usize {
        let week = usize::from(self.week) - 1;
        match self.phase {
            Phase::Preseason => week,
            Phase::Regular => usize::from(PRESEASON_WEEKS) + week,
            Phase::Postseason => {
                usize::from(PRESEASON_WEEKS) + usize::from(REGULAR_SEASON_WEEKS) + week
            }
        }
    }

    /// Phase of the slot.
    #[must_use]
    pub const fn phase(self) -> Phase {
        self.phase
    }

    /// Week number within the phase (1-based).
    #[must_use]
    pub const fn week(self) -> u8 {
        self.week
    }

    /// Storage name of the slot, e.g. `reg7`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        SLOT_NAMES[self.index()]
    }

    /// Phase-week code used on matchups, e.g. `REG7`.
    #[must_use]
    pub fn code(self) -> String {
        format!("{}{}", self.phase, self.week)
    }
}

impl fmt::Display for WeekSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeekSlot {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SLOT_NAMES
            .iter()
            .position(|name| *name == s)
            .and_then(Self::from_index)
            .ok_or_else(|| DomainError::UnknownSlot(s.to_string()))
    }
}

impl Serialize for WeekSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WeekSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
