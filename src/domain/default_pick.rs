//! Default-pick target selection.
//!
//! When a pick reaches a week's deadline without an allocation, it is
//! placed on the scheduled game with the largest absolute spread. Ties go
//! to the earliest kickoff, then to the lowest matchup id so the choice is
//! fully deterministic.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::matchup::{Matchup, MatchupStatus};
use super::pick::AllocationToken;

/// Which side of the chosen game a default pick rides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultPickPolicy {
    /// The team the line expects to win.
    #[default]
    Favorite,
    /// The team the line expects to lose.
    Underdog,
}

/// Chosen target for default allocations in one week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultTarget {
    pub token: AllocationToken,
    pub matchup_label: String,
}

/// Pick the default target among `matchups`.
///
/// Only games still in `scheduled` status with a quoted line are eligible.
#[must_use]
pub fn select_default_target(
    matchups: &[Matchup],
    policy: DefaultPickPolicy,
) -> Option<DefaultTarget> {
    let best = matchups
        .iter()
        .filter(|m| m.status == MatchupStatus::Scheduled)
        .filter(|m| m.spread_magnitude().is_some())
        .min_by(|a, b| compare_by_spread(a, b))?;

    let team = match policy {
        DefaultPickPolicy::Favorite => best.favored_team(),
        DefaultPickPolicy::Underdog => best.underdog_team(),
    }?;

    Some(DefaultTarget {
        token: AllocationToken::new(best.id.clone(), team),
        matchup_label: best.label(),
    })
}

/// Largest spread first, then earliest kickoff, then lowest id.
fn compare_by_spread(a: &Matchup, b: &Matchup) -> Ordering {
    b.spread_magnitude()
        .cmp(&a.spread_magnitude())
        .then_with(|| a.kickoff.cmp(&b.kickoff))
        .then_with(|| a.id.cmp(&b.id))
}
