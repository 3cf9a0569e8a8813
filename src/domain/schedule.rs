//! Reconciling feed games against stored matchups.
//!
//! A feed game is identified by (phase, week, away team, home team). When a
//! stored matchup carries that identity its id is kept and only the mutable
//! fields move; otherwise a new matchup with a fresh id is created. Picks
//! reference matchups by id, so this is what keeps live allocations attached
//! across repeated syncs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::MatchupId;
use super::matchup::{Matchup, MatchupStatus};
use super::slot::WeekSlot;
use crate::error::{Result, SyncError};

/// One game as delivered by the schedule/odds feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledGame {
    pub away_team: String,
    pub home_team: String,
    pub kickoff: DateTime<Utc>,
    pub status: MatchupStatus,
    pub away_spread: Option<Decimal>,
    pub home_spread: Option<Decimal>,
    #[serde(default)]
    pub away_score: Option<i32>,
    #[serde(default)]
    pub home_score: Option<i32>,
}

impl ScheduledGame {
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} @ {}", self.away_team, self.home_team)
    }

    fn validate(&self) -> std::result::Result<(), DomainError> {
        let reason = if self.away_team.trim().is_empty() || self.home_team.trim().is_empty() {
            "team name is empty"
        } else if self.away_team == self.home_team {
            "team cannot play itself"
        } else {
            return Ok(());
        };
        Err(DomainError::InvalidGame {
            game: self.label(),
            reason: reason.to_string(),
        })
    }
}

/// What a sync did with one feed game.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncAction {
    Created(Matchup),
    Updated(Matchup),
    Unchanged(Matchup),
}

impl SyncAction {
    #[must_use]
    pub fn matchup(&self) -> &Matchup {
        match self {
            Self::Created(m) | Self::Updated(m) | Self::Unchanged(m) => m,
        }
    }
}

/// Decide how `game` lands in `slot`, given the matchups already stored there.
///
/// # Errors
///
/// - [`DomainError::InvalidGame`] when the game fails sanity checks
/// - [`SyncError::Conflict`] when the feed and the store disagree on the
///   game's identity (home/away reversed, or a team already booked against
///   a different opponent that week)
pub fn reconcile(
    stored: &[Matchup],
    slot: WeekSlot,
    game: &ScheduledGame,
    now: DateTime<Utc>,
) -> Result<SyncAction> {
    game.validate()?;

    let existing = stored
        .iter()
        .find(|m| m.away_team == game.away_team && m.home_team == game.home_team);

    let Some(existing) = existing else {
        check_identity_conflicts(stored, game)?;
        return Ok(SyncAction::Created(Matchup {
            id: MatchupId::generate(),
            slot,
            away_team: game.away_team.clone(),
            home_team: game.home_team.clone(),
            kickoff: game.kickoff,
            status: game.status,
            away_spread: game.away_spread,
            home_spread: game.home_spread,
            away_score: game.away_score,
            home_score: game.home_score,
            last_external_update: now,
            update_count: 0,
            evaluated_at: None,
        }));
    };

    let mut next = existing.clone();
    next.kickoff = game.kickoff;
    next.away_spread = game.away_spread;
    next.home_spread = game.home_spread;
    // Scores are only taken alongside an accepted status.
    let accepted = existing.status.can_transition_to(game.status);
    if accepted {
        next.status = game.status;
    }
    if accepted && (game.away_score.is_some() || game.home_score.is_some()) {
        next.away_score = game.away_score;
        next.home_score = game.home_score;
    }

    if next == *existing {
        return Ok(SyncAction::Unchanged(next));
    }

    next.update_count += 1;
    next.last_external_update = now;
    Ok(SyncAction::Updated(next))
}

fn check_identity_conflicts(stored: &[Matchup], game: &ScheduledGame) -> Result<()> {
    if let Some(reversed) = stored
        .iter()
        .find(|m| m.away_team == game.home_team && m.home_team == game.away_team)
    {
        return Err(SyncError::Conflict {
            game: game.label(),
            reason: format!("home/away reversed relative to matchup {}", reversed.id),
        }
        .into());
    }

    for team in [&game.away_team, &game.home_team] {
        if let Some(booked) = stored.iter().find(|m| m.has_team(team)) {
            return Err(SyncError::Conflict {
                game: game.label(),
                reason: format!("{team} already scheduled in {}", booked.label()),
            }
            .into());
        }
    }
    Ok(())
}
