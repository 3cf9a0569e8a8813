//! Matchups: scheduled NFL games that picks are allocated against.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::MatchupId;
use super::season::Phase;
use super::slot::WeekSlot;

/// Lifecycle of a game as reported by the schedule feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchupStatus {
    Scheduled,
    InProgress,
    Final,
}

impl MatchupStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Final => "final",
        }
    }

    const fn rank(self) -> u8 {
        match self {
            Self::Scheduled => 0,
            Self::InProgress => 1,
            Self::Final => 2,
        }
    }

    /// Whether moving from `self` to `next` keeps the lifecycle monotonic.
    ///
    /// `scheduled -> in_progress -> final`; staying put is allowed,
    /// regressing is not.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        next.rank() >= self.rank()
    }
}

impl fmt::Display for MatchupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchupStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "in_progress" => Ok(Self::InProgress),
            "final" => Ok(Self::Final),
            other => Err(DomainError::UnknownStatus {
                kind: "matchup",
                value: other.to_string(),
            }),
        }
    }
}

/// Result of a finished game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameOutcome {
    Winner { winner: String, loser: String },
    Tie,
}

/// One scheduled game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matchup {
    pub id: MatchupId,
    pub slot: WeekSlot,
    pub away_team: String,
    pub home_team: String,
    pub kickoff: DateTime<Utc>,
    pub status: MatchupStatus,
    pub away_spread: Option<Decimal>,
    pub home_spread: Option<Decimal>,
    pub away_score: Option<i32>,
    pub home_score: Option<i32>,
    /// Last time the feed changed this row.
    pub last_external_update: DateTime<Utc>,
    /// Number of feed updates applied since creation.
    pub update_count: i32,
    /// Set once the final result has been turned into eliminations.
    pub evaluated_at: Option<DateTime<Utc>>,
}

impl Matchup {
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.slot.phase()
    }

    #[must_use]
    pub fn week(&self) -> u8 {
        self.slot.week()
    }

    /// Phase-week code, e.g. `REG7`.
    #[must_use]
    pub fn week_code(&self) -> String {
        self.slot.code()
    }

    /// `Away @ Home` label for logs and tables.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} @ {}", self.away_team, self.home_team)
    }

    #[must_use]
    pub fn has_team(&self, team: &str) -> bool {
        self.away_team == team || self.home_team == team
    }

    /// Allocations against this game are frozen from kickoff on.
    #[must_use]
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        now >= self.kickoff
    }

    /// Largest absolute spread quoted for either side.
    #[must_use]
    pub fn spread_magnitude(&self) -> Option<Decimal> {
        match (self.away_spread, self.home_spread) {
            (Some(away), Some(home)) => Some(away.abs().max(home.abs())),
            (Some(one), None) | (None, Some(one)) => Some(one.abs()),
            (None, None) => None,
        }
    }

    /// Team the line expects to win.
    ///
    /// A negative away spread makes the away side the favorite; otherwise
    /// the home side is. With only a home line, its sign decides.
    #[must_use]
    pub fn favored_team(&self) -> Option<&str> {
        match (self.away_spread, self.home_spread) {
            (Some(away), _) if away < Decimal::ZERO => Some(&self.away_team),
            (Some(_), _) => Some(&self.home_team),
            (None, Some(home)) if home > Decimal::ZERO => Some(&self.away_team),
            (None, Some(_)) => Some(&self.home_team),
            (None, None) => None,
        }
    }

    /// Team the line expects to lose.
    #[must_use]
    pub fn underdog_team(&self) -> Option<&str> {
        self.favored_team().map(|favored| self.opponent_of(favored))
    }

    fn opponent_of(&self, team: &str) -> &str {
        if team == self.away_team {
            &self.home_team
        } else {
            &self.away_team
        }
    }

    /// Final result, available once the game is final with both scores.
    #[must_use]
    pub fn outcome(&self) -> Option<GameOutcome> {
        if self.status != MatchupStatus::Final {
            return None;
        }
        let (away, home) = (self.away_score?, self.home_score?);
        let outcome = match away.cmp(&home) {
            std::cmp::Ordering::Greater => GameOutcome::Winner {
                winner: self.away_team.clone(),
                loser: self.home_team.clone(),
            },
            std::cmp::Ordering::Less => GameOutcome::Winner {
                winner: self.home_team.clone(),
                loser: self.away_team.clone(),
            },
            std::cmp::Ordering::Equal => GameOutcome::Tie,
        };
        Some(outcome)
    }

    #[must_use]
    pub fn is_evaluated(&self) -> bool {
        self.evaluated_at.is_some()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    pub(crate) fn matchup(away: &str, home: &str, away_spread: Option<Decimal>) -> Matchup {
        let kickoff = Utc.with_ymd_and_hms(2026, 10, 18, 17, 0, 0).unwrap();
        Matchup {
            id: MatchupId::generate(),
            slot: WeekSlot::new(Phase::Regular, 7).unwrap(),
            away_team: away.to_string(),
            home_team: home.to_string(),
            kickoff,
            status: MatchupStatus::Scheduled,
            away_spread,
            home_spread: away_spread.map(|s| -s),
            away_score: None,
            home_score: None,
            last_external_update: kickoff,
            update_count: 0,
            evaluated_at: None,
        }
    }

    #[test]
    fn status_transitions_are_monotonic() {
        use MatchupStatus::*;
        assert!(Scheduled.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Final));
        assert!(Final.can_transition_to(Final));
        assert!(!Final.can_transition_to(Scheduled));
        assert!(!InProgress.can_transition_to(Scheduled));
    }

    #[test]
    fn status_parses_storage_labels() {
        assert_eq!(
            "in_progress".parse::<MatchupStatus>().unwrap(),
            MatchupStatus::InProgress
        );
        assert!("done".parse::<MatchupStatus>().is_err());
    }

    #[test]
    fn negative_away_spread_favors_away_team() {
        let m = matchup("Chiefs", "Raiders", Some(dec!(-7.5)));
        assert_eq!(m.favored_team(), Some("Chiefs"));
        assert_eq!(m.underdog_team(), Some("Raiders"));
        assert_eq!(m.spread_magnitude(), Some(dec!(7.5)));
    }

    #[test]
    fn positive_or_even_away_spread_favors_home_team() {
        let m = matchup("Jets", "Bills", Some(dec!(3)));
        assert_eq!(m.favored_team(), Some("Bills"));

        let even = matchup("Jets", "Bills", Some(Decimal::ZERO));
        assert_eq!(even.favored_team(), Some("Bills"));
    }

    #[test]
    fn missing_lines_have_no_favorite() {
        let m = matchup("Jets", "Bills", None);
        assert_eq!(m.favored_team(), None);
        assert_eq!(m.spread_magnitude(), None);
    }

    #[test]
    fn outcome_requires_final_status_and_scores() {
        let mut m = matchup("Jets", "Bills", Some(dec!(3)));
        m.away_score = Some(24);
        m.home_score = Some(17);
        assert_eq!(m.outcome(), None);

        m.status = MatchupStatus::Final;
        assert_eq!(
            m.outcome(),
            Some(GameOutcome::Winner {
                winner: "Jets".into(),
                loser: "Bills".into()
            })
        );

        m.home_score = Some(24);
        assert_eq!(m.outcome(), Some(GameOutcome::Tie));
    }

    #[test]
    fn locked_from_kickoff_on() {
        let m = matchup("Jets", "Bills", None);
        assert!(!m.is_locked(m.kickoff - chrono::Duration::seconds(1)));
        assert!(m.is_locked(m.kickoff));
    }
}
