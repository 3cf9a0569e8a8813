//! ESPN NFL scoreboard response types.
//!
//! Only the fields the pool needs are modelled. Example (trimmed):
//! ```json
//! {"events":[{"id":"401671789","date":"2024-09-06T00:20Z","competitions":[{
//!   "status":{"type":{"state":"pre"}},
//!   "competitors":[
//!     {"homeAway":"home","score":"0","team":{"displayName":"Kansas City Chiefs","abbreviation":"KC"}},
//!     {"homeAway":"away","score":"0","team":{"displayName":"Baltimore Ravens","abbreviation":"BAL"}}],
//!   "odds":[{"details":"KC -3.0"}]}]}]}
//! ```

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{MatchupStatus, ScheduledGame};

#[derive(Debug, Deserialize)]
pub struct ScoreboardResponse {
    #[serde(default)]
    pub events: Vec<EspnEvent>,
}

#[derive(Debug, Deserialize)]
pub struct EspnEvent {
    pub id: String,
    pub date: String,
    #[serde(default)]
    pub competitions: Vec<EspnCompetition>,
}

#[derive(Debug, Deserialize)]
pub struct EspnCompetition {
    #[serde(default)]
    pub date: Option<String>,
    pub status: EspnStatus,
    #[serde(default)]
    pub competitors: Vec<EspnCompetitor>,
    #[serde(default)]
    pub odds: Vec<EspnOdds>,
}

#[derive(Debug, Deserialize)]
pub struct EspnStatus {
    #[serde(rename = "type")]
    pub kind: EspnStatusType,
}

#[derive(Debug, Deserialize)]
pub struct EspnStatusType {
    /// `pre`, `in`, or `post`.
    pub state: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EspnCompetitor {
    pub home_away: String,
    #[serde(default)]
    pub score: Option<String>,
    pub team: EspnTeam,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EspnTeam {
    pub display_name: String,
    #[serde(default)]
    pub abbreviation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EspnOdds {
    /// Favorite and line, e.g. `KC -3.0`, or `EVEN`.
    #[serde(default)]
    pub details: Option<String>,
}

/// Parse the feed's minute-precision timestamps (`2024-09-06T00:20Z`), also
/// accepting full RFC 3339.
pub fn parse_kickoff(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_status(state: &str) -> Option<MatchupStatus> {
    match state {
        "pre" => Some(MatchupStatus::Scheduled),
        "in" => Some(MatchupStatus::InProgress),
        "post" => Some(MatchupStatus::Final),
        _ => None,
    }
}

/// Split `KC -3.0` into (abbreviation, line).
fn parse_line(details: &str) -> Option<(Option<&str>, Decimal)> {
    let details = details.trim();
    if details.eq_ignore_ascii_case("even") || details.eq_ignore_ascii_case("pk") {
        return Some((None, Decimal::ZERO));
    }
    let (team, line) = details.rsplit_once(' ')?;
    let line: Decimal = line.parse().ok()?;
    Some((Some(team.trim()), line))
}

impl EspnEvent {
    /// Convert to a feed game. Returns a reason when the event is unusable.
    ///
    /// # Errors
    /// Returns a human-readable reason for events missing required fields.
    pub fn to_game(&self) -> Result<ScheduledGame, String> {
        let competition = self
            .competitions
            .first()
            .ok_or_else(|| format!("event {} has no competition", self.id))?;
        let side = |which: &str| {
            competition
                .competitors
                .iter()
                .find(|c| c.home_away == which)
                .ok_or_else(|| format!("event {} has no {which} team", self.id))
        };
        let home = side("home")?;
        let away = side("away")?;

        let raw_date = competition.date.as_deref().unwrap_or(&self.date);
        let kickoff = parse_kickoff(raw_date)
            .ok_or_else(|| format!("event {} has unreadable date '{raw_date}'", self.id))?;
        let status = parse_status(&competition.status.kind.state).ok_or_else(|| {
            format!(
                "event {} has unknown state '{}'",
                self.id, competition.status.kind.state
            )
        })?;

        let (away_spread, home_spread) = competition
            .odds
            .iter()
            .find_map(|o| o.details.as_deref().and_then(parse_line))
            .map_or((None, None), |(favorite, line)| match favorite {
                Some(abbr) if away.team.abbreviation.as_deref() == Some(abbr) => {
                    (Some(line), Some(-line))
                }
                Some(abbr) if home.team.abbreviation.as_deref() == Some(abbr) => {
                    (Some(-line), Some(line))
                }
                Some(_) => (None, None),
                None => (Some(line), Some(line)),
            });

        let score = |c: &EspnCompetitor| {
            if status == MatchupStatus::Scheduled {
                None
            } else {
                c.score.as_deref().and_then(|s| s.parse::<i32>().ok())
            }
        };

        Ok(ScheduledGame {
            away_team: away.team.display_name.clone(),
            home_team: home.team.display_name.clone(),
            kickoff,
            status,
            away_spread,
            home_spread,
            away_score: score(away),
            home_score: score(home),
        })
    }
}
