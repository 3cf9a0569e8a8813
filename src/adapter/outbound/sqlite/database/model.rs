//! Database model types for Diesel ORM.
//!
//! Timestamps are stored as RFC 3339 text in UTC with second precision, so
//! lexical order matches chronological order. Spreads are stored as decimal
//! text to keep comparisons exact.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use super::schema::{matchups, pick_allocations, pick_grants, picks, week_overrides};
use crate::domain::{
    Allocation, AllocationToken, Matchup, MatchupId, Phase, Pick, PickId, UserId, WeekSlot,
};
use crate::error::{Error, Result};

/// Format a timestamp for storage.
#[must_use]
pub fn encode_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a stored timestamp.
///
/// # Errors
/// Returns [`Error::Parse`] on malformed text.
pub fn decode_ts(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::Parse(format!("timestamp '{raw}': {e}")))
}

fn decode_decimal(raw: Option<String>) -> Result<Option<Decimal>> {
    raw.map(|s| {
        s.parse::<Decimal>()
            .map_err(|e| Error::Parse(format!("spread '{s}': {e}")))
    })
    .transpose()
}

/// Database row for a matchup.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = matchups)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MatchupRow {
    pub id: String,
    pub phase: String,
    pub week: i32,
    pub week_slot: String,
    pub away_team: String,
    pub home_team: String,
    pub kickoff: String,
    pub status: String,
    pub away_spread: Option<String>,
    pub home_spread: Option<String>,
    pub away_score: Option<i32>,
    pub home_score: Option<i32>,
    pub last_external_update: String,
    pub update_count: i32,
    pub evaluated_at: Option<String>,
}

impl From<&Matchup> for MatchupRow {
    fn from(m: &Matchup) -> Self {
        Self {
            id: m.id.to_string(),
            phase: m.phase().code().to_string(),
            week: i32::from(m.week()),
            week_slot: m.slot.as_str().to_string(),
            away_team: m.away_team.clone(),
            home_team: m.home_team.clone(),
            kickoff: encode_ts(m.kickoff),
            status: m.status.as_str().to_string(),
            away_spread: m.away_spread.map(|d| d.normalize().to_string()),
            home_spread: m.home_spread.map(|d| d.normalize().to_string()),
            away_score: m.away_score,
            home_score: m.home_score,
            last_external_update: encode_ts(m.last_external_update),
            update_count: m.update_count,
            evaluated_at: m.evaluated_at.map(encode_ts),
        }
    }
}

impl TryFrom<MatchupRow> for Matchup {
    type Error = Error;

    fn try_from(row: MatchupRow) -> Result<Self> {
        let slot: WeekSlot = row.week_slot.parse()?;
        let phase: Phase = row.phase.parse()?;
        if slot.phase() != phase || i32::from(slot.week()) != row.week {
            return Err(Error::Parse(format!(
                "matchup {} stored as {} {} but slot is {slot}",
                row.id, row.phase, row.week
            )));
        }

        Ok(Self {
            id: MatchupId::from(row.id),
            slot,
            away_team: row.away_team,
            home_team: row.home_team,
            kickoff: decode_ts(&row.kickoff)?,
            status: row.status.parse()?,
            away_spread: decode_decimal(row.away_spread)?,
            home_spread: decode_decimal(row.home_spread)?,
            away_score: row.away_score,
            home_score: row.home_score,
            last_external_update: decode_ts(&row.last_external_update)?,
            update_count: row.update_count,
            evaluated_at: row.evaluated_at.as_deref().map(decode_ts).transpose()?,
        })
    }
}

/// Database row for a completed pick grant.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = pick_grants)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PickGrantRow {
    pub id: String,
    pub user_id: String,
    pub picks_count: i32,
    pub source: String,
    pub completed_at: String,
}

/// Database row for a pick.
#[derive(Queryable, Selectable, Insertable, Identifiable, Debug, Clone)]
#[diesel(table_name = picks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PickRow {
    pub id: String,
    pub owner_id: String,
    pub pick_number: i32,
    pub display_name: String,
    pub status: String,
    pub picks_count: i32,
    pub grant_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Database row for one pick's token in one week slot.
#[derive(Queryable, Selectable, Insertable, Identifiable, Associations, Debug, Clone)]
#[diesel(table_name = pick_allocations)]
#[diesel(primary_key(pick_id, week_slot))]
#[diesel(belongs_to(PickRow, foreign_key = pick_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PickAllocationRow {
    pub pick_id: String,
    pub week_slot: String,
    pub matchup_id: String,
    pub team: String,
    pub is_default: i32,
    pub allocated_at: String,
}

impl PickAllocationRow {
    #[must_use]
    pub fn new(
        pick_id: &PickId,
        slot: WeekSlot,
        token: &AllocationToken,
        is_default: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            pick_id: pick_id.to_string(),
            week_slot: slot.as_str().to_string(),
            matchup_id: token.matchup_id.to_string(),
            team: token.team.clone(),
            is_default: i32::from(is_default),
            allocated_at: encode_ts(now),
        }
    }
}

impl TryFrom<PickAllocationRow> for Allocation {
    type Error = Error;

    fn try_from(row: PickAllocationRow) -> Result<Self> {
        Ok(Self {
            slot: row.week_slot.parse()?,
            token: AllocationToken::new(MatchupId::from(row.matchup_id), row.team),
            is_default: row.is_default != 0,
            allocated_at: decode_ts(&row.allocated_at)?,
        })
    }
}

/// Assemble a domain pick from its row and allocation rows.
///
/// # Errors
/// Returns an error if any stored label fails to parse.
pub fn pick_from_rows(row: PickRow, allocations: Vec<PickAllocationRow>) -> Result<Pick> {
    let mut allocations = allocations
        .into_iter()
        .map(Allocation::try_from)
        .collect::<Result<Vec<_>>>()?;
    allocations.sort_by_key(|a| a.slot);

    Ok(Pick {
        id: PickId::from(row.id),
        owner: UserId::from(row.owner_id),
        number: row.pick_number,
        display_name: row.display_name,
        status: row.status.parse()?,
        count: row.picks_count,
        allocations,
    })
}

/// Database row for a tester's pinned week.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = week_overrides)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WeekOverrideRow {
    pub user_id: String,
    pub phase: String,
    pub week: i32,
    pub pinned_at: String,
}

impl WeekOverrideRow {
    /// Resolve the stored phase and week back to an allow-listed slot.
    ///
    /// # Errors
    /// Returns an error when the stored pair is outside the season.
    pub fn slot(&self) -> Result<WeekSlot> {
        let phase: Phase = self.phase.parse()?;
        let week = u8::try_from(self.week)
            .map_err(|_| Error::Parse(format!("week override week {}", self.week)))?;
        Ok(WeekSlot::new(phase, week)?)
    }
}
