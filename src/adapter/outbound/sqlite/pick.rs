//! SQLite pick store implementation.
//!
//! Allocations live in `pick_allocations`, keyed by (pick, week slot). Every
//! write that touches more than one row runs in an immediate transaction so
//! a batch either lands completely or not at all.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::{
    decode_ts, encode_ts, pick_from_rows, PickAllocationRow, PickGrantRow, PickRow,
};
use crate::adapter::outbound::sqlite::database::schema::{
    matchups, pick_allocations, pick_grants, picks,
};
use crate::domain::error::DomainError;
use crate::domain::{
    AllocationToken, GrantId, MatchupId, Pick, PickId, PickStatus, UserId, WeekSlot,
};
use crate::error::{AllocationError, Error, Result};
use crate::port::outbound::store::{AllocationWrite, PickStore, PoolSummary};

/// SQLite-backed pick store.
pub struct SqlitePickStore {
    pool: DbPool,
}

impl SqlitePickStore {
    /// Create a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(
        &self,
    ) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>>
    {
        self.pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))
    }

    /// Attach allocations to pick rows, preserving row order.
    fn hydrate(conn: &mut SqliteConnection, rows: Vec<PickRow>) -> Result<Vec<Pick>> {
        let allocations: Vec<PickAllocationRow> = PickAllocationRow::belonging_to(&rows)
            .select(PickAllocationRow::as_select())
            .load(conn)?;
        let grouped = allocations.grouped_by(&rows);

        rows.into_iter()
            .zip(grouped)
            .map(|(row, allocs)| pick_from_rows(row, allocs))
            .collect()
    }

    fn picks_by_ids(conn: &mut SqliteConnection, ids: &[String]) -> Result<Vec<Pick>> {
        let rows: Vec<PickRow> = picks::table
            .filter(picks::id.eq_any(ids))
            .order((picks::owner_id.asc(), picks::pick_number.asc()))
            .select(PickRow::as_select())
            .load(conn)?;
        Self::hydrate(conn, rows)
    }

    fn kickoffs(
        conn: &mut SqliteConnection,
        ids: &[String],
    ) -> Result<HashMap<String, DateTime<Utc>>> {
        let rows: Vec<(String, String)> = matchups::table
            .filter(matchups::id.eq_any(ids))
            .select((matchups::id, matchups::kickoff))
            .load(conn)?;
        rows.into_iter()
            .map(|(id, kickoff)| Ok((id, decode_ts(&kickoff)?)))
            .collect()
    }

    fn set_status(
        conn: &mut SqliteConnection,
        ids: &[String],
        status: PickStatus,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let updated = diesel::update(picks::table.filter(picks::id.eq_any(ids)))
            .set((
                picks::status.eq(status.as_str()),
                picks::updated_at.eq(encode_ts(now)),
            ))
            .execute(conn)?;
        Ok(updated)
    }

    fn allocate_in(conn: &mut SqliteConnection, write: &AllocationWrite) -> Result<Vec<Pick>> {
        let mut seen = HashSet::new();
        let names: Vec<String> = write
            .pick_names
            .iter()
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect();

        let rows: Vec<PickRow> = picks::table
            .filter(picks::owner_id.eq(write.user.as_str()))
            .filter(picks::display_name.eq_any(&names))
            .select(PickRow::as_select())
            .load(conn)?;
        let found: Vec<Pick> = Self::hydrate(conn, rows)?;

        let held: Vec<String> = found
            .iter()
            .filter_map(|p| p.token(write.slot))
            .map(|t| t.matchup_id.to_string())
            .collect();
        let kickoffs = Self::kickoffs(conn, &held)?;

        let mut failed = Vec::new();
        for name in &names {
            let Some(pick) = found.iter().find(|p| p.display_name == *name) else {
                failed.push(name.clone());
                continue;
            };
            let locked = pick.token(write.slot).is_some_and(|t| {
                kickoffs
                    .get(t.matchup_id.as_str())
                    .is_some_and(|kickoff| write.now >= *kickoff)
            });
            if pick.is_eliminated() || locked {
                failed.push(pick.display_name.clone());
            }
        }

        if !failed.is_empty() {
            return Err(AllocationError::PartialBatchFailure {
                requested: names.len(),
                failed,
            }
            .into());
        }

        let rows: Vec<PickAllocationRow> = found
            .iter()
            .map(|p| PickAllocationRow::new(&p.id, write.slot, &write.token, false, write.now))
            .collect();
        diesel::replace_into(pick_allocations::table)
            .values(&rows)
            .execute(conn)?;

        let ids: Vec<String> = found.iter().map(|p| p.id.to_string()).collect();
        Self::set_status(conn, &ids, PickStatus::Active, write.now)?;
        Self::picks_by_ids(conn, &ids)
    }

    fn clear_in(
        conn: &mut SqliteConnection,
        user: &UserId,
        pick_name: &str,
        slot: WeekSlot,
        now: DateTime<Utc>,
    ) -> Result<Pick> {
        let row: Option<PickRow> = picks::table
            .filter(picks::owner_id.eq(user.as_str()))
            .filter(picks::display_name.eq(pick_name))
            .select(PickRow::as_select())
            .first(conn)
            .optional()?;
        let row = row.ok_or_else(|| DomainError::UnknownPick {
            pick: pick_name.to_string(),
            user_id: user.to_string(),
        })?;

        if row.status == PickStatus::Eliminated.as_str() {
            return Err(AllocationError::EliminatedPick {
                pick: pick_name.to_string(),
            }
            .into());
        }

        let key = (row.id.as_str(), slot.as_str());
        let existing: Option<PickAllocationRow> = pick_allocations::table
            .find(key)
            .select(PickAllocationRow::as_select())
            .first(conn)
            .optional()?;
        let existing = existing.ok_or_else(|| DomainError::NotAllocated {
            pick: pick_name.to_string(),
            slot: slot.as_str().to_string(),
        })?;

        let kickoffs = Self::kickoffs(conn, std::slice::from_ref(&existing.matchup_id))?;
        if let Some(kickoff) = kickoffs.get(&existing.matchup_id) {
            if now >= *kickoff {
                return Err(AllocationError::Locked {
                    matchup_id: existing.matchup_id,
                    kickoff: *kickoff,
                }
                .into());
            }
        }

        diesel::delete(pick_allocations::table.find(key)).execute(conn)?;

        let remaining: i64 = pick_allocations::table
            .filter(pick_allocations::pick_id.eq(&row.id))
            .count()
            .get_result(conn)?;
        let status = if remaining == 0 {
            PickStatus::Pending
        } else {
            PickStatus::Active
        };
        let ids = vec![row.id];
        Self::set_status(conn, &ids, status, now)?;

        Self::picks_by_ids(conn, &ids)?
            .pop()
            .ok_or_else(|| Error::Database("pick vanished during deallocation".into()))
    }
}

impl PickStore for SqlitePickStore {
    async fn grant(
        &self,
        user: &UserId,
        count: u32,
        source: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Pick>> {
        let count = i32::try_from(count)
            .ok()
            .filter(|c| *c > 0)
            .ok_or(DomainError::NonPositivePicksCount(i64::from(count)))?;
        let mut conn = self.conn()?;

        conn.immediate_transaction::<_, Error, _>(|conn| {
            let highest: Option<i32> = picks::table
                .filter(picks::owner_id.eq(user.as_str()))
                .select(diesel::dsl::max(picks::pick_number))
                .first(conn)?;
            let start = highest.unwrap_or(0) + 1;

            let grant = PickGrantRow {
                id: GrantId::generate().to_string(),
                user_id: user.to_string(),
                picks_count: count,
                source: source.to_string(),
                completed_at: encode_ts(now),
            };
            diesel::insert_into(pick_grants::table)
                .values(&grant)
                .execute(conn)?;

            let rows: Vec<PickRow> = (start..start + count)
                .map(|number| PickRow {
                    id: PickId::generate().to_string(),
                    owner_id: user.to_string(),
                    pick_number: number,
                    display_name: Pick::display_name_for(number),
                    status: PickStatus::Pending.as_str().to_string(),
                    picks_count: 1,
                    grant_id: grant.id.clone(),
                    created_at: encode_ts(now),
                    updated_at: encode_ts(now),
                })
                .collect();
            diesel::insert_into(picks::table)
                .values(&rows)
                .execute(conn)?;

            debug!(user = %user, first = start, count, "picks materialized");
            Self::hydrate(conn, rows)
        })
    }

    async fn picks_for_user(&self, user: &UserId) -> Result<Vec<Pick>> {
        let mut conn = self.conn()?;
        let rows: Vec<PickRow> = picks::table
            .filter(picks::owner_id.eq(user.as_str()))
            .order(picks::pick_number.asc())
            .select(PickRow::as_select())
            .load(&mut conn)?;
        Self::hydrate(&mut conn, rows)
    }

    async fn allocate(&self, write: &AllocationWrite) -> Result<Vec<Pick>> {
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, Error, _>(|conn| Self::allocate_in(conn, write))
    }

    async fn clear_allocation(
        &self,
        user: &UserId,
        pick_name: &str,
        slot: WeekSlot,
        now: DateTime<Utc>,
    ) -> Result<Pick> {
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, Error, _>(|conn| {
            Self::clear_in(conn, user, pick_name, slot, now)
        })
    }

    async fn unallocated(&self, slot: WeekSlot) -> Result<Vec<Pick>> {
        let mut conn = self.conn()?;
        let allocated: Vec<String> = pick_allocations::table
            .filter(pick_allocations::week_slot.eq(slot.as_str()))
            .select(pick_allocations::pick_id)
            .load(&mut conn)?;

        let rows: Vec<PickRow> = picks::table
            .filter(picks::status.ne(PickStatus::Eliminated.as_str()))
            .filter(picks::id.ne_all(&allocated))
            .order((picks::owner_id.asc(), picks::pick_number.asc()))
            .select(PickRow::as_select())
            .load(&mut conn)?;
        Self::hydrate(&mut conn, rows)
    }

    async fn assign_default(
        &self,
        slot: WeekSlot,
        token: &AllocationToken,
        picks: &[Pick],
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let candidates: Vec<String> = picks.iter().map(|p| p.id.to_string()).collect();
        let mut conn = self.conn()?;

        conn.immediate_transaction::<_, Error, _>(|conn| {
            let live: Vec<String> = picks::table
                .filter(picks::id.eq_any(&candidates))
                .filter(picks::status.ne(PickStatus::Eliminated.as_str()))
                .select(picks::id)
                .load(conn)?;

            let mut assigned = Vec::new();
            for id in live {
                let row = PickAllocationRow::new(&PickId::from(id.clone()), slot, token, true, now);
                let inserted = diesel::insert_or_ignore_into(pick_allocations::table)
                    .values(&row)
                    .execute(conn)?;
                if inserted > 0 {
                    assigned.push(id);
                }
            }

            Self::set_status(conn, &assigned, PickStatus::Active, now)?;
            Ok(assigned.len())
        })
    }

    async fn eliminate(
        &self,
        slot: WeekSlot,
        matchup_id: &MatchupId,
        winner: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Pick>> {
        let mut conn = self.conn()?;

        conn.immediate_transaction::<_, Error, _>(|conn| {
            let marked = diesel::update(
                matchups::table
                    .find(matchup_id.as_str())
                    .filter(matchups::evaluated_at.is_null()),
            )
            .set(matchups::evaluated_at.eq(encode_ts(now)))
            .execute(conn)?;
            if marked == 0 {
                debug!(matchup_id = %matchup_id, "matchup already evaluated");
                return Ok(Vec::new());
            }

            let Some(winner) = winner else {
                return Ok(Vec::new());
            };

            let backed: Vec<String> = pick_allocations::table
                .inner_join(picks::table)
                .filter(pick_allocations::week_slot.eq(slot.as_str()))
                .filter(pick_allocations::matchup_id.eq(matchup_id.as_str()))
                .filter(pick_allocations::team.eq(winner))
                .filter(picks::status.ne(PickStatus::Eliminated.as_str()))
                .select(picks::id)
                .load(conn)?;

            Self::set_status(conn, &backed, PickStatus::Eliminated, now)?;
            Self::picks_by_ids(conn, &backed)
        })
    }

    async fn summary(&self, slot: WeekSlot) -> Result<PoolSummary> {
        let mut conn = self.conn()?;

        let by_status: Vec<(String, i64)> = picks::table
            .group_by(picks::status)
            .select((picks::status, count_star()))
            .load(&mut conn)?;

        let mut summary = PoolSummary::default();
        for (status, count) in by_status {
            match status.parse::<PickStatus>()? {
                PickStatus::Pending => summary.pending = count,
                PickStatus::Active => summary.active = count,
                PickStatus::Eliminated => summary.eliminated = count,
            }
        }

        summary.allocated = pick_allocations::table
            .filter(pick_allocations::week_slot.eq(slot.as_str()))
            .count()
            .get_result(&mut conn)?;
        summary.defaulted = pick_allocations::table
            .filter(pick_allocations::week_slot.eq(slot.as_str()))
            .filter(pick_allocations::is_default.eq(1))
            .count()
            .get_result(&mut conn)?;

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection;
    use crate::adapter::outbound::sqlite::matchup::SqliteMatchupStore;
    use crate::domain::{Matchup, MatchupStatus, Phase, ScheduledGame};
    use crate::port::outbound::store::MatchupStore;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    struct Fixture {
        picks: SqlitePickStore,
        matchups: SqliteMatchupStore,
    }

    fn setup() -> Fixture {
        let pool = connection::open(":memory:").unwrap();
        Fixture {
            picks: SqlitePickStore::new(pool.clone()),
            matchups: SqliteMatchupStore::new(pool),
        }
    }

    fn slot() -> WeekSlot {
        WeekSlot::new(Phase::Regular, 2).unwrap()
    }

    fn kickoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 20, 17, 0, 0).unwrap()
    }

    fn before() -> DateTime<Utc> {
        kickoff() - Duration::days(2)
    }

    fn user() -> UserId {
        UserId::from("user-1")
    }

    async fn seed_matchup(f: &Fixture, away: &str, home: &str) -> Matchup {
        let game = ScheduledGame {
            away_team: away.into(),
            home_team: home.into(),
            kickoff: kickoff(),
            status: MatchupStatus::Scheduled,
            away_spread: Some(dec!(4)),
            home_spread: Some(dec!(-4)),
            away_score: None,
            home_score: None,
        };
        f.matchups
            .sync_game(slot(), &game, before())
            .await
            .unwrap()
            .matchup()
            .clone()
    }

    fn write(token: &AllocationToken, names: &[&str], now: DateTime<Utc>) -> AllocationWrite {
        AllocationWrite {
            user: user(),
            slot: slot(),
            token: token.clone(),
            pick_names: names.iter().map(|n| n.to_string()).collect(),
            now,
        }
    }

    #[tokio::test]
    async fn grant_numbers_picks_sequentially() {
        let f = setup();
        let first = f.picks.grant(&user(), 2, "checkout", before()).await.unwrap();
        let second = f.picks.grant(&user(), 1, "checkout", before()).await.unwrap();

        let names: Vec<_> = first
            .iter()
            .chain(second.iter())
            .map(|p| p.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["Pick 1", "Pick 2", "Pick 3"]);
        assert!(first.iter().all(|p| p.status == PickStatus::Pending && p.count == 1));
    }

    #[tokio::test]
    async fn grant_rejects_zero_count() {
        let f = setup();
        let err = f.picks.grant(&user(), 0, "checkout", before()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Domain(DomainError::NonPositivePicksCount(0))
        ));
    }

    #[tokio::test]
    async fn allocate_writes_token_and_activates() {
        let f = setup();
        let m = seed_matchup(&f, "Jets", "Bills").await;
        f.picks.grant(&user(), 2, "checkout", before()).await.unwrap();

        let token = AllocationToken::new(m.id.clone(), "Jets");
        let updated = f
            .picks
            .allocate(&write(&token, &["Pick 1", "Pick 2"], before()))
            .await
            .unwrap();

        assert_eq!(updated.len(), 2);
        for pick in &updated {
            assert_eq!(pick.status, PickStatus::Active);
            assert_eq!(pick.token(slot()), Some(&token));
            assert!(!pick.allocation(slot()).unwrap().is_default);
        }
    }

    #[tokio::test]
    async fn allocate_batch_is_all_or_nothing() {
        let f = setup();
        let m = seed_matchup(&f, "Jets", "Bills").await;
        f.picks.grant(&user(), 1, "checkout", before()).await.unwrap();

        let token = AllocationToken::new(m.id.clone(), "Jets");
        let err = f
            .picks
            .allocate(&write(&token, &["Pick 1", "Pick 9"], before()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Allocation(AllocationError::PartialBatchFailure { requested: 2, .. })
        ));

        let picks = f.picks.picks_for_user(&user()).await.unwrap();
        assert!(picks[0].allocations.is_empty());
        assert_eq!(picks[0].status, PickStatus::Pending);
    }

    #[tokio::test]
    async fn reallocation_blocked_once_held_game_kicks_off() {
        let f = setup();
        let m = seed_matchup(&f, "Jets", "Bills").await;
        f.picks.grant(&user(), 1, "checkout", before()).await.unwrap();
        let token = AllocationToken::new(m.id.clone(), "Jets");
        f.picks
            .allocate(&write(&token, &["Pick 1"], before()))
            .await
            .unwrap();

        let other = AllocationToken::new(m.id.clone(), "Bills");
        let err = f
            .picks
            .allocate(&write(&other, &["Pick 1"], kickoff()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Allocation(_)));
    }

    #[tokio::test]
    async fn clear_allocation_reverts_to_pending() {
        let f = setup();
        let m = seed_matchup(&f, "Jets", "Bills").await;
        f.picks.grant(&user(), 1, "checkout", before()).await.unwrap();
        let token = AllocationToken::new(m.id.clone(), "Jets");
        f.picks
            .allocate(&write(&token, &["Pick 1"], before()))
            .await
            .unwrap();

        let pick = f
            .picks
            .clear_allocation(&user(), "Pick 1", slot(), before())
            .await
            .unwrap();
        assert!(pick.allocations.is_empty());
        assert_eq!(pick.status, PickStatus::Pending);

        let err = f
            .picks
            .clear_allocation(&user(), "Pick 1", slot(), before())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Domain(DomainError::NotAllocated { .. })));
    }

    #[tokio::test]
    async fn clear_allocation_is_locked_after_kickoff() {
        let f = setup();
        let m = seed_matchup(&f, "Jets", "Bills").await;
        f.picks.grant(&user(), 1, "checkout", before()).await.unwrap();
        let token = AllocationToken::new(m.id.clone(), "Jets");
        f.picks
            .allocate(&write(&token, &["Pick 1"], before()))
            .await
            .unwrap();

        let err = f
            .picks
            .clear_allocation(&user(), "Pick 1", slot(), kickoff())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Allocation(AllocationError::Locked { .. })));
    }

    #[tokio::test]
    async fn defaults_fill_only_empty_live_picks() {
        let f = setup();
        let m = seed_matchup(&f, "Jets", "Bills").await;
        f.picks.grant(&user(), 3, "checkout", before()).await.unwrap();
        let chosen = AllocationToken::new(m.id.clone(), "Jets");
        f.picks
            .allocate(&write(&chosen, &["Pick 1"], before()))
            .await
            .unwrap();

        let open = f.picks.unallocated(slot()).await.unwrap();
        assert_eq!(open.len(), 2);

        let fallback = AllocationToken::new(m.id.clone(), "Bills");
        let assigned = f
            .picks
            .assign_default(slot(), &fallback, &open, kickoff())
            .await
            .unwrap();
        assert_eq!(assigned, 2);

        let again = f
            .picks
            .assign_default(slot(), &fallback, &open, kickoff())
            .await
            .unwrap();
        assert_eq!(again, 0);

        let picks = f.picks.picks_for_user(&user()).await.unwrap();
        assert_eq!(picks[0].token(slot()), Some(&chosen));
        assert!(picks[1].allocation(slot()).unwrap().is_default);
        assert!(f.picks.unallocated(slot()).await.unwrap().is_empty());

        let summary = f.picks.summary(slot()).await.unwrap();
        assert_eq!(summary.active, 3);
        assert_eq!(summary.allocated, 3);
        assert_eq!(summary.defaulted, 2);
    }

    #[tokio::test]
    async fn eliminate_hits_winner_backers_once() {
        let f = setup();
        let m = seed_matchup(&f, "Jets", "Bills").await;
        f.picks.grant(&user(), 2, "checkout", before()).await.unwrap();
        let jets = AllocationToken::new(m.id.clone(), "Jets");
        let bills = AllocationToken::new(m.id.clone(), "Bills");
        f.picks
            .allocate(&write(&jets, &["Pick 1"], before()))
            .await
            .unwrap();
        f.picks
            .allocate(&write(&bills, &["Pick 2"], before()))
            .await
            .unwrap();

        let later = kickoff() + Duration::hours(4);
        let out = f
            .picks
            .eliminate(slot(), &m.id, Some("Bills"), later)
            .await
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].display_name, "Pick 2");
        assert_eq!(out[0].status, PickStatus::Eliminated);

        let repeat = f
            .picks
            .eliminate(slot(), &m.id, Some("Jets"), later)
            .await
            .unwrap();
        assert!(repeat.is_empty());

        let stored = f.matchups.matchup_by_id(&m.id).await.unwrap().unwrap();
        assert!(stored.is_evaluated());

        let summary = f.picks.summary(slot()).await.unwrap();
        assert_eq!(summary.active, 1);
        assert_eq!(summary.eliminated, 1);
    }

    #[tokio::test]
    async fn tie_marks_evaluated_without_eliminating() {
        let f = setup();
        let m = seed_matchup(&f, "Jets", "Bills").await;
        f.picks.grant(&user(), 1, "checkout", before()).await.unwrap();
        let jets = AllocationToken::new(m.id.clone(), "Jets");
        f.picks
            .allocate(&write(&jets, &["Pick 1"], before()))
            .await
            .unwrap();

        let out = f.picks.eliminate(slot(), &m.id, None, kickoff()).await.unwrap();
        assert!(out.is_empty());
        let stored = f.matchups.matchup_by_id(&m.id).await.unwrap().unwrap();
        assert!(stored.is_evaluated());
    }
}
