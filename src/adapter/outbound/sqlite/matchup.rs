//! SQLite matchup store implementation.
//!
//! Each feed game is reconciled inside an immediate transaction, which takes
//! SQLite's write lock up front. Concurrent syncs of the same week therefore
//! run one after another, and the unique (phase, week, away, home) index
//! backs that up at the storage layer.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::MatchupRow;
use crate::adapter::outbound::sqlite::database::schema::matchups;
use crate::domain::{
    reconcile, Matchup, MatchupId, MatchupStatus, ScheduledGame, SyncAction, WeekSlot,
};
use crate::error::{Error, Result};
use crate::port::outbound::store::MatchupStore;

/// SQLite-backed matchup store.
pub struct SqliteMatchupStore {
    pool: DbPool,
}

impl SqliteMatchupStore {
    /// Create a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn load_slot(conn: &mut SqliteConnection, slot: WeekSlot) -> Result<Vec<Matchup>> {
        let rows: Vec<MatchupRow> = matchups::table
            .filter(matchups::week_slot.eq(slot.as_str()))
            .order((matchups::kickoff.asc(), matchups::id.asc()))
            .select(MatchupRow::as_select())
            .load(conn)?;
        rows.into_iter().map(Matchup::try_from).collect()
    }

    fn write(conn: &mut SqliteConnection, action: &SyncAction) -> Result<()> {
        match action {
            SyncAction::Created(m) => {
                diesel::insert_into(matchups::table)
                    .values(&MatchupRow::from(m))
                    .execute(conn)?;
            }
            SyncAction::Updated(m) => {
                diesel::update(matchups::table.find(m.id.as_str()))
                    .set(&MatchupRow::from(m))
                    .execute(conn)?;
            }
            SyncAction::Unchanged(_) => {}
        }
        Ok(())
    }
}

impl MatchupStore for SqliteMatchupStore {
    async fn sync_game(
        &self,
        slot: WeekSlot,
        game: &ScheduledGame,
        now: DateTime<Utc>,
    ) -> Result<SyncAction> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        conn.immediate_transaction::<_, Error, _>(|conn| {
            let stored = Self::load_slot(conn, slot)?;
            let action = reconcile(&stored, slot, game, now)?;
            Self::write(conn, &action)?;
            Ok(action)
        })
    }

    async fn matchups_for(&self, slot: WeekSlot) -> Result<Vec<Matchup>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;
        Self::load_slot(&mut conn, slot)
    }

    async fn matchup_by_id(&self, id: &MatchupId) -> Result<Option<Matchup>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let row: Option<MatchupRow> = matchups::table
            .find(id.as_str())
            .select(MatchupRow::as_select())
            .first(&mut conn)
            .optional()?;

        row.map(Matchup::try_from).transpose()
    }

    async fn unevaluated_finals(&self) -> Result<Vec<Matchup>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let rows: Vec<MatchupRow> = matchups::table
            .filter(matchups::status.eq(MatchupStatus::Final.as_str()))
            .filter(matchups::evaluated_at.is_null())
            .order((matchups::kickoff.asc(), matchups::id.asc()))
            .select(MatchupRow::as_select())
            .load(&mut conn)?;

        rows.into_iter().map(Matchup::try_from).collect()
    }
}
