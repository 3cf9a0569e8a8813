//! Builders for feed games and a store harness over one SQLite pool.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::adapter::outbound::sqlite::database::connection::{self, DbPool};
use crate::adapter::outbound::sqlite::{
    SqliteMatchupStore, SqlitePickStore, SqliteWeekOverrideStore,
};
use crate::domain::{Matchup, MatchupStatus, ScheduledGame, WeekSlot};
use crate::port::outbound::store::MatchupStore;

/// A scheduled game. The home line mirrors `away_spread`.
pub fn game(
    away: &str,
    home: &str,
    kickoff: DateTime<Utc>,
    away_spread: Option<Decimal>,
) -> ScheduledGame {
    ScheduledGame {
        away_team: away.to_string(),
        home_team: home.to_string(),
        kickoff,
        status: MatchupStatus::Scheduled,
        away_spread,
        home_spread: away_spread.map(|s| -s),
        away_score: None,
        home_score: None,
    }
}

/// `game` finished with the given score.
pub fn final_game(mut game: ScheduledGame, away_score: i32, home_score: i32) -> ScheduledGame {
    game.status = MatchupStatus::Final;
    game.away_score = Some(away_score);
    game.home_score = Some(home_score);
    game
}

/// Timestamp used for fixture syncs.
pub fn seeded_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// All three stores over one migrated pool.
pub struct Harness {
    pub pool: DbPool,
    pub matchups: Arc<SqliteMatchupStore>,
    pub picks: Arc<SqlitePickStore>,
    pub overrides: Arc<SqliteWeekOverrideStore>,
}

impl Harness {
    /// Harness over a private in-memory database.
    ///
    /// # Panics
    /// Panics if the database cannot be opened.
    pub fn in_memory() -> Self {
        let pool = connection::open(":memory:").expect("open in-memory database");
        Self::with_pool(pool)
    }

    pub fn with_pool(pool: DbPool) -> Self {
        Self {
            matchups: Arc::new(SqliteMatchupStore::new(pool.clone())),
            picks: Arc::new(SqlitePickStore::new(pool.clone())),
            overrides: Arc::new(SqliteWeekOverrideStore::new(pool.clone())),
            pool,
        }
    }

    /// Sync `games` into `slot` and return the stored matchups in order.
    ///
    /// # Panics
    /// Panics if any game fails to sync.
    pub async fn seed(&self, slot: WeekSlot, games: &[ScheduledGame]) -> Vec<Matchup> {
        let mut stored = Vec::with_capacity(games.len());
        for game in games {
            let action = self
                .matchups
                .sync_game(slot, game, seeded_at())
                .await
                .expect("seed game");
            stored.push(action.matchup().clone());
        }
        stored
    }
}
