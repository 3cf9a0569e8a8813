//! Operator construction.

use std::sync::Arc;
use std::time::Duration;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::{
    SqliteMatchupStore, SqlitePickStore, SqliteWeekOverrideStore,
};
use crate::application::{
    AllocationService, DefaultPickService, EliminationService, GrantService, MatchupSyncService,
    SeasonService,
};
use crate::domain::{DefaultPickPolicy, SeasonClock};
use crate::port::outbound::clock::Clock;
use crate::port::outbound::schedule::ScheduleSource;

/// Tunables the operator needs from configuration.
#[derive(Debug, Clone, Copy)]
pub struct OperatorSettings {
    pub season_clock: SeasonClock,
    pub default_policy: DefaultPickPolicy,
    pub sync_budget: Duration,
}

/// Pool operator over SQLite storage.
pub struct Operator {
    pub(super) clock: Arc<dyn Clock>,
    pub(super) season: Arc<SeasonService<SqliteMatchupStore, SqliteWeekOverrideStore>>,
    pub(super) sync: MatchupSyncService<SqliteMatchupStore>,
    pub(super) grants: GrantService<SqlitePickStore>,
    pub(super) allocation:
        AllocationService<SqliteMatchupStore, SqlitePickStore, SqliteWeekOverrideStore>,
    pub(super) defaults: DefaultPickService<SqliteMatchupStore, SqlitePickStore>,
    pub(super) elimination: EliminationService<SqliteMatchupStore, SqlitePickStore>,
    pub(super) picks: Arc<SqlitePickStore>,
}

impl Operator {
    /// Wire every service over one migrated pool.
    pub fn new(
        settings: OperatorSettings,
        pool: DbPool,
        source: Arc<dyn ScheduleSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let matchups = Arc::new(SqliteMatchupStore::new(pool.clone()));
        let picks = Arc::new(SqlitePickStore::new(pool.clone()));
        let overrides = Arc::new(SqliteWeekOverrideStore::new(pool));

        let season = Arc::new(SeasonService::new(
            settings.season_clock,
            matchups.clone(),
            overrides,
        ));

        Self {
            clock,
            sync: MatchupSyncService::new(matchups.clone(), source, settings.sync_budget),
            grants: GrantService::new(picks.clone()),
            allocation: AllocationService::new(season.clone(), matchups.clone(), picks.clone()),
            defaults: DefaultPickService::new(
                matchups.clone(),
                picks.clone(),
                settings.default_policy,
            ),
            elimination: EliminationService::new(matchups, picks.clone()),
            season,
            picks,
        }
    }
}
