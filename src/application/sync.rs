//! Schedule synchronization.
//!
//! Pulls one week from the feed and reconciles each game into the matchup
//! store. Games are independent: a conflict or failure on one is recorded in
//! the report and the batch moves on. The whole run is bounded by a time
//! budget; games not reached in time are counted as not processed and every
//! game already committed stays committed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::domain::{Matchup, MatchupId, SyncAction, WeekSlot};
use crate::error::{Error, Result, SyncError};
use crate::port::inbound::pool::{GameSyncFailure, SyncReport};
use crate::port::outbound::schedule::ScheduleSource;
use crate::port::outbound::store::MatchupStore;

pub struct MatchupSyncService<M> {
    store: Arc<M>,
    source: Arc<dyn ScheduleSource>,
    budget: Duration,
}

impl<M: MatchupStore> MatchupSyncService<M> {
    pub fn new(store: Arc<M>, source: Arc<dyn ScheduleSource>, budget: Duration) -> Self {
        Self {
            store,
            source,
            budget,
        }
    }

    /// Sync every feed game for `slot`.
    ///
    /// # Errors
    /// Fails only when the feed itself cannot be read; per-game failures are
    /// reported in [`SyncReport::errors`].
    pub async fn sync_week(&self, slot: WeekSlot, now: DateTime<Utc>) -> Result<SyncReport> {
        let started = Instant::now();
        let games = match timeout(self.budget, self.source.fetch_week(slot)).await {
            Ok(games) => games?,
            Err(_) => {
                return Err(SyncError::TransientSource {
                    reason: format!(
                        "{} did not answer within {} ms",
                        self.source.source_name(),
                        self.budget.as_millis()
                    ),
                }
                .into())
            }
        };
        debug!(
            slot = %slot,
            source = self.source.source_name(),
            games = games.len(),
            "Feed fetched"
        );

        let mut report = SyncReport::new(slot);
        for (index, game) in games.iter().enumerate() {
            if started.elapsed() >= self.budget {
                report.not_processed = games.len() - index;
                warn!(
                    slot = %slot,
                    not_processed = report.not_processed,
                    budget_ms = self.budget.as_millis() as u64,
                    "Sync budget exhausted"
                );
                break;
            }

            match self.store.sync_game(slot, game, now).await {
                Ok(SyncAction::Created(m)) => {
                    info!(matchup_id = %m.id, slot = %slot, game = %m.label(), "Matchup created");
                    report.created += 1;
                }
                Ok(SyncAction::Updated(m)) => {
                    info!(
                        matchup_id = %m.id,
                        slot = %slot,
                        status = %m.status,
                        update_count = m.update_count,
                        "Matchup updated"
                    );
                    report.updated += 1;
                }
                Ok(SyncAction::Unchanged(_)) => report.unchanged += 1,
                Err(err) => {
                    match &err {
                        Error::Sync(SyncError::Conflict { .. }) => {
                            warn!(slot = %slot, error = %err, "Sync conflict, game skipped");
                        }
                        _ => warn!(slot = %slot, game = %game.label(), error = %err, "Game sync failed"),
                    }
                    report.errors.push(GameSyncFailure {
                        game: game.label(),
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            slot = %slot,
            created = report.created,
            updated = report.updated,
            unchanged = report.unchanged,
            errors = report.errors.len(),
            not_processed = report.not_processed,
            "Week synced"
        );
        Ok(report)
    }

    pub async fn matchups_for(&self, slot: WeekSlot) -> Result<Vec<Matchup>> {
        self.store.matchups_for(slot).await
    }

    pub async fn matchup_by_id(&self, id: &MatchupId) -> Result<Option<Matchup>> {
        self.store.matchup_by_id(id).await
    }
}
