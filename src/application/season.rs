//! Week resolution for users, with tester pins layered over the clock.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::{SeasonClock, SeasonState, UserId, WeekContext, WeekSlot};
use crate::error::Result;
use crate::port::outbound::store::{MatchupStore, WeekOverrideStore};

/// Resolves the current week and its allocation deadline.
pub struct SeasonService<M, W> {
    clock: SeasonClock,
    matchups: Arc<M>,
    overrides: Arc<W>,
}

impl<M: MatchupStore, W: WeekOverrideStore> SeasonService<M, W> {
    pub fn new(clock: SeasonClock, matchups: Arc<M>, overrides: Arc<W>) -> Self {
        Self {
            clock,
            matchups,
            overrides,
        }
    }

    /// The pinned week for `user` if one exists, otherwise the clock's week.
    pub async fn current_week_for(
        &self,
        user: Option<&UserId>,
        now: DateTime<Utc>,
    ) -> Result<SeasonState> {
        Ok(self.resolve(user, now).await?.0)
    }

    async fn resolve(
        &self,
        user: Option<&UserId>,
        now: DateTime<Utc>,
    ) -> Result<(SeasonState, bool)> {
        if let Some(user) = user {
            if let Some(slot) = self.overrides.pinned_week(user).await? {
                return Ok((SeasonState::from_slot(slot), true));
            }
        }
        Ok((self.clock.resolve(now), false))
    }

    /// Earliest kickoff among `slot`'s matchups. `None` when none are known.
    async fn deadline(&self, slot: WeekSlot) -> Result<Option<DateTime<Utc>>> {
        let matchups = self.matchups.matchups_for(slot).await?;
        Ok(matchups.iter().map(|m| m.kickoff).min())
    }

    /// Resolved week, its deadline, and whether a pin is in effect.
    pub async fn week_context(
        &self,
        user: Option<&UserId>,
        now: DateTime<Utc>,
    ) -> Result<WeekContext> {
        self.context_for(user, None, now).await
    }

    /// Context for `slot`, or for the user's current week when `slot` is
    /// `None`. An explicit slot counts as pinned only when it is the slot
    /// the user's pin resolves to.
    pub async fn context_for(
        &self,
        user: Option<&UserId>,
        slot: Option<WeekSlot>,
        now: DateTime<Utc>,
    ) -> Result<WeekContext> {
        let (current, pinned) = self.resolve(user, now).await?;
        let (season, pinned) = match slot {
            Some(slot) if slot != current.slot => (SeasonState::from_slot(slot), false),
            _ => (current, pinned),
        };
        let deadline = self.deadline(season.slot).await?;
        let mut context = WeekContext {
            season,
            deadline,
            pinned,
            locked: false,
        };
        context.locked = context.deadline_passed(now);
        Ok(context)
    }

    pub async fn pin_week(&self, user: &UserId, slot: WeekSlot, now: DateTime<Utc>) -> Result<()> {
        self.overrides.pin_week(user, slot, now).await?;
        info!(user = %user, slot = %slot, "Week pinned");
        Ok(())
    }

    pub async fn unpin_week(&self, user: &UserId) -> Result<bool> {
        let removed = self.overrides.unpin_week(user).await?;
        if removed {
            info!(user = %user, "Week pin removed");
        }
        Ok(removed)
    }
}
