//! [`PoolOperator`] implementation.

use async_trait::async_trait;

use super::entry::Operator;
use crate::domain::{Matchup, Pick, UserId, WeekContext, WeekSlot};
use crate::error::Result;
use crate::port::inbound::pool::{
    AllocationOutcome, AllocationRequest, DefaultReport, EvaluationReport, PoolOperator,
    StatusReport, SyncReport,
};
use crate::port::outbound::store::PickStore;

impl Operator {
    async fn slot_or_current(&self, slot: Option<WeekSlot>) -> Result<WeekSlot> {
        match slot {
            Some(slot) => Ok(slot),
            None => Ok(self
                .season
                .current_week_for(None, self.clock.now())
                .await?
                .slot),
        }
    }
}

#[async_trait]
impl PoolOperator for Operator {
    async fn week_context(&self, user: Option<&UserId>) -> Result<WeekContext> {
        self.season.week_context(user, self.clock.now()).await
    }

    async fn sync_week(&self, slot: Option<WeekSlot>) -> Result<SyncReport> {
        let slot = self.slot_or_current(slot).await?;
        self.sync.sync_week(slot, self.clock.now()).await
    }

    async fn matchups(&self, slot: Option<WeekSlot>) -> Result<Vec<Matchup>> {
        let slot = self.slot_or_current(slot).await?;
        self.sync.matchups_for(slot).await
    }

    async fn grant_picks(&self, user: &UserId, count: u32, source: &str) -> Result<Vec<Pick>> {
        self.grants
            .grant_picks(user, count, source, self.clock.now())
            .await
    }

    async fn picks(&self, user: &UserId) -> Result<Vec<Pick>> {
        self.grants.picks(user).await
    }

    async fn allocate(&self, request: AllocationRequest) -> Result<AllocationOutcome> {
        self.allocation.allocate(request, self.clock.now()).await
    }

    async fn deallocate(&self, user: &UserId, pick_name: &str) -> Result<Pick> {
        self.allocation
            .deallocate(user, pick_name, self.clock.now())
            .await
    }

    async fn assign_defaults(&self, slot: Option<WeekSlot>) -> Result<DefaultReport> {
        let slot = self.slot_or_current(slot).await?;
        self.defaults.assign_defaults(slot, self.clock.now()).await
    }

    async fn evaluate_results(&self) -> Result<Vec<EvaluationReport>> {
        self.elimination.evaluate_results(self.clock.now()).await
    }

    async fn pin_week(&self, user: &UserId, slot: WeekSlot) -> Result<()> {
        self.season.pin_week(user, slot, self.clock.now()).await
    }

    async fn unpin_week(&self, user: &UserId) -> Result<bool> {
        self.season.unpin_week(user).await
    }

    async fn status(
        &self,
        user: Option<&UserId>,
        slot: Option<WeekSlot>,
    ) -> Result<StatusReport> {
        let week = self
            .season
            .context_for(user, slot, self.clock.now())
            .await?;
        let summary = self.picks.summary(week.season.slot).await?;
        Ok(StatusReport { week, summary })
    }
}
