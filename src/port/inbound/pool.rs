//! Pool use-cases exposed to inbound adapters (CLI, schedulers).
//!
//! Every operation is a short request/response call. The scheduled
//! triggers (`sync_week`, `assign_defaults`, `evaluate_results`) are
//! idempotent and safe to call repeatedly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    AllocationToken, Matchup, MatchupId, Pick, UserId, WeekContext, WeekSlot,
};
use crate::error::Result;
use crate::port::outbound::store::PoolSummary;

/// A user's request to put picks on one team.
#[derive(Debug, Clone)]
pub struct AllocationRequest {
    pub user_id: UserId,
    pub matchup_id: MatchupId,
    pub team: String,
    pub pick_names: Vec<String>,
}

/// Result of a successful allocation.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationOutcome {
    pub updated_picks: Vec<Pick>,
    pub message: String,
}

/// A feed game that could not be synchronized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSyncFailure {
    pub game: String,
    pub error: String,
}

/// Outcome of one sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub slot: WeekSlot,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub errors: Vec<GameSyncFailure>,
    /// Games left untouched because the run exceeded its time budget.
    pub not_processed: usize,
}

impl SyncReport {
    #[must_use]
    pub fn new(slot: WeekSlot) -> Self {
        Self {
            slot,
            created: 0,
            updated: 0,
            unchanged: 0,
            errors: Vec::new(),
            not_processed: 0,
        }
    }

    /// True when the run wrote nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0
    }
}

/// Outcome of one default-assignment run.
#[derive(Debug, Clone, Serialize)]
pub struct DefaultReport {
    pub slot: WeekSlot,
    pub picks_assigned: usize,
    pub target: Option<AllocationToken>,
    pub deadline: Option<DateTime<Utc>>,
    /// Why nothing was assigned, when applicable.
    pub skipped: Option<String>,
}

/// Outcome of evaluating one final matchup.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub matchup_id: MatchupId,
    pub matchup: String,
    pub winner: Option<String>,
    pub picks_eliminated: Vec<String>,
}

/// Current week plus pool counts.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub week: WeekContext,
    pub summary: PoolSummary,
}

/// Unified pool capability surface consumed by inbound adapters.
#[async_trait]
pub trait PoolOperator: Send + Sync {
    /// Resolved week for `user` (or the global clock) and its deadline.
    async fn week_context(&self, user: Option<&UserId>) -> Result<WeekContext>;

    /// Pull the feed for `slot` (default: current week) into the store.
    async fn sync_week(&self, slot: Option<WeekSlot>) -> Result<SyncReport>;

    /// Matchups of `slot` (default: current week).
    async fn matchups(&self, slot: Option<WeekSlot>) -> Result<Vec<Matchup>>;

    /// Materialize picks for a completed purchase or free grant.
    async fn grant_picks(&self, user: &UserId, count: u32, source: &str) -> Result<Vec<Pick>>;

    /// Every pick owned by `user`.
    async fn picks(&self, user: &UserId) -> Result<Vec<Pick>>;

    /// Allocate picks for the user's current week.
    async fn allocate(&self, request: AllocationRequest) -> Result<AllocationOutcome>;

    /// Clear a pick's current-week allocation.
    async fn deallocate(&self, user: &UserId, pick_name: &str) -> Result<Pick>;

    /// Default-assign unallocated picks once `slot`'s deadline passed.
    async fn assign_defaults(&self, slot: Option<WeekSlot>) -> Result<DefaultReport>;

    /// Turn every unevaluated final result into eliminations.
    async fn evaluate_results(&self) -> Result<Vec<EvaluationReport>>;

    /// Pin a tester to a week.
    async fn pin_week(&self, user: &UserId, slot: WeekSlot) -> Result<()>;

    /// Remove a tester's pin.
    async fn unpin_week(&self, user: &UserId) -> Result<bool>;

    /// Week context and pool counts for `slot`, or for the current week as
    /// `user` sees it.
    async fn status(
        &self,
        user: Option<&UserId>,
        slot: Option<WeekSlot>,
    ) -> Result<StatusReport>;
}
