//! Persistence ports for matchups, picks, and tester week pins.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    AllocationToken, Matchup, MatchupId, Pick, ScheduledGame, SyncAction, UserId, WeekSlot,
};
use crate::error::Result;

/// Storage operations for matchups.
pub trait MatchupStore: Send + Sync {
    /// Reconcile one feed game into `slot` inside a single write transaction.
    ///
    /// Implementations must serialize writers for the same slot so two
    /// concurrent syncs can never create the same game twice.
    fn sync_game(
        &self,
        slot: WeekSlot,
        game: &ScheduledGame,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<SyncAction>> + Send;

    /// All matchups scheduled in `slot`, ordered by kickoff.
    fn matchups_for(&self, slot: WeekSlot) -> impl Future<Output = Result<Vec<Matchup>>> + Send;

    /// Get a matchup by ID.
    fn matchup_by_id(&self, id: &MatchupId)
        -> impl Future<Output = Result<Option<Matchup>>> + Send;

    /// Final matchups whose results have not been evaluated yet.
    fn unevaluated_finals(&self) -> impl Future<Output = Result<Vec<Matchup>>> + Send;
}

/// Picks whose allocation for a week should be written as one unit.
#[derive(Debug, Clone)]
pub struct AllocationWrite {
    pub user: UserId,
    pub slot: WeekSlot,
    pub token: AllocationToken,
    pub pick_names: Vec<String>,
    pub now: DateTime<Utc>,
}

/// Pool-wide counts for the admin status view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolSummary {
    pub pending: i64,
    pub active: i64,
    pub eliminated: i64,
    /// Picks holding a token in the summarized slot.
    pub allocated: i64,
    /// Of those, tokens written by the default assigner.
    pub defaulted: i64,
}

/// Storage operations for picks and their weekly allocations.
pub trait PickStore: Send + Sync {
    /// Record a completed grant and materialize `count` pending picks,
    /// numbered after the user's highest existing pick.
    fn grant(
        &self,
        user: &UserId,
        count: u32,
        source: &str,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Pick>>> + Send;

    /// Every pick owned by `user`, with allocations, ordered by number.
    fn picks_for_user(&self, user: &UserId) -> impl Future<Output = Result<Vec<Pick>>> + Send;

    /// Write `write.token` into `write.slot` for every named pick, all or
    /// nothing. Picks move to `active`.
    ///
    /// Fails the whole batch when any pick is missing, eliminated, or
    /// already holds a token on a game that has kicked off.
    fn allocate(&self, write: &AllocationWrite) -> impl Future<Output = Result<Vec<Pick>>> + Send;

    /// Remove the token in `slot`. A pick left without any allocation
    /// reverts to `pending`.
    fn clear_allocation(
        &self,
        user: &UserId,
        pick_name: &str,
        slot: WeekSlot,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Pick>> + Send;

    /// Live picks from completed grants that hold no token in `slot`.
    fn unallocated(&self, slot: WeekSlot) -> impl Future<Output = Result<Vec<Pick>>> + Send;

    /// Write a default token for each pick that still has none in `slot`.
    /// Returns the number of picks assigned.
    fn assign_default(
        &self,
        slot: WeekSlot,
        token: &AllocationToken,
        picks: &[Pick],
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<usize>> + Send;

    /// Eliminate active picks whose `slot` token names `winner` in
    /// `matchup`, and mark the matchup evaluated, in one transaction.
    fn eliminate(
        &self,
        slot: WeekSlot,
        matchup_id: &MatchupId,
        winner: Option<&str>,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Pick>>> + Send;

    /// Status counts plus allocation counts for `slot`.
    fn summary(&self, slot: WeekSlot) -> impl Future<Output = Result<PoolSummary>> + Send;
}

/// Per-user week pins used by testers.
pub trait WeekOverrideStore: Send + Sync {
    /// The pinned slot for `user`, if any.
    fn pinned_week(&self, user: &UserId) -> impl Future<Output = Result<Option<WeekSlot>>> + Send;

    /// Pin `user` to `slot`, replacing any previous pin.
    fn pin_week(
        &self,
        user: &UserId,
        slot: WeekSlot,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Remove the pin. Returns whether one existed.
    fn unpin_week(&self, user: &UserId) -> impl Future<Output = Result<bool>> + Send;
}
