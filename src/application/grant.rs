//! Pick materialization for completed purchases and free grants.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::error::DomainError;
use crate::domain::{Pick, UserId};
use crate::error::Result;
use crate::port::outbound::store::PickStore;

pub struct GrantService<P> {
    picks: Arc<P>,
}

impl<P: PickStore> GrantService<P> {
    pub fn new(picks: Arc<P>) -> Self {
        Self { picks }
    }

    /// Create exactly `count` pending picks for `user`.
    ///
    /// # Errors
    /// [`DomainError::NonPositivePicksCount`] when `count` is zero.
    pub async fn grant_picks(
        &self,
        user: &UserId,
        count: u32,
        source: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Pick>> {
        if count == 0 {
            return Err(DomainError::NonPositivePicksCount(0).into());
        }
        let picks = self.picks.grant(user, count, source, now).await?;
        info!(user = %user, picks = picks.len(), source, "Picks granted");
        Ok(picks)
    }

    pub async fn picks(&self, user: &UserId) -> Result<Vec<Pick>> {
        self.picks.picks_for_user(user).await
    }
}
