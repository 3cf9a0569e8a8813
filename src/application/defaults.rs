//! Default pick assignment after a week's deadline.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::{select_default_target, DefaultPickPolicy, WeekSlot};
use crate::error::Result;
use crate::port::inbound::pool::DefaultReport;
use crate::port::outbound::store::{MatchupStore, PickStore};

pub struct DefaultPickService<M, P> {
    matchups: Arc<M>,
    picks: Arc<P>,
    policy: DefaultPickPolicy,
}

impl<M: MatchupStore, P: PickStore> DefaultPickService<M, P> {
    pub fn new(matchups: Arc<M>, picks: Arc<P>, policy: DefaultPickPolicy) -> Self {
        Self {
            matchups,
            picks,
            policy,
        }
    }

    /// Give every live pick without a `slot` token the week's default.
    ///
    /// Does nothing before the deadline (first kickoff of the week). Picks
    /// that already hold a token, default or chosen, are left alone, so
    /// re-running is safe.
    pub async fn assign_defaults(
        &self,
        slot: WeekSlot,
        now: DateTime<Utc>,
    ) -> Result<DefaultReport> {
        let matchups = self.matchups.matchups_for(slot).await?;
        let deadline = matchups.iter().map(|m| m.kickoff).min();
        let mut report = DefaultReport {
            slot,
            picks_assigned: 0,
            target: None,
            deadline,
            skipped: None,
        };

        let Some(deadline) = deadline else {
            report.skipped = Some(format!("no matchups stored for {slot}"));
            return Ok(report);
        };
        if now < deadline {
            report.skipped = Some(format!("deadline {deadline} has not passed"));
            return Ok(report);
        }

        let Some(target) = select_default_target(&matchups, self.policy) else {
            report.skipped = Some("no scheduled matchup with a line".into());
            return Ok(report);
        };
        report.target = Some(target.token.clone());

        let candidates = self.picks.unallocated(slot).await?;
        if candidates.is_empty() {
            debug!(slot = %slot, "No picks need a default");
            return Ok(report);
        }

        report.picks_assigned = self
            .picks
            .assign_default(slot, &target.token, &candidates, now)
            .await?;
        info!(
            slot = %slot,
            matchup_id = %target.token.matchup_id,
            team = %target.token.team,
            game = %target.matchup_label,
            picks = report.picks_assigned,
            "Default picks assigned"
        );
        Ok(report)
    }
}
