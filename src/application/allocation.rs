//! Pick allocation for the resolved current week.
//!
//! A request names one matchup, one team, and one or more of the user's
//! picks. Every precondition is checked before anything is written, and the
//! store applies the batch as one transaction. A single-pick request fails
//! with the specific reason; a multi-pick request in which any pick fails is
//! rejected as a whole with [`AllocationError::PartialBatchFailure`].

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::season::SeasonService;
use crate::domain::error::DomainError;
use crate::domain::{AllocationToken, Pick, UserId, WeekSlot};
use crate::error::{AllocationError, Error, Result};
use crate::port::inbound::pool::{AllocationOutcome, AllocationRequest};
use crate::port::outbound::store::{AllocationWrite, MatchupStore, PickStore, WeekOverrideStore};

pub struct AllocationService<M, P, W> {
    season: Arc<SeasonService<M, W>>,
    matchups: Arc<M>,
    picks: Arc<P>,
}

impl<M, P, W> AllocationService<M, P, W>
where
    M: MatchupStore,
    P: PickStore,
    W: WeekOverrideStore,
{
    pub fn new(season: Arc<SeasonService<M, W>>, matchups: Arc<M>, picks: Arc<P>) -> Self {
        Self {
            season,
            matchups,
            picks,
        }
    }

    pub async fn allocate(
        &self,
        request: AllocationRequest,
        now: DateTime<Utc>,
    ) -> Result<AllocationOutcome> {
        let mut seen = HashSet::new();
        let names: Vec<String> = request
            .pick_names
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty() && seen.insert(n.clone()))
            .collect();
        if names.is_empty() {
            return Err(DomainError::EmptyBatch.into());
        }

        let season = self.season.current_week_for(Some(&request.user_id), now).await?;
        let slot = season.slot;

        let matchup = self
            .matchups
            .matchup_by_id(&request.matchup_id)
            .await?
            .ok_or_else(|| DomainError::UnknownMatchup(request.matchup_id.to_string()))?;
        if !matchup.has_team(&request.team) {
            return Err(DomainError::TeamNotInMatchup {
                team: request.team.clone(),
                matchup_id: matchup.id.to_string(),
            }
            .into());
        }
        if matchup.slot != slot {
            return Err(DomainError::MatchupOutsideWeek {
                matchup_id: matchup.id.to_string(),
                matchup_slot: matchup.slot.to_string(),
                current_slot: slot.to_string(),
            }
            .into());
        }
        if matchup.is_locked(now) {
            return Err(AllocationError::Locked {
                matchup_id: matchup.id.to_string(),
                kickoff: matchup.kickoff,
            }
            .into());
        }

        let owned = self.picks.picks_for_user(&request.user_id).await?;
        let mut failures = Vec::new();
        for name in &names {
            if let Err(err) = self.check_pick(&owned, &request.user_id, name, slot, now).await {
                failures.push((name.clone(), err));
            }
        }

        if names.len() == 1 {
            if let Some((_, err)) = failures.pop() {
                return Err(err);
            }
        } else if !failures.is_empty() {
            warn!(
                user = %request.user_id,
                requested = names.len(),
                failed = failures.len(),
                "Allocation batch rejected"
            );
            return Err(AllocationError::PartialBatchFailure {
                requested: names.len(),
                failed: failures
                    .into_iter()
                    .map(|(name, err)| format!("{name} ({err})"))
                    .collect(),
            }
            .into());
        }

        let token = AllocationToken::new(matchup.id.clone(), request.team.clone());
        let updated_picks = self
            .picks
            .allocate(&AllocationWrite {
                user: request.user_id.clone(),
                slot,
                token: token.clone(),
                pick_names: names.clone(),
                now,
            })
            .await?;

        info!(
            user = %request.user_id,
            slot = %slot,
            matchup_id = %matchup.id,
            team = %request.team,
            token = %token,
            picks = updated_picks.len(),
            "Picks allocated"
        );

        let message = format!(
            "{} allocated to {} in {} for {}",
            names.join(", "),
            request.team,
            matchup.label(),
            season.label()
        );
        Ok(AllocationOutcome {
            updated_picks,
            message,
        })
    }

    async fn check_pick(
        &self,
        owned: &[Pick],
        user: &UserId,
        name: &str,
        slot: WeekSlot,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let pick = owned
            .iter()
            .find(|p| p.display_name == name)
            .ok_or_else(|| DomainError::UnknownPick {
                pick: name.to_string(),
                user_id: user.to_string(),
            })?;
        if pick.is_eliminated() {
            return Err(AllocationError::EliminatedPick {
                pick: name.to_string(),
            }
            .into());
        }

        if let Some(held) = pick.token(slot) {
            if let Some(current) = self.matchups.matchup_by_id(&held.matchup_id).await? {
                if current.is_locked(now) {
                    return Err(AllocationError::Locked {
                        matchup_id: current.id.to_string(),
                        kickoff: current.kickoff,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Clear `pick_name`'s token for the user's current week.
    pub async fn deallocate(
        &self,
        user: &UserId,
        pick_name: &str,
        now: DateTime<Utc>,
    ) -> Result<Pick> {
        let season = self.season.current_week_for(Some(user), now).await?;
        let pick = self
            .picks
            .clear_allocation(user, pick_name, season.slot, now)
            .await
            .map_err(|err| {
                if matches!(err, Error::Allocation(_)) {
                    warn!(user = %user, pick = pick_name, error = %err, "Deallocation rejected");
                }
                err
            })?;
        info!(
            user = %user,
            slot = %season.slot,
            pick = pick_name,
            status = %pick.status,
            "Pick deallocated"
        );
        Ok(pick)
    }
}
