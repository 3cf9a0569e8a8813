//! Elimination of picks that backed a winning team.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::domain::{GameOutcome, Matchup};
use crate::error::Result;
use crate::port::inbound::pool::EvaluationReport;
use crate::port::outbound::store::{MatchupStore, PickStore};

pub struct EliminationService<M, P> {
    matchups: Arc<M>,
    picks: Arc<P>,
}

impl<M: MatchupStore, P: PickStore> EliminationService<M, P> {
    pub fn new(matchups: Arc<M>, picks: Arc<P>) -> Self {
        Self { matchups, picks }
    }

    /// Evaluate one final matchup. Returns `None` for games that are not
    /// final, lack a score, or were already evaluated.
    pub async fn evaluate(
        &self,
        matchup: &Matchup,
        now: DateTime<Utc>,
    ) -> Result<Option<EvaluationReport>> {
        if matchup.is_evaluated() {
            return Ok(None);
        }
        let Some(outcome) = matchup.outcome() else {
            return Ok(None);
        };

        let winner = match &outcome {
            GameOutcome::Winner { winner, .. } => Some(winner.as_str()),
            GameOutcome::Tie => None,
        };
        let eliminated = self
            .picks
            .eliminate(matchup.slot, &matchup.id, winner, now)
            .await?;

        info!(
            matchup_id = %matchup.id,
            slot = %matchup.slot,
            winner = winner.unwrap_or("tie"),
            picks = eliminated.len(),
            "Matchup evaluated"
        );

        Ok(Some(EvaluationReport {
            matchup_id: matchup.id.clone(),
            matchup: matchup.label(),
            winner: winner.map(str::to_string),
            picks_eliminated: eliminated
                .into_iter()
                .map(|p| format!("{} / {}", p.owner, p.display_name))
                .collect(),
        }))
    }

    /// Evaluate every final matchup not yet evaluated. A failure on one
    /// matchup is logged and the rest still run.
    pub async fn evaluate_results(&self, now: DateTime<Utc>) -> Result<Vec<EvaluationReport>> {
        let finals = self.matchups.unevaluated_finals().await?;
        let mut reports = Vec::with_capacity(finals.len());
        for matchup in &finals {
            match self.evaluate(matchup, now).await {
                Ok(Some(report)) => reports.push(report),
                Ok(None) => {}
                Err(err) => error!(matchup_id = %matchup.id, error = %err, "Evaluation failed"),
            }
        }
        Ok(reports)
    }
}
