//! Scripted [`ScheduleSource`] for sync tests.
//!
//! Games are set per week slot and can be replaced between syncs to mimic
//! line moves and status changes. A queued failure is returned by the next
//! fetch instead of the games.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::{ScheduledGame, WeekSlot};
use crate::error::{Error, Result, SyncError};
use crate::port::outbound::schedule::ScheduleSource;

#[derive(Default)]
pub struct ScriptedScheduleSource {
    weeks: Mutex<HashMap<WeekSlot, Vec<ScheduledGame>>>,
    failures: Mutex<VecDeque<Error>>,
    fetch_count: Arc<AtomicU32>,
}

impl ScriptedScheduleSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the games served for `slot`.
    pub fn set_week(&self, slot: WeekSlot, games: Vec<ScheduledGame>) {
        self.weeks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(slot, games);
    }

    /// Make the next fetch fail as if the feed timed out.
    pub fn fail_next_transient(&self) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(
                SyncError::TransientSource {
                    reason: "scripted timeout".into(),
                }
                .into(),
            );
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScheduleSource for ScriptedScheduleSource {
    async fn fetch_week(&self, slot: WeekSlot) -> Result<Vec<ScheduledGame>> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
        {
            return Err(err);
        }
        Ok(self
            .weeks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&slot)
            .cloned()
            .unwrap_or_default())
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}
