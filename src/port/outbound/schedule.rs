//! Schedule/odds feed port.

use async_trait::async_trait;

use crate::domain::{ScheduledGame, WeekSlot};
use crate::error::Error;

/// External source of games, kickoff times, lines, and results.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Fetch every game the source knows for `slot`.
    ///
    /// Network failures surface as retryable errors; nothing is stored by
    /// the source itself.
    async fn fetch_week(&self, slot: WeekSlot) -> Result<Vec<ScheduledGame>, Error>;

    /// Get the source name for logging/debugging.
    fn source_name(&self) -> &'static str;
}
