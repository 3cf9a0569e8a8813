//! Pool domain: season phases, week slots, matchups, and picks.
//!
//! Everything here is pure. Storage, the schedule feed, and the clock
//! reading all live behind ports.

pub mod default_pick;
pub mod error;
pub mod id;
pub mod matchup;
pub mod pick;
pub mod schedule;
pub mod season;
pub mod slot;

pub use default_pick::{select_default_target, DefaultPickPolicy, DefaultTarget};
pub use id::{GrantId, MatchupId, PickId, UserId};
pub use matchup::{GameOutcome, Matchup, MatchupStatus};
pub use pick::{Allocation, AllocationToken, Pick, PickStatus};
pub use schedule::{reconcile, ScheduledGame, SyncAction};
pub use season::{Phase, SeasonClock, SeasonState, WeekContext};
pub use slot::WeekSlot;
