//! Outbound adapters (driven side): storage and the schedule feed.

pub mod espn;
pub mod sqlite;
