//! SQLite persistence adapters.
//!
//! Provides SQLite-backed implementations of the matchup, pick, and week
//! override stores using Diesel ORM.

pub mod database;
pub mod matchup;
pub mod pick;
pub mod week_override;

pub use matchup::SqliteMatchupStore;
pub use pick::SqlitePickStore;
pub use week_override::SqliteWeekOverrideStore;
