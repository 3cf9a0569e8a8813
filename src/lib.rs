//! Loserpool - an NFL loser pool engine.
//!
//! Players own picks. Each week every live pick rides one team, and a pick
//! survives the week when that team does not win. The crate covers the
//! whole weekly cycle:
//!
//! - **Season clock** - which phase and week it is, with tester pins
//! - **Matchup sync** - schedule, lines, and results from the ESPN feed,
//!   keyed so that matchup ids survive every re-sync
//! - **Allocation** - putting picks on a team before kickoff
//! - **Default picks** - filling unallocated picks once the week locks
//! - **Elimination** - turning final results into eliminated picks
//!
//! # Modules
//!
//! - [`domain`] - Pure types and rules: slots, matchups, picks
//! - [`port`] - Inbound use-case surface and outbound store/feed traits
//! - [`application`] - Use-case services over the ports
//! - [`adapter`] - SQLite stores, the ESPN client, and the CLI
//! - [`infrastructure`] - Configuration, logging, and wiring
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `testkit` - Fixed clock, scripted feed, and store fixtures for tests
//!
//! # Example
//!
//! ```
//! use loserpool::domain::{Phase, SeasonClock};
//! use chrono::{NaiveDate, TimeZone, Utc};
//!
//! let clock = SeasonClock::new(NaiveDate::from_ymd_opt(2026, 8, 6).unwrap());
//! let state = clock.resolve(Utc.with_ymd_and_hms(2026, 9, 17, 12, 0, 0).unwrap());
//! assert_eq!(state.phase, Phase::Regular);
//! assert_eq!(state.slot.as_str(), "reg4");
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
