//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`source`]: [`ScriptedScheduleSource`](source::ScriptedScheduleSource),
//!   a schedule feed with per-week scripted games and failures.
//! - [`clock`]: [`FixedClock`](clock::FixedClock), a settable clock.
//! - [`fixtures`]: Game builders and an in-memory store [`Harness`](fixtures::Harness).

pub mod clock;
pub mod fixtures;
pub mod source;
