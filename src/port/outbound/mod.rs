//! Outbound ports: what the use cases need from the outside world.

pub mod clock;
pub mod schedule;
pub mod store;
