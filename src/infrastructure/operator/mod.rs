//! Operator implementation for inbound adapters.
//!
//! [`Operator`] wires the use-case services over the SQLite stores and
//! implements [`PoolOperator`](crate::port::inbound::pool::PoolOperator).
//! It is the only place that reads the wall clock.

pub mod entry;
mod pool;

pub use entry::{Operator, OperatorSettings};
