//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!     CLI ──────────▶│  PoolOperator (inbound) │
//!                    │   application services  │
//!                    └───────────┬─────────────┘
//!                  ┌─────────────┴─────────────┐
//!                  ▼                           ▼
//!           ┌─────────────┐            ┌───────────────┐
//!           │   Stores    │            │ScheduleSource │
//!           │  (SQLite)   │            │  (ESPN feed)  │
//!           └─────────────┘            └───────────────┘
//! ```

pub mod inbound;
pub mod outbound;
