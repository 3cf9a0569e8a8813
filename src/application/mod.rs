//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the pool's use cases. Each takes the current time as an
//! argument; reading the clock is the composition root's job.

pub mod allocation;
pub mod defaults;
pub mod elimination;
pub mod grant;
pub mod season;
pub mod sync;

pub use allocation::AllocationService;
pub use defaults::DefaultPickService;
pub use elimination::EliminationService;
pub use grant::GrantService;
pub use season::SeasonService;
pub use sync::MatchupSyncService;
