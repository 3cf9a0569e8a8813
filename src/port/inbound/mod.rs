//! Inbound ports (driving side): use-cases exposed to adapters.

pub mod pool;
