//! ESPN schedule and odds feed adapter.

pub mod client;
pub mod dto;
pub mod settings;

pub use client::EspnClient;
pub use settings::FeedConfig;
