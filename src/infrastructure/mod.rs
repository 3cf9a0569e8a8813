//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic: configuration, logging, and runtime wiring.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`operator`] - Pool operator consumed by the CLI

pub mod bootstrap;
pub mod config;
pub mod operator;
