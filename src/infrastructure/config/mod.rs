//! Infrastructure configuration modules.

pub mod logging;
pub mod season;
pub mod settings;
