//! Path utilities for loserpool.
//!
//! Local files live under `~/.loserpool/`:
//! - `~/.loserpool/config.toml` - main configuration
//! - `~/.loserpool/loserpool.db` - pool database

use std::path::PathBuf;

/// Returns the loserpool home directory (`~/.loserpool/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".loserpool")
}

/// Returns the default config file path (`~/.loserpool/config.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}

/// Returns the default database path (`~/.loserpool/loserpool.db`).
pub fn default_database() -> PathBuf {
    home_dir().join("loserpool.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_under_loserpool_home() {
        let home = home_dir();
        let config = default_config();
        let db = default_database();

        assert!(home.to_string_lossy().contains(".loserpool"));
        assert!(config.starts_with(&home));
        assert!(db.starts_with(&home));
    }
}
