//! Handler for the `config` command group.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Execute `config show`.
pub fn execute_show(path: &Path) -> Result<()> {
    let config = Config::load(path)?;

    if output::is_json() {
        output::json_output(json!({ "command": "config.show", "config": config }));
        return Ok(());
    }

    output::section("Effective Configuration");
    output::field("Path", path.display());
    output::field("Database", &config.database);

    output::section("Season");
    if let Some(start) = config.season.start_date {
        output::field("Start date", start);
    }
    output::field("Default policy", format!("{:?}", config.defaults.policy).to_lowercase());

    output::section("Feed");
    output::field("Base URL", &config.feed.base_url);
    output::field(
        "Season",
        config
            .feed
            .season
            .map_or_else(|| "current".to_string(), |s| s.to_string()),
    );
    output::field("Timeout", format!("{}ms", config.feed.timeout_ms));
    output::field("Retries", config.feed.retry_max_attempts);
    output::field("Sync budget", format!("{}ms", config.feed.sync_budget_ms));

    output::section("Logging");
    output::field("Level", &config.logging.level);
    output::field("Format", &config.logging.format);
    Ok(())
}

/// Execute `config validate`.
pub fn execute_validate(path: &Path) -> Result<()> {
    let config = Config::load(path)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "config.validate",
            "path": path.display().to_string(),
            "valid": true,
            "database": config.database,
        }));
        return Ok(());
    }

    output::section("Config Validation");
    output::field("Path", path.display());
    output::success("Config file is valid");
    output::field(
        "Next",
        format!("loserpool config show -c {}", path.display()),
    );
    Ok(())
}
