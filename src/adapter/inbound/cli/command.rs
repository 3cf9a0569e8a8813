//! Command-line interface definitions.
//!
//! Defines the CLI structure for the loserpool administrative tool using
//! `clap`. Every pool subcommand is a single request/response call against
//! the configured database.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::paths;
use crate::domain::{Phase, WeekSlot};
use crate::error::Result;

/// NFL loser pool administration CLI
#[derive(Parser, Debug)]
#[command(name = "loserpool")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to the configuration file.
    #[arg(short, long, global = true, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands for the loserpool CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the resolved current week and its deadline
    Week(WeekArgs),

    /// Pull schedule and odds for a week from the feed
    Sync(SlotArgs),

    /// List a week's matchups
    Matchups(SlotArgs),

    /// Grant picks to a user
    Grant(GrantArgs),

    /// List a user's picks
    Picks(UserArgs),

    /// Allocate picks to a team for the user's current week
    Allocate(AllocateArgs),

    /// Clear a pick's current-week allocation
    Deallocate(DeallocateArgs),

    /// Assign default picks once a week's deadline has passed
    Defaults(SlotArgs),

    /// Evaluate final results and eliminate losing picks
    Evaluate,

    /// Pin a tester to a week
    Pin(PinArgs),

    /// Remove a tester's week pin
    Unpin(UserArgs),

    /// Show the current week and pool counts
    Status(StatusArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `loserpool config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration with defaults applied.
    Show,
    /// Validate a configuration file for correctness.
    Validate,
}

/// Optional explicit week. Omit both flags to use the current week.
#[derive(Args, Debug, Clone, Default)]
pub struct SlotArgs {
    /// Season phase (pre, reg, post).
    #[arg(long, requires = "week")]
    pub phase: Option<Phase>,
    /// Week number within the phase.
    #[arg(long, requires = "phase")]
    pub week: Option<u8>,
}

impl SlotArgs {
    /// Resolve the flags into a validated slot.
    ///
    /// # Errors
    /// Returns a domain error when the week is outside the phase.
    pub fn slot(&self) -> Result<Option<WeekSlot>> {
        match (self.phase, self.week) {
            (Some(phase), Some(week)) => Ok(Some(WeekSlot::new(phase, week)?)),
            _ => Ok(None),
        }
    }
}

/// Arguments for `loserpool week`.
#[derive(Args, Debug)]
pub struct WeekArgs {
    /// Resolve the week as this user sees it (honors tester pins).
    #[arg(long)]
    pub user: Option<String>,
}

/// Arguments for `loserpool status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Resolve the week as this user sees it (honors tester pins).
    #[arg(long)]
    pub user: Option<String>,
    #[command(flatten)]
    pub slot: SlotArgs,
}

/// Arguments naming a single user.
#[derive(Args, Debug)]
pub struct UserArgs {
    /// User identifier.
    #[arg(long)]
    pub user: String,
}

/// Arguments for `loserpool grant`.
#[derive(Args, Debug)]
pub struct GrantArgs {
    /// User identifier.
    #[arg(long)]
    pub user: String,
    /// Number of picks to create.
    #[arg(long)]
    pub count: u32,
    /// Where the picks came from (purchase reference, promo, ...).
    #[arg(long, default_value = "admin")]
    pub source: String,
}

/// Arguments for `loserpool allocate`.
#[derive(Args, Debug)]
pub struct AllocateArgs {
    /// User identifier.
    #[arg(long)]
    pub user: String,
    /// Target matchup id.
    #[arg(long)]
    pub matchup: String,
    /// Team the picks ride this week.
    #[arg(long)]
    pub team: String,
    /// Pick display names, e.g. "Pick 1". Repeat for several picks.
    #[arg(long = "pick", required = true)]
    pub picks: Vec<String>,
}

/// Arguments for `loserpool deallocate`.
#[derive(Args, Debug)]
pub struct DeallocateArgs {
    /// User identifier.
    #[arg(long)]
    pub user: String,
    /// Pick display name.
    #[arg(long)]
    pub pick: String,
}

/// Arguments for `loserpool pin`.
#[derive(Args, Debug)]
pub struct PinArgs {
    /// User identifier.
    #[arg(long)]
    pub user: String,
    /// Season phase (pre, reg, post).
    #[arg(long)]
    pub phase: Phase,
    /// Week number within the phase.
    #[arg(long)]
    pub week: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn allocate_collects_repeated_picks() {
        let cli = Cli::parse_from([
            "loserpool", "allocate", "--user", "u1", "--matchup", "m1", "--team", "Jets",
            "--pick", "Pick 1", "--pick", "Pick 2",
        ]);
        let Commands::Allocate(args) = cli.command else {
            panic!("expected allocate");
        };
        assert_eq!(args.picks, vec!["Pick 1", "Pick 2"]);
    }

    #[test]
    fn slot_args_resolve_through_allow_list() {
        let cli = Cli::parse_from(["loserpool", "sync", "--phase", "reg", "--week", "7"]);
        let Commands::Sync(args) = cli.command else {
            panic!("expected sync");
        };
        assert_eq!(args.slot().unwrap().unwrap().as_str(), "reg7");

        let out_of_range = SlotArgs {
            phase: Some(Phase::Postseason),
            week: Some(5),
        };
        assert!(out_of_range.slot().is_err());
        assert!(SlotArgs::default().slot().unwrap().is_none());
    }

    #[test]
    fn status_takes_user_and_slot() {
        let cli = Cli::parse_from([
            "loserpool", "status", "--user", "tester", "--phase", "post", "--week", "2",
        ]);
        let Commands::Status(args) = cli.command else {
            panic!("expected status");
        };
        assert_eq!(args.user.as_deref(), Some("tester"));
        assert_eq!(args.slot.slot().unwrap().unwrap().as_str(), "post2");
    }

    #[test]
    fn phase_without_week_is_rejected() {
        let parsed = Cli::try_parse_from(["loserpool", "matchups", "--phase", "reg"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_config_flag_is_accepted_after_subcommand() {
        let cli = Cli::parse_from(["loserpool", "config", "validate", "--config", "/tmp/x.toml"]);
        assert_eq!(cli.config, PathBuf::from("/tmp/x.toml"));
    }
}
