//! Administrative CLI.
//!
//! [`run`] is the whole binary: it applies the global output flags, loads
//! the configuration, wires the operator, and dispatches one subcommand.

pub mod command;
pub mod config;
pub mod output;
pub mod paths;
pub mod pool;

use tracing::debug;

use self::command::{Cli, Commands, ConfigCommand};
use self::output::OutputConfig;
use crate::error::Result;
use crate::infrastructure::bootstrap::build_operator;
use crate::infrastructure::config::settings::Config;
use crate::port::inbound::pool::PoolOperator;

/// Run the parsed command line to completion.
///
/// # Errors
/// Returns the first configuration, storage, or pool-rule error hit.
pub async fn run(cli: Cli) -> Result<()> {
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose), &cli.color);

    if let Commands::Config(command) = &cli.command {
        return match command {
            ConfigCommand::Show => config::execute_show(&cli.config),
            ConfigCommand::Validate => config::execute_validate(&cli.config),
        };
    }

    let mut config = Config::load(&cli.config)?;
    match output::verbosity() {
        0 => {}
        1 => config.logging.level = "debug".to_string(),
        _ => config.logging.level = "trace".to_string(),
    }
    config.init_logging();
    debug!(
        config = %cli.config.display(),
        database = %config.database,
        "Configuration loaded"
    );

    let operator = build_operator(&config)?;
    dispatch(&operator, &cli.command).await
}

/// Execute one pool subcommand against `operator`.
///
/// # Errors
/// Propagates the handler's error.
pub async fn dispatch(operator: &dyn PoolOperator, command: &Commands) -> Result<()> {
    match command {
        Commands::Week(args) => pool::week(operator, args).await,
        Commands::Sync(args) => pool::sync(operator, args).await,
        Commands::Matchups(args) => pool::matchups(operator, args).await,
        Commands::Grant(args) => pool::grant(operator, args).await,
        Commands::Picks(args) => pool::picks(operator, args).await,
        Commands::Allocate(args) => pool::allocate(operator, args).await,
        Commands::Deallocate(args) => pool::deallocate(operator, args).await,
        Commands::Defaults(args) => pool::defaults(operator, args).await,
        Commands::Evaluate => pool::evaluate(operator).await,
        Commands::Pin(args) => pool::pin(operator, args).await,
        Commands::Unpin(args) => pool::unpin(operator, args).await,
        Commands::Status(args) => pool::status(operator, args).await,
        Commands::Config(_) => Ok(()),
    }
}
