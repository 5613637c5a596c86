use super::context::AppContext;
use crate::cli::root::{Cli, Command};
use crate::commands;
use crate::error::CliError;
use crate::logging;
use clap::Parser;

pub fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    logging::init(cli.debug);

    let context = AppContext::from_cli(&cli)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| CliError::io("failed to start async runtime", source))?;

    let result = runtime.block_on(async {
        match cli.command {
            Command::Sync(args) => commands::sync::run(&context, args).await,
            Command::Replay(args) => commands::replay::run(&context, args).await,
        }
    });

    if let Err(err) = &result {
        if let Some(statement) = err.statement() {
            tracing::debug!(statement, "failing statement");
        }
    }
    result
}
