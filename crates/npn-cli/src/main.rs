//! npn CLI entry point.

use std::process::ExitCode;

use clap::{CommandFactory, Parser, error::ErrorKind};
use npn_core::{Engine, Registry};
use tracing_subscriber::EnvFilter;

use npn_cli::{Cli, Commands, cmd, exit};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return parse_failure(&err),
    };

    let Some(command) = cli.command else {
        // No command given.
        let _ = Cli::command().print_help();
        return ExitCode::from(exit::NO_COMMAND);
    };

    tracing::debug!(registry = %cli.registry, "starting");
    let engine = Engine::new(Registry::new(&cli.registry));

    let result = match command {
        Commands::Install { identifier } => cmd::install::run(&engine, identifier.as_deref()).await,
        Commands::Update { name } => cmd::update::run(&engine, name.as_deref()).await,
        Commands::Uninstall { name } => cmd::remove::run(&name),
        Commands::Clean => cmd::clean::run(),
    };

    match result {
        Ok(()) => ExitCode::from(exit::SUCCESS),
        Err(err) => {
            let code = if err.is_download_failure() {
                exit::DOWNLOAD_FAILED
            } else {
                exit::FAILURE
            };
            eprintln!("error: {:#}", anyhow::Error::new(err));
            ExitCode::from(code)
        }
    }
}

/// Map clap's parse errors onto the documented exit codes: an unrecognized
/// subcommand is distinct from a missing one.
fn parse_failure(err: &clap::Error) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
            ExitCode::from(exit::SUCCESS)
        }
        ErrorKind::InvalidSubcommand => {
            let _ = err.print();
            ExitCode::from(exit::UNKNOWN_COMMAND)
        }
        _ => {
            let _ = err.print();
            ExitCode::from(exit::NO_COMMAND)
        }
    }
}
