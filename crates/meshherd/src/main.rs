mod cli;
mod commands;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use meshherd_api::OfflineAdapter;
use meshherd_core::Controller;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, configured: &str) {
    let filter = match verbosity {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = meshherd_config::load_config(cli.global.config.as_deref());
    init_tracing(
        cli.global.verbose,
        config.as_ref().map_or("warn", |c| c.log_level.as_str()),
    );

    match cli.command {
        // Config commands work even when the file is missing or broken
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Everything else opens the database
        cmd => {
            let controller_config = config?.controller_config(cli.global.database.as_deref());
            let controller = Controller::start(controller_config, Arc::new(OfflineAdapter)).await?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &controller, &cli.global).await
        }
    }
}
