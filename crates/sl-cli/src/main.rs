//! Sluice CLI - forward-only schema migrations for Postgres and DuckDB

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::Cli;
use commands::{migrate, ping, status, tables};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        cli::Commands::Migrate(args) => migrate::execute(args, &cli.global).await,
        cli::Commands::Status(args) => status::execute(args, &cli.global).await,
        cli::Commands::Ping => ping::execute(&cli.global).await,
        cli::Commands::Tables(args) => tables::execute(args, &cli.global).await,
    }
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
}
