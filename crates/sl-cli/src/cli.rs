//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// Sluice - forward-only schema migrations
#[derive(Parser, Debug)]
#[command(name = "sluice")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Target database connection string
    #[arg(
        short = 'u',
        long,
        global = true,
        env = "DATABASE_URL",
        hide_env_values = true
    )]
    pub database_url: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending change-scripts
    Migrate(MigrateArgs),

    /// Show applied and pending change-scripts
    Status(StatusArgs),

    /// Check that the database is reachable
    Ping,

    /// List tables in the default schema
    Tables(TablesArgs),
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Override the change-script directory
    #[arg(short, long)]
    pub scripts_dir: Option<String>,

    /// List pending scripts without applying them
    #[arg(long)]
    pub dry_run: bool,

    /// Build-time mode: only run for production or hosted deploys
    #[arg(long)]
    pub deploy: bool,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Override the change-script directory
    #[arg(short, long)]
    pub scripts_dir: Option<String>,
}

/// Arguments for the tables command
#[derive(Args, Debug)]
pub struct TablesArgs {
    /// Only tables whose name starts with this prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Also list the columns of this table
    #[arg(long)]
    pub columns: Option<String>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
