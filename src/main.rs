//! cloudls - list cloud storage and fleet resources with automatic pagination

mod cli;
mod commands;
mod core;
mod output;
mod paginator;
mod providers;
mod utils;

use anyhow::Result;
use cli::{Cli, Commands};
use colored::Colorize;
use crate::core::{CloudlsPaths, Config, Overrides};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize logger
    let filters = std::env::var("RUST_LOG").ok();
    logger_builder(cli.verbose, filters.as_deref()).init();

    // Handle errors
    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Run the appropriate command
async fn run(cli: Cli) -> Result<()> {
    let config = Config::new(CloudlsPaths::new_with_custom_config(cli.config)?);
    let overrides = Overrides {
        profile: cli.profile,
        endpoint: cli.endpoint,
        region: cli.region,
        token: cli.token,
    };

    match cli.command {
        Commands::List(args) => commands::run_list(args, &config, &overrides).await,

        Commands::Operations => commands::run_operations(),

        Commands::Config { command } => commands::run_config(command, &config, &overrides),
    }
}

/// Logger at Info, overridden by `RUST_LOG`, with debug output for this crate
/// when `--verbose` is set
fn logger_builder(verbose: bool, filters: Option<&str>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Info);
    if let Some(filters) = filters {
        builder.parse_filters(filters);
    }
    if verbose {
        builder.filter_module(env!("CARGO_CRATE_NAME"), log::LevelFilter::Debug);
    }
    builder
}
