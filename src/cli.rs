//! CLI argument parsing for cloudls

use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cloudls")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "List cloud storage and fleet resources with automatic pagination", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of ~/.cloudls/config.toml
    #[arg(long, global = true, env = "CLOUDLS_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Profile from the config file
    #[arg(short, long, global = true, env = "CLOUDLS_PROFILE")]
    pub profile: Option<String>,

    /// Service endpoint URL (overrides the profile)
    #[arg(long, global = true, env = "CLOUDLS_ENDPOINT", value_name = "URL")]
    pub endpoint: Option<String>,

    /// Region sent with each request (overrides the profile)
    #[arg(long, global = true, env = "CLOUDLS_REGION")]
    pub region: Option<String>,

    /// Bearer token (overrides the profile)
    #[arg(long, global = true, env = "CLOUDLS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List resources, following continuation tokens across pages
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show the operations that can be listed
    #[command(visible_alias = "ops")]
    Operations,

    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args, Clone, Debug)]
pub struct ListArgs {
    /// Operation to list (see `cloudls operations`)
    pub operation: String,

    /// Filter passed to the service (can specify multiple)
    #[arg(short, long = "filter", value_name = "NAME=VALUE", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,

    /// Items requested per call; the service may return fewer
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: Option<u32>,

    /// Stop after this many items in total (zero or negative: no limit)
    #[arg(long, allow_negative_numbers = true)]
    pub max_items: Option<i64>,

    /// Resume a previous listing from this token
    #[arg(long, value_name = "TOKEN")]
    pub starting_token: Option<String>,

    /// Fetch a single page only
    #[arg(long)]
    pub no_paginate: bool,

    /// Print a single field of each record (dotted path, e.g. Owner.DisplayName)
    #[arg(short, long, value_name = "FIELD")]
    pub select: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Deprecated spelling of --max-items
    #[arg(long, hide = true, allow_negative_numbers = true)]
    pub limit: Option<i64>,

    /// Deprecated spelling of --starting-token
    #[arg(long, hide = true)]
    pub marker: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show profiles and the settings that would be used
    Show,

    /// Print the config file location
    Path,

    /// Write a commented default config file
    Init {
        /// Overwrite an existing file without asking
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Open the config file in $EDITOR
    Edit,
}

/// Parse a `NAME=VALUE` filter
fn parse_filter(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("filter name is empty in '{}'", s));
    }

    Ok((name.to_string(), value.to_string()))
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
