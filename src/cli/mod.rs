//! Command-line interface definitions.

pub mod check;
pub mod watch;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::domain::SortKey;

/// Arbwatch - live view of an arbitrage scanner's opportunities.
#[derive(Parser, Debug)]
#[command(name = "arbwatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Follow the scanner's opportunity set until interrupted
    Watch(WatchArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `arbwatch check`
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration file and print derived endpoints
    Config(ConfigPathArg),
}

#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments for the `watch` subcommand.
#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Path to configuration file; built-in defaults apply if it is missing
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Override minimum net profit percent shown
    #[arg(long)]
    pub min_profit: Option<Decimal>,

    /// Override sort key (profit, net_profit, liquidity, recent)
    #[arg(long)]
    pub sort: Option<SortKey>,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,

    /// Records listed per render
    #[arg(long, default_value = "10")]
    pub rows: usize,
}
