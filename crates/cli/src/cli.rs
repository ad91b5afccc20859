//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Media Relay - channel-to-webhook relay with multi-part post aggregation
#[derive(Parser, Debug)]
#[command(
    name = "media-relay",
    author,
    version,
    about = "Channel-to-webhook media relay pipeline",
    long_about = "Relays posts from a source messaging channel to configured webhook sinks.\n\n\
                  Multi-part posts (albums) are aggregated behind a quiet window and \n\
                  delivered as a single outbound message per sink, with per-sink size \n\
                  limits and failure isolation."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "MEDIA_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "MEDIA_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the relay pipeline
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "relay.toml", env = "MEDIA_RELAY_CONFIG")]
    pub config: PathBuf,

    /// Inbound event stream as JSON lines; reads stdin when omitted
    #[arg(long, env = "MEDIA_RELAY_EVENTS")]
    pub events: Option<PathBuf>,

    /// Delay between replayed events in milliseconds (0 = as fast as parsed)
    #[arg(long, default_value = "0", env = "MEDIA_RELAY_EVENT_INTERVAL")]
    pub event_interval_ms: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "MEDIA_RELAY_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without running the pipeline
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "relay.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "relay.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show sink configuration details
    #[arg(long)]
    pub sinks: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
