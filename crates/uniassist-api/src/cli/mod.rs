//! CLI command definitions for the `uniassist` binary.
//!
//! Uses clap derive macros for argument parsing. `serve` runs the REST API;
//! the remaining commands are admin helpers that work on the same database.

pub mod serve;
pub mod status;
pub mod user;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// UniAssist university assistant server.
#[derive(Parser)]
#[command(name = "uniassist", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format.
    #[arg(long, global = true, value_enum, default_value = "pretty", env = "UNIASSIST_LOG_FORMAT")]
    pub log_format: LogFormatArg,

    /// Also export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "UNIASSIST_OTEL")]
    pub otel: bool,

    /// Data directory holding `config.toml` and the database.
    #[arg(long, global = true, env = "UNIASSIST_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (overrides config and `PORT`).
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to (overrides config).
        #[arg(long)]
        host: Option<String>,
    },

    /// List registered users.
    Users,

    /// Add credits to a user's balance.
    #[command(name = "grant-credits")]
    GrantCredits {
        /// Account email.
        email: String,

        /// Credits to add (must be positive).
        amount: i64,
    },

    /// System status dashboard.
    Status,
}
