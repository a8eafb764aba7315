//! UniAssist CLI and REST API entry point.
//!
//! Binary name: `uniassist`
//!
//! Parses CLI arguments, loads configuration and secrets, initializes the
//! database and services, then dispatches to the command handler or starts
//! the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;

use uniassist_infra::config::{Secrets, load_app_config, resolve_data_dir};
use uniassist_observe::tracing_setup::{
    LogFormat, TracingOptions, init_tracing, shutdown_tracing,
};

use cli::{Cli, Commands, LogFormatArg};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Fallback filter when RUST_LOG is unset.
    let default_filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "info,uniassist=debug",
        _ => "trace",
    };
    init_tracing(&TracingOptions {
        default_filter: default_filter.to_string(),
        format: match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        },
        enable_otel: cli.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let data_dir = cli.data_dir.clone().unwrap_or_else(resolve_data_dir);
    let mut config = load_app_config(&data_dir).await;
    let secrets = Secrets::from_env();
    secrets.apply_overrides(&mut config);
    tracing::debug!(?secrets, data_dir = %data_dir.display(), "configuration loaded");

    let state = AppState::init(data_dir, config, secrets).await?;

    match cli.command {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            cli::serve::serve(state, host, port, cli.quiet).await?;
        }

        Commands::Users => {
            cli::user::list_users(&state, cli.json).await?;
        }

        Commands::GrantCredits { email, amount } => {
            cli::user::grant_credits(&state, &email, amount, cli.json).await?;
        }

        Commands::Status => {
            cli::status::status(&state, cli.json).await?;
        }
    }

    Ok(())
}
