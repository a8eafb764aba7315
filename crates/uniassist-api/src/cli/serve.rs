//! `uniassist serve`: run the REST API until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::time::Duration;

use console::style;

use crate::http;
use crate::state::AppState;

/// How often expired guest sessions and rate-limit windows are swept.
const JANITOR_INTERVAL: Duration = Duration::from_secs(300);

pub async fn serve(state: AppState, host: String, port: u16, quiet: bool) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let janitor = tokio::spawn(run_janitor(state.clone()));

    if !quiet {
        println!(
            "  {} UniAssist API listening on {}",
            style("⚡").bold(),
            style(format!("http://{addr}")).cyan()
        );
        println!("  {}", style("Press Ctrl+C to stop").dim());
    }
    tracing::info!(%addr, "server started");

    let router = http::router::build_router(state);
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    janitor.abort();
    if !quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
}

async fn run_janitor(state: AppState) {
    let mut ticker = tokio::time::interval(JANITOR_INTERVAL);
    // The first tick completes immediately; nothing has expired yet.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let stats = state.guest_service.cleanup();
        state.rate_limiter.prune(chrono::Utc::now());
        tracing::debug!(
            guest_sessions = stats.after,
            rate_limited_keys = state.rate_limiter.tracked_keys(),
            "janitor pass"
        );
    }
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
