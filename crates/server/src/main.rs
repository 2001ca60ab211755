//! intake-agent server binary
//!
//! Usage: `intake-agent [config.toml]`. Settings also come from
//! `INTAKE_AGENT_`-prefixed environment variables, which override the
//! file (e.g. `INTAKE_AGENT_SERVER__PORT=9090`).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use intake_agent_config::load_settings;
use intake_agent_server::{spawn_idle_sweeper, AppState, InMemoryLeadSink};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,intake_agent=debug")),
        )
        .init();

    let config_path: Option<PathBuf> = std::env::args().nth(1).map(PathBuf::from);
    let settings =
        load_settings(config_path.as_deref()).context("failed to load settings")?;

    let sink = Arc::new(InMemoryLeadSink::new());
    let state = AppState::new(settings.clone(), sink).context("failed to build app state")?;

    spawn_idle_sweeper(state.registry.clone(), SWEEP_INTERVAL);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "intake-agent listening");

    axum::serve(listener, intake_agent_server::http::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
