use anyhow::Context;
use tracing_subscriber::EnvFilter;

use command_center::{app::app, config, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL, COMMAND_MASTER_PASSWORD, etc. are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config().clone();
    tracing::info!("Starting command center in {:?} mode", config.environment);
    if !config.master_password_set() {
        tracing::warn!("No master password configured; every privileged action will be refused");
    }

    let port = config.server.port;
    let prefix = config.server.route_prefix.clone();
    let state = AppState::from_config(config).shared();
    let router = app(state.clone());

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Command center listening on http://{}{}", bind_addr, prefix);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    state.database.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
