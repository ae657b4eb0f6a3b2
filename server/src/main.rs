//! credit-server entry point.

use anyhow::{Context, Result};
use clap::Parser;
use credit_server::{AppState, ServerConfig, init_logging, router};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    let state = AppState::from_config(&config).context("Failed to initialize the service")?;
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("Listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // no signal handler; run until killed
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
