use anyhow::Context;
use dotenvy::dotenv;
use stowage::config::ServerConfig;
use stowage::router::init_router;
use stowage::state::init_app_state;
use stowage_observability::{init_logging, init_metrics};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    init_logging(env!("CARGO_CRATE_NAME"));

    let metrics = init_metrics().context("failed to install metrics recorder")?;
    let state = init_app_state()
        .await
        .context("failed to initialise the cache store")?;
    let app = init_router(state, metrics);

    let server_config = ServerConfig::from_env();
    let addr = server_config
        .socket_addr()
        .context("invalid SERVER_HOST/SERVER_PORT")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
