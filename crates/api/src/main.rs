//! Premium API server
//!
//! Loads every configured model once at startup, then serves
//! `POST /predict` with the configured default model.

use anyhow::Result;
use premium_api::{api, config::ServerConfig};
use premium_lib::StructuredLogger;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting premium-api");

    let config = ServerConfig::load()?;
    info!(
        addr = %config.bind_addr(),
        model_dir = %config.model_dir.display(),
        api_model = %config.api_model,
        "Server configured"
    );

    let logger = StructuredLogger::new("premium-api");
    let state = api::build_state(&config, logger.clone()).await?;
    logger.log_startup(SERVICE_VERSION, &state.registry.names(), &config.api_model);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    let shutdown_logger = logger.clone();
    api::serve(listener, state, async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown_logger.log_shutdown("SIGINT received");
        }
    })
    .await?;

    info!("Shutting down");
    Ok(())
}
