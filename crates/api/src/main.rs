mod config;
mod metrics;
mod routes;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use config::{AppConfig, LogFormat};
use routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    init_tracing(config.logging.format);
    tracing::info!(?config, "Configuration loaded");

    // Missing credentials leave the analyzer unconfigured, not the process dead
    let analyzer = config.build_analyzer()?;
    let state = Arc::new(AppState::new(analyzer));

    // Build router
    let app = routes::app_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;

    tracing::info!("Server listening on http://{}", config.server.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
