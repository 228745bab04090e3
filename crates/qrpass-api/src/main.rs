//! # qrpass-api — Binary Entry Point
//!
//! Reads configuration from the environment, installs the tracing
//! subscriber, and serves the API. Refuses to start without a valid
//! signing secret.

use qrpass_api::config::AppConfig;
use qrpass_api::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = config.as_ref().map(|c| c.log_json).unwrap_or(false);
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = config.map_err(|e| {
        tracing::error!("Configuration invalid: {e}");
        e
    })?;
    tracing::info!(config = ?config, "configuration loaded");

    let port = config.port;
    let app = qrpass_api::app(AppState::from_config(config));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("qrpass API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
