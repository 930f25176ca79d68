use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use commodity_feed::{app, config::API_KEY_VAR, AppState, FeedConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine, the environment may already be populated
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Commodity Feed Service...");

    let config = FeedConfig::from_env()?;
    if config.api_key == "demo" {
        warn!("{} not set, using the provider's demo key", API_KEY_VAR);
    }

    let state = Arc::new(AppState::from_config(&config)?);
    let settings = state.feed.settings();
    info!(
        base_url = %config.base_url,
        record_limit = settings.record_limit,
        min_points = settings.min_points,
        timeout_secs = config.timeout_secs,
        "✓ Alpha Vantage client initialized"
    );

    let app = app(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!("🚀 Commodity Feed Service listening on port {}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
