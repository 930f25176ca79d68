pub mod accounts;
pub mod config;
pub mod feed;
pub mod handlers;
pub mod normalizers;
pub mod sample;
pub mod types;
pub mod sources {
    pub mod alphavantage;
}

pub use crate::config::FeedConfig;
pub use feed::{CommodityFeed, FeedSettings};
pub use sources::alphavantage::AlphaVantageClient;
pub use types::*;

use axum::{routing::get, Router};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
pub struct AppState {
    pub feed: CommodityFeed,
    /// Jitter source for the simulated broker accounts
    pub rng: Mutex<StdRng>,
}

impl AppState {
    pub fn new(feed: CommodityFeed) -> Self {
        Self::with_rng(feed, StdRng::from_entropy())
    }

    pub fn with_rng(feed: CommodityFeed, rng: StdRng) -> Self {
        Self {
            feed,
            rng: Mutex::new(rng),
        }
    }

    /// State backed by the Alpha Vantage client described by `config`
    pub fn from_config(config: &FeedConfig) -> anyhow::Result<Self> {
        let client = AlphaVantageClient::new(&config.api_key, &config.base_url, config.timeout())?;
        let feed = CommodityFeed::new(Arc::new(client), config.feed_settings());
        Ok(Self::new(feed))
    }
}

/// Build the API router
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/commodities", get(handlers::get_commodities))
        .route("/commodities/", get(handlers::get_commodities))
        .route("/users", get(handlers::get_users))
        .route("/users/", get(handlers::get_users))
        .route("/raw", get(handlers::get_raw))
        .route("/raw/", get(handlers::get_raw))
        .route("/health", get(handlers::health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
