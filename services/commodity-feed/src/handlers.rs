use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::accounts::{simulated_accounts, BrokerAccount};
use crate::types::{FetchEnvelope, SourceHealth};
use crate::AppState;

/// GET /commodities/ - Chart series with provenance, never fails
pub async fn get_commodities(State(state): State<Arc<AppState>>) -> Json<FetchEnvelope> {
    Json(state.feed.fetch().await)
}

/// GET /users/ - Simulated broker accounts
pub async fn get_users(State(state): State<Arc<AppState>>) -> Json<AccountsResponse> {
    let accounts = {
        // Poisoning only means another request panicked mid-draw; the RNG is still usable
        let mut rng = state.rng.lock().unwrap_or_else(|e| e.into_inner());
        simulated_accounts(&mut *rng)
    };

    let now = Utc::now();
    info!("Serving simulated broker data at {}", now.format("%H:%M:%S"));

    Json(AccountsResponse {
        success: true,
        data: accounts,
        timestamp: now,
        source: "simulated".to_string(),
    })
}

/// GET /raw/ - Secondary series passthrough for debugging
pub async fn get_raw(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RawResponse>, (StatusCode, Json<RawResponse>)> {
    match state.feed.raw_secondary().await {
        Ok(data) => Ok(Json(RawResponse {
            success: true,
            data: Some(data),
            error: None,
        })),
        Err(e) => {
            warn!("Raw passthrough failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RawResponse {
                    success: false,
                    data: None,
                    error: Some(e.to_string()),
                }),
            ))
        }
    }
}

/// GET /health - Service and upstream health, no upstream call
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let upstream = state.feed.upstream().health();

    Json(HealthResponse {
        status: if upstream.is_healthy {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        upstream,
    })
}

// Response types
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct AccountsResponse {
    pub success: bool,
    pub data: Vec<BrokerAccount>,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct RawResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub upstream: SourceHealth,
}
