//! HTTP-level tests against a fake Alpha Vantage
//!
//! Each test mounts the provider responses it needs on a wiremock server
//! and drives the axum router directly.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use commodity_feed::{
    app, sample::sample_series, AlphaVantageClient, AppState, ChartPoint, CommodityFeed,
    FeedSettings,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Provider-shaped payload, newest first
fn wti_payload(days: u32) -> Value {
    let data: Vec<Value> = (1..=days)
        .rev()
        .map(|day| json!({ "date": format!("2024-03-{:02}", day), "value": format!("{}.456", 75 + day) }))
        .collect();
    json!({
        "name": "Crude Oil Prices WTI",
        "interval": "daily",
        "unit": "dollars per barrel",
        "data": data
    })
}

fn state_for(server: &MockServer, timeout: Duration) -> Arc<AppState> {
    let client = AlphaVantageClient::new("test-key", &format!("{}/query", server.uri()), timeout)
        .expect("client");
    let feed = CommodityFeed::new(Arc::new(client), FeedSettings::default());
    Arc::new(AppState::with_rng(feed, StdRng::seed_from_u64(11)))
}

async fn get_json(state: Arc<AppState>, uri: &str) -> (StatusCode, Value) {
    let response = app(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn mount(server: &MockServer, function: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("function", function))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn commodities_returns_live_series() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("function", "WTI"))
        .and(query_param("interval", "daily"))
        .and(query_param("apikey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wti_payload(21)))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get_json(state_for(&server, Duration::from_secs(5)), "/commodities/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["source"], "real_api");
    assert_eq!(body["count"], 21);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 21);
    assert_eq!(data[0], json!({ "label": "Mar 01", "value": 76.46 }));
    assert_eq!(data[20], json!({ "label": "Mar 21", "value": 96.46 }));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn commodities_timeout_serves_sample() {
    let server = MockServer::start().await;
    mount(
        &server,
        "WTI",
        ResponseTemplate::new(200)
            .set_body_json(wti_payload(21))
            .set_delay(Duration::from_secs(2)),
    )
    .await;

    let (status, body) =
        get_json(state_for(&server, Duration::from_millis(200)), "/commodities").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["source"], "sample");
    assert_eq!(body["fallback_reason"], "upstream_unreachable");
    assert!(body["message"].as_str().unwrap().contains("timed out"));

    let data: Vec<ChartPoint> = serde_json::from_value(body["data"].clone()).unwrap();
    assert_eq!(data, sample_series());
}

#[tokio::test]
async fn commodities_server_error_serves_sample() {
    let server = MockServer::start().await;
    mount(&server, "WTI", ResponseTemplate::new(503)).await;

    let (_, body) = get_json(state_for(&server, Duration::from_secs(5)), "/commodities/").await;

    assert_eq!(body["source"], "sample");
    assert_eq!(body["fallback_reason"], "upstream_unreachable");
    assert_eq!(body["data"].as_array().unwrap().len(), 21);
}

#[tokio::test]
async fn commodities_sparse_primary_uses_secondary() {
    let server = MockServer::start().await;
    mount(&server, "WTI", ResponseTemplate::new(200).set_body_json(wti_payload(5))).await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("function", "ALL_COMMODITIES"))
        .and(query_param("interval", "monthly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Global Price Index of All Commodities",
            "interval": "monthly",
            "data": (1..=12).rev().map(|m| json!({ "date": format!("2023-{:02}-01", m), "value": "160.5" })).collect::<Vec<_>>()
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (_, body) = get_json(state_for(&server, Duration::from_secs(5)), "/commodities/").await;

    assert_eq!(body["source"], "secondary_api");
    assert_eq!(body["count"], 12);
    assert_eq!(body["data"][0]["label"], "Jan 01");
    assert_eq!(body["data"][11]["label"], "Dec 01");
}

#[tokio::test]
async fn commodities_five_records_serves_sample() {
    let server = MockServer::start().await;
    mount(&server, "WTI", ResponseTemplate::new(200).set_body_json(wti_payload(5))).await;
    mount(
        &server,
        "ALL_COMMODITIES",
        ResponseTemplate::new(200).set_body_json(wti_payload(5)),
    )
    .await;

    let (_, body) = get_json(state_for(&server, Duration::from_secs(5)), "/commodities/").await;

    assert_eq!(body["source"], "sample");
    assert_eq!(body["fallback_reason"], "insufficient_data");
    let data: Vec<ChartPoint> = serde_json::from_value(body["data"].clone()).unwrap();
    assert_eq!(data, sample_series());
}

#[tokio::test]
async fn commodities_rate_limit_notice_serves_sample() {
    let server = MockServer::start().await;
    let notice = json!({ "Information": "Our standard API rate limit is 25 requests per day." });
    mount(&server, "WTI", ResponseTemplate::new(200).set_body_json(notice.clone())).await;
    mount(&server, "ALL_COMMODITIES", ResponseTemplate::new(200).set_body_json(notice)).await;

    let (_, body) = get_json(state_for(&server, Duration::from_secs(5)), "/commodities/").await;

    assert_eq!(body["source"], "sample");
    assert_eq!(body["fallback_reason"], "malformed_response");
    assert!(body["message"].as_str().unwrap().contains("rate limit"));
}

#[tokio::test]
async fn commodities_repeated_calls_are_identical() {
    let server = MockServer::start().await;
    mount(&server, "WTI", ResponseTemplate::new(200).set_body_json(wti_payload(21))).await;
    let state = state_for(&server, Duration::from_secs(5));

    let (_, first) = get_json(state.clone(), "/commodities/").await;
    let (_, second) = get_json(state, "/commodities/").await;

    assert_eq!(
        serde_json::to_vec(&first["data"]).unwrap(),
        serde_json::to_vec(&second["data"]).unwrap()
    );
}

#[tokio::test]
async fn raw_passes_secondary_through() {
    let server = MockServer::start().await;
    let payload = json!({ "name": "Global Price Index of All Commodities", "data": [] });
    mount(&server, "ALL_COMMODITIES", ResponseTemplate::new(200).set_body_json(payload.clone())).await;

    let (status, body) = get_json(state_for(&server, Duration::from_secs(5)), "/raw/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], payload);
}

#[tokio::test]
async fn raw_upstream_failure_is_500() {
    let server = MockServer::start().await;
    mount(&server, "ALL_COMMODITIES", ResponseTemplate::new(502)).await;

    let (status, body) = get_json(state_for(&server, Duration::from_secs(5)), "/raw/").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("502"));
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn users_returns_three_accounts() {
    let server = MockServer::start().await;

    let (status, body) = get_json(state_for(&server, Duration::from_secs(5)), "/users/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);
    assert_eq!(data[0]["broker"], "Zerodha (DU000004)");
    assert_eq!(data[1]["status"], "Active");
    assert_eq!(data[2]["status"], "Pending");
    assert_eq!(data[2]["current_pnl"], "₹ 0.00");
}

#[tokio::test]
async fn users_is_reproducible_with_same_seed() {
    let server = MockServer::start().await;

    let (_, first) = get_json(state_for(&server, Duration::from_secs(5)), "/users/").await;
    let (_, second) = get_json(state_for(&server, Duration::from_secs(5)), "/users/").await;

    assert_eq!(first["data"], second["data"]);
}

#[tokio::test]
async fn health_tracks_upstream_failures() {
    let server = MockServer::start().await;
    mount(&server, "WTI", ResponseTemplate::new(500)).await;
    let state = state_for(&server, Duration::from_secs(5));

    let (_, before) = get_json(state.clone(), "/health").await;
    assert_eq!(before["status"], "healthy");
    assert_eq!(before["upstream"]["source"], "alphavantage");

    get_json(state.clone(), "/commodities/").await;

    let (status, after) = get_json(state, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["status"], "degraded");
    assert_eq!(after["upstream"]["is_healthy"], false);
}
