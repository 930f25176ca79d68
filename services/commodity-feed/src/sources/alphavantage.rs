use crate::types::*;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// Outcome of every Alpha Vantage call, read by `/health` without touching the quota
pub struct HealthTracker {
    // Epoch millis, 0 until the first outcome of that kind
    last_success_ms: AtomicU64,
    last_failure_ms: AtomicU64,
    success_count: AtomicU64,
    failure_count: AtomicU64,
    last_latency_ms: AtomicU64,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self {
            last_success_ms: AtomicU64::new(0),
            last_failure_ms: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
            last_latency_ms: AtomicU64::new(0),
        }
    }

    pub fn record_success(&self, latency_ms: u64) {
        self.last_success_ms.store(now_ms(), Ordering::Relaxed);
        self.last_latency_ms.store(latency_ms, Ordering::Relaxed);
        self.success_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.last_failure_ms.store(now_ms(), Ordering::Relaxed);
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Healthy until the first failure, then only while the latest outcome is a success
    pub fn is_healthy(&self) -> bool {
        let last_success = self.last_success_ms.load(Ordering::Relaxed);
        let last_failure = self.last_failure_ms.load(Ordering::Relaxed);
        last_failure == 0 || last_success >= last_failure
    }

    pub fn success_rate(&self) -> f64 {
        let successes = self.success_count.load(Ordering::Relaxed);
        let failures = self.failure_count.load(Ordering::Relaxed);
        let total = successes + failures;
        if total == 0 {
            return 1.0;
        }
        successes as f64 / total as f64
    }

    pub fn snapshot(&self, source: &str) -> SourceHealth {
        let last_success = match self.last_success_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => DateTime::from_timestamp_millis(ms as i64),
        };
        let is_healthy = self.is_healthy();

        SourceHealth {
            source: source.to_string(),
            is_healthy,
            last_success,
            last_error: if is_healthy {
                None
            } else {
                Some("Recent failures detected".to_string())
            },
            success_rate: self.success_rate(),
            avg_latency_ms: self.last_latency_ms.load(Ordering::Relaxed),
        }
    }
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn now_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Alpha Vantage client for commodity time series
/// Free tier: 25 calls/day
/// Docs: https://www.alphavantage.co/documentation/#commodities
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    base_url: Url,
    timeout: Duration,
    health_tracker: HealthTracker,
}

impl AlphaVantageClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://www.alphavantage.co/query";

    pub fn new(api_key: impl Into<String>, base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("Invalid upstream base URL {}: {}", base_url, e))?;

        let client = Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url,
            timeout,
            health_tracker: HealthTracker::new(),
        })
    }

    /// Single GET for a series, bounded by the configured timeout
    ///
    /// Network errors, timeouts and non-2xx statuses are `UpstreamUnreachable`;
    /// a body that is not JSON is `MalformedResponse`.
    pub async fn get_series(&self, endpoint: SeriesEndpoint) -> Result<serde_json::Value> {
        let request_start = Instant::now();

        debug!(
            function = endpoint.function(),
            interval = endpoint.interval(),
            "Fetching series from Alpha Vantage"
        );

        let request = self
            .client
            .get(self.base_url.clone())
            .query(&[
                ("function", endpoint.function()),
                ("interval", endpoint.interval()),
                ("apikey", self.api_key.as_str()),
            ])
            .send();

        let response = match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                self.health_tracker.record_failure();
                // Strip the URL so the API key never reaches the logs
                return Err(FeedError::UpstreamUnreachable(e.without_url().to_string()));
            }
            Err(_) => {
                self.health_tracker.record_failure();
                return Err(FeedError::UpstreamUnreachable(format!(
                    "Alpha Vantage {} request timed out after {}ms",
                    endpoint.function(),
                    self.timeout.as_millis()
                )));
            }
        };

        let status = response.status();
        if !status.is_success() {
            self.health_tracker.record_failure();
            warn!("Alpha Vantage {} returned {}", endpoint.function(), status);
            return Err(FeedError::UpstreamUnreachable(format!(
                "Alpha Vantage API error: {}",
                status
            )));
        }

        let remaining = self.timeout.saturating_sub(request_start.elapsed());
        let body = match tokio::time::timeout(remaining, response.bytes()).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                self.health_tracker.record_failure();
                return Err(FeedError::UpstreamUnreachable(e.without_url().to_string()));
            }
            Err(_) => {
                self.health_tracker.record_failure();
                return Err(FeedError::UpstreamUnreachable(format!(
                    "Alpha Vantage {} body read timed out",
                    endpoint.function()
                )));
            }
        };

        let latency_ms = request_start.elapsed().as_millis() as u64;
        self.health_tracker.record_success(latency_ms);

        info!(
            function = endpoint.function(),
            latency_ms,
            bytes = body.len(),
            "Alpha Vantage response received"
        );

        serde_json::from_slice(&body).map_err(|e| FeedError::MalformedResponse(e.to_string()))
    }

    /// Get health status using internal metrics (no API call)
    pub fn health(&self) -> SourceHealth {
        self.health_tracker.snapshot(self.name())
    }

    pub fn name(&self) -> &str {
        "alphavantage"
    }
}

#[async_trait::async_trait]
impl UpstreamFeed for AlphaVantageClient {
    async fn fetch_json(&self, endpoint: SeriesEndpoint) -> Result<serde_json::Value> {
        AlphaVantageClient::get_series(self, endpoint).await
    }

    fn health(&self) -> SourceHealth {
        AlphaVantageClient::health(self)
    }

    fn name(&self) -> &str {
        "alphavantage"
    }
}
