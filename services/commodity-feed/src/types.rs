use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One point on the commodities chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String, // "Mar 05"
    pub value: f64,    // rounded to 2 dp
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Raw record as delivered by the provider (newest first)
///
/// Both fields are optional so a single bad record can be skipped
/// without failing the whole payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamRecord {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// Time series payload from the provider
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamSeries {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    /// Kept as raw values so each record is decoded on its own
    pub data: Vec<serde_json::Value>,
}

/// Where the data in an envelope came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    RealApi,
    SecondaryApi,
    Sample,
}

/// Why the sample series was served instead of live data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    UpstreamUnreachable,
    MalformedResponse,
    InsufficientData,
}

/// Uniform response of the commodities endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchEnvelope {
    pub success: bool,
    pub data: Vec<ChartPoint>,
    pub source: DataSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
}

impl FetchEnvelope {
    /// Envelope for a live series
    pub fn live(source: DataSource, data: Vec<ChartPoint>) -> Self {
        let count = data.len();
        Self {
            success: true,
            data,
            source,
            message: None,
            timestamp: Utc::now(),
            count: Some(count),
            fallback_reason: None,
        }
    }

    /// Envelope carrying the fixed sample series
    pub fn sample(reason: FallbackReason, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: crate::sample::sample_series(),
            source: DataSource::Sample,
            message: Some(message.into()),
            timestamp: Utc::now(),
            count: None,
            fallback_reason: Some(reason),
        }
    }
}

/// Upstream source health/status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceHealth {
    pub source: String,
    pub is_healthy: bool,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub success_rate: f64,
    pub avg_latency_ms: u64,
}

/// Error types for the commodity feed
#[derive(Debug, Clone, thiserror::Error)]
pub enum FeedError {
    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("Insufficient data: parsed {found} points, need {required}")]
    InsufficientData { found: usize, required: usize },
}

impl FeedError {
    pub fn fallback_reason(&self) -> FallbackReason {
        match self {
            FeedError::UpstreamUnreachable(_) => FallbackReason::UpstreamUnreachable,
            FeedError::MalformedResponse(_) => FallbackReason::MalformedResponse,
            FeedError::InsufficientData { .. } => FallbackReason::InsufficientData,
        }
    }
}

/// Result type for feed operations
pub type Result<T> = std::result::Result<T, FeedError>;

/// Which provider series to request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesEndpoint {
    /// WTI crude oil, daily
    WtiDaily,
    /// Global commodities index, monthly
    AllCommoditiesMonthly,
}

impl SeriesEndpoint {
    pub fn function(&self) -> &'static str {
        match self {
            SeriesEndpoint::WtiDaily => "WTI",
            SeriesEndpoint::AllCommoditiesMonthly => "ALL_COMMODITIES",
        }
    }

    pub fn interval(&self) -> &'static str {
        match self {
            SeriesEndpoint::WtiDaily => "daily",
            SeriesEndpoint::AllCommoditiesMonthly => "monthly",
        }
    }
}

/// Trait for commodity series providers
#[async_trait::async_trait]
pub trait UpstreamFeed: Send + Sync {
    /// Fetch one series as raw JSON
    async fn fetch_json(&self, endpoint: SeriesEndpoint) -> Result<serde_json::Value>;

    /// Source health status
    fn health(&self) -> SourceHealth;

    /// Source name
    fn name(&self) -> &str;
}
