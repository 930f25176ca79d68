//! Tiered commodity feed: primary series, secondary series, fixed sample
//!
//! Every call ends in a chartable envelope. Upstream and parsing failures
//! are absorbed here and only show up through `source`, `message` and
//! `fallback_reason`.

use crate::normalizers::{normalize_series, parse_series};
use crate::types::*;
use std::sync::Arc;
use tracing::{info, warn};

/// Default number of raw records taken from the provider
pub const DEFAULT_RECORD_LIMIT: usize = 21;
/// Fewer live points than this and the sample series is served
pub const DEFAULT_MIN_POINTS: usize = 10;

/// Tunables for the normalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSettings {
    pub record_limit: usize,
    pub min_points: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            record_limit: DEFAULT_RECORD_LIMIT,
            min_points: DEFAULT_MIN_POINTS,
        }
    }
}

/// Commodity feed normalizer with graceful degradation
pub struct CommodityFeed {
    upstream: Arc<dyn UpstreamFeed>,
    settings: FeedSettings,
}

impl CommodityFeed {
    pub fn new(upstream: Arc<dyn UpstreamFeed>, settings: FeedSettings) -> Self {
        Self { upstream, settings }
    }

    pub fn settings(&self) -> FeedSettings {
        self.settings
    }

    pub fn upstream(&self) -> &Arc<dyn UpstreamFeed> {
        &self.upstream
    }

    /// Run the tiers in order and return the first sufficient result
    pub async fn fetch(&self) -> FetchEnvelope {
        info!(source = self.upstream.name(), "Fetching commodity series");

        // Tier 1: primary series
        let primary_err = match self.load_points(SeriesEndpoint::WtiDaily).await {
            Ok(points) => {
                info!("Returning {} real-time data points", points.len());
                return FetchEnvelope::live(DataSource::RealApi, points);
            }
            Err(e @ FeedError::UpstreamUnreachable(_)) => {
                warn!("Primary series unreachable, using sample data: {}", e);
                return fallback(e);
            }
            Err(e) => e,
        };

        warn!("Primary series insufficient ({}), trying secondary", primary_err);

        // Tier 2: secondary series
        match self.load_points(SeriesEndpoint::AllCommoditiesMonthly).await {
            Ok(points) => {
                info!("Returning {} points from secondary series", points.len());
                FetchEnvelope::live(DataSource::SecondaryApi, points)
            }
            // Tier 3: fixed sample
            Err(e) => {
                warn!("Secondary series failed, using sample data: {}", e);
                fallback(e)
            }
        }
    }

    /// Fetch, parse and reshape one series; sparse results are an error
    pub async fn load_points(&self, endpoint: SeriesEndpoint) -> Result<Vec<ChartPoint>> {
        let payload = self.upstream.fetch_json(endpoint).await?;
        let series = parse_series(&payload)?;

        info!(
            function = endpoint.function(),
            name = series.name.as_deref().unwrap_or("unknown"),
            interval = series.interval.as_deref().unwrap_or("unknown"),
            unit = series.unit.as_deref().unwrap_or("unknown"),
            records = series.data.len(),
            "Series received"
        );

        let points = normalize_series(&series, self.settings.record_limit);
        if points.len() < self.settings.min_points {
            return Err(FeedError::InsufficientData {
                found: points.len(),
                required: self.settings.min_points,
            });
        }

        Ok(points)
    }

    /// Secondary series passed through untouched (debug endpoint)
    pub async fn raw_secondary(&self) -> Result<serde_json::Value> {
        self.upstream
            .fetch_json(SeriesEndpoint::AllCommoditiesMonthly)
            .await
    }
}

fn fallback(err: FeedError) -> FetchEnvelope {
    FetchEnvelope::sample(err.fallback_reason(), format!("Using sample data: {}", err))
}
