// Normalization of provider payloads into chart points
use crate::types::*;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use std::str::FromStr;
use tracing::debug;

/// Keys the provider uses for rate-limit and bad-key replies (sent with HTTP 200)
const NOTICE_KEYS: [&str; 3] = ["Information", "Note", "Error Message"];

/// Extract the series from a provider payload
pub fn parse_series(payload: &serde_json::Value) -> Result<UpstreamSeries> {
    if payload.get("data").map_or(false, |d| d.is_array()) {
        return UpstreamSeries::deserialize(payload)
            .map_err(|e| FeedError::MalformedResponse(e.to_string()));
    }

    let notice = NOTICE_KEYS
        .iter()
        .find_map(|key| payload.get(*key).and_then(|v| v.as_str()));

    match notice {
        Some(text) => Err(FeedError::MalformedResponse(format!(
            "provider notice: {}",
            text
        ))),
        None => Err(FeedError::MalformedResponse(
            "missing `data` series field".to_string(),
        )),
    }
}

/// Reshape the first `limit` records into chronological chart points
///
/// Records with an unparseable date or value are skipped; the rest of
/// the batch is kept.
pub fn normalize_series(series: &UpstreamSeries, limit: usize) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = series
        .data
        .iter()
        .take(limit)
        .filter_map(parse_record)
        .collect();

    // Provider order is newest first
    points.reverse();
    points
}

/// Convert a single raw record, or `None` if it should be skipped
pub fn parse_record(raw: &serde_json::Value) -> Option<ChartPoint> {
    let record = match UpstreamRecord::deserialize(raw) {
        Ok(r) => r,
        Err(e) => {
            debug!("Skipping record with unexpected shape: {}", e);
            return None;
        }
    };

    let date = record.date.as_deref().unwrap_or_default();
    let Some(label) = format_label(date) else {
        debug!(date, "Skipping record with unparseable date");
        return None;
    };

    let value = record.value.as_deref().unwrap_or_default();
    let Some(value) = parse_value(value).and_then(round_value) else {
        debug!(date, value, "Skipping record with unparseable value");
        return None;
    };

    Some(ChartPoint { label, value })
}

/// "2024-03-05" -> "Mar 05"
pub fn format_label(date: &str) -> Option<String> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%b %d").to_string())
}

/// "71,234.5" -> 71234.5
pub fn parse_value(raw: &str) -> Option<Decimal> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// Round to 2 dp for display
pub fn round_value(value: Decimal) -> Option<f64> {
    // Go through the string form so the f64 is the nearest one to the rounded decimal
    value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_string()
        .parse::<f64>()
        .ok()
}
