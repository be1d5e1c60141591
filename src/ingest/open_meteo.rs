/// Open-Meteo forecast API client (continuous precipitation telemetry).
///
/// Requests hourly precipitation (with at least a trailing day of history)
/// and daily precipitation aggregates in the coordinate's local civil time,
/// then reduces them to the real-time sample window and one projection per
/// daily horizon.
///
/// API Documentation: https://open-meteo.com/en/docs
///
/// Unlike the official feed, failures here are returned to the caller:
/// without rainfall there is nothing to reconcile or score.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{EngineConfig, HorizonConfig, HorizonKind, TelemetryConfig};
use crate::ingest::{build_client, get_text, TelemetrySource};
use crate::model::{Coordinate, DailyProjection, FeedError, RainSample, TelemetryReport};

const HOURLY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

// ---------------------------------------------------------------------------
// Serde structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub utc_offset_seconds: i32,
    #[serde(default)]
    pub timezone: String,
    pub hourly: HourlyBlock,
    #[serde(default)]
    pub daily: Option<DailyBlock>,
}

#[derive(Debug, Deserialize)]
pub struct HourlyBlock {
    pub time: Vec<String>,
    pub precipitation: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct DailyBlock {
    pub time: Vec<String>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability_max: Vec<Option<f64>>,
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Builds the forecast URL for a coordinate.
///
/// `forecast_days` should cover the furthest daily horizon; see
/// `EngineConfig::forecast_days`.
pub fn build_forecast_url(config: &TelemetryConfig, coordinate: &Coordinate, forecast_days: u32) -> String {
    format!(
        "{}?latitude={}&longitude={}&hourly=precipitation&daily=precipitation_sum,precipitation_probability_max&timezone={}&past_days={}&forecast_days={}",
        config.base_url,
        coordinate.latitude,
        coordinate.longitude,
        urlencoding::encode(&config.timezone),
        config.past_days,
        forecast_days
    )
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parses a forecast response body.
///
/// # Errors
/// `FeedError::Malformed` if the JSON does not deserialize, the hourly
/// arrays differ in length, or the hourly series is empty.
pub fn parse_forecast_response(json: &str) -> Result<ForecastResponse, FeedError> {
    let response: ForecastResponse = serde_json::from_str(json)
        .map_err(|e| FeedError::Malformed(format!("JSON deserialization failed: {}", e)))?;

    if response.hourly.time.len() != response.hourly.precipitation.len() {
        return Err(FeedError::Malformed(format!(
            "hourly arrays differ in length ({} times, {} values)",
            response.hourly.time.len(),
            response.hourly.precipitation.len()
        )));
    }
    if response.hourly.time.is_empty() {
        return Err(FeedError::Malformed("empty hourly series".to_string()));
    }

    Ok(response)
}

/// Index of the hour whose local timestamp starts with `hour_prefix`
/// ("YYYY-MM-DDTHH"), or the last index when no entry matches.
///
/// Returns `(index, exact)`; `None` only for an empty series.
pub fn locate_current_hour(times: &[String], hour_prefix: &str) -> Option<(usize, bool)> {
    match times.iter().position(|t| t.starts_with(hour_prefix)) {
        Some(i) => Some((i, true)),
        None => times.len().checked_sub(1).map(|i| (i, false)),
    }
}

/// "HH:MM" part of a local hourly timestamp.
fn clock_time(timestamp: &str) -> String {
    NaiveDateTime::parse_from_str(timestamp, HOURLY_TIME_FORMAT)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|_| timestamp.get(11..16).unwrap_or(timestamp).to_string())
}

/// Samples for the `window` hours ending at `end_index`, oldest first.
///
/// Hours before the start of the series are omitted, so the result holds
/// between 1 and `window` samples. Null or negative values read as 0 mm.
pub fn extract_window(hourly: &HourlyBlock, end_index: usize, window: usize) -> Vec<RainSample> {
    let start = (end_index + 1).saturating_sub(window);
    (start..=end_index)
        .filter_map(|i| {
            let time = hourly.time.get(i)?;
            let rainfall = hourly.precipitation.get(i).copied().flatten().unwrap_or(0.0).max(0.0);
            Some(RainSample {
                timestamp_local: clock_time(time),
                rainfall_mm: rainfall,
                water_level_cm: 0.0,
            })
        })
        .collect()
}

/// One projection per daily horizon, summing precipitation over the
/// horizon's span and taking the highest probability.
///
/// Days missing from the feed contribute nothing.
pub fn project_horizons(
    daily: Option<&DailyBlock>,
    today: NaiveDate,
    past_days: u32,
    horizons: &[HorizonConfig],
) -> Vec<DailyProjection> {
    let today_key = today.format("%Y-%m-%d").to_string();

    horizons
        .iter()
        .filter(|h| h.kind == HorizonKind::Daily)
        .map(|h| {
            let (sum, probability) = match daily {
                Some(block) => {
                    let today_index = block
                        .time
                        .iter()
                        .position(|d| *d == today_key)
                        .unwrap_or(past_days as usize);
                    let start = today_index + h.offset_days as usize;
                    let end = start + h.span_days as usize;

                    let sum: f64 = (start..end)
                        .filter_map(|i| block.precipitation_sum.get(i).copied().flatten())
                        .fold(0.0, |acc, v| acc + v.max(0.0));
                    let probability = (start..end)
                        .filter_map(|i| block.precipitation_probability_max.get(i).copied().flatten())
                        .fold(0.0_f64, f64::max);
                    (sum, probability)
                }
                None => (0.0, 0.0),
            };

            DailyProjection {
                horizon_label: h.label.clone(),
                rainfall_sum_mm: sum,
                rain_probability_pct: probability.round().clamp(0.0, 100.0) as u8,
            }
        })
        .collect()
}

/// Reduces a parsed response to the report for `now`.
pub fn build_report(
    response: &ForecastResponse,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Result<TelemetryReport, FeedError> {
    let offset = FixedOffset::east_opt(response.utc_offset_seconds).ok_or_else(|| {
        FeedError::Malformed(format!("invalid utc_offset_seconds {}", response.utc_offset_seconds))
    })?;
    let local_now = now.with_timezone(&offset);
    let hour_prefix = local_now.format("%Y-%m-%dT%H").to_string();

    let (index, exact) = locate_current_hour(&response.hourly.time, &hour_prefix)
        .ok_or_else(|| FeedError::Malformed("empty hourly series".to_string()))?;

    if !exact {
        warn!(hour = %hour_prefix, "Current hour not in telemetry series, using last available hour");
    }

    let series = extract_window(&response.hourly, index, config.telemetry.window_hours);
    let projections = project_horizons(
        response.daily.as_ref(),
        local_now.date_naive(),
        config.telemetry.past_days,
        &config.horizons,
    );

    Ok(TelemetryReport {
        series,
        projections,
        timezone: response.timezone.clone(),
        degraded_alignment: !exact,
    })
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP-backed telemetry source with the long telemetry timeout.
pub struct OpenMeteoTelemetry {
    client: reqwest::blocking::Client,
    config: EngineConfig,
}

impl OpenMeteoTelemetry {
    pub fn new(config: &EngineConfig) -> Result<Self, FeedError> {
        Ok(Self {
            client: build_client(config.timeouts.telemetry())?,
            config: config.clone(),
        })
    }
}

impl TelemetrySource for OpenMeteoTelemetry {
    fn fetch_telemetry(
        &self,
        coordinate: &Coordinate,
        now: DateTime<Utc>,
    ) -> Result<TelemetryReport, FeedError> {
        let url = build_forecast_url(&self.config.telemetry, coordinate, self.config.forecast_days());
        debug!(%url, "Fetching telemetry");

        let body = get_text(&self.client, &url)?;
        let response = parse_forecast_response(&body)?;
        build_report(&response, now, &self.config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
