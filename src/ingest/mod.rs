/// Upstream data adapters.
///
/// - `geocode`    — place name → coordinate + region (Open-Meteo geocoding)
/// - `bmkg`       — official categorical status from the regional XML feeds
/// - `open_meteo` — hourly precipitation window + daily projections
/// - `fixtures`   — (test only) representative payloads
///
/// Each adapter keeps URL construction and payload parsing as pure
/// functions so they can be tested against fixtures without a network.

pub mod bmkg;
pub mod geocode;
pub mod open_meteo;

#[cfg(test)]
pub(crate) mod fixtures;

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::model::{Coordinate, FeedError, OfficialStatus, TelemetryReport};

const USER_AGENT: &str = concat!("florisk_service/", env!("CARGO_PKG_VERSION"));

/// Source of the official categorical status.
///
/// Infallible by contract: every failure is reported as
/// `OfficialStatus::unavailable()`.
pub trait StatusSource: Send + Sync {
    fn fetch_status(&self, region_name: &str, place_name: &str) -> OfficialStatus;
}

/// Source of continuous precipitation telemetry. Failures are fatal to
/// the analysis, so they are returned rather than absorbed.
pub trait TelemetrySource: Send + Sync {
    fn fetch_telemetry(
        &self,
        coordinate: &Coordinate,
        now: DateTime<Utc>,
    ) -> Result<TelemetryReport, FeedError>;
}

/// Blocking client with a per-adapter timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::blocking::Client, FeedError> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(FeedError::from)
}

/// GETs `url` and returns the body of a 2xx response.
pub(crate) fn get_text(client: &reqwest::blocking::Client, url: &str) -> Result<String, FeedError> {
    let response = client.get(url).send()?;

    if !response.status().is_success() {
        return Err(FeedError::Status(response.status().as_u16()));
    }

    Ok(response.text()?)
}
