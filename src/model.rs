/// Core data types for the flood risk inference engine.
///
/// This module defines the shared domain model imported by all other modules:
/// the resolved location, both weather signals, the derived sensor window,
/// risk assessments and the assembled analysis result. It contains no I/O.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A place resolved by the geocoder. Produced once per request and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    pub resolved_name: String,
    /// Administrative region (province/state) used to pick the regional feed.
    pub region_name: String,
}

impl Coordinate {
    /// "Name, Region" label used in the analysis result.
    pub fn label(&self) -> String {
        if self.region_name.is_empty() {
            self.resolved_name.clone()
        } else {
            format!("{}, {}", self.resolved_name, self.region_name)
        }
    }
}

// ---------------------------------------------------------------------------
// Official categorical status
// ---------------------------------------------------------------------------

/// Whether the official regional feed contributed a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusSource {
    Official,
    Unavailable,
}

/// Categorical weather status for the matched sub-area of a regional feed.
///
/// `Unavailable` is an expected outcome (feed outage, malformed payload,
/// area without a weather parameter); the pipeline proceeds without it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficialStatus {
    pub categorical_code: i32,
    pub label: String,
    pub matched_area_name: String,
    pub source: StatusSource,
}

impl OfficialStatus {
    pub fn unavailable() -> Self {
        Self {
            categorical_code: 0,
            label: "unavailable".to_string(),
            matched_area_name: String::new(),
            source: StatusSource::Unavailable,
        }
    }

    pub fn is_available(&self) -> bool {
        self.source == StatusSource::Official
    }

    /// The categorical code, only when the feed actually supplied one.
    pub fn code(&self) -> Option<i32> {
        self.is_available().then_some(self.categorical_code)
    }
}

// ---------------------------------------------------------------------------
// Telemetry
// ---------------------------------------------------------------------------

/// One hour of the real-time window.
///
/// Field names follow the chart payload the presentation layer expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainSample {
    /// Local civil time, "HH:MM".
    #[serde(rename = "timestamp")]
    pub timestamp_local: String,
    pub rainfall_mm: f64,
    /// Synthetic proxy, filled in by `analysis::water_level`.
    pub water_level_cm: f64,
}

/// Oldest-first window of up to six hourly samples ending at "now".
pub type TelemetrySeries = Vec<RainSample>;

/// Daily aggregate for one forecast horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyProjection {
    pub horizon_label: String,
    pub rainfall_sum_mm: f64,
    pub rain_probability_pct: u8,
}

/// Everything the telemetry adapter returns for one coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryReport {
    pub series: TelemetrySeries,
    pub projections: Vec<DailyProjection>,
    /// IANA timezone name reported by the feed, e.g. "Asia/Jakarta".
    pub timezone: String,
    /// True when the current hour was not found and the last index was used.
    pub degraded_alignment: bool,
}

// ---------------------------------------------------------------------------
// Risk
// ---------------------------------------------------------------------------

/// Three-level classification, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Safe,
    Watch,
    Danger,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Safe => write!(f, "SAFE"),
            RiskLevel::Watch => write!(f, "WATCH"),
            RiskLevel::Danger => write!(f, "DANGER"),
        }
    }
}

/// Bounded score and its level.
///
/// Only `analysis::scoring` can build one, so score and level are always
/// derived together by the same rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    #[serde(rename = "probability")]
    score: u32,
    #[serde(rename = "riskLevel")]
    level: RiskLevel,
}

impl RiskAssessment {
    pub(crate) fn new(score: u32, level: RiskLevel) -> Self {
        Self { score, level }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> RiskLevel {
        self.level
    }
}

/// Risk for one named forecast window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizonForecast {
    #[serde(rename = "period")]
    pub horizon_label: String,
    #[serde(flatten)]
    pub assessment: RiskAssessment,
    /// Rainfall scalar the score was computed from.
    pub rainfall_mm: f64,
    pub rain_probability_pct: Option<u8>,
    pub projected_water_level_cm: f64,
    pub reasoning: String,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Factors {
    pub rainfall: String,
    pub drainage: String,
    pub history: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceLink {
    pub title: String,
    pub uri: String,
}

/// A data source that contributed to the analysis, as `{ "web": { title, uri } }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRef {
    pub web: SourceLink,
}

impl SourceRef {
    pub fn web(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            web: SourceLink {
                title: title.into(),
                uri: uri.into(),
            },
        }
    }
}

/// Top-level output handed to the presentation layer.
///
/// `risk_level`, `probability` and `sensor_data` are always engine values;
/// only `description` and `recommendation` may come from a narrator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub location: String,
    pub risk_level: RiskLevel,
    pub probability: u32,
    pub description: String,
    pub factors: Factors,
    pub recommendation: String,
    pub sensor_data: TelemetrySeries,
    pub water_level_basis: String,
    pub forecasts: Vec<HorizonForecast>,
    pub official_status: OfficialStatus,
    pub correction_applied: bool,
    /// IANA timezone of `sensor_data` timestamps.
    pub timezone: String,
    /// The current hour was missing from the feed; the window ends at the
    /// last available hour instead.
    pub degraded_alignment: bool,
    pub sources: Vec<SourceRef>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failure of a single upstream feed request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeedError {
    /// Transport failure or timeout.
    #[error("HTTP error: {0}")]
    Http(String),
    /// Non-2xx response.
    #[error("HTTP status {0}")]
    Status(u16),
    /// The body could not be parsed into the expected structure.
    #[error("Malformed payload: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => FeedError::Status(status.as_u16()),
            None => FeedError::Http(e.to_string()),
        }
    }
}

/// Fatal failures of a whole analysis request.
///
/// Official-feed failures never appear here; they are absorbed into
/// `OfficialStatus::unavailable()`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("Location not found: {0}")]
    LocationNotFound(String),
    #[error("Geocoding failed: {0}")]
    GeocodingFailed(FeedError),
    #[error("Telemetry fetch failed: {0}")]
    TelemetryFetchFailed(FeedError),
}

impl AnalysisError {
    /// Message suitable for showing to the person who typed the place name.
    pub fn user_message(&self) -> &'static str {
        match self {
            AnalysisError::LocationNotFound(_) => "location not recognized",
            AnalysisError::GeocodingFailed(_) | AnalysisError::TelemetryFetchFailed(_) => {
                "weather data is temporarily unavailable, try again"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_status_has_no_code() {
        let status = OfficialStatus::unavailable();
        assert!(!status.is_available());
        assert_eq!(status.code(), None);
    }

    #[test]
    fn test_coordinate_label() {
        let coord = Coordinate {
            latitude: -6.2,
            longitude: 106.8,
            resolved_name: "Jakarta".to_string(),
            region_name: "DKI Jakarta".to_string(),
        };
        assert_eq!(coord.label(), "Jakarta, DKI Jakarta");

        let bare = Coordinate { region_name: String::new(), ..coord };
        assert_eq!(bare.label(), "Jakarta");
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Safe < RiskLevel::Watch);
        assert!(RiskLevel::Watch < RiskLevel::Danger);
    }

    #[test]
    fn test_horizon_forecast_serializes_flat() {
        let forecast = HorizonForecast {
            horizon_label: "Tomorrow".to_string(),
            assessment: RiskAssessment::new(44, RiskLevel::Watch),
            rainfall_mm: 22.0,
            rain_probability_pct: Some(80),
            projected_water_level_cm: 314.0,
            reasoning: "Projected rainfall 22.0 mm".to_string(),
        };

        let json = serde_json::to_value(&forecast).unwrap();
        assert_eq!(json["period"], "Tomorrow");
        assert_eq!(json["probability"], 44);
        assert_eq!(json["riskLevel"], "WATCH");
        assert_eq!(json["rainProbabilityPct"], 80);
    }

    #[test]
    fn test_user_messages() {
        let not_found = AnalysisError::LocationNotFound("Atlantis".to_string());
        assert_eq!(not_found.user_message(), "location not recognized");

        let telemetry = AnalysisError::TelemetryFetchFailed(FeedError::Status(503));
        assert!(telemetry.user_message().contains("try again"));
    }
}
