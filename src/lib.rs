/// florisk_service: hybrid flood risk inference for a free-text place name.
///
/// # Module structure
///
/// ```text
/// florisk_service
/// ├── model         — shared data types (Coordinate, OfficialStatus, RainSample, AnalysisResult, errors)
/// ├── config        — engine configuration loader (florisk.toml)
/// ├── weather_codes — official categorical code table and severity tiers
/// ├── regions       — region → regional feed identifier registry
/// ├── ingest
/// │   ├── geocode    — place name → coordinate + region
/// │   ├── bmkg       — official regional XML feed: URL, parsing, area selection
/// │   ├── open_meteo — hourly precipitation window + daily projections
/// │   └── fixtures (test only) — representative API response payloads
/// ├── analysis
/// │   ├── reconcile   — official status vs. telemetry correction
/// │   ├── water_level — synthetic water level proxy
/// │   ├── scoring     — bounded risk score + level
/// │   └── horizons    — per-horizon forecasts
/// ├── narrative     — description/recommendation prose (template or Gemini)
/// ├── pipeline      — FloodAnalyzer: geocode → fetch → reconcile → score → assemble
/// ├── endpoint      — HTTP API for the presentation layer
/// └── logging       — tracing subscriber setup
/// ```

/// Public modules
pub mod analysis;
pub mod config;
pub mod endpoint;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod narrative;
pub mod pipeline;
pub mod regions;
pub mod weather_codes;
