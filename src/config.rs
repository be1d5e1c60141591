/// Engine configuration loader - parses florisk.toml
///
/// Every tunable the engine uses (timeouts, correction bounds, scoring
/// thresholds, proxy constants, feed URLs, forecast horizons) lives here and
/// is injected by reference into each component. Nothing re-derives these
/// values at a call site, and nothing mutates them after startup.

use serde::Deserialize;
use std::env;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::regions::{self, RegionFeed};

/// Configuration file read from the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "florisk.toml";

/// Environment variable that overrides `DEFAULT_CONFIG_PATH`.
pub const CONFIG_PATH_ENV: &str = "FLORISK_CONFIG";

/// Longest forecast the daily aggregate feed serves.
pub const MAX_FORECAST_DAYS: u32 = 16;

/// Accepted water level multipliers, in cm per mm of rain.
pub const CM_PER_MM_RANGE: RangeInclusive<f64> = 10.0..=15.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("Failed to parse {path}: {source}")]
    Parse { path: String, source: toml::de::Error },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Per-collaborator request timeouts, in seconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Short: expiry degrades the official status to unavailable.
    pub official_secs: u64,
    /// Long: expiry fails the whole request.
    pub telemetry_secs: u64,
    pub geocoder_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            official_secs: 4,
            telemetry_secs: 15,
            geocoder_secs: 10,
        }
    }
}

impl TimeoutConfig {
    pub fn official(&self) -> Duration {
        Duration::from_secs(self.official_secs)
    }

    pub fn telemetry(&self) -> Duration {
        Duration::from_secs(self.telemetry_secs)
    }

    pub fn geocoder(&self) -> Duration {
        Duration::from_secs(self.geocoder_secs)
    }
}

/// Bounds for rain injected when telemetry reports a false zero.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    /// Window totals below this are treated as "telemetry saw nothing".
    pub trigger_total_mm: f64,
    pub min_mm: f64,
    pub max_mm: f64,
    /// Fixed RNG seed; `None` seeds from entropy per request.
    pub seed: Option<u64>,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            trigger_total_mm: 0.5,
            min_mm: 1.0,
            max_mm: 4.0,
            seed: None,
        }
    }
}

/// Score formula and level thresholds, shared by every horizon.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Points per millimetre of rain.
    pub rain_weight: f64,
    pub floor: u32,
    pub ceiling: u32,
    /// Lowest WATCH score (inclusive).
    pub watch: u32,
    /// Lowest DANGER score (inclusive).
    pub danger: u32,
    pub bonus_light: u32,
    pub bonus_moderate: u32,
    pub bonus_heavy: u32,
    pub bonus_extreme: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            rain_weight: 2.0,
            floor: 5,
            ceiling: 99,
            watch: 40,
            danger: 70,
            bonus_light: 10,
            bonus_moderate: 20,
            bonus_heavy: 35,
            bonus_extreme: 50,
        }
    }
}

/// Synthetic water level: `base_cm + rainfall_mm * cm_per_mm`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaterLevelConfig {
    pub base_cm: f64,
    pub cm_per_mm: f64,
}

impl Default for WaterLevelConfig {
    fn default() -> Self {
        Self {
            base_cm: 50.0,
            cm_per_mm: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub base_url: String,
    /// IANA name or "auto" to use the coordinate's own timezone.
    pub timezone: String,
    /// Days of hourly history requested; 1 guarantees a trailing 24 hours.
    pub past_days: u32,
    /// Samples in the real-time window.
    pub window_hours: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            timezone: "auto".to_string(),
            past_days: 1,
            window_hours: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OfficialConfig {
    pub base_url: String,
    pub national_feed_id: String,
    pub regions: Vec<RegionFeed>,
}

impl Default for OfficialConfig {
    fn default() -> Self {
        Self {
            base_url: "https://data.bmkg.go.id/DataMKG/MEWS/DigitalForecast".to_string(),
            national_feed_id: regions::NATIONAL_FEED_ID.to_string(),
            regions: regions::default_region_feeds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub language: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            language: "id".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeProvider {
    Template,
    Gemini,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    pub provider: NarrativeProvider,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            provider: NarrativeProvider::Template,
            model: "gemini-1.5-flash".to_string(),
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizonKind {
    /// Measured window plus the official status.
    Now,
    /// Daily aggregate projection.
    Daily,
}

/// One named forecast window.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HorizonConfig {
    pub label: String,
    pub kind: HorizonKind,
    /// Days after today the window starts (daily horizons only).
    #[serde(default)]
    pub offset_days: u32,
    /// Days summed into the projection (daily horizons only).
    #[serde(default = "default_span_days")]
    pub span_days: u32,
}

fn default_span_days() -> u32 {
    1
}

impl HorizonConfig {
    pub fn now(label: &str) -> Self {
        Self {
            label: label.to_string(),
            kind: HorizonKind::Now,
            offset_days: 0,
            span_days: 1,
        }
    }

    pub fn daily(label: &str, offset_days: u32, span_days: u32) -> Self {
        Self {
            label: label.to_string(),
            kind: HorizonKind::Daily,
            offset_days,
            span_days,
        }
    }

    /// Last forecast day (exclusive) this horizon needs from the feed.
    pub fn days_needed(&self) -> u32 {
        match self.kind {
            HorizonKind::Now => 1,
            HorizonKind::Daily => self.offset_days + self.span_days,
        }
    }
}

fn default_horizons() -> Vec<HorizonConfig> {
    vec![
        HorizonConfig::now("Today"),
        HorizonConfig::daily("Tomorrow", 1, 1),
        HorizonConfig::daily("Day after", 2, 1),
    ]
}

// ---------------------------------------------------------------------------
// Root
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub timeouts: TimeoutConfig,
    pub correction: CorrectionConfig,
    pub scoring: ScoringConfig,
    pub water_level: WaterLevelConfig,
    pub telemetry: TelemetryConfig,
    pub official: OfficialConfig,
    pub geocoder: GeocoderConfig,
    pub narrative: NarrativeConfig,
    pub horizons: Vec<HorizonConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeouts: TimeoutConfig::default(),
            correction: CorrectionConfig::default(),
            scoring: ScoringConfig::default(),
            water_level: WaterLevelConfig::default(),
            telemetry: TelemetryConfig::default(),
            official: OfficialConfig::default(),
            geocoder: GeocoderConfig::default(),
            narrative: NarrativeConfig::default(),
            horizons: default_horizons(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects combinations the engine cannot apply consistently.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.correction;
        let w = &self.water_level;
        let reals = [
            ("correction.trigger_total_mm", c.trigger_total_mm),
            ("correction.min_mm", c.min_mm),
            ("correction.max_mm", c.max_mm),
            ("scoring.rain_weight", self.scoring.rain_weight),
            ("water_level.base_cm", w.base_cm),
            ("water_level.cm_per_mm", w.cm_per_mm),
        ];
        if let Some((name, value)) = reals.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::Invalid(format!("{} must be a finite number (got {})", name, value)));
        }

        if !(c.min_mm > 0.0 && c.min_mm <= c.max_mm) {
            return Err(ConfigError::Invalid(format!(
                "correction bounds must satisfy 0 < min_mm <= max_mm (got {}..{})",
                c.min_mm, c.max_mm
            )));
        }
        if c.min_mm < c.trigger_total_mm {
            return Err(ConfigError::Invalid(format!(
                "correction.min_mm ({}) must be at least trigger_total_mm ({})",
                c.min_mm, c.trigger_total_mm
            )));
        }

        let s = &self.scoring;
        if s.floor > s.ceiling {
            return Err(ConfigError::Invalid(format!(
                "scoring.floor ({}) exceeds scoring.ceiling ({})",
                s.floor, s.ceiling
            )));
        }
        if !(s.floor < s.watch && s.watch < s.danger && s.danger <= s.ceiling) {
            return Err(ConfigError::Invalid(format!(
                "scoring thresholds must satisfy floor < watch < danger <= ceiling (got {} / {} / {} / {})",
                s.floor, s.watch, s.danger, s.ceiling
            )));
        }
        if s.rain_weight < 0.0 {
            return Err(ConfigError::Invalid("scoring.rain_weight must not be negative".to_string()));
        }

        if w.base_cm < 0.0 {
            return Err(ConfigError::Invalid("water_level.base_cm must not be negative".to_string()));
        }
        if !CM_PER_MM_RANGE.contains(&w.cm_per_mm) {
            return Err(ConfigError::Invalid(format!(
                "water_level.cm_per_mm must be within {}..={} (got {})",
                CM_PER_MM_RANGE.start(),
                CM_PER_MM_RANGE.end(),
                w.cm_per_mm
            )));
        }

        if self.telemetry.window_hours == 0 {
            return Err(ConfigError::Invalid("telemetry.window_hours must be positive".to_string()));
        }

        if self.horizons.is_empty() {
            return Err(ConfigError::Invalid("at least one horizon is required".to_string()));
        }
        for h in &self.horizons {
            if h.kind == HorizonKind::Daily && h.span_days == 0 {
                return Err(ConfigError::Invalid(format!("horizon '{}' has span_days = 0", h.label)));
            }
            if h.days_needed() > MAX_FORECAST_DAYS {
                return Err(ConfigError::Invalid(format!(
                    "horizon '{}' reaches {} days ahead; the daily feed serves at most {}",
                    h.label,
                    h.days_needed(),
                    MAX_FORECAST_DAYS
                )));
            }
        }

        Ok(())
    }

    /// Forecast days to request so every daily horizon is covered.
    pub fn forecast_days(&self) -> u32 {
        self.horizons.iter().map(HorizonConfig::days_needed).max().unwrap_or(1).max(1)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Loads configuration from an explicit path. A missing file is an error.
pub fn load_config_from<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: display.clone(),
        source,
    })?;
    EngineConfig::from_toml_str(&contents, &display)
}

/// Loads configuration from `$FLORISK_CONFIG` (after reading `.env`) or
/// `florisk.toml`.
///
/// When no override is set and the default file is absent, built-in
/// defaults are used.
pub fn load_config() -> Result<EngineConfig, ConfigError> {
    dotenv::dotenv().ok();

    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        return load_config_from(path);
    }

    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        load_config_from(DEFAULT_CONFIG_PATH)
    } else {
        info!(path = DEFAULT_CONFIG_PATH, "No configuration file found, using defaults");
        Ok(EngineConfig::default())
    }
}
