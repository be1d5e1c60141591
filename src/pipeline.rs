/// End-to-end analysis of one place name.
///
/// ```text
/// place ─► geocode ─┬─► official status (scoped thread, absorbs failures)
///                   └─► telemetry       (current thread, failures fatal)
///                   join ─► reconcile ─► water level ─► score ─► horizons ─► narrate
/// ```
///
/// A `FloodAnalyzer` holds only immutable configuration and adapters, so one
/// instance can serve concurrent requests; all per-request state lives on
/// the calling thread and is dropped when `analyze` returns.

use std::thread;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{info, warn};

use crate::analysis::{horizons, reconcile, scoring, water_level};
use crate::config::EngineConfig;
use crate::ingest::bmkg::{self, BmkgStatusSource};
use crate::ingest::geocode::{Geocoder, OpenMeteoGeocoder};
use crate::ingest::open_meteo::OpenMeteoTelemetry;
use crate::ingest::{StatusSource, TelemetrySource};
use crate::model::{
    AnalysisError, AnalysisResult, Coordinate, FeedError, OfficialStatus, SourceRef, TelemetryReport,
};
use crate::narrative::{self, NarrativeFacts, Narrator};

pub struct FloodAnalyzer {
    config: EngineConfig,
    geocoder: Box<dyn Geocoder>,
    status_source: Box<dyn StatusSource>,
    telemetry: Box<dyn TelemetrySource>,
    narrator: Box<dyn Narrator>,
}

impl FloodAnalyzer {
    pub fn new(
        config: EngineConfig,
        geocoder: Box<dyn Geocoder>,
        status_source: Box<dyn StatusSource>,
        telemetry: Box<dyn TelemetrySource>,
        narrator: Box<dyn Narrator>,
    ) -> Self {
        Self {
            config,
            geocoder,
            status_source,
            telemetry,
            narrator,
        }
    }

    /// Analyzer backed by the live HTTP adapters.
    pub fn from_config(config: EngineConfig) -> Result<Self, FeedError> {
        let geocoder = OpenMeteoGeocoder::new(&config)?;
        let status_source = BmkgStatusSource::new(&config)?;
        let telemetry = OpenMeteoTelemetry::new(&config)?;
        let narrator = narrative::narrator_from_config(&config.narrative);
        Ok(Self::new(
            config,
            Box::new(geocoder),
            Box::new(status_source),
            Box::new(telemetry),
            narrator,
        ))
    }

    /// Analyzes `place` at the current time, with the configured RNG.
    pub fn analyze(&self, place: &str) -> Result<AnalysisResult, AnalysisError> {
        let mut rng = reconcile::correction_rng(&self.config.correction);
        self.analyze_at(place, Utc::now(), &mut rng)
    }

    pub fn analyze_at<R: Rng>(
        &self,
        place: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<AnalysisResult, AnalysisError> {
        let place = place.trim();
        if place.is_empty() {
            return Err(AnalysisError::LocationNotFound(String::new()));
        }

        let coordinate = self
            .geocoder
            .locate(place)
            .map_err(AnalysisError::GeocodingFailed)?
            .ok_or_else(|| AnalysisError::LocationNotFound(place.to_string()))?;

        info!(
            place,
            resolved = %coordinate.resolved_name,
            region = %coordinate.region_name,
            "Location resolved"
        );

        let (status, report) = self.fetch_signals(&coordinate, now);
        let report = report.map_err(|e| {
            warn!(place, error = %e, "Telemetry unavailable, aborting analysis");
            AnalysisError::TelemetryFetchFailed(e)
        })?;

        let result = assemble(&coordinate, status, report, &self.config, self.narrator.as_ref(), rng);

        info!(
            location = %result.location,
            score = result.probability,
            level = %result.risk_level,
            corrected = result.correction_applied,
            degraded = result.degraded_alignment,
            "Analysis complete"
        );

        Ok(result)
    }

    /// Runs both feed fetches concurrently and joins them.
    fn fetch_signals(
        &self,
        coordinate: &Coordinate,
        now: DateTime<Utc>,
    ) -> (OfficialStatus, Result<TelemetryReport, FeedError>) {
        let status_source = self.status_source.as_ref();
        let telemetry = self.telemetry.as_ref();

        thread::scope(|scope| {
            let official = scope.spawn(|| {
                status_source.fetch_status(&coordinate.region_name, &coordinate.resolved_name)
            });

            let report = telemetry.fetch_telemetry(coordinate, now);

            let status = official.join().unwrap_or_else(|_| {
                warn!("Official status fetch panicked, continuing without it");
                OfficialStatus::unavailable()
            });

            (status, report)
        })
    }
}

fn sources(coordinate: &Coordinate, status: &OfficialStatus, config: &EngineConfig) -> Vec<SourceRef> {
    let mut sources = Vec::with_capacity(2);
    if status.is_available() {
        sources.push(SourceRef::web(
            format!("BMKG regional forecast ({})", status.matched_area_name),
            bmkg::build_feed_url(&config.official, &coordinate.region_name),
        ));
    }
    sources.push(SourceRef::web(
        "Open-Meteo hourly precipitation",
        config.telemetry.base_url.clone(),
    ));
    sources
}

/// Builds the result from already-fetched signals. No I/O apart from the
/// narrator.
pub fn assemble<R: Rng>(
    coordinate: &Coordinate,
    status: OfficialStatus,
    report: TelemetryReport,
    config: &EngineConfig,
    narrator: &dyn Narrator,
    rng: &mut R,
) -> AnalysisResult {
    let mut series = report.series;

    let outcome = reconcile::reconcile(&mut series, &status, &config.correction, rng);
    if outcome.corrected() {
        info!(
            measured_mm = outcome.measured_total_mm,
            reconciled_mm = outcome.reconciled_total_mm,
            samples = outcome.adjusted_samples,
            "Telemetry corrected to match official rain status"
        );
    }
    water_level::annotate(&mut series, &config.water_level);

    let total_mm = outcome.reconciled_total_mm;
    let now = scoring::assess(total_mm, true, status.code(), &config.scoring);
    let forecasts = horizons::forecast_horizons(
        &config.horizons,
        total_mm,
        series.len(),
        &status,
        &report.projections,
        config,
    );

    let location = coordinate.label();
    let prose = narrator.narrate(&NarrativeFacts {
        location: location.clone(),
        level: now.level(),
        score: now.score(),
        total_rainfall_mm: total_mm,
        official_label: status.is_available().then(|| status.label.clone()),
        correction_applied: outcome.corrected(),
    });

    AnalysisResult {
        sources: sources(coordinate, &status, config),
        location,
        risk_level: now.level(),
        probability: now.score(),
        description: prose.description,
        factors: narrative::factors(total_mm),
        recommendation: prose.recommendation,
        sensor_data: series,
        water_level_basis: water_level::basis_label(&config.water_level),
        forecasts,
        official_status: status,
        correction_applied: outcome.corrected(),
        timezone: report.timezone,
        degraded_alignment: report.degraded_alignment,
    }
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::stubs::*;
    use super::*;
    use crate::model::RiskLevel;
    use crate::narrative::TemplateNarrator;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::{Duration, Instant};

    fn run(analyzer: &FloodAnalyzer, place: &str) -> Result<AnalysisResult, AnalysisError> {
        analyzer.analyze_at(place, Utc::now(), &mut StdRng::seed_from_u64(3))
    }

    #[test]
    fn test_unavailable_status_dry_telemetry_is_safe() {
        let analyzer = analyzer(OfficialStatus::unavailable(), Ok(report(&[0.0; 6])));
        let result = run(&analyzer, "Jakarta Selatan").unwrap();

        assert_eq!(result.risk_level, RiskLevel::Safe);
        assert_eq!(result.probability, 5);
        assert!(!result.correction_applied);
        assert!(result.sensor_data.iter().all(|s| s.rainfall_mm == 0.0 && s.water_level_cm == 50.0));
        assert_eq!(result.sources.len(), 1, "only telemetry contributed");
    }

    #[test]
    fn test_heavy_rain_status_corrects_false_zero() {
        let analyzer = analyzer(official(63, "heavy rain"), Ok(report(&[0.0; 6])));
        let result = run(&analyzer, "Jakarta Selatan").unwrap();

        assert!(result.correction_applied);
        assert!(result.probability >= 40, "got {}", result.probability);
        assert!(result.risk_level >= RiskLevel::Watch);
        assert!(result.sensor_data[..3].iter().all(|s| s.rainfall_mm == 0.0));
        assert!(result.sensor_data[3..].iter().all(|s| s.rainfall_mm >= 1.0));
        for sample in &result.sensor_data {
            assert_eq!(sample.water_level_cm, 50.0 + sample.rainfall_mm * 12.0);
        }
    }

    #[test]
    fn test_heavy_telemetry_clamps_to_ceiling() {
        let analyzer = analyzer(OfficialStatus::unavailable(), Ok(report(&[10.0; 6])));
        let result = run(&analyzer, "Jakarta Selatan").unwrap();

        assert_eq!(result.probability, 99);
        assert_eq!(result.risk_level, RiskLevel::Danger);
        assert!(result.description.starts_with("CRITICAL WARNING"));
    }

    #[test]
    fn test_now_forecast_matches_headline() {
        let analyzer = analyzer(official(61, "moderate rain"), Ok(report(&[0.5, 0.5, 1.0, 1.0, 2.0, 2.0])));
        let result = run(&analyzer, "Jakarta Selatan").unwrap();

        let today = &result.forecasts[0];
        assert_eq!(today.horizon_label, "Today");
        assert_eq!(today.assessment.score(), result.probability);
        assert_eq!(today.assessment.level(), result.risk_level);
        // 7 mm * 2 + 20
        assert_eq!(result.probability, 34);
        assert_eq!(result.forecasts[1].assessment.score(), 24);
    }

    #[test]
    fn test_unknown_place() {
        let analyzer = FloodAnalyzer::new(
            EngineConfig::default(),
            Box::new(StubGeocoder(Ok(None))),
            Box::new(StubStatus(OfficialStatus::unavailable())),
            Box::new(StubTelemetry(Ok(report(&[0.0; 6])))),
            Box::new(TemplateNarrator),
        );
        let err = run(&analyzer, "Atlantis").unwrap_err();
        assert_eq!(err, AnalysisError::LocationNotFound("Atlantis".to_string()));
        assert_eq!(err.user_message(), "location not recognized");
    }

    #[test]
    fn test_blank_place_is_not_found() {
        let analyzer = analyzer(OfficialStatus::unavailable(), Ok(report(&[0.0; 6])));
        assert!(matches!(run(&analyzer, "   "), Err(AnalysisError::LocationNotFound(_))));
    }

    #[test]
    fn test_telemetry_failure_is_fatal() {
        let analyzer = analyzer(official(95, "thunderstorm"), Err(FeedError::Status(503)));
        let err = run(&analyzer, "Jakarta Selatan").unwrap_err();
        assert_eq!(err, AnalysisError::TelemetryFetchFailed(FeedError::Status(503)));
        assert!(err.user_message().contains("try again"));
    }

    #[test]
    fn test_feeds_are_fetched_concurrently() {
        let delay = Duration::from_millis(300);
        let analyzer = FloodAnalyzer::new(
            EngineConfig::default(),
            Box::new(StubGeocoder(Ok(Some(jakarta())))),
            Box::new(Slow(delay, StubStatus(official(61, "moderate rain")))),
            Box::new(Slow(delay, StubTelemetry(Ok(report(&[1.0; 6]))))),
            Box::new(TemplateNarrator),
        );

        let started = Instant::now();
        let result = run(&analyzer, "Jakarta Selatan").unwrap();
        let elapsed = started.elapsed();

        assert_eq!(result.official_status.categorical_code, 61);
        assert!(elapsed >= delay);
        assert!(elapsed < Duration::from_millis(550), "took {:?}", elapsed);
    }

    #[test]
    fn test_report_metadata_reaches_result() {
        let mut degraded = report(&[0.0; 6]);
        degraded.degraded_alignment = true;
        let analyzer = analyzer(OfficialStatus::unavailable(), Ok(degraded));
        let result = run(&analyzer, "Jakarta Selatan").unwrap();

        assert_eq!(result.timezone, "Asia/Jakarta");
        assert!(result.degraded_alignment);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["timezone"], "Asia/Jakarta");
        assert_eq!(json["degradedAlignment"], true);
    }

    #[test]
    fn test_result_serializes_for_presentation() {
        let analyzer = analyzer(official(60, "light rain"), Ok(report(&[0.2, 0.4, 0.0, 0.0, 0.0, 1.0])));
        let result = run(&analyzer, "Jakarta Selatan").unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["location"], "Jakarta Selatan, DKI Jakarta");
        assert!(json["riskLevel"].is_string());
        assert_eq!(json["sensorData"].as_array().unwrap().len(), 6);
        assert!(json["sensorData"][0]["timestamp"].is_string());
        assert_eq!(json["forecasts"][1]["period"], "Tomorrow");
        assert!(json["waterLevelBasis"].as_str().unwrap().contains("Synthetic proxy"));
        assert_eq!(json["officialStatus"]["source"], "OFFICIAL");
        assert_eq!(json["sources"].as_array().unwrap().len(), 2);
        assert!(json["sources"][0]["web"]["uri"].as_str().unwrap().contains("DKIJakarta"));
        assert!(json["sources"][0]["web"]["title"].as_str().unwrap().contains("Jakarta Selatan"));
        assert_eq!(json["sources"][1]["web"]["uri"], "https://api.open-meteo.com/v1/forecast");
    }
}
