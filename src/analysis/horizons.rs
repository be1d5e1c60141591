/// Horizon forecast generation.
///
/// Applies the scoring engine once per configured horizon, in configured
/// order. The "now" horizon scores the reconciled measured total with the
/// official categorical bonus; daily horizons score their projected sum
/// without it. Reasoning strings are descriptive only.

use crate::analysis::{scoring, water_level};
use crate::config::{EngineConfig, HorizonConfig, HorizonKind};
use crate::model::{DailyProjection, HorizonForecast, OfficialStatus};

fn now_reasoning(status: &OfficialStatus, total_mm: f64, sample_count: usize) -> String {
    if status.is_available() {
        format!(
            "Official status: {} ({}); {:.1} mm measured over the last {} hours",
            status.label, status.matched_area_name, total_mm, sample_count
        )
    } else {
        format!(
            "Official status unavailable; {:.1} mm measured over the last {} hours",
            total_mm, sample_count
        )
    }
}

fn daily_reasoning(projection: &DailyProjection) -> String {
    format!(
        "Projected rainfall {:.1} mm, {}% chance of rain",
        projection.rainfall_sum_mm, projection.rain_probability_pct
    )
}

/// Scores every horizon.
///
/// `measured_total_mm` is the reconciled window total and `sample_count` the
/// number of samples it covers. A daily horizon with no matching projection
/// is scored as dry and says so in its reasoning.
pub fn forecast_horizons(
    horizons: &[HorizonConfig],
    measured_total_mm: f64,
    sample_count: usize,
    status: &OfficialStatus,
    projections: &[DailyProjection],
    config: &EngineConfig,
) -> Vec<HorizonForecast> {
    horizons
        .iter()
        .map(|horizon| {
            let (rainfall_mm, probability, reasoning, is_now) = match horizon.kind {
                HorizonKind::Now => (
                    measured_total_mm,
                    None,
                    now_reasoning(status, measured_total_mm, sample_count),
                    true,
                ),
                HorizonKind::Daily => {
                    match projections.iter().find(|p| p.horizon_label == horizon.label) {
                        Some(p) => (p.rainfall_sum_mm, Some(p.rain_probability_pct), daily_reasoning(p), false),
                        None => (0.0, None, "No projection available for this horizon".to_string(), false),
                    }
                }
            };

            HorizonForecast {
                horizon_label: horizon.label.clone(),
                assessment: scoring::assess(rainfall_mm, is_now, status.code(), &config.scoring),
                rainfall_mm,
                rain_probability_pct: probability,
                projected_water_level_cm: water_level::water_level_cm(rainfall_mm, &config.water_level),
                reasoning,
            }
        })
        .collect()
}
