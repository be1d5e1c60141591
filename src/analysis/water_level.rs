/// Synthetic water level proxy.
///
/// `water_level_cm = base_cm + rainfall_mm * cm_per_mm`, applied with the
/// same constants to every sample of a run. This is a visualisation signal
/// derived from rainfall, not a measured or hydrologically modelled level,
/// and every result carries `basis_label` saying so.

use crate::config::WaterLevelConfig;
use crate::model::RainSample;

pub fn water_level_cm(rainfall_mm: f64, config: &WaterLevelConfig) -> f64 {
    config.base_cm + rainfall_mm.max(0.0) * config.cm_per_mm
}

/// Fills `water_level_cm` on every sample from its (corrected) rainfall.
pub fn annotate(series: &mut [RainSample], config: &WaterLevelConfig) {
    for sample in series {
        sample.water_level_cm = water_level_cm(sample.rainfall_mm, config);
    }
}

/// Human-readable statement of what the water level figures are.
pub fn basis_label(config: &WaterLevelConfig) -> String {
    format!(
        "Synthetic proxy: {} cm base + {} cm per mm of rainfall. Not a measured water level.",
        config.base_cm, config.cm_per_mm
    )
}
