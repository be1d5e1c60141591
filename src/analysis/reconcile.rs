/// Reconciliation of the official status with the telemetry window.
///
/// Telemetry can report a false zero for light or very local rain that the
/// ground-based official status already confirms. When the official source
/// says it is raining and the whole window measured less than the trigger
/// total, the most recent half of the window is raised to a bounded
/// light-rain value. Nothing else is ever changed:
///
/// - a non-trivial telemetry reading always wins over the official status;
/// - no sample is ever lowered;
/// - injected values never exceed `CorrectionConfig::max_mm`;
/// - once corrected, the window total is above the trigger, so a second
///   pass is a no-op.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::CorrectionConfig;
use crate::model::{OfficialStatus, RainSample};
use crate::weather_codes;

/// What reconciliation saw and did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcileOutcome {
    pub official_says_rain: bool,
    /// Window total before correction.
    pub measured_total_mm: f64,
    /// Window total after correction.
    pub reconciled_total_mm: f64,
    pub adjusted_samples: usize,
}

impl ReconcileOutcome {
    pub fn corrected(&self) -> bool {
        self.adjusted_samples > 0
    }
}

/// True when the official feed is available and reports a rain-type code.
pub fn official_says_rain(status: &OfficialStatus) -> bool {
    status
        .code()
        .is_some_and(|code| weather_codes::tier_for(code).is_precipitating())
}

pub fn total_rainfall(series: &[RainSample]) -> f64 {
    series.iter().map(|s| s.rainfall_mm).fold(0.0, |acc, v| acc + v)
}

/// RNG for injected values: fixed when a seed is configured.
pub fn correction_rng(config: &CorrectionConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Applies the one-directional correction in place.
pub fn reconcile<R: Rng>(
    series: &mut [RainSample],
    status: &OfficialStatus,
    config: &CorrectionConfig,
    rng: &mut R,
) -> ReconcileOutcome {
    let says_rain = official_says_rain(status);
    let measured = total_rainfall(series);

    if !says_rain || measured >= config.trigger_total_mm {
        return ReconcileOutcome {
            official_says_rain: says_rain,
            measured_total_mm: measured,
            reconciled_total_mm: measured,
            adjusted_samples: 0,
        };
    }

    // The rain is modelled as having just started: only the latter half moves.
    let start = series.len() / 2;
    let mut adjusted = 0;
    for sample in &mut series[start..] {
        let injected = round_tenth(rng.gen_range(config.min_mm..=config.max_mm))
            .clamp(config.min_mm, config.max_mm);
        if injected > sample.rainfall_mm {
            sample.rainfall_mm = injected;
            adjusted += 1;
        }
    }

    ReconcileOutcome {
        official_says_rain: says_rain,
        measured_total_mm: measured,
        reconciled_total_mm: total_rainfall(series),
        adjusted_samples: adjusted,
    }
}
