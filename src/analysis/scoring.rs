/// Risk scoring.
///
/// `score = rainfall_mm * rain_weight (+ categorical bonus on the "now"
/// horizon)`, rounded and clamped to `[floor, ceiling]`, then classified by
/// fixed thresholds. The function is total and deterministic; the same
/// thresholds apply to every horizon.

use crate::config::ScoringConfig;
use crate::model::{RiskAssessment, RiskLevel};
use crate::weather_codes::{self, SeverityTier};

/// Bonus points for the severity tier of an official code.
pub fn categorical_bonus(code: Option<i32>, config: &ScoringConfig) -> u32 {
    match code.map(weather_codes::tier_for) {
        Some(SeverityTier::Extreme) => config.bonus_extreme,
        Some(SeverityTier::Heavy) => config.bonus_heavy,
        Some(SeverityTier::Moderate) => config.bonus_moderate,
        Some(SeverityTier::Light) => config.bonus_light,
        Some(SeverityTier::None) | None => 0,
    }
}

pub fn classify(score: u32, config: &ScoringConfig) -> RiskLevel {
    if score >= config.danger {
        RiskLevel::Danger
    } else if score >= config.watch {
        RiskLevel::Watch
    } else {
        RiskLevel::Safe
    }
}

/// Scores one horizon.
///
/// `code` is the official categorical code, or `None` when the feed was
/// unavailable. It only contributes when `is_now` is set.
pub fn assess(rainfall_mm: f64, is_now: bool, code: Option<i32>, config: &ScoringConfig) -> RiskAssessment {
    let rainfall = if rainfall_mm.is_nan() { 0.0 } else { rainfall_mm.max(0.0) };
    let bonus = if is_now { categorical_bonus(code, config) } else { 0 };

    let raw = rainfall * config.rain_weight + f64::from(bonus);
    // Float-to-int `as` saturates, so an infinite total lands on the ceiling.
    let score = (raw.round() as u32).clamp(config.floor, config.ceiling);

    RiskAssessment::new(score, classify(score, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ScoringConfig {
        ScoringConfig::default()
    }

    #[test]
    fn test_dry_non_rain_scores_floor() {
        for code in [None, Some(0), Some(3), Some(45)] {
            let a = assess(0.0, true, code, &cfg());
            assert_eq!(a.score(), 5);
            assert_eq!(a.level(), RiskLevel::Safe);
        }
    }

    #[test]
    fn test_watch_boundary_is_inclusive() {
        let a = assess(20.0, false, None, &cfg());
        assert_eq!(a.score(), 40);
        assert_eq!(a.level(), RiskLevel::Watch);

        let below = assess(19.5, false, None, &cfg());
        assert_eq!(below.score(), 39);
        assert_eq!(below.level(), RiskLevel::Safe);
    }

    #[test]
    fn test_danger_boundary_is_inclusive() {
        assert_eq!(assess(35.0, false, None, &cfg()).level(), RiskLevel::Danger);
        assert_eq!(assess(34.5, false, None, &cfg()).level(), RiskLevel::Watch);
    }

    #[test]
    fn test_heavy_rainfall_clamps_to_ceiling_for_any_bonus() {
        for code in [None, Some(0), Some(60), Some(61), Some(63), Some(80), Some(95), Some(97)] {
            for rainfall in [50.0, 60.0, 500.0, f64::INFINITY] {
                let a = assess(rainfall, true, code, &cfg());
                assert_eq!(a.score(), 99, "rainfall {} code {:?}", rainfall, code);
                assert_eq!(a.level(), RiskLevel::Danger);
            }
        }
    }

    #[test]
    fn test_47mm_clamps_whenever_official_reports_rain() {
        for code in [60, 61, 63, 80, 95, 97] {
            assert_eq!(assess(47.0, true, Some(code), &cfg()).score(), 99);
        }
        assert_eq!(assess(47.0, true, None, &cfg()).score(), 94);
    }

    #[test]
    fn test_monotonic_in_rainfall() {
        for code in [None, Some(60), Some(63), Some(97)] {
            let mut previous = 0;
            for step in 0..=400 {
                let rainfall = f64::from(step) * 0.25;
                let score = assess(rainfall, true, code, &cfg()).score();
                assert!(score >= previous, "score fell at {} mm (code {:?})", rainfall, code);
                assert!((5..=99).contains(&score));
                previous = score;
            }
        }
    }

    #[test]
    fn test_bonus_tiers() {
        let c = cfg();
        assert_eq!(categorical_bonus(Some(97), &c), 50);
        assert_eq!(categorical_bonus(Some(95), &c), 50);
        assert_eq!(categorical_bonus(Some(80), &c), 35);
        assert_eq!(categorical_bonus(Some(63), &c), 35);
        assert_eq!(categorical_bonus(Some(61), &c), 20);
        assert_eq!(categorical_bonus(Some(60), &c), 10);
        assert_eq!(categorical_bonus(Some(45), &c), 0);
        assert_eq!(categorical_bonus(Some(62), &c), 0, "codes outside the table carry no bonus");
        assert_eq!(categorical_bonus(None, &c), 0);
    }

    #[test]
    fn test_bonus_only_applies_to_now() {
        let now = assess(3.0, true, Some(63), &cfg());
        let later = assess(3.0, false, Some(63), &cfg());
        assert_eq!(now.score(), 41);
        assert_eq!(now.level(), RiskLevel::Watch);
        assert_eq!(later.score(), 6);
        assert_eq!(later.level(), RiskLevel::Safe);
    }

    #[test]
    fn test_invalid_rainfall_is_treated_as_dry() {
        assert_eq!(assess(f64::NAN, false, None, &cfg()).score(), 5);
        assert_eq!(assess(-12.0, false, None, &cfg()).score(), 5);
    }

    #[test]
    fn test_deterministic() {
        let a = assess(13.7, true, Some(61), &cfg());
        let b = assess(13.7, true, Some(61), &cfg());
        assert_eq!(a, b);
    }
}
