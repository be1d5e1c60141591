/// Categorical weather code enumeration used by the official regional feed.
///
/// This is the single source of truth for code labels and for the severity
/// tier each code contributes to the "now" risk score. Codes that are not
/// listed here normalize to `DEFAULT_LABEL` with no severity.

// ---------------------------------------------------------------------------
// Severity tiers
// ---------------------------------------------------------------------------

/// Rain severity of a categorical code, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SeverityTier {
    /// Clear, cloudy, haze, smoke, fog.
    None,
    Light,
    Moderate,
    Heavy,
    /// Thunderstorm-grade.
    Extreme,
}

impl SeverityTier {
    /// True for the rain-type tiers.
    pub fn is_precipitating(self) -> bool {
        self != SeverityTier::None
    }
}

// ---------------------------------------------------------------------------
// Code table
// ---------------------------------------------------------------------------

pub struct WeatherCode {
    pub code: i32,
    pub label: &'static str,
    pub tier: SeverityTier,
}

/// Label used for any code missing from `WEATHER_CODES`.
pub const DEFAULT_LABEL: &str = "overcast";

/// Every code the regional feed is documented to emit.
///
/// Local rain (80) is folded into the heavy tier.
pub static WEATHER_CODES: &[WeatherCode] = &[
    WeatherCode { code: 0, label: "clear", tier: SeverityTier::None },
    WeatherCode { code: 1, label: "mostly clear", tier: SeverityTier::None },
    WeatherCode { code: 2, label: "partly cloudy", tier: SeverityTier::None },
    WeatherCode { code: 3, label: "overcast", tier: SeverityTier::None },
    WeatherCode { code: 4, label: "heavy overcast", tier: SeverityTier::None },
    WeatherCode { code: 5, label: "haze", tier: SeverityTier::None },
    WeatherCode { code: 10, label: "smoke", tier: SeverityTier::None },
    WeatherCode { code: 45, label: "fog", tier: SeverityTier::None },
    WeatherCode { code: 60, label: "light rain", tier: SeverityTier::Light },
    WeatherCode { code: 61, label: "moderate rain", tier: SeverityTier::Moderate },
    WeatherCode { code: 63, label: "heavy rain", tier: SeverityTier::Heavy },
    WeatherCode { code: 80, label: "local rain", tier: SeverityTier::Heavy },
    WeatherCode { code: 95, label: "thunderstorm", tier: SeverityTier::Extreme },
    WeatherCode { code: 97, label: "severe thunderstorm", tier: SeverityTier::Extreme },
];

pub fn find_code(code: i32) -> Option<&'static WeatherCode> {
    WEATHER_CODES.iter().find(|c| c.code == code)
}

/// Label for a code, falling back to `DEFAULT_LABEL`.
pub fn label_for(code: i32) -> &'static str {
    find_code(code).map(|c| c.label).unwrap_or(DEFAULT_LABEL)
}

/// Severity tier for a code; unknown codes have none.
pub fn tier_for(code: i32) -> SeverityTier {
    find_code(code).map(|c| c.tier).unwrap_or(SeverityTier::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        for (i, a) in WEATHER_CODES.iter().enumerate() {
            for b in &WEATHER_CODES[i + 1..] {
                assert_ne!(a.code, b.code, "duplicate code {}", a.code);
            }
        }
    }

    #[test]
    fn test_known_labels() {
        assert_eq!(label_for(0), "clear");
        assert_eq!(label_for(63), "heavy rain");
        assert_eq!(label_for(97), "severe thunderstorm");
    }

    #[test]
    fn test_unknown_code_defaults_to_overcast() {
        assert_eq!(label_for(7), DEFAULT_LABEL);
        assert_eq!(label_for(-1), DEFAULT_LABEL);
        assert_eq!(tier_for(70), SeverityTier::None);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(tier_for(45), SeverityTier::None);
        assert_eq!(tier_for(60), SeverityTier::Light);
        assert_eq!(tier_for(61), SeverityTier::Moderate);
        assert_eq!(tier_for(63), SeverityTier::Heavy);
        assert_eq!(tier_for(80), SeverityTier::Heavy);
        assert_eq!(tier_for(95), SeverityTier::Extreme);
        assert_eq!(tier_for(97), SeverityTier::Extreme);
    }

    #[test]
    fn test_only_rain_codes_precipitate() {
        for code in WEATHER_CODES {
            let rain_range = (60..=97).contains(&code.code);
            assert_eq!(
                code.tier.is_precipitating(),
                rain_range,
                "code {} ({}) precipitation flag mismatch",
                code.code,
                code.label
            );
        }
    }
}
