/// Deterministic risk-inference stages, applied in this order:
///
/// - `reconcile`   — official status vs. telemetry correction (bounded randomness)
/// - `water_level` — synthetic water level proxy
/// - `scoring`     — rainfall + categorical bonus → bounded score and level
/// - `horizons`    — scoring applied to each configured forecast window

pub mod horizons;
pub mod reconcile;
pub mod scoring;
pub mod water_level;
