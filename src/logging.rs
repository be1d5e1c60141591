/// Tracing subscriber setup for the binary.
///
/// Filter comes from `RUST_LOG` (default `info`). Set
/// `FLORISK_LOG_FORMAT=json` for one JSON object per event. Logs go to
/// stderr so CLI output on stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

pub const LOG_FORMAT_ENV: &str = "FLORISK_LOG_FORMAT";

/// Installs the global subscriber. Calling it again is a no-op.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    // Err only means a subscriber is already installed.
    let _ = if json { builder.json().try_init() } else { builder.try_init() };
}
