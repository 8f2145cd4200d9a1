//! Logging infrastructure for abx.
//!
//! Provides centralized tracing setup for all binaries. The engine only emits
//! events; installing a subscriber never changes a recommendation.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the stderr subscriber at INFO unless RUST_LOG says otherwise
///
/// Stdout is left to command output, so `--json` results stay parseable.
pub fn init() {
    init_with_level("info")
}

/// Install the subscriber with `default_level` as the fallback filter
///
/// `default_level` usually comes from the `[logging] level` config key.
/// RUST_LOG still wins when set. A second call leaves the first subscriber
/// in place.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

/// Debug-level subscriber routed through the test harness writer
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{recommend, InfectionSite, PatientProfile, Sex};

    #[test]
    fn test_subscriber_does_not_change_output() {
        let profile = PatientProfile::new(52.0, Sex::Female, 68.0, 160.0, InfectionSite::Urinary);
        let before = serde_json::to_string(&recommend(&profile)).unwrap();

        init_test();
        let after = serde_json::to_string(&recommend(&profile)).unwrap();

        assert_eq!(before, after);
    }
}
