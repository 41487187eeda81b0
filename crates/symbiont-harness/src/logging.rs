#![forbid(unsafe_code)]

//! Log setup for tests.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber filtered by `RUST_LOG` (default
/// `warn`). Safe to call from every test; only the first call installs.
pub fn init_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        // Another harness may already own the global subscriber.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Install the JSON subscriber from `symbiont-core` instead of the test
/// writer. Returns `false` if a subscriber was already installed.
#[cfg(feature = "json-logs")]
pub fn init_json_logging() -> bool {
    symbiont_core::logging::init_json_subscriber()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_test_logging();
        init_test_logging();
        symbiont_core::debug!("logging initialized twice");
    }
}
