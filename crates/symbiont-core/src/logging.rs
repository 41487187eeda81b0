#![forbid(unsafe_code)]

//! Structured logging.
//!
//! Re-exports the `tracing` macros so dependents can log through one path,
//! and (with `tracing-json`) installs a JSON subscriber filtered by
//! `RUST_LOG`.

pub use tracing::{debug, debug_span, error, info, trace, warn};

/// Install a global JSON subscriber honouring `RUST_LOG`.
///
/// Returns `false` if a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_subscriber() -> bool {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .is_ok()
}
