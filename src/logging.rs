//! Logging setup
//!
//! Initializes the tracing subscriber with the configured level. `RUST_LOG`
//! takes precedence so embedders can raise verbosity per-module without
//! touching the config file.

use tracing_subscriber::EnvFilter;

/// Initialize logging at `level` for this crate's targets.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pasw={level}")));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
