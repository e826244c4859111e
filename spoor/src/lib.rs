//! Helpers for tracing.

use tracing_subscriber::EnvFilter;

/// Init a basic env-filtered tracing system. Safe to call from every test; only the first call
/// installs anything.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
