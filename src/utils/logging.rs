//! Logging setup

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber. `RUST_LOG` controls the filter;
/// `info` is the default. Safe to call more than once (later calls are
/// no-ops), which keeps test setups simple.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
