//! Tracing subscriber bootstrap.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Env var read for the log filter, e.g. `LOG_LEVEL=entity_api_client=debug`.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Installs a fmt subscriber filtered by `LOG_LEVEL` (default `info`).
///
/// Safe to call more than once: later calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter())
        .try_init();
}

/// Same as [`init`] but writes through the test harness, so output is
/// captured per test.
pub fn init_for_tests() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .with(env_filter())
        .try_init();
}

fn env_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var(LOG_LEVEL_ENV)
        .from_env_lossy()
}
