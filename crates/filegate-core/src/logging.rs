//! Tracing subscriber initialization.

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::logging::LoggingConfig;

/// Initialize tracing/logging for the process.
///
/// The `RUST_LOG` environment variable overrides the configured level.
/// Called once by the host at startup; calling it twice panics, which is
/// why tests use their own subscribers.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}
