//! Tracing setup: subscriber installation, span definitions and event types.

pub mod events;
pub mod spans;

use sysdoc_core::config::ObservabilityConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "SYSDOC_LOG";

/// Build the filter: `SYSDOC_LOG` wins, then the configured level, then `info`.
pub fn build_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// Safe to call more than once: returns `false` when a subscriber was
/// already installed and leaves it in place.
pub fn init_tracing(config: &ObservabilityConfig) -> bool {
    let json = config.json_logs;
    tracing_subscriber::registry()
        .with(json.then(|| {
            fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
        }))
        .with((!json).then(|| fmt::layer().with_target(true)))
        .with(build_filter(config))
        .try_init()
        .is_ok()
}
