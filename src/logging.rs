//! Logging
//!
//! Internal events use `tracing` and always go to stderr; stdout carries only
//! the selection output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Environment variable holding a filter directive, e.g. `critique=debug`
pub const LOG_ENV: &str = "CRITIQUE_LOG";

/// Build the filter: `CRITIQUE_LOG` wins, else `debug` when verbose, else `warn`
pub fn build_env_filter(verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return filter;
    }
    EnvFilter::new(if verbose { "debug" } else { "warn" })
}

/// Install the global subscriber
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(verbose: bool) {
    let _ = Registry::default()
        .with(build_env_filter(verbose))
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init();
}
