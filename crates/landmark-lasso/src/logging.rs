//! Logging setup
//!
//! Logs go to stderr so the listing on stdout stays machine readable.
//! `RUST_LOG` overrides the default level.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

fn default_filter() -> EnvFilter {
    if cfg!(debug_assertions) {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}

/// Install the global subscriber. Calling it again is a no-op.
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);

    if tracing_subscriber::registry().with(fmt_layer).try_init().is_ok() {
        #[cfg(feature = "profiling")]
        tracing::info!("Logging initialized (profiling scopes reported as tracing spans)");
        #[cfg(not(feature = "profiling"))]
        tracing::info!("Logging initialized (profiling disabled in this build)");
    }
}
