//! Tracing setup for the command-line interface

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to stderr.
///
/// The default filter enables the given level for this crate; a `RUST_LOG`
/// environment variable overrides it entirely. Events go to stderr so
/// command output on stdout stays parseable.
pub fn init_logging(level: &str) {
    let default_filter = format!("paydown={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .init();
}
