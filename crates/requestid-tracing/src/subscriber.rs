//! Global subscriber setup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, TracingConfig};

/// Install the global subscriber: an `EnvFilter` plus an fmt layer on stderr.
///
/// An unparsable `log_level` falls back to `info`.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init_tracing(config: &TracingConfig) {
    if let Err(e) = try_init_tracing(config) {
        panic!("failed to install tracing subscriber: {e}");
    }
}

/// Like [`init_tracing`], but returns an error instead of panicking when a
/// global subscriber is already installed.
pub fn try_init_tracing(config: &TracingConfig) -> Result<(), TryInitError> {
    let env_filter = build_filter(&config.log_level);
    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(config.with_target)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(config.with_target)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(config.with_target)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    }
}

fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}
