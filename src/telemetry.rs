//! Structured logging initialisation.

use crate::config::{LogFormat, LoggingConfig};
use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt};

/// Errors returned while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Neither `RUST_LOG` nor the configured level is a valid directive.
    #[error("invalid log filter {directive:?}: {source}")]
    InvalidFilter {
        /// Rejected directive.
        directive: String,
        /// Parser error.
        source: tracing_subscriber::filter::ParseError,
    },

    /// A global subscriber or `log` bridge is already installed.
    #[error("logging is already initialised: {0}")]
    AlreadyInitialised(String),
}

/// Installs the global tracing subscriber and the `log` bridge.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this
/// more than once returns [`TelemetryError::AlreadyInitialised`].
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or logging was
/// already initialised.
pub fn init(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Text => install(registry.with(fmt::layer().with_target(true))),
        LogFormat::Json => install(registry.with(fmt::layer().json().with_current_span(true))),
    }
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|source| TelemetryError::InvalidFilter {
        directive: config.level.clone(),
        source,
    })
}

fn install<S>(subscriber: S) -> Result<(), TelemetryError>
where
    S: Subscriber + Send + Sync + 'static,
{
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| TelemetryError::AlreadyInitialised(err.to_string()))?;
    tracing_log::LogTracer::init().map_err(|err| TelemetryError::AlreadyInitialised(err.to_string()))
}
