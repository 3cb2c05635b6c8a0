use crate::config::{Environment, LogLevel};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the filter from `RUST_LOG`, falling back to the configured level.
pub(crate) fn env_filter(log_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level.as_str()))
}

/// Initialize the tracing subscriber with pretty formatting for development
/// and JSON formatting for production.
///
/// The OpenTelemetry layer is attached as well; it only exports spans once a
/// global tracer provider has been installed (see [`crate::TelemetryGuard`]).
pub fn setup_logging(log_level: LogLevel, environment: Environment) {
    let registry = tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(tracing_opentelemetry::layer());

    match environment {
        Environment::Production => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_level(true))
                .init();
        }
        Environment::Development => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_ansi(true))
                .init();
        }
    }
}
