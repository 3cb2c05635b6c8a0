use common::{Environment, LogLevel};
use serde::Deserialize;
use std::path::PathBuf;

/// Largest accepted request body unless overridden.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub log_level: LogLevel,
    pub environment: Environment,
    pub bind_address: String,
    /// Where uploads and derived mask files are written.
    pub upload_dir: PathBuf,
    /// Directory of the bundled `imgNN.png` samples.
    pub samples_dir: PathBuf,
    pub max_body_bytes: usize,
    /// OTLP collector; telemetry export is off when unset.
    pub otel_endpoint: Option<String>,
}

pub fn get_configuration() -> Result<Config, config::ConfigError> {
    let config = config::Config::builder()
        .set_default("log_level", "info")?
        .set_default("environment", "development")?
        .set_default("bind_address", "0.0.0.0:8080")?
        .set_default("upload_dir", "/tmp")?
        .set_default("samples_dir", "samples")?
        .set_default("max_body_bytes", DEFAULT_MAX_BODY_BYTES as u64)?
        .add_source(
            config::Environment::with_prefix("GATEWAY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: Config = config.try_deserialize::<Config>()?;

    Ok(config)
}
