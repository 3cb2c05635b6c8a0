use common::{TelemetryGuard, setup_logging};
use gateway::{
    AppState, config::get_configuration, router, samples::SampleCatalog, storage::UploadStore,
};
use inference::{InferenceConfig, ModelRegistry, SegmentationService};

#[cfg(feature = "ort-backend")]
use inference::backend::ort::OrtBackend as Backend;

#[cfg(not(feature = "ort-backend"))]
compile_error!("A backend feature must be enabled: 'ort-backend'");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_configuration()?;
    let inference_config = InferenceConfig::from_env()?;

    let _telemetry = match &config.otel_endpoint {
        Some(endpoint) => Some(TelemetryGuard::init(
            "gateway",
            endpoint,
            config.log_level,
            config.environment,
        )?),
        None => {
            setup_logging(config.log_level, config.environment);
            None
        }
    };

    tracing::info!(config = ?config, inference = ?inference_config, "Loaded configuration");

    let provider = inference_config.execution_provider;
    let intra_threads = inference_config.intra_threads;
    let registry = ModelRegistry::<Backend>::new(&inference_config.models_dir)
        .with_loader(move |path| Backend::load_model_with_provider(path, provider, intra_threads));
    let service = SegmentationService::new(registry, &inference_config);

    let state = AppState::new(
        service,
        UploadStore::new(&config.upload_dir),
        SampleCatalog::new(&config.samples_dir),
    );
    let app = router(state, config.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!(address = %config.bind_address, "Gateway listening");
    axum::serve(listener, app).await?;

    Ok(())
}
