use crate::{
    backend::SegmentationModel,
    config::InferenceConfig,
    error::SegmentError,
    invoker::InferenceInvoker,
    postprocessing::restore_size,
    registry::ModelRegistry,
    request::SegmentationConfig,
};
use artifacts::OutputEncoder;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Local;
use ndarray::Array2;
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};
use preprocess::{decode_image, display_image};
use schema::{ArtifactSet, SegmentForm, SegmentResponse};
use std::time::Instant;

/// Format of the `timestamp` field in replies.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Everything one successful segmentation produced.
#[derive(Debug, Clone)]
pub struct SegmentOutcome {
    /// `[height, width]` for grayscale inputs, `[height, width, 3]` otherwise.
    pub input_shape: Vec<usize>,
    /// Final label mask, at the extent the artifacts were built from.
    pub labels: Array2<u16>,
    pub artifacts: ArtifactSet,
}

struct SegmentationMetrics {
    duration: Histogram<f64>,
    requests: Counter<u64>,
    failures: Counter<u64>,
}

fn init_metrics(meter_name: &'static str) -> SegmentationMetrics {
    let meter = global::meter(meter_name);
    let latency_buckets = [
        0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0, 5.0, 10.0, 30.0,
    ];
    let duration = meter
        .f64_histogram("segmentation_duration_seconds")
        .with_description("Time to serve a segmentation (decode + infer + encode)")
        .with_unit("s")
        .with_boundaries(latency_buckets.to_vec())
        .build();
    let requests = meter
        .u64_counter("segmentation_requests_total")
        .with_description("Total segmentation requests")
        .build();
    let failures = meter
        .u64_counter("segmentation_failures_total")
        .with_description("Total failed segmentation requests, by error kind")
        .build();

    SegmentationMetrics {
        duration,
        requests,
        failures,
    }
}

/// The segmentation pipeline: decode, resolve, infer, restore, encode.
///
/// Every call runs synchronously on the calling thread.
pub struct SegmentationService<B> {
    invoker: InferenceInvoker<B>,
    encoder: OutputEncoder,
    metrics: SegmentationMetrics,
}

impl<B: SegmentationModel> SegmentationService<B> {
    pub fn new(registry: ModelRegistry<B>, config: &InferenceConfig) -> Self {
        Self {
            invoker: InferenceInvoker::new(registry, config.max_image_size),
            encoder: OutputEncoder::default(),
            metrics: init_metrics("segmentation"),
        }
    }

    pub fn with_encoder(mut self, encoder: OutputEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn registry(&self) -> &ModelRegistry<B> {
        self.invoker.registry()
    }

    /// Serve a form request, folding every failure into the reply.
    pub fn handle(&self, form: &SegmentForm) -> SegmentResponse {
        let start = Instant::now();
        match self.segment(form) {
            Ok(outcome) => {
                let execution_time = start.elapsed().as_secs_f64();
                let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
                tracing::info!(
                    %timestamp,
                    execution_time,
                    input_shape = ?outcome.input_shape,
                    outputs = outcome.artifacts.len(),
                    "Segmentation succeeded"
                );
                SegmentResponse::success(
                    outcome.input_shape,
                    execution_time,
                    timestamp,
                    outcome.artifacts,
                )
            }
            Err(e) => SegmentResponse::failure(e.to_string()),
        }
    }

    /// Segment the base64 image carried in `form.input`.
    pub fn segment(&self, form: &SegmentForm) -> Result<SegmentOutcome, SegmentError> {
        self.observe(|| {
            let input = form
                .input
                .as_deref()
                .map(str::trim)
                .filter(|input| !input.is_empty())
                .ok_or_else(|| SegmentError::InvalidRequest("missing input image".to_string()))?;
            let bytes = STANDARD
                .decode(input)
                .map_err(|e| SegmentError::InvalidRequest(format!("input is not base64: {e}")))?;
            self.run(&bytes, form)
        })
    }

    /// Segment raw encoded image bytes, with the rest of the configuration
    /// taken from `form`.
    pub fn segment_bytes(
        &self,
        bytes: &[u8],
        form: &SegmentForm,
    ) -> Result<SegmentOutcome, SegmentError> {
        self.observe(|| self.run(bytes, form))
    }

    fn observe(
        &self,
        f: impl FnOnce() -> Result<SegmentOutcome, SegmentError>,
    ) -> Result<SegmentOutcome, SegmentError> {
        let start = Instant::now();
        let result = f();

        self.metrics.requests.add(1, &[]);
        self.metrics
            .duration
            .record(start.elapsed().as_secs_f64(), &[]);
        if let Err(e) = &result {
            self.metrics
                .failures
                .add(1, &[KeyValue::new("kind", e.kind())]);
            tracing::warn!(error = %e, kind = e.kind(), "Segmentation failed");
        }
        result
    }

    #[tracing::instrument(skip_all, fields(bytes = bytes.len()))]
    fn run(&self, bytes: &[u8], form: &SegmentForm) -> Result<SegmentOutcome, SegmentError> {
        let image = decode_image(bytes, form.format.as_deref()).map_err(SegmentError::Decode)?;
        let config = SegmentationConfig::from_form(form)?;

        let (height, width, image_channels) = image.dim();
        let input_shape = if image_channels == 1 {
            vec![height, width]
        } else {
            vec![height, width, image_channels]
        };

        let channels = config.channels(image_channels);
        tracing::debug!(
            network = %config.network,
            rescale = config.rescale.value(),
            channels = ?channels.as_array(),
            "Resolved segmentation config"
        );

        let segmentation = self.invoker.invoke(&image.view(), &config, channels)?;
        let display = display_image(&segmentation.image.view(), channels);
        let restored = restore_size(segmentation, display, (height, width), config.keep_size)?;
        let artifacts = self
            .encoder
            .encode(&restored.encode_input(), &config.outputs)?;

        Ok(SegmentOutcome {
            input_shape,
            labels: restored.labels,
            artifacts,
        })
    }
}
