use super::{ExecutionProvider, ModelInput, ModelOutput, SegmentationModel};
use crate::processing::{
    post::{crop_flows, crop_masks, relabel_sequential},
    pre::pack_input,
};
use ort::{
    session::{Session, builder::GraphOptimizationLevel},
    value::TensorRef,
};
use preprocess::{rescaled_size, resize_image, resize_labels};
use std::path::Path;

const DEFAULT_INTRA_THREADS: usize = 4;

pub struct OrtBackend {
    session: Session,
}

impl OrtBackend {
    /// Load model with specified execution provider
    pub fn load_model_with_provider(
        path: &Path,
        provider: ExecutionProvider,
        intra_threads: usize,
    ) -> anyhow::Result<Self> {
        // Initialize ORT environment (idempotent)
        let _ = ort::init().commit();

        let mut builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(intra_threads)?;

        match provider {
            ExecutionProvider::Cuda => {
                tracing::info!("Initializing ONNX Runtime with CUDA execution provider");
                builder = builder.with_execution_providers([
                    ort::execution_providers::CUDAExecutionProvider::default()
                        .with_device_id(0)
                        .build()
                        .error_on_failure(),
                ])?;
            }
            ExecutionProvider::Cpu => {
                tracing::info!("Initializing ONNX Runtime with CPU execution provider");
            }
        }

        let session = builder.commit_from_file(path)?;

        tracing::info!("Model loaded from {}", path.display());
        Ok(Self { session })
    }
}

impl SegmentationModel for OrtBackend {
    fn load_model(path: &Path) -> anyhow::Result<Self> {
        Self::load_model_with_provider(path, ExecutionProvider::Cpu, DEFAULT_INTRA_THREADS)
    }

    fn infer(&mut self, input: &ModelInput<'_>) -> anyhow::Result<ModelOutput> {
        if input.tile {
            anyhow::bail!("Tiled evaluation is not supported by the ONNX backend");
        }

        let (height, width, _) = input.image.dim();
        let (scaled_height, scaled_width) = rescaled_size(height, width, input.rescale.value());
        let scaled = resize_image(&input.image, scaled_height, scaled_width)?;
        let tensor = pack_input(&scaled.view(), input.channels, input.invert)?;

        let outputs = {
            let _infer_span = tracing::info_span!("model_inference").entered();
            self.session.run(ort::inputs![
                "image" => TensorRef::from_array_view(tensor.view())?
            ])?
        };

        let masks = match outputs["masks"].try_extract_array::<i64>() {
            Ok(masks) => crop_masks(&masks, scaled_height, scaled_width)?,
            Err(_) => {
                let masks = outputs["masks"].try_extract_array::<i32>()?;
                crop_masks(&masks, scaled_height, scaled_width)?
            }
        };
        let flows = outputs["flows"].try_extract_array::<u8>()?;
        let flows = crop_flows(&flows, scaled_height, scaled_width)?;

        // Back to the size the caller handed in.
        let labels = relabel_sequential(&masks.view())?;
        let labels = resize_labels(&labels.view(), height, width)?;
        let flows = resize_image(&flows.view(), height, width)?;

        Ok(ModelOutput {
            masks: labels.mapv(u32::from),
            flows,
        })
    }
}
