use crate::backend::{ModelInput, SegmentationModel};
use crate::error::SegmentError;
use crate::processing::post::relabel_sequential;
use crate::registry::ModelRegistry;
use crate::request::SegmentationConfig;
use common::span;
use ndarray::{Array2, Array3, ArrayView3};
use preprocess::{Channels, cap_image};

/// Mask and flow from one model call, with the image they were computed on.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Instance labels, contiguous from 1.
    pub labels: Array2<u16>,
    pub flows: Array3<u8>,
    /// Inference image, after size capping.
    pub image: Array3<u8>,
}

impl Segmentation {
    pub fn instance_count(&self) -> usize {
        self.labels.iter().copied().max().map_or(0, usize::from)
    }
}

/// Caps the image, runs the network's model and validates what comes back.
pub struct InferenceInvoker<B> {
    registry: ModelRegistry<B>,
    max_side: usize,
}

impl<B: SegmentationModel> InferenceInvoker<B> {
    pub fn new(registry: ModelRegistry<B>, max_side: usize) -> Self {
        Self { registry, max_side }
    }

    pub fn registry(&self) -> &ModelRegistry<B> {
        &self.registry
    }

    pub fn invoke(
        &self,
        image: &ArrayView3<u8>,
        config: &SegmentationConfig,
        channels: Channels,
    ) -> Result<Segmentation, SegmentError> {
        let _s = span!("invoke_model");

        let image = cap_image(image, self.max_side)
            .map_err(|e| SegmentError::Inference(format!("malformed image: {e}")))?;
        let (height, width, _) = image.dim();

        let model = self
            .registry
            .get(config.network)
            .map_err(SegmentError::inference)?;
        let output = {
            let mut model = model
                .lock()
                .map_err(|_| SegmentError::Inference("model lock poisoned".to_string()))?;
            model
                .infer(&ModelInput {
                    image: image.view(),
                    rescale: config.rescale,
                    channels,
                    tile: false,
                    invert: config.invert,
                })
                .map_err(SegmentError::inference)?
        };

        if output.masks.dim() != (height, width) {
            return Err(SegmentError::Inference(format!(
                "model returned a {:?} mask for a {height}x{width} image",
                output.masks.dim()
            )));
        }
        if output.flows.dim() != (height, width, 3) {
            return Err(SegmentError::Inference(format!(
                "model returned a {:?} flow field for a {height}x{width} image",
                output.flows.dim()
            )));
        }

        let labels = relabel_sequential(&output.masks.view()).map_err(SegmentError::inference)?;
        let segmentation = Segmentation {
            labels,
            flows: output.flows,
            image,
        };
        tracing::debug!(
            network = %config.network,
            height,
            width,
            instances = segmentation.instance_count(),
            "Model inference complete"
        );
        Ok(segmentation)
    }
}
