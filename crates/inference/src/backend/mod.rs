use ndarray::{Array2, Array3, ArrayView3};
use preprocess::{Channels, RescaleFactor};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[cfg(feature = "ort-backend")]
pub mod ort;

/// A segmentation network with its parameters loaded.
///
/// Implementations are black boxes: they receive the capped image and the
/// resolved configuration and hand back a label mask and a flow rendering
/// with the image's spatial extent.
pub trait SegmentationModel {
    fn load_model(path: &Path) -> anyhow::Result<Self>
    where
        Self: Sized;

    fn infer(&mut self, input: &ModelInput<'_>) -> anyhow::Result<ModelOutput>;
}

pub struct ModelInput<'a> {
    /// Height x width x channels (1 or 3).
    pub image: ArrayView3<'a, u8>,
    pub rescale: RescaleFactor,
    pub channels: Channels,
    /// Tiled evaluation; the service always passes `false`.
    pub tile: bool,
    pub invert: bool,
}

pub struct ModelOutput {
    /// Instance labels, 0 = background. Ids need not be contiguous.
    pub masks: Array2<u32>,
    /// RGB rendering of the flow field, height x width x 3.
    pub flows: Array3<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionProvider {
    #[default]
    Cpu,
    Cuda,
}

impl fmt::Display for ExecutionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionProvider::Cpu => f.write_str("cpu"),
            ExecutionProvider::Cuda => f.write_str("cuda"),
        }
    }
}

impl FromStr for ExecutionProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(ExecutionProvider::Cpu),
            "cuda" | "gpu" => Ok(ExecutionProvider::Cuda),
            other => anyhow::bail!(
                "{other} is not a supported execution provider. Use either `cpu` or `cuda`."
            ),
        }
    }
}
