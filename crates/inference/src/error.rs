use artifacts::EncodeError;
use preprocess::{PreprocessError, UnknownNetwork};
use thiserror::Error;

/// Everything that can abort a segmentation request.
///
/// Model backends speak `anyhow`; their errors are flattened into the message
/// of [`SegmentError::Inference`].
#[derive(Error, Debug)]
pub enum SegmentError {
    /// The wrapped error already names the decoding step.
    #[error("{0}")]
    Decode(#[source] PreprocessError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Post-processing failed: {0}")]
    PostProcess(#[source] PreprocessError),

    #[error("Encoding failed: {0}")]
    Encoding(#[from] EncodeError),

    #[error("Resource error: {0}")]
    Resource(String),
}

impl SegmentError {
    /// Short stable name, used as the `kind` metric attribute.
    pub fn kind(&self) -> &'static str {
        match self {
            SegmentError::Decode(_) => "decode",
            SegmentError::InvalidRequest(_) => "invalid_request",
            SegmentError::Inference(_) => "inference",
            SegmentError::PostProcess(_) => "post_process",
            SegmentError::Encoding(_) => "encoding",
            SegmentError::Resource(_) => "resource",
        }
    }

    pub fn inference(err: anyhow::Error) -> Self {
        SegmentError::Inference(format!("{err:#}"))
    }
}

impl From<UnknownNetwork> for SegmentError {
    fn from(err: UnknownNetwork) -> Self {
        SegmentError::InvalidRequest(err.to_string())
    }
}
