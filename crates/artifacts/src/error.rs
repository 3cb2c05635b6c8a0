use schema::OutputKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Raster encoding failed: {0}")]
    Raster(#[from] image::ImageError),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Outline extraction failed: {0}")]
    Outline(String),

    #[error("Overlay rendering failed: {0}")]
    Overlay(String),

    #[error("Polygon conversion failed: {0}")]
    Polygon(String),

    #[error("Shape mismatch: {0}")]
    Shape(String),

    #[error("Failed to produce {kind}: {source}")]
    Artifact {
        kind: OutputKind,
        source: Box<EncodeError>,
    },
}

impl EncodeError {
    /// Kind of the artifact that failed, when known.
    pub fn kind(&self) -> Option<OutputKind> {
        match self {
            EncodeError::Artifact { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
