use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Unsupported image format hint: {0}")]
    UnknownFormat(String),

    #[error("Unsupported channel count: {0}")]
    ChannelCount(usize),

    #[error("Empty image ({height}x{width})")]
    EmptyImage { height: usize, width: usize },

    #[error("Resize failed: {0}")]
    Resize(String),
}

impl From<fast_image_resize::ResizeError> for PreprocessError {
    fn from(err: fast_image_resize::ResizeError) -> Self {
        PreprocessError::Resize(err.to_string())
    }
}

impl From<fast_image_resize::ImageBufferError> for PreprocessError {
    fn from(err: fast_image_resize::ImageBufferError) -> Self {
        PreprocessError::Resize(err.to_string())
    }
}
