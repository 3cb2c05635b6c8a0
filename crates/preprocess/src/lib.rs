//! Request-side image preparation: decoding, rescale resolution, channel
//! selection and the resize primitives shared with post-processing.

pub mod channels;
pub mod decode;
pub mod error;
pub mod network;
pub mod rescale;
pub mod resize;

pub use channels::{Channels, display_image};
pub use decode::{ImageArray, decode_image};
pub use error::PreprocessError;
pub use network::{Network, UnknownNetwork};
pub use rescale::{DEFAULT_DIAMETER, MAX_RESCALE, RescaleFactor};
pub use resize::{DEFAULT_MAX_SIDE, cap_image, capped_size, rescaled_size, resize_image, resize_labels};
