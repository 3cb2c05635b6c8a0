//! Channel selection for inference and the matching display transform.

use crate::network::Network;
use ndarray::{Array3, ArrayView3, Axis, s};

/// Largest valid channel index (1 = red, 2 = green, 3 = blue; 0 = none/gray).
pub const MAX_CHANNEL_INDEX: u8 = 3;

/// Resolved `[primary, secondary]` channel pair handed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Channels {
    pub primary: u8,
    pub secondary: u8,
}

impl Channels {
    pub const GRAYSCALE: Channels = Channels {
        primary: 0,
        secondary: 0,
    };

    pub fn new(primary: u8, secondary: u8) -> Self {
        Self { primary, secondary }
    }

    pub fn as_array(&self) -> [u8; 2] {
        [self.primary, self.secondary]
    }

    /// Resolve the raw request fields against the image and network.
    ///
    /// Malformed or out-of-range indices fall back to 0. Single-channel images
    /// always resolve to `(0, 0)`; networks without a secondary input get
    /// `secondary = 0`.
    pub fn resolve(
        primary: Option<&str>,
        secondary: Option<&str>,
        image_channels: usize,
        network: Network,
    ) -> Self {
        if image_channels == 1 {
            return Self::GRAYSCALE;
        }

        let primary = parse_channel_index(primary);
        let secondary = if network.supports_second_channel() {
            parse_channel_index(secondary)
        } else {
            0
        };

        Self { primary, secondary }
    }
}

fn parse_channel_index(raw: Option<&str>) -> u8 {
    raw.and_then(|value| value.trim().parse::<u8>().ok())
        .filter(|&index| index <= MAX_CHANNEL_INDEX)
        .unwrap_or(0)
}

/// Derive the image shown to the caller from the inference image.
///
/// With no secondary channel the picture either collapses to a three-way
/// duplicated grayscale mean (`primary == 0`) or keeps only the primary plane.
/// With a secondary channel the image is returned as is.
pub fn display_image(image: &ArrayView3<u8>, channels: Channels) -> Array3<u8> {
    if channels.secondary != 0 {
        return image.to_owned();
    }

    let n_channels = image.len_of(Axis(2));
    if channels.primary == 0 || n_channels == 1 {
        let mean = image.map_axis(Axis(2), |pixel| {
            let sum: u32 = pixel.iter().map(|&v| u32::from(v)).sum();
            (sum / pixel.len() as u32) as u8
        });
        let (height, width) = mean.dim();
        return Array3::from_shape_fn((height, width, 3), |(y, x, _)| mean[[y, x]]);
    }

    let keep = usize::from(channels.primary - 1);
    let mut display = image.to_owned();
    for channel in 0..n_channels {
        if channel != keep {
            display.slice_mut(s![.., .., channel]).fill(0);
        }
    }
    display
}
