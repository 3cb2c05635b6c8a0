use common::span;
use ndarray::{Array2, Array4, ArrayView2, ArrayView3, Axis, s};
use preprocess::Channels;

/// Spatial sides of the network input must be multiples of this.
pub const PAD_MULTIPLE: usize = 16;

const LOWER_PERCENTILE: f32 = 1.0;
const UPPER_PERCENTILE: f32 = 99.0;

/// Smallest multiple of [`PAD_MULTIPLE`] holding `side`.
pub fn padded_side(side: usize) -> usize {
    side.div_ceil(PAD_MULTIPLE).max(1) * PAD_MULTIPLE
}

/// Pack an 8-bit image into the `[1, 2, H, W]` network input.
///
/// Channel 0 holds the primary plane (the mean of all channels when the
/// primary index is 0), channel 1 the secondary plane (zeros when the index
/// is 0). Each plane is stretched so its 1st and 99th percentiles land on 0
/// and 1. The primary plane is inverted after normalization when requested.
/// Bottom and right are zero padded up to [`PAD_MULTIPLE`].
pub fn pack_input(
    image: &ArrayView3<u8>,
    channels: Channels,
    invert: bool,
) -> anyhow::Result<Array4<f32>> {
    let _s = span!("pack_input");

    let (height, width, _) = image.dim();
    let mut primary = normalize99(&select_plane(image, channels.primary)?.view());
    if invert {
        primary.mapv_inplace(|v| 1.0 - v);
    }

    let mut input = Array4::<f32>::zeros((1, 2, padded_side(height), padded_side(width)));
    input.slice_mut(s![0, 0, ..height, ..width]).assign(&primary);
    if channels.secondary != 0 {
        let secondary = normalize99(&select_plane(image, channels.secondary)?.view());
        input.slice_mut(s![0, 1, ..height, ..width]).assign(&secondary);
    }
    Ok(input)
}

/// Plane for a 1-based channel index, or the per-pixel mean for index 0.
fn select_plane(image: &ArrayView3<u8>, index: u8) -> anyhow::Result<Array2<f32>> {
    let channels = image.dim().2;
    if index == 0 {
        return image
            .mapv(f32::from)
            .mean_axis(Axis(2))
            .ok_or_else(|| anyhow::anyhow!("Image has no channels"));
    }

    let axis = usize::from(index) - 1;
    if axis >= channels {
        anyhow::bail!("Channel {index} requested from a {channels}-channel image");
    }
    Ok(image.index_axis(Axis(2), axis).mapv(f32::from))
}

/// Linear stretch of `plane` from its 1st..99th percentile range to 0..1.
///
/// A flat plane (no spread between the percentiles) maps to zeros.
pub fn normalize99(plane: &ArrayView2<f32>) -> Array2<f32> {
    let mut sorted: Vec<f32> = plane.iter().copied().collect();
    sorted.sort_by(f32::total_cmp);

    let low = percentile(&sorted, LOWER_PERCENTILE);
    let high = percentile(&sorted, UPPER_PERCENTILE);
    let range = high - low;
    if range <= f32::EPSILON {
        return Array2::zeros(plane.raw_dim());
    }
    plane.mapv(|v| (v - low) / range)
}

/// Percentile of sorted data with linear interpolation between ranks.
fn percentile(sorted: &[f32], p: f32) -> f32 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = p / 100.0 * (n - 1) as f32;
            let below = rank.floor() as usize;
            let above = (below + 1).min(n - 1);
            let weight = rank - below as f32;
            sorted[below] + (sorted[above] - sorted[below]) * weight
        }
    }
}
