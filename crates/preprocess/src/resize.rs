use crate::error::PreprocessError;
use common::span;
use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image, ImageRef},
};
use ndarray::{Array2, Array3, ArrayView2, ArrayView3};

/// Default cap on the longest side of the image fed to the model.
pub const DEFAULT_MAX_SIDE: usize = 512;

/// Size whose longest side is at most `max_side`, aspect ratio preserved.
///
/// The longer side is clamped to the cap and the shorter one scaled and
/// rounded to the nearest pixel (never below 1). Images already within the
/// cap keep their size.
pub fn capped_size(height: usize, width: usize, max_side: usize) -> (usize, usize) {
    if height.max(width) <= max_side {
        return (height, width);
    }

    let scale_side = |side: usize, longest: usize| -> usize {
        ((side as f64 * max_side as f64 / longest as f64).round() as usize).max(1)
    };

    if height > width {
        (max_side, scale_side(width, height))
    } else {
        (scale_side(height, width), max_side)
    }
}

/// Size after multiplying both sides by `factor`, rounded, never below 1.
pub fn rescaled_size(height: usize, width: usize, factor: f32) -> (usize, usize) {
    let scale = |side: usize| ((side as f64 * f64::from(factor)).round() as usize).max(1);
    (scale(height), scale(width))
}

/// Downscale `image` so its longest side fits `max_side`.
pub fn cap_image(image: &ArrayView3<u8>, max_side: usize) -> Result<Array3<u8>, PreprocessError> {
    let (height, width) = (image.shape()[0], image.shape()[1]);
    let (new_height, new_width) = capped_size(height, width, max_side);
    if (new_height, new_width) != (height, width) {
        tracing::debug!(
            height,
            width,
            new_height,
            new_width,
            "Capping image size before inference"
        );
    }
    resize_image(image, new_height, new_width)
}

/// Bilinear resize of an 8-bit image with 1 or 3 channels.
pub fn resize_image(
    image: &ArrayView3<u8>,
    height: usize,
    width: usize,
) -> Result<Array3<u8>, PreprocessError> {
    let _s = span!("resize_image");

    let (src_height, src_width, channels) = image.dim();
    check_dims(src_height, src_width)?;
    check_dims(height, width)?;
    if (src_height, src_width) == (height, width) {
        return Ok(image.to_owned());
    }

    let pixel_type = match channels {
        1 => PixelType::U8,
        3 => PixelType::U8x3,
        other => return Err(PreprocessError::ChannelCount(other)),
    };

    let contiguous = image.as_standard_layout();
    let pixels = contiguous
        .as_slice()
        .ok_or_else(|| PreprocessError::Resize("image is not contiguous".to_string()))?;

    let resized = resize_buffer(
        pixels,
        (src_width, src_height),
        (width, height),
        pixel_type,
        ResizeAlg::Convolution(FilterType::Bilinear),
    )?;

    Array3::from_shape_vec((height, width, channels), resized)
        .map_err(|e| PreprocessError::Resize(e.to_string()))
}

/// Nearest-neighbour resize of a label mask.
///
/// Every output value is copied from some input pixel, so no label appears
/// that was not present before.
pub fn resize_labels(
    labels: &ArrayView2<u16>,
    height: usize,
    width: usize,
) -> Result<Array2<u16>, PreprocessError> {
    let _s = span!("resize_labels");

    let (src_height, src_width) = labels.dim();
    check_dims(src_height, src_width)?;
    check_dims(height, width)?;
    if (src_height, src_width) == (height, width) {
        return Ok(labels.to_owned());
    }

    let bytes: Vec<u8> = labels.iter().flat_map(|v| v.to_ne_bytes()).collect();
    let resized = resize_buffer(
        &bytes,
        (src_width, src_height),
        (width, height),
        PixelType::U16,
        ResizeAlg::Nearest,
    )?;

    let values: Vec<u16> = resized
        .chunks_exact(2)
        .map(|b| u16::from_ne_bytes([b[0], b[1]]))
        .collect();

    Array2::from_shape_vec((height, width), values).map_err(|e| PreprocessError::Resize(e.to_string()))
}

fn resize_buffer(
    pixels: &[u8],
    (src_width, src_height): (usize, usize),
    (dst_width, dst_height): (usize, usize),
    pixel_type: PixelType,
    algorithm: ResizeAlg,
) -> Result<Vec<u8>, PreprocessError> {
    let src = ImageRef::new(src_width as u32, src_height as u32, pixels, pixel_type)?;
    let mut dst = Image::new(dst_width as u32, dst_height as u32, pixel_type);

    Resizer::new().resize(&src, &mut dst, &ResizeOptions::new().resize_alg(algorithm))?;

    Ok(dst.into_vec())
}

fn check_dims(height: usize, width: usize) -> Result<(), PreprocessError> {
    if height == 0 || width == 0 {
        return Err(PreprocessError::EmptyImage { height, width });
    }
    Ok(())
}
