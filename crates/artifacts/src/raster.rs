//! PNG encodings of the raw arrays.

use crate::error::EncodeError;
use base64::{Engine, engine::general_purpose::STANDARD};
use image::{DynamicImage, GrayImage, ImageBuffer, ImageFormat, Luma, RgbImage};
use ndarray::{Array2, ArrayView2, ArrayView3};
use std::io::Cursor;

pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// 16-bit grayscale PNG of a label mask, one sample per label value.
pub fn encode_labels_png(labels: &ArrayView2<u16>) -> Result<Vec<u8>, EncodeError> {
    let (height, width) = labels.dim();
    let buffer: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_raw(width as u32, height as u32, labels.iter().copied().collect())
            .ok_or_else(|| EncodeError::Shape(format!("label mask {height}x{width}")))?;
    write_png(DynamicImage::ImageLuma16(buffer))
}

/// Inverse of [`encode_labels_png`].
pub fn decode_labels_png(bytes: &[u8]) -> Result<Array2<u16>, EncodeError> {
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.into_luma16();
    let (width, height) = decoded.dimensions();
    Array2::from_shape_vec((height as usize, width as usize), decoded.into_raw())
        .map_err(|e| EncodeError::Shape(e.to_string()))
}

/// 8-bit PNG of an image with 1 (grayscale) or 3 (RGB) channels.
pub fn encode_image_png(image: &ArrayView3<u8>) -> Result<Vec<u8>, EncodeError> {
    let (height, width, channels) = image.dim();
    let data: Vec<u8> = image.iter().copied().collect();
    let shape_error = || EncodeError::Shape(format!("image {height}x{width}x{channels}"));

    let dynamic = match channels {
        1 => DynamicImage::ImageLuma8(
            GrayImage::from_raw(width as u32, height as u32, data).ok_or_else(shape_error)?,
        ),
        3 => DynamicImage::ImageRgb8(
            RgbImage::from_raw(width as u32, height as u32, data).ok_or_else(shape_error)?,
        ),
        _ => return Err(shape_error()),
    };
    write_png(dynamic)
}

fn write_png(image: DynamicImage) -> Result<Vec<u8>, EncodeError> {
    let mut png_bytes = Cursor::new(Vec::new());
    image.write_to(&mut png_bytes, ImageFormat::Png)?;
    Ok(png_bytes.into_inner())
}
