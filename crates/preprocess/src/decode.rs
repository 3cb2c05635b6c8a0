//! Decoding caller-supplied bytes into a height × width × channels array.

use crate::error::PreprocessError;
use image::{DynamicImage, ImageFormat};
use ndarray::Array3;

/// Decoded image, `[height, width, channels]` with 1 or 3 channels.
pub type ImageArray = Array3<u8>;

/// Decode an encoded image.
///
/// `format_hint` is an extension or MIME-like name (`png`, `tif`, `image/jpeg`);
/// without it the format is guessed from the magic bytes. Grayscale inputs keep a
/// single channel, everything else becomes RGB. Alpha is dropped.
pub fn decode_image(bytes: &[u8], format_hint: Option<&str>) -> Result<ImageArray, PreprocessError> {
    let decoded = match format_hint.map(str::trim).filter(|hint| !hint.is_empty()) {
        Some(hint) => {
            let format = parse_format_hint(hint)?;
            image::load_from_memory_with_format(bytes, format)?
        }
        None => image::load_from_memory(bytes)?,
    };

    let array = dynamic_to_array(decoded)?;
    tracing::debug!(shape = ?array.shape(), "Decoded image");
    Ok(array)
}

fn parse_format_hint(hint: &str) -> Result<ImageFormat, PreprocessError> {
    let lowered = hint.to_ascii_lowercase();
    let ext = lowered
        .rsplit(['/', '.'])
        .next()
        .unwrap_or(lowered.as_str());
    ImageFormat::from_extension(ext).ok_or_else(|| PreprocessError::UnknownFormat(hint.to_string()))
}

/// Convert a decoded image into the array layout used by the pipeline.
pub fn dynamic_to_array(image: DynamicImage) -> Result<ImageArray, PreprocessError> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    if width == 0 || height == 0 {
        return Err(PreprocessError::EmptyImage { height, width });
    }

    let (channels, raw) = if image.color().has_color() {
        (3, image.into_rgb8().into_raw())
    } else {
        (1, image.into_luma8().into_raw())
    };

    Array3::from_shape_vec((height, width, channels), raw)
        .map_err(|_| PreprocessError::ChannelCount(channels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    /// Test grayscale PNG keeps a single channel
    #[test]
    fn test_decode_grayscale_png() {
        let gray = GrayImage::from_fn(4, 3, |x, y| Luma([(x + y * 4) as u8]));
        let bytes = encode(DynamicImage::ImageLuma8(gray), ImageFormat::Png);

        let array = decode_image(&bytes, None).unwrap();
        assert_eq!(array.shape(), &[3, 4, 1]);
        assert_eq!(array[[2, 3, 0]], 11, "Row-major layout should be preserved");
    }

    /// Test RGBA input drops alpha and keeps RGB order
    #[test]
    fn test_decode_rgba_drops_alpha() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 40]));
        let bytes = encode(DynamicImage::ImageRgba8(rgba), ImageFormat::Png);

        let array = decode_image(&bytes, Some("png")).unwrap();
        assert_eq!(array.shape(), &[2, 2, 3]);
        assert_eq!(array[[1, 1, 0]], 10);
        assert_eq!(array[[1, 1, 2]], 30);
    }

    /// Test format hints accept MIME types and dotted extensions
    #[test]
    fn test_format_hint_variants() {
        let rgb = RgbImage::from_pixel(3, 3, Rgb([1, 2, 3]));
        let bytes = encode(DynamicImage::ImageRgb8(rgb), ImageFormat::Png);

        assert!(decode_image(&bytes, Some("image/png")).is_ok());
        assert!(decode_image(&bytes, Some(".PNG")).is_ok());
        assert!(decode_image(&bytes, Some("   ")).is_ok(), "Blank hint means guess");
    }

    /// Test unknown hints and garbage bytes surface as errors
    #[test]
    fn test_decode_failures() {
        let err = decode_image(b"not an image", None).unwrap_err();
        assert!(matches!(err, PreprocessError::Decode(_)));

        let err = decode_image(b"not an image", Some("definitely-not-a-format")).unwrap_err();
        assert!(matches!(err, PreprocessError::UnknownFormat(_)));
    }
}
