use crate::error::EncodeError;
use ndarray::{Array3, ArrayView2, ArrayView3, Axis};

/// Colours instance labels over the display image.
pub trait OverlayRenderer: Send + Sync {
    fn render_overlay(
        &self,
        image: &ArrayView3<u8>,
        labels: &ArrayView2<u16>,
    ) -> Result<Array3<u8>, EncodeError>;
}

/// Golden-ratio hue step, so neighbouring labels get distant colours.
const HUE_STEP: f32 = 0.618_034;

/// HSV overlay: each label gets a fixed hue at full saturation, with the
/// value taken from the normalized image brightness. Background pixels keep
/// the normalized grayscale.
#[derive(Debug, Clone, Copy, Default)]
pub struct HueOverlay;

impl HueOverlay {
    pub fn hue(label: u16) -> f32 {
        (f32::from(label) * HUE_STEP).fract()
    }
}

impl OverlayRenderer for HueOverlay {
    fn render_overlay(
        &self,
        image: &ArrayView3<u8>,
        labels: &ArrayView2<u16>,
    ) -> Result<Array3<u8>, EncodeError> {
        let (height, width, _) = image.dim();
        if labels.dim() != (height, width) {
            return Err(EncodeError::Overlay(format!(
                "mask is {:?} but image is {:?}",
                labels.dim(),
                (height, width)
            )));
        }

        let gray = image
            .mapv(f32::from)
            .mean_axis(Axis(2))
            .ok_or_else(|| EncodeError::Overlay("image has no channels".to_string()))?;
        let max = gray.iter().copied().fold(0.0f32, f32::max);

        let mut overlay = Array3::<u8>::zeros((height, width, 3));
        for ((row, col), &label) in labels.indexed_iter() {
            let value = if max > 0.0 { gray[[row, col]] / max } else { 1.0 };
            let rgb = if label == 0 {
                let v = (value * 255.0).round() as u8;
                [v, v, v]
            } else {
                hsv_to_rgb(Self::hue(label), 1.0, value)
            };
            for (channel, v) in rgb.into_iter().enumerate() {
                overlay[[row, col, channel]] = v;
            }
        }
        Ok(overlay)
    }
}

/// HSV with all components in [0, 1] to 8-bit RGB.
fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> [u8; 3] {
    let h = (hue.rem_euclid(1.0)) * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * f);
    let t = value * (1.0 - saturation * (1.0 - f));
    let (r, g, b) = match sector as u8 {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    };
    let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    [to_u8(r), to_u8(g), to_u8(b)]
}
