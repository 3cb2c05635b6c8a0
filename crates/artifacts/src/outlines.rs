use crate::error::EncodeError;
use crate::labels::label_regions;
use imageproc::contours::{BorderType, Contour, find_contours};
use ndarray::ArrayView2;

/// Closed outline as `[x, y]` pixel positions (column, row).
pub type Outline = Vec<[f32; 2]>;

/// Traces instance boundaries in a label mask.
pub trait OutlineExtractor: Send + Sync {
    fn extract_outlines(&self, labels: &ArrayView2<u16>) -> Result<Vec<Outline>, EncodeError>;
}

/// Outer borders of every instance, traced label by label with
/// Suzuki-Abe border following. Outlines come out in label order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContourOutlines;

impl OutlineExtractor for ContourOutlines {
    fn extract_outlines(&self, labels: &ArrayView2<u16>) -> Result<Vec<Outline>, EncodeError> {
        let mut outlines = Vec::new();
        for region in label_regions(labels) {
            let (dx, dy) = region.origin();
            let contours: Vec<Contour<u32>> = find_contours(&region.crop(labels));
            outlines.extend(
                contours
                    .into_iter()
                    .filter(|contour| contour.border_type == BorderType::Outer)
                    .map(|contour| {
                        contour
                            .points
                            .into_iter()
                            .map(|p| [(f64::from(p.x) + dx) as f32, (f64::from(p.y) + dy) as f32])
                            .collect()
                    }),
            );
        }
        tracing::trace!(count = outlines.len(), "Extracted outlines");
        Ok(outlines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_square_outline_follows_border_pixels() {
        let mut labels = Array2::<u16>::zeros((10, 10));
        labels.slice_mut(ndarray::s![2..5, 3..7]).fill(1);

        let outlines = ContourOutlines.extract_outlines(&labels.view()).unwrap();
        assert_eq!(outlines.len(), 1);

        let outline = &outlines[0];
        for &[x, y] in outline {
            let on_border = x == 3.0 || x == 6.0 || y == 2.0 || y == 4.0;
            assert!(on_border, "Point ({x}, {y}) is not on the square border");
        }
        assert!(outline.contains(&[3.0, 2.0]));
        assert!(outline.contains(&[6.0, 4.0]));
    }

    #[test]
    fn test_one_outline_per_instance_and_holes_skipped() {
        let mut labels = Array2::<u16>::zeros((12, 12));
        // Ring with a hole: only its outer border counts.
        labels.slice_mut(ndarray::s![1..6, 1..6]).fill(1);
        labels[[3, 3]] = 0;
        labels.slice_mut(ndarray::s![8..10, 8..11]).fill(2);

        let outlines = ContourOutlines.extract_outlines(&labels.view()).unwrap();
        assert_eq!(outlines.len(), 2);
        assert!(outlines[0].contains(&[1.0, 1.0]));
        assert!(outlines[1].contains(&[8.0, 8.0]));
    }

    #[test]
    fn test_empty_mask_has_no_outlines() {
        let labels = Array2::<u16>::zeros((5, 5));
        assert!(
            ContourOutlines
                .extract_outlines(&labels.view())
                .unwrap()
                .is_empty()
        );
    }
}
