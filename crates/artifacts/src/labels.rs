//! Per-label bounding boxes and binary crops shared by the contour tracers.

use image::{GrayImage, Luma};
use ndarray::ArrayView2;
use std::collections::BTreeMap;

/// Inclusive bounding box of one instance label, in (row, col) pixel indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LabelRegion {
    pub label: u16,
    pub min_row: usize,
    pub min_col: usize,
    pub max_row: usize,
    pub max_col: usize,
}

impl LabelRegion {
    fn new(label: u16, row: usize, col: usize) -> Self {
        Self {
            label,
            min_row: row,
            min_col: col,
            max_row: row,
            max_col: col,
        }
    }

    fn include(&mut self, row: usize, col: usize) {
        self.min_row = self.min_row.min(row);
        self.min_col = self.min_col.min(col);
        self.max_row = self.max_row.max(row);
        self.max_col = self.max_col.max(col);
    }

    /// Offset to add to a crop coordinate to land back in the full mask.
    ///
    /// Crops carry one pixel of background padding on every side.
    pub fn origin(&self) -> (f64, f64) {
        (self.min_col as f64 - 1.0, self.min_row as f64 - 1.0)
    }

    /// Binary crop of this label, 255 inside and 0 elsewhere, padded by one
    /// pixel so border following never touches the image edge.
    pub fn crop(&self, labels: &ArrayView2<u16>) -> GrayImage {
        let width = (self.max_col - self.min_col + 3) as u32;
        let height = (self.max_row - self.min_row + 3) as u32;
        let mut crop = GrayImage::new(width, height);
        for row in self.min_row..=self.max_row {
            for col in self.min_col..=self.max_col {
                if labels[[row, col]] == self.label {
                    let x = (col - self.min_col + 1) as u32;
                    let y = (row - self.min_row + 1) as u32;
                    crop.put_pixel(x, y, Luma([255]));
                }
            }
        }
        crop
    }
}

/// Bounding box of every non-zero label, ordered by label.
pub(crate) fn label_regions(labels: &ArrayView2<u16>) -> Vec<LabelRegion> {
    let mut regions: BTreeMap<u16, LabelRegion> = BTreeMap::new();
    for ((row, col), &label) in labels.indexed_iter() {
        if label == 0 {
            continue;
        }
        regions
            .entry(label)
            .and_modify(|region| region.include(row, col))
            .or_insert_with(|| LabelRegion::new(label, row, col));
    }
    regions.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_regions_are_sorted_with_tight_bounds() {
        let labels = array![[0u16, 0, 3], [2, 2, 3], [0, 2, 0]];
        let regions = label_regions(&labels.view());

        assert_eq!(regions.len(), 2);
        assert_eq!(
            regions[0],
            LabelRegion {
                label: 2,
                min_row: 1,
                min_col: 0,
                max_row: 2,
                max_col: 1
            }
        );
        assert_eq!(regions[1].label, 3);
        assert_eq!((regions[1].min_row, regions[1].max_row), (0, 1));
    }

    #[test]
    fn test_crop_is_padded_binary() {
        let labels = array![[1u16, 1], [0, 5]];
        let regions = label_regions(&labels.view());
        let crop = regions[0].crop(&labels.view());

        assert_eq!(crop.dimensions(), (4, 3));
        assert_eq!(crop.get_pixel(1, 1)[0], 255);
        assert_eq!(crop.get_pixel(2, 1)[0], 255);
        assert_eq!(crop.get_pixel(0, 0)[0], 0);
        // Label 5 falls outside region 1's box and must not leak in.
        assert_eq!(crop.get_pixel(2, 2)[0], 0);
        assert_eq!(regions[0].origin(), (-1.0, -1.0));
    }

    #[test]
    fn test_background_only_has_no_regions() {
        let labels = ndarray::Array2::<u16>::zeros((4, 4));
        assert!(label_regions(&labels.view()).is_empty());
    }
}
