use crate::error::SegmentError;
use crate::invoker::Segmentation;
use artifacts::EncodeInput;
use common::span;
use ndarray::{Array2, Array3};
use preprocess::{resize_image, resize_labels};

/// Arrays handed to the output encoder, all at the same spatial extent.
#[derive(Debug, Clone)]
pub struct RestoredOutputs {
    pub labels: Array2<u16>,
    pub flows: Array3<u8>,
    pub image: Array3<u8>,
}

impl RestoredOutputs {
    pub fn encode_input(&self) -> EncodeInput<'_> {
        EncodeInput {
            labels: self.labels.view(),
            flows: self.flows.view(),
            image: self.image.view(),
        }
    }
}

/// Bring the segmentation and display image back to `original` (height,
/// width) when `keep_size` is set; otherwise pass them through.
///
/// The mask is resized nearest-neighbour so no new labels appear; flow and
/// image are resized bilinearly.
pub fn restore_size(
    segmentation: Segmentation,
    display: Array3<u8>,
    original: (usize, usize),
    keep_size: bool,
) -> Result<RestoredOutputs, SegmentError> {
    let Segmentation { labels, flows, .. } = segmentation;
    let (height, width) = original;
    if !keep_size || labels.dim() == original {
        return Ok(RestoredOutputs {
            labels,
            flows,
            image: display,
        });
    }

    let _s = span!("restore_size");
    tracing::debug!(
        from = ?labels.dim(),
        to = ?original,
        "Restoring outputs to input size"
    );

    Ok(RestoredOutputs {
        labels: resize_labels(&labels.view(), height, width).map_err(SegmentError::PostProcess)?,
        flows: resize_image(&flows.view(), height, width).map_err(SegmentError::PostProcess)?,
        image: resize_image(&display.view(), height, width).map_err(SegmentError::PostProcess)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::s;
    use std::collections::BTreeSet;

    fn segmentation(height: usize, width: usize) -> Segmentation {
        let mut labels = Array2::<u16>::zeros((height, width));
        labels.slice_mut(s![2..10, 3..12]).fill(1);
        labels.slice_mut(s![20..30, 25..40]).fill(2);
        Segmentation {
            labels,
            flows: Array3::from_elem((height, width, 3), 100),
            image: Array3::from_elem((height, width, 3), 50),
        }
    }

    #[test]
    fn test_passthrough_without_keep_size() {
        let seg = segmentation(32, 48);
        let display = seg.image.clone();
        let restored = restore_size(seg, display, (64, 96), false).unwrap();
        assert_eq!(restored.labels.dim(), (32, 48));
        assert_eq!(restored.image.dim(), (32, 48, 3));
    }

    #[test]
    fn test_resize_back_to_original() {
        let seg = segmentation(32, 48);
        let display = seg.image.clone();
        let restored = restore_size(seg, display, (64, 96), true).unwrap();

        assert_eq!(restored.labels.dim(), (64, 96));
        assert_eq!(restored.flows.dim(), (64, 96, 3));
        assert_eq!(restored.image.dim(), (64, 96, 3));
    }

    #[test]
    fn test_nearest_restoration_adds_no_labels() {
        let seg = segmentation(32, 48);
        let before: BTreeSet<u16> = seg.labels.iter().copied().collect();
        let display = seg.image.clone();

        let restored = restore_size(seg, display, (45, 67), true).unwrap();
        let after: BTreeSet<u16> = restored.labels.iter().copied().collect();
        assert!(after.is_subset(&before), "{after:?} not within {before:?}");
    }

    #[test]
    fn test_incompatible_display_is_post_process_error() {
        let seg = segmentation(32, 48);
        let display = Array3::<u8>::zeros((32, 48, 4));
        let err = restore_size(seg, display, (64, 96), true).unwrap_err();
        assert!(matches!(err, SegmentError::PostProcess(_)));
    }
}
