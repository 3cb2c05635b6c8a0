use common::span_debug;
use ndarray::{Array2, Array3, ArrayView2, ArrayViewD, Ix3, Ix4, s};
use std::collections::HashMap;

/// Drop the batch axis and padding from a `[1, H', W']` mask output.
///
/// Negative ids are rejected; the model only emits 0 and positive ids.
pub fn crop_masks<T>(masks: &ArrayViewD<T>, height: usize, width: usize) -> anyhow::Result<Array2<u32>>
where
    T: Copy + Into<i64>,
{
    let masks = masks
        .view()
        .into_dimensionality::<Ix3>()
        .map_err(|e| anyhow::anyhow!("Unexpected mask output shape {:?}: {e}", masks.shape()))?;
    check_extent(masks.shape(), height, width, "mask")?;

    let mut cropped = Array2::<u32>::zeros((height, width));
    for ((row, col), value) in masks.slice(s![0, ..height, ..width]).indexed_iter() {
        let id: i64 = (*value).into();
        cropped[[row, col]] = u32::try_from(id)
            .map_err(|_| anyhow::anyhow!("Mask id {id} at ({row}, {col}) is out of range"))?;
    }
    Ok(cropped)
}

/// Drop the batch axis and padding from a `[1, H', W', 3]` flow output.
pub fn crop_flows(flows: &ArrayViewD<u8>, height: usize, width: usize) -> anyhow::Result<Array3<u8>> {
    let flows = flows
        .view()
        .into_dimensionality::<Ix4>()
        .map_err(|e| anyhow::anyhow!("Unexpected flow output shape {:?}: {e}", flows.shape()))?;
    check_extent(flows.shape(), height, width, "flow")?;
    if flows.shape()[3] != 3 {
        anyhow::bail!("Flow output has {} channels, expected 3", flows.shape()[3]);
    }
    Ok(flows.slice(s![0, ..height, ..width, ..]).to_owned())
}

fn check_extent(shape: &[usize], height: usize, width: usize, what: &str) -> anyhow::Result<()> {
    if shape[0] != 1 || shape[1] < height || shape[2] < width {
        anyhow::bail!("{what} output {shape:?} cannot hold a {height}x{width} image");
    }
    Ok(())
}

/// Renumber instance ids to `1..=n` in raster order, keeping 0 as background.
///
/// Fails when there are more instances than a 16-bit mask can carry.
pub fn relabel_sequential(masks: &ArrayView2<u32>) -> anyhow::Result<Array2<u16>> {
    let _s = span_debug!("relabel_sequential");
    let mut mapping: HashMap<u32, u16> = HashMap::new();
    let mut relabeled = Array2::<u16>::zeros(masks.raw_dim());

    for (out, &id) in relabeled.iter_mut().zip(masks.iter()) {
        if id == 0 {
            continue;
        }
        let next = mapping.len() + 1;
        let label = match mapping.get(&id) {
            Some(&label) => label,
            None => {
                let label = u16::try_from(next).map_err(|_| {
                    anyhow::anyhow!("More than {} instances do not fit a 16-bit mask", u16::MAX)
                })?;
                mapping.insert(id, label);
                label
            }
        };
        *out = label;
    }
    Ok(relabeled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, IxDyn, array};

    #[test]
    fn test_crop_masks_removes_padding() {
        let raw = Array::from_shape_fn(IxDyn(&[1, 16, 16]), |idx| (idx[1] * 16 + idx[2]) as i64);
        let cropped = crop_masks(&raw.view(), 3, 5).unwrap();
        assert_eq!(cropped.dim(), (3, 5));
        assert_eq!(cropped[[2, 4]], 36);
    }

    #[test]
    fn test_crop_masks_accepts_i32_and_rejects_negative() {
        let mut raw = Array::<i32, _>::zeros(IxDyn(&[1, 16, 16]));
        assert!(crop_masks(&raw.view(), 16, 16).is_ok());

        raw[[0, 0, 0]] = -1;
        assert!(crop_masks(&raw.view(), 16, 16).is_err());
    }

    #[test]
    fn test_crop_rejects_bad_shapes() {
        let raw = Array::<i64, _>::zeros(IxDyn(&[16, 16]));
        assert!(crop_masks(&raw.view(), 4, 4).is_err());

        let raw = Array::<i64, _>::zeros(IxDyn(&[1, 8, 8]));
        assert!(crop_masks(&raw.view(), 10, 4).is_err());

        let flows = Array::<u8, _>::zeros(IxDyn(&[1, 16, 16, 2]));
        assert!(crop_flows(&flows.view(), 4, 4).is_err());
    }

    #[test]
    fn test_crop_flows() {
        let flows = Array::from_shape_fn(IxDyn(&[1, 16, 32, 3]), |idx| idx[3] as u8);
        let cropped = crop_flows(&flows.view(), 10, 20).unwrap();
        assert_eq!(cropped.dim(), (10, 20, 3));
        assert_eq!(cropped[[9, 19, 2]], 2);
    }

    #[test]
    fn test_relabel_sequential_in_raster_order() {
        let masks = array![[0u32, 900, 900], [42, 0, 7], [42, 42, 0]];
        let relabeled = relabel_sequential(&masks.view()).unwrap();
        assert_eq!(relabeled, array![[0u16, 1, 1], [2, 0, 3], [2, 2, 0]]);
    }

    #[test]
    fn test_relabel_overflow_fails() {
        let masks = Array2::from_shape_fn((256, 257), |(r, c)| (r * 257 + c + 1) as u32);
        assert!(relabel_sequential(&masks.view()).is_err());
    }
}
