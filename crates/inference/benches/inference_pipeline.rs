use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use inference::processing::{
    post::{crop_masks, relabel_sequential},
    pre::{pack_input, padded_side},
};
use ndarray::{Array, Array2, Array3, IxDyn};
use preprocess::Channels;

/// Create an RGB test image with a gradient pattern
fn create_test_image(height: usize, width: usize) -> Array3<u8> {
    Array3::from_shape_fn((height, width, 3), |(y, x, c)| match c {
        0 => (x % 256) as u8,
        1 => (y % 256) as u8,
        _ => ((x * y) % 256) as u8,
    })
}

/// Create mock model mask output with sparse, non-contiguous instance ids
fn create_mock_masks(height: usize, width: usize) -> Array<i64, IxDyn> {
    let (padded_h, padded_w) = (padded_side(height), padded_side(width));
    Array::from_shape_fn(IxDyn(&[1, padded_h, padded_w]), |idx| {
        let (y, x) = (idx[1], idx[2]);
        if y % 24 < 18 && x % 24 < 18 {
            (((y / 24) * 64 + x / 24) * 7 + 3) as i64
        } else {
            0
        }
    })
}

fn benchmark_preprocessing(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocessing");

    let resolutions = [(256, 256), (384, 512), (512, 512)];

    for (height, width) in resolutions.iter() {
        let image = create_test_image(*height, *width);

        group.bench_with_input(
            BenchmarkId::new("pack_input", format!("{}x{}", width, height)),
            &image,
            |b, image| {
                b.iter(|| {
                    pack_input(black_box(&image.view()), Channels::new(2, 3), black_box(false))
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

fn benchmark_postprocessing(c: &mut Criterion) {
    let mut group = c.benchmark_group("postprocessing");

    let resolutions = [(256, 256), (512, 512)];

    for (height, width) in resolutions.iter() {
        let masks = create_mock_masks(*height, *width);
        let cropped: Array2<u32> = crop_masks(&masks.view(), *height, *width).unwrap();

        group.bench_with_input(
            BenchmarkId::new("crop_masks", format!("{}x{}", width, height)),
            &masks,
            |b, masks| {
                b.iter(|| crop_masks(black_box(&masks.view()), *height, *width).unwrap());
            },
        );

        group.bench_with_input(
            BenchmarkId::new("relabel_sequential", format!("{}x{}", width, height)),
            &cropped,
            |b, cropped| {
                b.iter(|| relabel_sequential(black_box(&cropped.view())).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_preprocessing, benchmark_postprocessing);
criterion_main!(benches);
