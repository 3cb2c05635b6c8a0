use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ndarray::{Array2, Array3};
use preprocess::{Channels, cap_image, display_image, resize_labels};

/// Create an RGB image with a gradient pattern
fn create_test_image(height: usize, width: usize) -> Array3<u8> {
    Array3::from_shape_fn((height, width, 3), |(y, x, c)| match c {
        0 => (x % 256) as u8,
        1 => (y % 256) as u8,
        _ => ((x + y) % 256) as u8,
    })
}

/// Create a label mask tiled with 32x32 instances
fn create_test_labels(height: usize, width: usize) -> Array2<u16> {
    let cols = width.div_ceil(32);
    Array2::from_shape_fn((height, width), |(y, x)| ((y / 32) * cols + x / 32 + 1) as u16)
}

fn benchmark_cap_image(c: &mut Criterion) {
    let mut group = c.benchmark_group("cap_image");

    let resolutions = [(480, 640), (720, 1280), (1080, 1920), (2160, 3840)];

    for (height, width) in resolutions.iter() {
        let image = create_test_image(*height, *width);

        group.bench_with_input(
            BenchmarkId::new("rgb", format!("{}x{}", width, height)),
            &image,
            |b, image| {
                b.iter(|| cap_image(black_box(&image.view()), black_box(512)).unwrap());
            },
        );
    }

    group.finish();
}

fn benchmark_restore_labels(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize_labels");

    let targets = [(480, 640), (1080, 1920)];
    let labels = create_test_labels(384, 512);

    for (height, width) in targets.iter() {
        group.bench_with_input(
            BenchmarkId::new("nearest", format!("{}x{}", width, height)),
            &(*height, *width),
            |b, &(h, w)| {
                b.iter(|| resize_labels(black_box(&labels.view()), h, w).unwrap());
            },
        );
    }

    group.finish();
}

fn benchmark_display_image(c: &mut Criterion) {
    let image = create_test_image(512, 512);

    c.bench_function("display_grayscale_512", |b| {
        b.iter(|| display_image(black_box(&image.view()), Channels::GRAYSCALE));
    });
    c.bench_function("display_primary_only_512", |b| {
        b.iter(|| display_image(black_box(&image.view()), Channels::new(2, 0)));
    });
}

criterion_group!(
    benches,
    benchmark_cap_image,
    benchmark_restore_labels,
    benchmark_display_image
);
criterion_main!(benches);
