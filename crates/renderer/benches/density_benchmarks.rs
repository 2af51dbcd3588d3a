//! Benchmarks for the renderer crate - marker compositing and PNG encoding.
//!
//! Run with: cargo bench --package renderer --bench density_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use map_common::{CanvasSize, PixelPoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use renderer::{png, Basemap, DensityRenderer, DensityStyle, JitteredRadius};

/// Scatter `count` points over the canvas with a fixed seed.
fn generate_points(canvas: CanvasSize, count: usize) -> Vec<PixelPoint> {
    let mut rng = StdRng::seed_from_u64(17);
    (0..count)
        .map(|_| PixelPoint::new(rng.gen_range(0..canvas.width), rng.gen_range(0..canvas.height)))
        .collect()
}

fn bench_composite_markers(c: &mut Criterion) {
    let mut group = c.benchmark_group("composite_markers");
    group.sample_size(20);

    let canvas = CanvasSize::REFERENCE;
    let basemap = Basemap::blank(canvas, [0, 0, 0]);
    let renderer = DensityRenderer::new(&DensityStyle::default()).unwrap();

    // A few hundred prefixes is typical; the dataset has ~1600 in total
    for count in [10, 200, 1600] {
        let points = generate_points(canvas, count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("reference_canvas", count), &points, |b, points| {
            b.iter(|| {
                let mut radii = JitteredRadius::seeded(3);
                black_box(renderer.render(&basemap, points.iter().copied(), &mut radii))
            });
        });
    }

    group.finish();
}

fn bench_png_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_encoding");
    group.sample_size(20);

    let renderer = DensityRenderer::new(&DensityStyle::default()).unwrap();
    let sizes = [(400, 300), (1622, 704), (3244, 1408)];

    for (width, height) in sizes {
        let canvas = CanvasSize::new(width, height);
        let render = renderer.render(
            &Basemap::blank(canvas, [0, 0, 0]),
            generate_points(canvas, 200),
            &mut JitteredRadius::seeded(3),
        );

        group.throughput(Throughput::Bytes(canvas.pixel_count() as u64 * 4));

        group.bench_with_input(
            BenchmarkId::new("opaque_rgb", format!("{}x{}", width, height)),
            &render.image,
            |b, image| {
                b.iter(|| png::encode_image(black_box(image)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_composite_markers, bench_png_encoding);
criterion_main!(benches);
