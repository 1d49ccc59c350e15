//! Benchmarks for geodetic grid assembly.
//!
//! Run with: cargo bench --package geodetic-grid --bench grid_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geodetic_grid::edges::{pixel_corners, pixel_edges};
use geodetic_grid::transform::{core_transform, EllipsoidGeometry, TrigMesh};
use geodetic_grid::{GeodeticGrid, PrecomputedLatLon, ProjectionParameters, Step};
use ndarray::Array2;

/// Full disk axes slightly wider than the Earth, mirrored about nadir.
fn full_disk(size: usize) -> ProjectionParameters {
    let half_extent = 0.16;
    let spacing = 2.0 * half_extent / size as f64;
    let x: Vec<f64> = (0..size)
        .map(|i| -half_extent + spacing * (i as f64 + 0.5))
        .collect();
    let y: Vec<f64> = x.iter().rev().copied().collect();
    ProjectionParameters::goes_east(x, y).unwrap()
}

// =============================================================================
// CORE TRANSFORM
// =============================================================================

fn bench_core_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("core_transform");
    let geometry = EllipsoidGeometry::from_parameters(&full_disk(2));

    for size in [250usize, 1000] {
        let params = full_disk(size);
        let mesh = TrigMesh::from_axes(params.x(), params.y());
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &mesh, |b, mesh| {
            b.iter(|| core_transform(black_box(&geometry), black_box(mesh)))
        });
    }

    group.finish();
}

// =============================================================================
// DIRECT VS FAST
// =============================================================================

fn bench_direct_vs_fast(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembly");
    group.sample_size(20);

    for size in [100usize, 250, 500] {
        let params = full_disk(size);
        group.throughput(Throughput::Elements((size * size) as u64));

        for algorithm in ["direct", "fast"] {
            group.bench_with_input(BenchmarkId::new(algorithm, size), &params, |b, params| {
                b.iter(|| GeodeticGrid::calculate(black_box(params), algorithm, Step::FULL).unwrap())
            });
        }
    }

    group.finish();
}

fn bench_corner_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("corner_assembly");
    group.sample_size(20);
    let params = full_disk(250);

    for algorithm in ["direct[corner]", "fast[corner]"] {
        group.bench_function(algorithm, |b| {
            b.iter(|| GeodeticGrid::calculate(black_box(&params), algorithm, Step::FULL).unwrap())
        });
    }

    group.finish();
}

fn bench_stepped_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("stepped_assembly");
    let params = full_disk(500);

    for step in [2i64, 4, 8] {
        let step = Step::uniform(step).unwrap();
        group.bench_with_input(BenchmarkId::new("fast", step), &step, |b, &step| {
            b.iter(|| GeodeticGrid::calculate(black_box(&params), "fast", step).unwrap())
        });
    }

    group.finish();
}

// =============================================================================
// EDGES AND PRECOMPUTED
// =============================================================================

fn bench_edges(c: &mut Criterion) {
    let mut group = c.benchmark_group("edges");
    let centers: Vec<f64> = full_disk(5424).x().to_vec();

    group.bench_function("pixel_edges_5424", |b| {
        b.iter(|| pixel_edges(black_box(&centers)).unwrap())
    });

    let lat = Array2::from_shape_fn((500, 500), |(r, _)| 50.0 - r as f64 * 0.02);
    let lon = Array2::from_shape_fn((500, 500), |(_, c)| -100.0 + c as f64 * 0.02);
    group.bench_function("pixel_corners_500", |b| {
        b.iter(|| pixel_corners(black_box(&lat), black_box(&lon)))
    });

    group.finish();
}

fn bench_precomputed(c: &mut Criterion) {
    let mut group = c.benchmark_group("precomputed");
    let lat = Array2::from_shape_fn((1000, 1000), |(r, _)| 50.0 - r as f32 * 0.02);
    let lon = Array2::from_shape_fn((1000, 1000), |(_, c)| -100.0 + c as f32 * 0.02);
    let input = PrecomputedLatLon::new(lat, lon).with_fill_value(-999.0);

    for (name, step, corners) in [
        ("full", Step::FULL, false),
        ("step_4", Step::uniform(4).unwrap(), false),
        ("corner", Step::FULL, true),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| GeodeticGrid::from_precomputed(black_box(&input), step, corners).unwrap())
        });
    }

    group.finish();
}

criterion_group!(transform_benches, bench_core_transform);

criterion_group!(
    assembly_benches,
    bench_direct_vs_fast,
    bench_corner_assembly,
    bench_stepped_assembly,
);

criterion_group!(edge_benches, bench_edges, bench_precomputed);

criterion_main!(transform_benches, assembly_benches, edge_benches);
