//! Performance benchmarks for landmark-lib
//!
//! Run with: cargo bench --package landmark-lib

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use landmark_lib::{BoundaryCapture, Coordinate, Location, MemoryStore, Polygon};
use std::hint::black_box;

/// Generate landmarks scattered over a city-sized area around (base_lat, base_lng)
fn generate_locations(count: usize, base_lat: f64, base_lng: f64) -> Vec<Location> {
    (0..count)
        .map(|i| {
            let t = i as f64 / count as f64;
            let lat = base_lat + (t * 7919.0).fract() * 0.1;
            let lng = base_lng + (t * 104729.0).fract() * 0.1;
            Location::new(
                format!("landmark-{i:07}"),
                "",
                Coordinate::new(lat, lng),
                vec!["point_of_interest".to_string()],
            )
        })
        .collect()
}

/// A wobbly closed loop, like a hand-drawn circle, with `vertices` points
fn generate_lasso(vertices: usize, center_lat: f64, center_lng: f64, radius: f64) -> Polygon {
    let points = (0..vertices)
        .map(|i| {
            let a = i as f64 / vertices as f64 * std::f64::consts::TAU;
            let r = radius * (1.0 + 0.1 * (a * 7.0).sin());
            Coordinate::new(center_lat + r * a.sin(), center_lng + r * a.cos())
        })
        .collect();
    Polygon::close(points).expect("non-empty lasso")
}

fn bench_store_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_build");

    for count in [10_000usize, 100_000] {
        let locations = generate_locations(count, 24.75, 120.95);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &locations, |b, l| {
            b.iter(|| MemoryStore::new(black_box(l.clone())))
        });
    }

    group.finish();
}

fn bench_polygon_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("polygon_query");

    let store = MemoryStore::new(generate_locations(100_000, 24.75, 120.95));

    for vertices in [16usize, 256, 2048] {
        let lasso = generate_lasso(vertices, 24.8, 121.0, 0.02);
        group.bench_with_input(BenchmarkId::new("vertices", vertices), &lasso, |b, p| {
            b.iter(|| store.query_within(black_box(p)))
        });
    }

    group.finish();
}

fn bench_capture(c: &mut Criterion) {
    let mut group = c.benchmark_group("capture");

    // Pointer-move stream with many near-duplicate samples
    let samples: Vec<Coordinate> = (0..20_000)
        .map(|i| {
            let a = i as f64 / 20_000.0 * std::f64::consts::TAU;
            Coordinate::new(24.8 + 0.02 * a.sin(), 121.0 + 0.02 * a.cos())
        })
        .collect();

    group.throughput(Throughput::Elements(samples.len() as u64));
    group.bench_function("gesture_20k_moves", |b| {
        b.iter(|| {
            let mut capture = BoundaryCapture::default();
            capture.begin(samples[0]);
            for point in &samples[1..] {
                capture.extend(*point);
            }
            black_box(capture.end())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_store_build, bench_polygon_query, bench_capture);
criterion_main!(benches);
