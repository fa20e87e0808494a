//! Benchmarks for the nearest-neighbour backends.
//!
//! Run with: cargo bench -p vakra --bench matching

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use vakra::core::Point2D;
use vakra::curves::{CurveMatcher, CurveRecord};
use vakra::matching::{MatcherBackend, SpatialMatcher};

fn random_points(seed: u64, n: usize, extent: f64) -> Vec<Point2D> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| Point2D::new(rng.random_range(0.0..extent), rng.random_range(0.0..extent)))
        .collect()
}

fn bench_nearest_within(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest_within");

    for &n in &[1_000usize, 10_000, 50_000] {
        // Same density at every size: ~1 point per 100 m²
        let extent = (n as f64 * 100.0).sqrt();
        let a = random_points(1, n, extent);
        let b = random_points(2, n * 2, extent);
        group.throughput(Throughput::Elements(n as u64));

        for backend in [MatcherBackend::Tree, MatcherBackend::Grid] {
            let matcher = SpatialMatcher::new(backend);
            group.bench_with_input(
                BenchmarkId::new(format!("{backend:?}"), n),
                &(&a, &b),
                |bench, (a, b)| {
                    bench.iter(|| {
                        black_box(matcher.nearest_within(a, b, 50.0, None).unwrap());
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_curve_matching(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(3);
    let curve = |i: usize, p: Point2D, rng: &mut StdRng| CurveRecord {
        curve_id: format!("c_{i}"),
        source: "bench".into(),
        line_id: format!("l_{i}"),
        n_points: 5,
        arc_length_m: rng.random_range(20.0..200.0),
        kappa_max: Some(0.01),
        radius_min: Some(100.0),
        radius_robust: Some(120.0),
        apex_x: p.x,
        apex_y: p.y,
        class: None,
    };
    let a: Vec<CurveRecord> = random_points(4, 5_000, 20_000.0)
        .into_iter()
        .enumerate()
        .map(|(i, p)| curve(i, p, &mut rng))
        .collect();
    let b: Vec<CurveRecord> = random_points(5, 5_000, 20_000.0)
        .into_iter()
        .enumerate()
        .map(|(i, p)| curve(i, p, &mut rng))
        .collect();

    let matcher = CurveMatcher::default();
    c.bench_function("match_curves_5000", |bench| {
        bench.iter(|| black_box(matcher.match_curves(&a, &b).unwrap()));
    });
}

criterion_group!(benches, bench_nearest_within, bench_curve_matching);
criterion_main!(benches);
