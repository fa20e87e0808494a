//! Shared fixtures for integration tests.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use vakra::core::Point2D;

/// Uniform random points in `[0, extent)²`.
pub fn random_points(seed: u64, n: usize, extent: f64) -> Vec<Point2D> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| Point2D::new(rng.random_range(0.0..extent), rng.random_range(0.0..extent)))
        .collect()
}

/// Points of `y = x² / (2·r0)` for `x` in `[-half_span, half_span]`.
pub fn parabola(r0: f64, half_span: f64, step_x: f64) -> Vec<Point2D> {
    let n = (2.0 * half_span / step_x).round() as usize;
    (0..=n)
        .map(|i| {
            let x = -half_span + i as f64 * step_x;
            Point2D::new(x, x * x / (2.0 * r0))
        })
        .collect()
}

/// Circular arc of `radius` around `center` from `start` to `end` radians.
pub fn circle_arc(center: Point2D, radius: f64, start: f64, end: f64, n: usize) -> Vec<Point2D> {
    (0..=n)
        .map(|i| {
            let t = start + (end - start) * i as f64 / n as f64;
            Point2D::new(center.x + radius * t.cos(), center.y + radius * t.sin())
        })
        .collect()
}

/// Straight line from `from` to `to` with `n + 1` evenly spaced vertices.
pub fn straight(from: Point2D, to: Point2D, n: usize) -> Vec<Point2D> {
    (0..=n).map(|i| from.lerp(to, i as f64 / n as f64)).collect()
}

/// Translate every point.
pub fn offset(points: &[Point2D], dx: f64, dy: f64) -> Vec<Point2D> {
    points
        .iter()
        .map(|p| Point2D::new(p.x + dx, p.y + dy))
        .collect()
}

/// Install a test logger once; repeated calls are ignored.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
