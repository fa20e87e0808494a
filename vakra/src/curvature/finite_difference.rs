//! Finite-difference curvature on resampled lines.

use super::CurvatureSample;
use crate::core::math::{DENOM_FLOOR, safe_div};
use crate::core::{Point2D, cumulative_lengths};

/// Derivative of `values` with respect to the coordinates `s`.
///
/// Second-order central differences in the interior (exact for quadratics
/// on non-uniform spacing) and first-order one-sided differences at the two
/// ends. On a uniform grid the interior reduces to `(f[i+1] - f[i-1]) / 2h`.
///
/// Returns zeros when fewer than two values are given.
pub fn gradient(values: &[f64], s: &[f64]) -> Vec<f64> {
    debug_assert_eq!(values.len(), s.len(), "values and s must have same length");
    let n = values.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let mut out = vec![0.0; n];
    out[0] = safe_div(values[1] - values[0], s[1] - s[0], DENOM_FLOOR);
    out[n - 1] = safe_div(values[n - 1] - values[n - 2], s[n - 1] - s[n - 2], DENOM_FLOOR);

    for i in 1..n - 1 {
        let h0 = s[i] - s[i - 1];
        let h1 = s[i + 1] - s[i];
        let num = h0 * h0 * values[i + 1] - h1 * h1 * values[i - 1]
            + (h1 * h1 - h0 * h0) * values[i];
        out[i] = safe_div(num, h0 * h1 * (h0 + h1), DENOM_FLOOR);
    }

    out
}

/// Curvature at every point of a (uniformly resampled) line.
///
/// `κ = |x'y'' − y'x''| / (x'² + y'²)^1.5`, with derivatives taken with
/// respect to arc length and the denominator floored at [`DENOM_FLOOR`].
/// Lines with fewer than three points return a single straight sample.
pub fn finite_difference_profile(
    points: &[Point2D],
    straight_radius_m: f64,
) -> Vec<CurvatureSample> {
    if points.len() < 3 {
        let origin = points.first().copied().unwrap_or_default();
        return vec![CurvatureSample::straight(0.0, origin)];
    }

    let s = cumulative_lengths(points);
    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();

    let dx = gradient(&xs, &s);
    let dy = gradient(&ys, &s);
    let ddx = gradient(&dx, &s);
    let ddy = gradient(&dy, &s);

    (0..points.len())
        .map(|i| {
            let speed_sq = dx[i] * dx[i] + dy[i] * dy[i];
            let cross = (dx[i] * ddy[i] - dy[i] * ddx[i]).abs();
            let kappa = safe_div(cross, speed_sq * speed_sq.sqrt(), DENOM_FLOOR);
            CurvatureSample::from_curvature(s[i], points[i], kappa, straight_radius_m)
        })
        .collect()
}
