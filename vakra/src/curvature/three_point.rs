//! Three-point (circumscribed circle) curvature.

use super::CurvatureSample;
use crate::core::math::{AREA_SQ_FLOOR, DENOM_FLOOR, safe_div};
use crate::core::{Point2D, cumulative_lengths};

/// Radius of the circle through three points.
///
/// `R = a·b·c / (4·Area)` with the area from Heron's formula, evaluated in
/// the cancellation-resistant ordering (sides sorted `a ≥ b ≥ c`). The
/// radicand is clamped to zero before the square root; colinear or
/// coincident points (squared area at or below [`AREA_SQ_FLOOR`]) return
/// `f64::INFINITY`.
///
/// # Example
/// ```
/// use vakra::core::Point2D;
/// use vakra::curvature::circumradius;
///
/// let r = circumradius(
///     Point2D::new(100.0, 0.0),
///     Point2D::new(0.0, 100.0),
///     Point2D::new(-100.0, 0.0),
/// );
/// assert!((r - 100.0).abs() < 1e-6);
///
/// let straight = circumradius(
///     Point2D::new(0.0, 0.0),
///     Point2D::new(1.0, 1.0),
///     Point2D::new(2.0, 2.0),
/// );
/// assert!(straight.is_infinite());
/// ```
pub fn circumradius(p1: Point2D, p2: Point2D, p3: Point2D) -> f64 {
    let mut sides = [p1.distance(p2), p2.distance(p3), p1.distance(p3)];
    sides.sort_by(|x, y| y.total_cmp(x));
    let [a, b, c] = sides;

    // 16·Area² = (a+(b+c))(c-(a-b))(c+(a-b))(a+(b-c))
    let radicand = (a + (b + c)) * (c - (a - b)) * (c + (a - b)) * (a + (b - c));
    let area_sq = radicand.max(0.0) / 16.0;
    if area_sq <= AREA_SQ_FLOOR {
        return f64::INFINITY;
    }

    safe_div(a * b * c, 4.0 * area_sq.sqrt(), DENOM_FLOOR)
}

/// Curvature at every interior vertex of a line.
///
/// Sample `i - 1` describes vertex `i` and is tagged with the cumulative arc
/// length at that vertex. Lines with fewer than three points return a single
/// straight sample at `s = 0`.
pub fn three_point_profile(points: &[Point2D], straight_radius_m: f64) -> Vec<CurvatureSample> {
    if points.len() < 3 {
        let origin = points.first().copied().unwrap_or_default();
        return vec![CurvatureSample::straight(0.0, origin)];
    }

    let s = cumulative_lengths(points);
    points
        .windows(3)
        .enumerate()
        .map(|(k, w)| {
            let radius = circumradius(w[0], w[1], w[2]);
            CurvatureSample::from_radius(s[k + 1], w[1], radius, straight_radius_m)
        })
        .collect()
}
