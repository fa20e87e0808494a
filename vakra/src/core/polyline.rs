//! Ordered point sequences (road centerlines).
//!
//! Free functions over `&[Point2D]` for the geometric bookkeeping every
//! estimator needs: validation, duplicate removal, cumulative arc length,
//! centroid and Douglas-Peucker simplification.

use super::Point2D;
use crate::error::{Result, VakraError};

/// Fail with `InvalidInput` if any coordinate is NaN or infinite.
pub fn validate_finite(points: &[Point2D]) -> Result<()> {
    match points.iter().position(|p| !p.is_finite()) {
        Some(i) => Err(VakraError::invalid_input(format!(
            "non-finite coordinate at index {i}: ({}, {})",
            points[i].x, points[i].y
        ))),
        None => Ok(()),
    }
}

/// Remove consecutive points closer than `epsilon` to the last kept point.
///
/// The last input point is always kept (replacing the previous kept point if
/// the two are within `epsilon`), so the line keeps its true end.
pub fn dedup_consecutive(points: &[Point2D], epsilon: f64) -> Vec<Point2D> {
    let mut out: Vec<Point2D> = Vec::with_capacity(points.len());
    let eps_sq = epsilon * epsilon;

    for (i, &p) in points.iter().enumerate() {
        match out.last() {
            Some(last) if last.distance_sq(p) <= eps_sq => {
                if i + 1 == points.len() && out.len() > 1 {
                    let n = out.len();
                    out[n - 1] = p;
                }
            }
            _ => out.push(p),
        }
    }

    out
}

/// Cumulative arc length at each vertex (first entry is 0).
pub fn cumulative_lengths(points: &[Point2D]) -> Vec<f64> {
    let mut s = Vec::with_capacity(points.len());
    let mut acc = 0.0;
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            acc += points[i - 1].distance(*p);
        }
        s.push(acc);
    }
    s
}

/// Total arc length.
pub fn total_length(points: &[Point2D]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Length-weighted centroid of the segments.
///
/// Falls back to the vertex mean for zero-length lines and returns `None`
/// for an empty slice.
pub fn centroid(points: &[Point2D]) -> Option<Point2D> {
    let first = *points.first()?;

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut total = 0.0;
    for w in points.windows(2) {
        let len = w[0].distance(w[1]);
        let mid = w[0].lerp(w[1], 0.5);
        sum_x += mid.x * len;
        sum_y += mid.y * len;
        total += len;
    }

    if total > 0.0 {
        return Some(Point2D::new(sum_x / total, sum_y / total));
    }

    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    if n > 1.0 {
        Some(Point2D::new(sx / n, sy / n))
    } else {
        Some(first)
    }
}

/// Distance from `p` to the segment `a`-`b`.
pub fn point_segment_distance(p: Point2D, a: Point2D, b: Point2D) -> f64 {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq <= 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * ab.x + (p.y - a.y) * ab.y) / len_sq).clamp(0.0, 1.0);
    p.distance(a.lerp(b, t))
}

/// Douglas-Peucker simplification.
///
/// Keeps both endpoints; a tolerance of zero (or less) returns the input.
pub fn simplify(points: &[Point2D], tolerance: f64) -> Vec<Point2D> {
    if points.len() < 3 || tolerance <= 0.0 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    // Explicit stack instead of recursion: long roads have thousands of vertices.
    let mut stack = vec![(0usize, points.len() - 1)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }

        let mut max_dist = 0.0;
        let mut max_idx = start;
        for i in (start + 1)..end {
            let d = point_segment_distance(points[i], points[start], points[end]);
            if d > max_dist {
                max_dist = d;
                max_idx = i;
            }
        }

        if max_dist > tolerance {
            keep[max_idx] = true;
            stack.push((start, max_idx));
            stack.push((max_idx, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}
