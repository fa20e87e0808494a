//! Uniform arc-length resampling.
//!
//! [`resample`] produces points at `0, step, 2·step, …` along the line
//! (strictly before the end) by linear interpolation along the original
//! segments, then the true final point exactly once. It densifies lines for
//! the three-point estimator, which tolerates one short closing chord.
//!
//! [`resample_uniform`] stops at the last multiple of the step instead, so
//! every spacing is exactly `step`. Finite differences divide by the squared
//! spacing and need that.
//!
//! Lines no longer than one step are returned as-is by both.

use crate::core::{Point2D, cumulative_lengths, validate_finite};
use crate::error::{Result, VakraError, ensure_positive};

/// Relative slack so a sample landing on the end (up to rounding) is not
/// emitted twice.
const END_TOLERANCE: f64 = 1e-9;

/// Resample a line at a uniform arc-length step, keeping its endpoint.
///
/// # Errors
/// `InvalidInput` if `step_m` is not positive and finite, if fewer than
/// two points are given, or if a coordinate is NaN or infinite.
///
/// # Example
/// ```
/// use vakra::core::Point2D;
/// use vakra::sampling::resample;
///
/// let line = [
///     Point2D::new(0.0, 0.0),
///     Point2D::new(8.0, 0.0),
///     Point2D::new(8.0, 4.0),
/// ];
/// let out = resample(&line, 5.0).unwrap();
/// assert_eq!(
///     out,
///     vec![
///         Point2D::new(0.0, 0.0),
///         Point2D::new(5.0, 0.0),
///         Point2D::new(8.0, 2.0),
///         Point2D::new(8.0, 4.0),
///     ]
/// );
/// ```
pub fn resample(points: &[Point2D], step_m: f64) -> Result<Vec<Point2D>> {
    let s = checked_lengths(points, step_m)?;
    let length = s[s.len() - 1];
    if length <= step_m {
        return Ok(points.to_vec());
    }

    let end = length - step_m * END_TOLERANCE;
    let targets = (0..)
        .map(|k| k as f64 * step_m)
        .take_while(|&target| target < end);
    let mut out = interpolate(points, &s, targets);
    out.push(points[points.len() - 1]);
    Ok(out)
}

/// Resample a line on the grid `0, step, 2·step, …` up to its length.
///
/// The last sample sits on the largest multiple of `step_m` not exceeding
/// the length; a shorter remainder is dropped rather than closed by a
/// sub-step chord.
///
/// # Errors
/// Same as [`resample`].
///
/// # Example
/// ```
/// use vakra::core::Point2D;
/// use vakra::sampling::resample_uniform;
///
/// let line = [Point2D::new(0.0, 0.0), Point2D::new(12.0, 0.0)];
/// let out = resample_uniform(&line, 5.0).unwrap();
/// assert_eq!(
///     out,
///     vec![
///         Point2D::new(0.0, 0.0),
///         Point2D::new(5.0, 0.0),
///         Point2D::new(10.0, 0.0),
///     ]
/// );
/// ```
pub fn resample_uniform(points: &[Point2D], step_m: f64) -> Result<Vec<Point2D>> {
    let s = checked_lengths(points, step_m)?;
    let length = s[s.len() - 1];
    if length <= step_m {
        return Ok(points.to_vec());
    }

    let count = (length / step_m + END_TOLERANCE).floor() as usize + 1;
    let targets = (0..count).map(|k| k as f64 * step_m);
    Ok(interpolate(points, &s, targets))
}

fn checked_lengths(points: &[Point2D], step_m: f64) -> Result<Vec<f64>> {
    ensure_positive("step_m", step_m)?;
    if points.len() < 2 {
        return Err(VakraError::invalid_input(format!(
            "resampling needs at least 2 points, got {}",
            points.len()
        )));
    }
    validate_finite(points)?;
    Ok(cumulative_lengths(points))
}

/// Points at increasing arc lengths `targets`, clamped to the line.
fn interpolate(
    points: &[Point2D],
    s: &[f64],
    targets: impl Iterator<Item = f64>,
) -> Vec<Point2D> {
    let mut out = Vec::with_capacity(targets.size_hint().0 + 1);
    let mut seg = 0usize;
    for target in targets {
        // Advance to the segment containing `target`
        while seg + 2 < points.len() && s[seg + 1] < target {
            seg += 1;
        }

        let seg_len = s[seg + 1] - s[seg];
        let p = if seg_len > 0.0 {
            let t = ((target - s[seg]) / seg_len).clamp(0.0, 1.0);
            points[seg].lerp(points[seg + 1], t)
        } else {
            points[seg]
        };
        out.push(p);
    }
    out
}
