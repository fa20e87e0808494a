//! Numeric helpers shared by the estimators, the fitter and the matchers.
//!
//! Every epsilon-guarded division in the crate goes through [`safe_div`] with
//! one of the named floors below, so the guard values live in one place.

/// Denominator floor for finite-difference curvature (`(x'² + y'²)^1.5`) and
/// for the total sum of squares in `R²`.
pub const DENOM_FLOOR: f64 = 1e-12;

/// Squared triangle area (m⁴) at or below which three points are treated as
/// colinear by the circumradius estimator.
pub const AREA_SQ_FLOOR: f64 = 1e-16;

/// Length floor (meters) for arc-length ratios of near-zero-length curves.
pub const LENGTH_RATIO_FLOOR: f64 = 1e-6;

/// Divide with the denominator clamped from below at `floor`.
///
/// `floor` must be positive. The denominator is expected to be non-negative
/// (a sum of squares, a length, a norm); a negative or NaN denominator is
/// clamped to `floor` as well.
///
/// # Example
/// ```
/// use vakra::core::math::{safe_div, DENOM_FLOOR};
///
/// assert_eq!(safe_div(1.0, 4.0, DENOM_FLOOR), 0.25);
/// assert_eq!(safe_div(0.0, 0.0, DENOM_FLOOR), 0.0);
/// assert!(safe_div(1.0, 0.0, DENOM_FLOOR).is_finite());
/// ```
#[inline]
pub fn safe_div(num: f64, den: f64, floor: f64) -> f64 {
    debug_assert!(floor > 0.0, "safe_div floor must be positive");
    let den = if den >= floor { den } else { floor };
    num / den
}

/// Percentile with linear interpolation between closest ranks.
///
/// `q` is in percent (`0..=100`). Non-finite values are ignored.
/// Returns `None` when no finite value remains.
///
/// # Example
/// ```
/// use vakra::core::math::percentile;
///
/// let v = [1.0, 2.0, 3.0, 4.0, f64::INFINITY];
/// assert_eq!(percentile(&v, 50.0), Some(2.5));
/// assert_eq!(percentile(&v, 100.0), Some(4.0));
/// assert_eq!(percentile(&[f64::NAN], 50.0), None);
/// ```
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || !q.is_finite() {
        return None;
    }
    finite.sort_by(f64::total_cmp);

    let q = q.clamp(0.0, 100.0) / 100.0;
    let rank = q * (finite.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(finite[lo]);
    }
    let frac = rank - lo as f64;
    Some(finite[lo] + (finite[hi] - finite[lo]) * frac)
}

/// Mean of the finite values, `None` if there are none.
pub fn finite_mean(values: &[f64]) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values.iter().copied().filter(|v| v.is_finite()) {
        sum += v;
        n += 1;
    }
    (n > 0).then(|| sum / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_safe_div_floor() {
        assert_eq!(safe_div(2.0, 1e-20, 1e-12), 2.0e12);
        assert_eq!(safe_div(2.0, f64::NAN, 1e-12), 2.0e12);
        assert_eq!(safe_div(3.0, 1.5, 1e-12), 2.0);
    }

    #[test]
    fn test_percentile_matches_linear_interpolation() {
        let v = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_relative_eq!(percentile(&v, 0.0).unwrap(), 10.0);
        assert_relative_eq!(percentile(&v, 25.0).unwrap(), 20.0);
        assert_relative_eq!(percentile(&v, 85.0).unwrap(), 44.0);
        assert_relative_eq!(percentile(&v, 15.0).unwrap(), 16.0);
    }

    #[test]
    fn test_percentile_unsorted_input() {
        let v = [50.0, 10.0, 40.0, 20.0, 30.0];
        assert_relative_eq!(percentile(&v, 50.0).unwrap(), 30.0);
    }

    #[test]
    fn test_percentile_single_value() {
        assert_eq!(percentile(&[7.0], 85.0), Some(7.0));
        assert_eq!(percentile(&[], 85.0), None);
    }

    #[test]
    fn test_finite_mean() {
        assert_eq!(finite_mean(&[1.0, 3.0, f64::INFINITY, f64::NAN]), Some(2.0));
        assert_eq!(finite_mean(&[f64::NAN]), None);
    }
}
