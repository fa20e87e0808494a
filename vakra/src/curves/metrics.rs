//! Indicators on matched curves.

use serde::{Deserialize, Serialize};

use super::CurveRecord;
use crate::core::math::{finite_mean, percentile};
use crate::matching::MatchRecord;

/// Reference speeds (km/h) for lateral acceleration differences.
pub const REFERENCE_SPEEDS_KMH: [f64; 3] = [50.0, 80.0, 110.0];

/// Lateral acceleration `v² / R` (m/s²) at `v_kmh` on a curve of radius `radius_m`.
///
/// `None` for a missing, zero, negative or infinite radius.
///
/// # Example
/// ```
/// use vakra::curves::lateral_acceleration;
///
/// let a = lateral_acceleration(72.0, Some(100.0)).unwrap();
/// assert!((a - 4.0).abs() < 1e-12);
/// assert!(lateral_acceleration(72.0, Some(f64::INFINITY)).is_none());
/// ```
pub fn lateral_acceleration(v_kmh: f64, radius_m: Option<f64>) -> Option<f64> {
    let r = radius_m?;
    if !(r.is_finite() && r > 0.0) {
        return None;
    }
    let v = v_kmh / 3.6;
    let a = v * v / r;
    a.is_finite().then_some(a)
}

/// Differences (A minus B) between two matched curves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurvePairDiff {
    /// Curve id in A.
    pub curve_a: String,
    /// Curve id in B.
    pub curve_b: String,
    /// Apex distance (m).
    pub distance_m: f64,
    /// Arc-length ratio of the pair.
    pub length_ratio: Option<f64>,
    /// `radius_min(A) - radius_min(B)` (m).
    pub diff_radius_min: Option<f64>,
    /// `kappa_max(A) - kappa_max(B)` (1/m).
    pub diff_kappa_max: Option<f64>,
    /// Lateral acceleration differences at 50, 80 and 110 km/h (m/s²).
    pub diff_lateral_accel: [Option<f64>; 3],
    /// Class of the A curve, else of the B curve.
    pub class: Option<String>,
}

impl CurvePairDiff {
    /// Compare two curves paired by `record`.
    pub fn new(a: &CurveRecord, b: &CurveRecord, record: &MatchRecord) -> Self {
        let diff = |x: Option<f64>, y: Option<f64>| -> Option<f64> {
            match (x, y) {
                (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some(x - y),
                _ => None,
            }
        };

        Self {
            curve_a: a.curve_id.clone(),
            curve_b: b.curve_id.clone(),
            distance_m: record.distance_m,
            length_ratio: record.compatibility_ratio,
            diff_radius_min: diff(a.radius_min, b.radius_min),
            diff_kappa_max: diff(a.kappa_max, b.kappa_max),
            diff_lateral_accel: REFERENCE_SPEEDS_KMH.map(|v| {
                diff(
                    lateral_acceleration(v, a.radius_min),
                    lateral_acceleration(v, b.radius_min),
                )
            }),
            class: a.class.clone().or_else(|| b.class.clone()),
        }
    }
}

/// One [`CurvePairDiff`] per match record.
///
/// Records whose indices fall outside the curve slices are skipped.
pub fn curve_pair_diffs(
    curves_a: &[CurveRecord],
    curves_b: &[CurveRecord],
    matches: &[MatchRecord],
) -> Vec<CurvePairDiff> {
    matches
        .iter()
        .filter_map(|m| {
            let a = curves_a.get(m.index_a)?;
            let b = curves_b.get(m.index_b)?;
            Some(CurvePairDiff::new(a, b, m))
        })
        .collect()
}

/// Descriptive statistics of one indicator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KpiStats {
    /// Number of finite values.
    pub count: usize,
    /// Mean.
    pub mean: f64,
    /// Median.
    pub median: f64,
    /// Sample standard deviation (`None` below two values).
    pub std: Option<f64>,
    /// First quartile.
    pub q25: f64,
    /// Third quartile.
    pub q75: f64,
}

impl KpiStats {
    /// Statistics of the finite values, `None` if there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let count = finite.len();
        let mean = finite_mean(&finite)?;
        let std = (count > 1).then(|| {
            let ss: f64 = finite.iter().map(|v| (v - mean) * (v - mean)).sum();
            (ss / (count - 1) as f64).sqrt()
        });

        Some(Self {
            count,
            mean,
            median: percentile(&finite, 50.0)?,
            std,
            q25: percentile(&finite, 25.0)?,
            q75: percentile(&finite, 75.0)?,
        })
    }

    /// Interquartile range.
    #[inline]
    pub fn iqr(&self) -> f64 {
        self.q75 - self.q25
    }
}
