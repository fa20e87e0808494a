//! Per-line curvature summary.

use serde::{Deserialize, Serialize};

use super::{CurvatureConfig, CurvatureSample};
use crate::core::math::percentile;
use crate::core::{Point2D, centroid, total_length};

/// Aggregate curvature statistics of one line.
///
/// Only finite radii contribute. A line without any finite radius is
/// straight: both radius fields are `+∞` and the mean curvature is zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineSummary {
    /// Line identifier.
    pub line_id: String,
    /// Dataset tag of the line.
    pub source: String,
    /// Smallest finite radius, floored at the minimum realistic radius (m).
    pub radius_min_m: f64,
    /// Robust percentile of the finite radii (m).
    pub radius_robust_m: f64,
    /// Mean of the finite curvatures, each capped at `1 / min_radius_m` (1/m).
    pub mean_curvature_per_m: f64,
    /// Arc length of the line (m).
    pub length_m: f64,
    /// Length-weighted centroid.
    pub centroid: Point2D,
    /// No finite radius anywhere on the line.
    pub is_straight: bool,
    /// Number of curvature samples summarized.
    pub n_samples: usize,
}

impl LineSummary {
    /// Summarize a curvature profile computed on `points`.
    pub fn from_profile(
        line_id: &str,
        source: &str,
        points: &[Point2D],
        samples: &[CurvatureSample],
        config: &CurvatureConfig,
    ) -> Self {
        let radii: Vec<f64> = samples
            .iter()
            .map(|s| s.radius_m)
            .filter(|r| r.is_finite() && *r > 0.0)
            .collect();

        let length_m = total_length(points);
        let centroid = centroid(points).unwrap_or_default();

        if radii.is_empty() {
            return Self {
                line_id: line_id.to_string(),
                source: source.to_string(),
                radius_min_m: f64::INFINITY,
                radius_robust_m: f64::INFINITY,
                mean_curvature_per_m: 0.0,
                length_m,
                centroid,
                is_straight: true,
                n_samples: samples.len(),
            };
        }

        let floor = config.min_radius_m;
        let min_r = radii.iter().copied().fold(f64::INFINITY, f64::min);
        let robust = percentile(&radii, config.robust_percentile).unwrap_or(min_r);
        let kappa_cap = 1.0 / floor;
        let mean_kappa =
            radii.iter().map(|r| (1.0 / r).min(kappa_cap)).sum::<f64>() / radii.len() as f64;

        Self {
            line_id: line_id.to_string(),
            source: source.to_string(),
            radius_min_m: min_r.max(floor),
            radius_robust_m: robust,
            mean_curvature_per_m: mean_kappa,
            length_m,
            centroid,
            is_straight: false,
            n_samples: samples.len(),
        }
    }
}
