//! Line-level comparison of two datasets.

use serde::{Deserialize, Serialize};

use crate::core::Point2D;
use crate::curvature::LineSummary;
use crate::error::Result;
use crate::matching::{ClassFilter, MatchingConfig, SpatialMatcher};

/// Differences (A minus B) between two lines paired by nearest centroid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinePairDiff {
    /// Index in A.
    pub index_a: usize,
    /// Index in B.
    pub index_b: usize,
    /// Line id in A.
    pub line_a: String,
    /// Line id in B.
    pub line_b: String,
    /// Centroid distance (m).
    pub distance_m: f64,
    /// Difference of minimum radii (m); `None` when either line is straight.
    pub diff_radius_min: Option<f64>,
    /// Difference of robust radii (m); `None` when either line is straight.
    pub diff_radius_robust: Option<f64>,
    /// Difference of mean curvatures (1/m).
    pub diff_mean_curvature: f64,
}

/// Pair every line of A with the line of B whose centroid is nearest
/// (within `config.max_dist_m`, class-compatible when `classes` is given)
/// and diff their summaries.
pub fn compare_lines(
    summaries_a: &[LineSummary],
    summaries_b: &[LineSummary],
    classes: Option<&ClassFilter>,
    config: &MatchingConfig,
) -> Result<Vec<LinePairDiff>> {
    let matches = SpatialMatcher::new(config.backend).nearest_within(
        &centroids(summaries_a),
        &centroids(summaries_b),
        config.max_dist_m,
        classes,
    )?;

    Ok(matches
        .into_iter()
        .map(|m| {
            let a = &summaries_a[m.index_a];
            let b = &summaries_b[m.index_b];
            LinePairDiff {
                index_a: m.index_a,
                index_b: m.index_b,
                line_a: a.line_id.clone(),
                line_b: b.line_id.clone(),
                distance_m: m.distance_m,
                diff_radius_min: finite_diff(a.radius_min_m, b.radius_min_m),
                diff_radius_robust: finite_diff(a.radius_robust_m, b.radius_robust_m),
                diff_mean_curvature: a.mean_curvature_per_m - b.mean_curvature_per_m,
            }
        })
        .collect())
}

fn centroids(summaries: &[LineSummary]) -> Vec<Point2D> {
    summaries.iter().map(|l| l.centroid).collect()
}

fn finite_diff(a: f64, b: f64) -> Option<f64> {
    (a.is_finite() && b.is_finite()).then(|| a - b)
}
