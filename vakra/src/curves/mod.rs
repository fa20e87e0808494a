//! Discrete curve features.
//!
//! Curvature samples from many lines are flagged against curvature/radius
//! thresholds, consecutive flagged samples of one line are grouped into
//! curves, and each curve is summarized by its apex, extreme curvature and
//! arc length. Curves of two datasets are then paired through their apexes.
//!
//! ```text
//! samples ─▶ flag ─▶ group runs ─▶ CurveRecord ─▶ match_curves ─▶ CurvePairDiff
//!              │
//!              └─ nothing flagged: top 5 % |κ| (or bottom 5 % radius)
//! ```

pub mod compare;
pub mod extractor;
pub mod matcher;
pub mod metrics;
mod profile;

use serde::{Deserialize, Serialize};

use crate::core::Point2D;
use crate::curvature::{CurvatureSample, LineSummary};

pub use compare::{LinePairDiff, compare_lines};
pub use extractor::{CurveExtraction, CurveExtractor, FallbackKind, extract};
pub use matcher::{CurveMatcher, match_curves};
pub use metrics::{CurvePairDiff, KpiStats, curve_pair_diffs, lateral_acceleration};
pub use profile::{MeanKappaProfile, mean_kappa_profile};

/// One extractor input: a curvature sample or a short segment summary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveSample {
    /// Line (road) the sample belongs to. Runs never cross a change of id.
    pub line_id: String,
    /// Location used as apex candidate.
    pub point: Point2D,
    /// Curvature magnitude (1/m), `None` when unavailable.
    pub curvature: Option<f64>,
    /// Radius (m), `None` when unavailable or straight.
    pub radius: Option<f64>,
    /// Arc length represented by this sample (m).
    pub length_m: f64,
    /// Road class label.
    pub class: Option<String>,
}

impl CurveSample {
    /// Convert a curvature profile of one line.
    ///
    /// Each sample stands for half the arc length to each neighbour.
    pub fn from_profile(
        line_id: &str,
        class: Option<&str>,
        profile: &[CurvatureSample],
    ) -> Vec<CurveSample> {
        let n = profile.len();
        (0..n)
            .map(|i| {
                let s = profile[i].arc_length_m;
                let before = if i > 0 { s - profile[i - 1].arc_length_m } else { 0.0 };
                let after = if i + 1 < n { profile[i + 1].arc_length_m - s } else { 0.0 };
                let sample = &profile[i];
                CurveSample {
                    line_id: line_id.to_string(),
                    point: sample.point,
                    curvature: Some(sample.curvature_per_m),
                    radius: sample.radius_m.is_finite().then_some(sample.radius_m),
                    length_m: 0.5 * (before + after),
                    class: class.map(str::to_string),
                }
            })
            .collect()
    }

    /// Use a whole (short) line summary as one sample of road `road_id`.
    ///
    /// Curvature is the summary's mean curvature, radius its minimum radius
    /// and the apex candidate its centroid.
    pub fn from_summary(summary: &LineSummary, road_id: &str, class: Option<&str>) -> CurveSample {
        CurveSample {
            line_id: road_id.to_string(),
            point: summary.centroid,
            curvature: Some(summary.mean_curvature_per_m),
            radius: summary
                .radius_min_m
                .is_finite()
                .then_some(summary.radius_min_m),
            length_m: summary.length_m,
            class: class.map(str::to_string),
        }
    }

    /// Finite curvature magnitude.
    #[inline]
    pub(crate) fn abs_curvature(&self) -> Option<f64> {
        self.curvature.map(f64::abs).filter(|k| k.is_finite())
    }

    /// Finite radius.
    #[inline]
    pub(crate) fn finite_radius(&self) -> Option<f64> {
        self.radius.filter(|r| r.is_finite())
    }
}

/// Summary of one extracted curve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveRecord {
    /// `"{source}_{group}"`, groups numbered from 0 in input order.
    pub curve_id: String,
    /// Dataset tag.
    pub source: String,
    /// Line the curve lies on.
    pub line_id: String,
    /// Number of samples in the curve.
    pub n_points: usize,
    /// Sum of the sample lengths (m). NaN when no sample has a finite length.
    pub arc_length_m: f64,
    /// Largest curvature magnitude (1/m).
    pub kappa_max: Option<f64>,
    /// Smallest radius (m).
    pub radius_min: Option<f64>,
    /// 15th percentile of the radii (m): the radius exceeded by 85 % of them.
    pub radius_robust: Option<f64>,
    /// Apex x coordinate.
    pub apex_x: f64,
    /// Apex y coordinate.
    pub apex_y: f64,
    /// Most frequent class label of the samples.
    pub class: Option<String>,
}

impl CurveRecord {
    /// Apex as a point.
    #[inline]
    pub fn apex(&self) -> Point2D {
        Point2D::new(self.apex_x, self.apex_y)
    }
}

/// Configuration for curve extraction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    /// Samples with `|κ|` at or above this are flagged (1/m).
    /// Default: 1e-4
    pub kappa_min: f64,

    /// Samples with a radius at or below this are flagged (m).
    /// Default: 150.0
    pub radius_max_m: f64,

    /// Share of samples flagged by the fallback when nothing passes the
    /// thresholds.
    /// Default: 0.05
    pub fallback_fraction: f64,

    /// Number of bins of the mean curvature position profile.
    /// Default: 20
    pub profile_bins: usize,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            kappa_min: 1e-4,
            radius_max_m: 150.0,
            fallback_fraction: 0.05,
            profile_bins: 20,
        }
    }
}

impl CurveConfig {
    /// Builder-style setter for both flagging thresholds.
    pub fn with_thresholds(mut self, kappa_min: f64, radius_max_m: f64) -> Self {
        self.kappa_min = kappa_min;
        self.radius_max_m = radius_max_m;
        self
    }
}
