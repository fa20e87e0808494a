//! Discrete curvature estimation along road centerlines.
//!
//! Two interchangeable estimators produce arc-length-tagged samples:
//!
//! - **Three-point circumradius** ([`three_point_profile`]): one sample per
//!   interior vertex, radius of the circle through the vertex and its two
//!   neighbours. Used on raw or lightly densified lines.
//! - **Finite differences** ([`finite_difference_profile`]): first and
//!   second derivatives of `x(s)`, `y(s)` on a line resampled at a uniform
//!   step. One sample per resampled point; a remainder shorter than the step
//!   at the end of the line is not sampled.
//!
//! # Sentinel convention
//!
//! Curvature is an unsigned magnitude. "No measurable curvature" is always
//! `curvature_per_m == 0.0` with `radius_m == f64::INFINITY`, never NaN or a
//! negative number. Radii above the configured straight ceiling are reported
//! the same way. Lines with fewer than three points yield a single straight
//! sample at `s = 0`.
//!
//! ```text
//!        p[i]
//!       /    \         R = a·b·c / (4·Area)
//!   p[i-1]    p[i+1]
//! ```

mod finite_difference;
mod summary;
mod three_point;

use serde::{Deserialize, Serialize};

use crate::core::{Point2D, dedup_consecutive, validate_finite};
use crate::error::Result;
use crate::sampling::resample_uniform;

pub use finite_difference::{finite_difference_profile, gradient};
pub use summary::LineSummary;
pub use three_point::{circumradius, three_point_profile};

/// Curvature at one location along a line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurvatureSample {
    /// Arc length from the start of the line (meters).
    pub arc_length_m: f64,
    /// Unsigned curvature (1/m), always `>= 0`.
    pub curvature_per_m: f64,
    /// Radius (m): `1 / curvature_per_m`, or `+∞` when the curvature is zero.
    pub radius_m: f64,
    /// Location of the sample.
    pub point: Point2D,
}

impl CurvatureSample {
    /// A straight (zero-curvature) sample.
    #[inline]
    pub fn straight(arc_length_m: f64, point: Point2D) -> Self {
        Self {
            arc_length_m,
            curvature_per_m: 0.0,
            radius_m: f64::INFINITY,
            point,
        }
    }

    /// Build a sample from a radius.
    ///
    /// NaN, non-positive, infinite or above-`straight_radius_m` radii all
    /// become a straight sample.
    pub fn from_radius(
        arc_length_m: f64,
        point: Point2D,
        radius_m: f64,
        straight_radius_m: f64,
    ) -> Self {
        if radius_m.is_finite() && radius_m > 0.0 && radius_m <= straight_radius_m {
            Self {
                arc_length_m,
                curvature_per_m: 1.0 / radius_m,
                radius_m,
                point,
            }
        } else {
            Self::straight(arc_length_m, point)
        }
    }

    /// Build a sample from a (possibly signed) curvature.
    pub fn from_curvature(
        arc_length_m: f64,
        point: Point2D,
        curvature_per_m: f64,
        straight_radius_m: f64,
    ) -> Self {
        let kappa = curvature_per_m.abs();
        if !kappa.is_finite() || kappa <= 0.0 {
            return Self::straight(arc_length_m, point);
        }
        let radius = 1.0 / kappa;
        if radius > straight_radius_m {
            return Self::straight(arc_length_m, point);
        }
        Self {
            arc_length_m,
            curvature_per_m: kappa,
            radius_m: radius,
            point,
        }
    }

    /// True when no finite radius was measured here.
    #[inline]
    pub fn is_straight(&self) -> bool {
        !self.radius_m.is_finite()
    }
}

/// Curvature estimation algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurvatureMethod {
    /// Circumradius of consecutive vertex triples.
    #[default]
    ThreePoint,
    /// Central finite differences after uniform resampling at `step_m`.
    FiniteDifference {
        /// Resampling step (meters).
        step_m: f64,
    },
}

/// Configuration for curvature estimation and per-line summaries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurvatureConfig {
    /// Estimation algorithm.
    /// Default: three-point
    pub method: CurvatureMethod,

    /// Consecutive points closer than this are merged, both in line
    /// preprocessing and before estimation (m).
    /// Default: 1e-6
    pub dedup_epsilon_m: f64,

    /// Minimum realistic radius (m). Summary radii are floored here and
    /// mean curvature is capped at its inverse.
    /// Default: 5.0
    pub min_radius_m: f64,

    /// "Effectively straight" ceiling (m). Larger radii are reported as `+∞`.
    /// Default: 5000.0
    pub straight_radius_m: f64,

    /// Percentile of finite radii reported as the robust radius.
    /// Default: 85.0
    pub robust_percentile: f64,
}

impl Default for CurvatureConfig {
    fn default() -> Self {
        Self {
            method: CurvatureMethod::ThreePoint,
            dedup_epsilon_m: 1e-6,
            min_radius_m: 5.0,
            straight_radius_m: 5000.0,
            robust_percentile: 85.0,
        }
    }
}

impl CurvatureConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for the estimation method.
    pub fn with_method(mut self, method: CurvatureMethod) -> Self {
        self.method = method;
        self
    }

    /// Builder-style setter for the straight ceiling.
    pub fn with_straight_radius(mut self, meters: f64) -> Self {
        self.straight_radius_m = meters;
        self
    }

    /// Builder-style setter for the minimum realistic radius.
    pub fn with_min_radius(mut self, meters: f64) -> Self {
        self.min_radius_m = meters;
        self
    }
}

/// Curvature estimator bound to a configuration.
///
/// # Example
/// ```
/// use vakra::core::Point2D;
/// use vakra::curvature::{CurvatureConfig, CurvatureEstimator};
///
/// let estimator = CurvatureEstimator::new(CurvatureConfig::default());
/// let line = [
///     Point2D::new(100.0, 0.0),
///     Point2D::new(0.0, 100.0),
///     Point2D::new(-100.0, 0.0),
/// ];
/// let profile = estimator.profile(&line).unwrap();
/// assert_eq!(profile.len(), 1);
/// assert!((profile[0].radius_m - 100.0).abs() < 1e-6);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CurvatureEstimator {
    config: CurvatureConfig,
}

impl CurvatureEstimator {
    /// Create an estimator with the given configuration.
    pub fn new(config: CurvatureConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &CurvatureConfig {
        &self.config
    }

    /// Compute the curvature profile of a line.
    ///
    /// Coordinates are validated and consecutive duplicates removed first.
    ///
    /// # Errors
    /// `InvalidInput` for an empty line, NaN/infinite coordinates, or a
    /// non-positive finite-difference step.
    pub fn profile(&self, points: &[Point2D]) -> Result<Vec<CurvatureSample>> {
        if points.is_empty() {
            return Err(crate::VakraError::invalid_input("line has no points"));
        }
        validate_finite(points)?;
        let points = dedup_consecutive(points, self.config.dedup_epsilon_m);

        match self.config.method {
            CurvatureMethod::ThreePoint => {
                Ok(three_point_profile(&points, self.config.straight_radius_m))
            }
            CurvatureMethod::FiniteDifference { step_m } => {
                crate::error::ensure_positive("step_m", step_m)?;
                if points.len() < 2 {
                    return Ok(vec![CurvatureSample::straight(0.0, points[0])]);
                }
                let resampled = resample_uniform(&points, step_m)?;
                Ok(finite_difference_profile(
                    &resampled,
                    self.config.straight_radius_m,
                ))
            }
        }
    }

    /// Compute the profile and its per-line summary.
    pub fn summarize(
        &self,
        line_id: &str,
        source: &str,
        points: &[Point2D],
    ) -> Result<(Vec<CurvatureSample>, LineSummary)> {
        let samples = self.profile(points)?;
        let summary = LineSummary::from_profile(line_id, source, points, &samples, &self.config);
        Ok((samples, summary))
    }
}
