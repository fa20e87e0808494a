//! Curve pairing by apex proximity and arc-length agreement.

use log::debug;

use super::CurveRecord;
use crate::core::Point2D;
use crate::core::math::{LENGTH_RATIO_FLOOR, safe_div};
use crate::error::{Result, ensure_non_negative};
use crate::matching::{MatchRecord, MatcherBackend, MatchingConfig, SpatialMatcher};

/// Pairs curves of two datasets.
///
/// Each curve of A is matched to the curve of B with the nearest apex. The
/// pair is kept when the apexes are within `max_dist_m` and the longer arc
/// is at most `len_ratio_max` times the shorter one. The nearest apex is the
/// only candidate: a pair failing the length test is not retried with the
/// second-nearest curve.
#[derive(Clone, Debug)]
pub struct CurveMatcher {
    spatial: SpatialMatcher,
    max_dist_m: f64,
    len_ratio_max: f64,
}

impl Default for CurveMatcher {
    fn default() -> Self {
        Self::from_config(&MatchingConfig::default())
    }
}

impl CurveMatcher {
    /// Create a matcher.
    pub fn new(backend: MatcherBackend, max_dist_m: f64, len_ratio_max: f64) -> Self {
        Self {
            spatial: SpatialMatcher::new(backend),
            max_dist_m,
            len_ratio_max,
        }
    }

    /// Create a matcher from the matching configuration.
    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::new(config.backend, config.max_dist_m, config.len_ratio_max)
    }

    /// Match `curves_a` against `curves_b`.
    ///
    /// Indices in the records refer to the input slices; `compatibility_ratio`
    /// holds the arc-length ratio `max / min`. Curves with a non-finite
    /// apex take no part; curves with a non-finite arc length never match.
    ///
    /// # Errors
    /// `InvalidInput` for a negative or NaN distance or ratio limit.
    pub fn match_curves(
        &self,
        curves_a: &[CurveRecord],
        curves_b: &[CurveRecord],
    ) -> Result<Vec<MatchRecord>> {
        ensure_non_negative("len_ratio_max", self.len_ratio_max)?;

        let (idx_a, apex_a) = finite_apexes(curves_a);
        let (idx_b, apex_b) = finite_apexes(curves_b);

        let nearest = self
            .spatial
            .nearest_within(&apex_a, &apex_b, self.max_dist_m, None)?;
        let candidates = nearest.len();

        let matches: Vec<MatchRecord> = nearest
            .into_iter()
            .filter_map(|m| {
                let a = idx_a[m.index_a];
                let b = idx_b[m.index_b];
                let ratio = length_ratio(curves_a[a].arc_length_m, curves_b[b].arc_length_m)?;
                (ratio <= self.len_ratio_max).then_some(MatchRecord {
                    index_a: a,
                    index_b: b,
                    distance_m: m.distance_m,
                    compatibility_ratio: Some(ratio),
                })
            })
            .collect();

        debug!(
            "[Curves] {} A curves, {} B curves: {} within {} m, {} after length ratio <= {}",
            curves_a.len(),
            curves_b.len(),
            candidates,
            self.max_dist_m,
            matches.len(),
            self.len_ratio_max
        );
        Ok(matches)
    }
}

/// Match curves with the R-tree backend.
pub fn match_curves(
    curves_a: &[CurveRecord],
    curves_b: &[CurveRecord],
    max_dist_m: f64,
    len_ratio_max: f64,
) -> Result<Vec<MatchRecord>> {
    CurveMatcher::new(MatcherBackend::Tree, max_dist_m, len_ratio_max)
        .match_curves(curves_a, curves_b)
}

/// `max(la, lb) / max(min(la, lb), ε)`, `None` if either length is not finite.
pub fn length_ratio(la: f64, lb: f64) -> Option<f64> {
    if !la.is_finite() || !lb.is_finite() {
        return None;
    }
    Some(safe_div(la.max(lb), la.min(lb), LENGTH_RATIO_FLOOR))
}

fn finite_apexes(curves: &[CurveRecord]) -> (Vec<usize>, Vec<Point2D>) {
    curves
        .iter()
        .enumerate()
        .map(|(i, c)| (i, c.apex()))
        .filter(|(_, p)| p.is_finite())
        .unzip()
}
