//! Curve extraction: flag, group, summarize.

use std::cmp::Reverse;
use std::ops::Range;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{CurveConfig, CurveRecord, CurveSample};
use crate::core::math::percentile;

/// Percentile of the radii reported as a curve's robust radius.
const ROBUST_RADIUS_PERCENTILE: f64 = 15.0;

/// Which adaptive rule flagged the samples when the thresholds flagged none.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackKind {
    /// Samples in the top fraction by `|κ|`.
    TopCurvature,
    /// Samples in the bottom fraction by radius (no curvature available).
    BottomRadius,
}

/// Output of [`CurveExtractor::extract`].
#[derive(Clone, Debug, PartialEq)]
pub struct CurveExtraction {
    /// One record per group, in input order.
    pub curves: Vec<CurveRecord>,
    /// Group of each input sample, `None` when not flagged.
    pub groups: Vec<Option<usize>>,
    /// Set when the adaptive fallback replaced the thresholds. Curves from
    /// such a run are not comparable with threshold-based ones.
    pub fallback: Option<FallbackKind>,
}

/// Curve extractor bound to a configuration.
#[derive(Clone, Debug, Default)]
pub struct CurveExtractor {
    config: CurveConfig,
}

impl CurveExtractor {
    /// Create an extractor with the given configuration.
    pub fn new(config: CurveConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &CurveConfig {
        &self.config
    }

    /// Extract curves from samples ordered by line, then along the line.
    pub fn extract(&self, samples: &[CurveSample], source: &str) -> CurveExtraction {
        let (flags, fallback) = self.flag(samples);
        let groups = group_consecutive(samples, &flags);
        let curves: Vec<CurveRecord> = group_ranges(&groups)
            .into_iter()
            .enumerate()
            .map(|(gid, range)| summarize(&samples[range], source, gid))
            .collect();

        debug!(
            "[Curves] {}: {} samples, {} flagged, {} curves",
            source,
            samples.len(),
            flags.iter().filter(|&&f| f).count(),
            curves.len()
        );

        CurveExtraction {
            curves,
            groups,
            fallback,
        }
    }

    /// Threshold flags, or the adaptive fallback if they flag nothing.
    fn flag(&self, samples: &[CurveSample]) -> (Vec<bool>, Option<FallbackKind>) {
        let kappa_min = self.config.kappa_min;
        let radius_max = self.config.radius_max_m;

        let flags: Vec<bool> = samples
            .iter()
            .map(|s| {
                s.abs_curvature().is_some_and(|k| k >= kappa_min)
                    || s.finite_radius().is_some_and(|r| r <= radius_max)
            })
            .collect();
        if flags.iter().any(|&f| f) || samples.is_empty() {
            return (flags, None);
        }

        let fraction = self.config.fallback_fraction.clamp(0.0, 1.0);
        let kappas: Vec<f64> = samples.iter().filter_map(CurveSample::abs_curvature).collect();
        if !kappas.is_empty() {
            let top = percentile(&kappas, 100.0 * (1.0 - fraction)).unwrap_or(f64::INFINITY);
            // Sparse curvature puts the percentile at zero: keep every curved sample
            let threshold = if top > 0.0 {
                top
            } else {
                kappas
                    .iter()
                    .copied()
                    .filter(|&k| k > 0.0)
                    .fold(f64::INFINITY, f64::min)
            };
            if !threshold.is_finite() {
                debug!("[Curves] every |κ| is zero, fallback skipped");
                return (flags, None);
            }
            warn!(
                "[Curves] no sample passes |κ| >= {:e} or R <= {}; flagging top {:.0}% by |κ| (>= {:e})",
                kappa_min,
                radius_max,
                100.0 * fraction,
                threshold
            );
            let flags = samples
                .iter()
                .map(|s| s.abs_curvature().is_some_and(|k| k >= threshold))
                .collect();
            return (flags, Some(FallbackKind::TopCurvature));
        }

        let radii: Vec<f64> = samples.iter().filter_map(CurveSample::finite_radius).collect();
        match percentile(&radii, 100.0 * fraction) {
            Some(threshold) => {
                warn!(
                    "[Curves] no curvature available and no R <= {}; flagging bottom {:.0}% by radius (<= {})",
                    radius_max,
                    100.0 * fraction,
                    threshold
                );
                let flags = samples
                    .iter()
                    .map(|s| s.finite_radius().is_some_and(|r| r <= threshold))
                    .collect();
                (flags, Some(FallbackKind::BottomRadius))
            }
            None => (flags, None),
        }
    }
}

/// Extract curves with the given thresholds and the default fallback.
pub fn extract(
    samples: &[CurveSample],
    source: &str,
    kappa_min: f64,
    radius_max_m: f64,
) -> CurveExtraction {
    CurveExtractor::new(CurveConfig::default().with_thresholds(kappa_min, radius_max_m))
        .extract(samples, source)
}

/// Number runs of consecutive flagged samples.
///
/// A run ends at an unflagged sample or where the line id changes.
pub fn group_consecutive(samples: &[CurveSample], flags: &[bool]) -> Vec<Option<usize>> {
    debug_assert_eq!(samples.len(), flags.len());
    let mut groups = vec![None; flags.len()];
    let mut next_gid = 0usize;

    for i in 0..flags.len() {
        if !flags[i] {
            continue;
        }
        let continues = i > 0 && flags[i - 1] && samples[i].line_id == samples[i - 1].line_id;
        if continues {
            groups[i] = groups[i - 1];
        } else {
            groups[i] = Some(next_gid);
            next_gid += 1;
        }
    }

    groups
}

/// Index ranges of each group, in group order.
fn group_ranges(groups: &[Option<usize>]) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = Vec::new();
    for (i, g) in groups.iter().enumerate() {
        let Some(gid) = *g else { continue };
        if gid < ranges.len() {
            ranges[gid].end = i + 1;
        } else {
            ranges.push(i..i + 1);
        }
    }
    ranges
}

fn summarize(samples: &[CurveSample], source: &str, gid: usize) -> CurveRecord {
    let lengths: Vec<f64> = samples
        .iter()
        .map(|s| s.length_m)
        .filter(|l| l.is_finite())
        .collect();
    let arc_length_m = if lengths.is_empty() {
        f64::NAN
    } else {
        lengths.iter().sum()
    };

    let kappa_max = samples
        .iter()
        .filter_map(CurveSample::abs_curvature)
        .reduce(f64::max);
    let radii: Vec<f64> = samples.iter().filter_map(CurveSample::finite_radius).collect();
    let radius_min = radii.iter().copied().reduce(f64::min);
    let radius_robust = percentile(&radii, ROBUST_RADIUS_PERCENTILE);

    let apex = &samples[apex_index(samples, kappa_max, radius_min)];

    CurveRecord {
        curve_id: format!("{source}_{gid}"),
        source: source.to_string(),
        line_id: apex.line_id.clone(),
        n_points: samples.len(),
        arc_length_m,
        kappa_max,
        radius_min,
        radius_robust,
        apex_x: apex.point.x,
        apex_y: apex.point.y,
        class: mode_class(samples),
    }
}

/// Sample with the largest `|κ|`; ties (or missing curvature) go to the
/// smallest radius, then to the first sample.
fn apex_index(samples: &[CurveSample], kappa_max: Option<f64>, radius_min: Option<f64>) -> usize {
    let radius_key = |s: &CurveSample| s.finite_radius().unwrap_or(f64::INFINITY);

    let candidates: Vec<usize> = match (kappa_max, radius_min) {
        (Some(k), _) => (0..samples.len())
            .filter(|&i| samples[i].abs_curvature() == Some(k))
            .collect(),
        (None, Some(r)) => (0..samples.len())
            .filter(|&i| samples[i].finite_radius() == Some(r))
            .collect(),
        (None, None) => return 0,
    };

    let mut best = candidates[0];
    for &i in &candidates[1..] {
        if radius_key(&samples[i]) < radius_key(&samples[best]) {
            best = i;
        }
    }
    best
}

/// Most frequent class (a missing class counts as a value); ties go to the
/// lexically smallest label, a missing class last.
fn mode_class(samples: &[CurveSample]) -> Option<String> {
    let mut counts: Vec<(Option<&str>, usize)> = Vec::new();
    for s in samples {
        let label = s.class.as_deref();
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, n)) => *n += 1,
            None => counts.push((label, 1)),
        }
    }

    counts
        .into_iter()
        .min_by_key(|&(label, n)| (Reverse(n), label.is_none(), label))
        .and_then(|(label, _)| label.map(str::to_string))
}
