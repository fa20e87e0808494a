//! Per-line preprocessing and profiling.
//!
//! ```text
//! RoadLine ─► validate ─► dedup ─► length check ─► simplify ─► densify
//!                                       │                         │
//!                                    skipped                      ▼
//!                                            CurvatureEstimator ─► LineProfile
//! ```

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::VakraConfig;
use crate::core::{Point2D, dedup_consecutive, simplify, total_length, validate_finite};
use crate::curvature::{CurvatureEstimator, CurvatureSample, LineSummary};
use crate::curves::{
    CurveExtraction, CurveExtractor, CurveMatcher, CurvePairDiff, CurveSample, LinePairDiff,
    compare_lines, curve_pair_diffs,
};
use crate::error::{Result, ensure_non_negative, ensure_positive};
use crate::matching::{ClassCompatibility, ClassFilter, MatchRecord};
use crate::sampling::resample;

/// Line cleanup applied before curvature estimation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Lines shorter than this are skipped (m).
    /// Default: 1.0
    pub min_line_length_m: f64,

    /// Douglas-Peucker tolerance (m); 0 disables simplification.
    /// Default: 0.5
    pub simplify_tolerance_m: f64,

    /// Densification step (m).
    /// Default: 5.0
    pub densify_step_m: f64,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            min_line_length_m: 1.0,
            simplify_tolerance_m: 0.5,
            densify_step_m: 5.0,
        }
    }
}

impl PreprocessConfig {
    /// Builder-style setter for the simplification tolerance.
    pub fn with_simplify_tolerance(mut self, meters: f64) -> Self {
        self.simplify_tolerance_m = meters;
        self
    }

    /// Builder-style setter for the densification step.
    pub fn with_densify_step(mut self, meters: f64) -> Self {
        self.densify_step_m = meters;
        self
    }
}

/// A road centerline from one source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadLine {
    /// Identifier, unique within its source.
    pub id: String,
    /// Dataset label.
    pub source: String,
    /// Road class label as found in the source.
    pub class: Option<String>,
    /// Road name.
    pub name: Option<String>,
    /// Vertices in a metric projection.
    pub points: Vec<Point2D>,
}

impl RoadLine {
    /// Create an unclassified, unnamed line.
    pub fn new(id: impl Into<String>, source: impl Into<String>, points: Vec<Point2D>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            class: None,
            name: None,
            points,
        }
    }

    /// Builder-style setter for the class label.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Builder-style setter for the road name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Curvature profile and summary of one preprocessed line.
#[derive(Clone, Debug, PartialEq)]
pub struct LineProfile {
    /// Identifier of the originating [`RoadLine`].
    pub line_id: String,
    /// Dataset label.
    pub source: String,
    /// Road class label, unnormalised.
    pub class: Option<String>,
    /// Road name.
    pub name: Option<String>,
    /// Curvature along the preprocessed line.
    pub samples: Vec<CurvatureSample>,
    /// Per-line statistics of `samples`.
    pub summary: LineSummary,
}

impl LineProfile {
    /// Extractor inputs for this line.
    pub fn curve_samples(&self) -> Vec<CurveSample> {
        CurveSample::from_profile(&self.line_id, self.class.as_deref(), &self.samples)
    }
}

/// Clean one line.
///
/// Consecutive points closer than `dedup_epsilon_m` are merged, with the
/// same epsilon the curvature estimator uses
/// ([`CurvatureConfig::dedup_epsilon_m`](crate::curvature::CurvatureConfig::dedup_epsilon_m)).
///
/// Returns `Ok(None)` when the deduplicated line is shorter than
/// `min_line_length_m` or collapses to a single point.
///
/// # Errors
/// `InvalidInput` for an empty line, non-finite coordinates or invalid
/// preprocessing parameters.
pub fn preprocess_line(
    points: &[Point2D],
    config: &PreprocessConfig,
    dedup_epsilon_m: f64,
) -> Result<Option<Vec<Point2D>>> {
    ensure_positive("densify_step_m", config.densify_step_m)?;
    ensure_non_negative("min_line_length_m", config.min_line_length_m)?;
    ensure_non_negative("dedup_epsilon_m", dedup_epsilon_m)?;
    if points.is_empty() {
        return Err(crate::VakraError::invalid_input("line has no points"));
    }
    validate_finite(points)?;

    let points = dedup_consecutive(points, dedup_epsilon_m);
    if points.len() < 2 || total_length(&points) < config.min_line_length_m {
        return Ok(None);
    }

    let points = simplify(&points, config.simplify_tolerance_m);
    resample(&points, config.densify_step_m).map(Some)
}

/// Preprocess and profile every line in parallel.
///
/// Output order follows input order; skipped lines are absent.
pub fn profile_lines(lines: &[RoadLine], config: &VakraConfig) -> Result<Vec<LineProfile>> {
    let estimator = CurvatureEstimator::new(config.curvature.clone());

    let profiles: Vec<Option<LineProfile>> = lines
        .par_iter()
        .map(|line| profile_line(line, &estimator, config))
        .collect::<Result<_>>()?;

    let skipped = profiles.iter().filter(|p| p.is_none()).count();
    if skipped > 0 {
        warn!(
            "[Pipeline] Skipped {} of {} lines shorter than {} m",
            skipped,
            lines.len(),
            config.preprocess.min_line_length_m
        );
    }

    let profiles: Vec<LineProfile> = profiles.into_iter().flatten().collect();
    debug!(
        "[Pipeline] Profiled {} lines, {} curvature samples, {} straight",
        profiles.len(),
        profiles.iter().map(|p| p.samples.len()).sum::<usize>(),
        profiles.iter().filter(|p| p.summary.is_straight).count()
    );
    Ok(profiles)
}

fn profile_line(
    line: &RoadLine,
    estimator: &CurvatureEstimator,
    config: &VakraConfig,
) -> Result<Option<LineProfile>> {
    let dedup_epsilon_m = config.curvature.dedup_epsilon_m;
    let Some(points) = preprocess_line(&line.points, &config.preprocess, dedup_epsilon_m)? else {
        return Ok(None);
    };
    let (samples, summary) = estimator.summarize(&line.id, &line.source, &points)?;
    Ok(Some(LineProfile {
        line_id: line.id.clone(),
        source: line.source.clone(),
        class: line.class.clone(),
        name: line.name.clone(),
        samples,
        summary,
    }))
}

/// Pair lines of A and B by nearest centroid and diff their summaries.
///
/// Classes are compared through `classes` only when
/// `config.matching.match_class` is set.
pub fn compare_profiles<C: ClassCompatibility + ?Sized>(
    profiles_a: &[LineProfile],
    profiles_b: &[LineProfile],
    classes: &C,
    config: &VakraConfig,
) -> Result<Vec<LinePairDiff>> {
    let summaries_a: Vec<LineSummary> = profiles_a.iter().map(|p| p.summary.clone()).collect();
    let summaries_b: Vec<LineSummary> = profiles_b.iter().map(|p| p.summary.clone()).collect();
    let filter = config.matching.match_class.then(|| {
        ClassFilter::new(&line_classes(profiles_a), &line_classes(profiles_b), classes)
    });
    compare_lines(&summaries_a, &summaries_b, filter.as_ref(), &config.matching)
}

/// Curves of both datasets and their pairing.
#[derive(Clone, Debug, PartialEq)]
pub struct CurveComparison {
    /// Curves of dataset A.
    pub extraction_a: CurveExtraction,
    /// Curves of dataset B.
    pub extraction_b: CurveExtraction,
    /// Accepted A-to-B apex pairs, in A order.
    pub matches: Vec<MatchRecord>,
    /// Differences of the pairs in `matches`.
    pub diffs: Vec<CurvePairDiff>,
}

/// Extract curves from both sets of profiles and pair them by apex.
///
/// Curve ids are prefixed with the source of the first profile of each set.
pub fn compare_curves(
    profiles_a: &[LineProfile],
    profiles_b: &[LineProfile],
    config: &VakraConfig,
) -> Result<CurveComparison> {
    let extractor = CurveExtractor::new(config.curves.clone());
    let extract = |profiles: &[LineProfile], fallback: &str| {
        let samples: Vec<CurveSample> =
            profiles.iter().flat_map(LineProfile::curve_samples).collect();
        let source = profiles.first().map_or(fallback, |p| p.source.as_str());
        extractor.extract(&samples, source)
    };
    let extraction_a = extract(profiles_a, "A");
    let extraction_b = extract(profiles_b, "B");

    let matches = CurveMatcher::from_config(&config.matching)
        .match_curves(&extraction_a.curves, &extraction_b.curves)?;
    let diffs = curve_pair_diffs(&extraction_a.curves, &extraction_b.curves, &matches);

    Ok(CurveComparison {
        extraction_a,
        extraction_b,
        matches,
        diffs,
    })
}

fn line_classes(profiles: &[LineProfile]) -> Vec<Option<String>> {
    profiles.iter().map(|p| p.class.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn arc(radius: f64, n: usize) -> Vec<Point2D> {
        (0..=n)
            .map(|i| {
                let t = i as f64 / n as f64 * std::f64::consts::FRAC_PI_2;
                Point2D::new(radius * t.cos(), radius * t.sin())
            })
            .collect()
    }

    const EPS: f64 = 1e-6;

    #[test]
    fn test_preprocess_skips_short_lines() {
        let config = PreprocessConfig::default();
        let short = [Point2D::new(0.0, 0.0), Point2D::new(0.5, 0.0)];
        assert!(preprocess_line(&short, &config, EPS).unwrap().is_none());

        let single = [Point2D::new(3.0, 3.0), Point2D::new(3.0, 3.0)];
        let config = PreprocessConfig {
            min_line_length_m: 0.0,
            ..PreprocessConfig::default()
        };
        assert!(preprocess_line(&single, &config, EPS).unwrap().is_none());
    }

    #[test]
    fn test_preprocess_densifies() {
        let line = [Point2D::new(0.0, 0.0), Point2D::new(20.0, 0.0)];
        let out = preprocess_line(&line, &PreprocessConfig::default(), EPS)
            .unwrap()
            .unwrap();
        assert_eq!(out.len(), 5);
        assert_relative_eq!(out[1].x, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_preprocess_rejects_bad_input() {
        let config = PreprocessConfig::default();
        assert!(preprocess_line(&[], &config, EPS).is_err());
        let nan = [Point2D::new(0.0, 0.0), Point2D::new(f64::NAN, 0.0)];
        assert!(preprocess_line(&nan, &config, EPS).is_err());
        let line = [Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0)];
        let zero_step = PreprocessConfig::default().with_densify_step(0.0);
        assert!(preprocess_line(&line, &zero_step, EPS).is_err());
    }

    #[test]
    fn test_preprocess_dedup_follows_curvature_epsilon() {
        // 0.4 m hop between two 100 m legs
        let line = [
            Point2D::new(0.0, 0.0),
            Point2D::new(100.0, 0.0),
            Point2D::new(100.4, 0.0),
            Point2D::new(100.4, 100.0),
        ];
        let config = PreprocessConfig::default()
            .with_simplify_tolerance(0.0)
            .with_densify_step(1000.0);
        let kept = preprocess_line(&line, &config, EPS).unwrap().unwrap();
        assert_eq!(kept.len(), 4);
        let merged = preprocess_line(&line, &config, 0.5).unwrap().unwrap();
        assert_eq!(merged.len(), 3);
        assert!(preprocess_line(&line, &config, -1.0).is_err());

        let mut vakra = VakraConfig::default();
        vakra.preprocess = config;
        vakra.curvature.dedup_epsilon_m = 0.5;
        let profiles = profile_lines(&[RoadLine::new("l", "ign", line.to_vec())], &vakra).unwrap();
        assert_eq!(profiles[0].samples.len(), 1);
        assert_relative_eq!(profiles[0].summary.length_m, 200.0, epsilon = 0.5);
    }

    #[test]
    fn test_profile_lines_keeps_order_and_skips() {
        let lines = vec![
            RoadLine::new("curve", "osm", arc(100.0, 900)).with_class("primary"),
            RoadLine::new("stub", "osm", vec![Point2D::new(0.0, 0.0), Point2D::new(0.2, 0.0)]),
            RoadLine::new(
                "straight",
                "osm",
                vec![Point2D::new(0.0, 0.0), Point2D::new(200.0, 0.0)],
            )
            .with_name("D 12"),
        ];
        // Douglas-Peucker vertices would show up as sharp corners once densified
        let mut config = VakraConfig::default();
        config.preprocess = config.preprocess.with_simplify_tolerance(0.0);
        let profiles = profile_lines(&lines, &config).unwrap();
        assert_eq!(profiles.len(), 2);

        assert_eq!(profiles[0].line_id, "curve");
        assert!(!profiles[0].summary.is_straight);
        assert_relative_eq!(profiles[0].summary.radius_min_m, 100.0, max_relative = 0.02);

        assert_eq!(profiles[1].line_id, "straight");
        assert_eq!(profiles[1].name.as_deref(), Some("D 12"));
        assert!(profiles[1].summary.is_straight);
    }

    #[test]
    fn test_curve_samples_carry_class() {
        let lines = vec![RoadLine::new("c", "ign", arc(80.0, 60)).with_class("Route principale")];
        let profiles = profile_lines(&lines, &VakraConfig::default()).unwrap();
        let samples = profiles[0].curve_samples();
        assert_eq!(samples.len(), profiles[0].samples.len());
        assert!(
            samples
                .iter()
                .all(|s| s.class.as_deref() == Some("Route principale") && s.line_id == "c")
        );
        let total: f64 = samples.iter().map(|s| s.length_m).sum();
        let span = profiles[0].samples.last().unwrap().arc_length_m
            - profiles[0].samples[0].arc_length_m;
        assert_relative_eq!(total, span, epsilon = 1e-9);
    }

    #[test]
    fn test_compare_profiles_class_switch() {
        let line = |id: &str, source: &str, dy: f64, class: &str| {
            let points = arc(100.0, 900)
                .into_iter()
                .map(|p| Point2D::new(p.x, p.y + dy))
                .collect();
            RoadLine::new(id, source, points).with_class(class)
        };
        let mut config = VakraConfig::default();
        config.preprocess = config.preprocess.with_simplify_tolerance(0.0);
        let a = profile_lines(&[line("a", "ign", 0.0, "Route principale")], &config).unwrap();
        let b = profile_lines(&[line("b", "osm", 3.0, "secondary")], &config).unwrap();
        let mapping = crate::matching::ClassMapping::default();

        let diffs = compare_profiles(&a, &b, &mapping, &config).unwrap();
        assert_eq!(diffs.len(), 1);
        assert_relative_eq!(diffs[0].distance_m, 3.0, epsilon = 1e-6);

        config.matching.match_class = true;
        assert!(compare_profiles(&a, &b, &mapping, &config).unwrap().is_empty());
    }
}
