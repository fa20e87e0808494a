//! Resampling and curvature properties on generated geometry.

mod common;

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use vakra::VakraConfig;
use vakra::clothoid::ClothoidFitter;
use vakra::core::{Point2D, total_length};
use vakra::curvature::{CurvatureConfig, CurvatureEstimator, CurvatureMethod};
use vakra::pipeline::{RoadLine, profile_lines};
use vakra::sampling::resample;

fn random_walk(rng: &mut StdRng, n: usize) -> Vec<Point2D> {
    let mut p = Point2D::new(0.0, 0.0);
    let mut heading: f64 = 0.0;
    let mut out = vec![p];
    for _ in 0..n {
        heading += rng.random_range(-0.6..0.6);
        let len = rng.random_range(0.5..40.0);
        p = Point2D::new(p.x + len * heading.cos(), p.y + len * heading.sin());
        out.push(p);
    }
    out
}

#[test]
fn test_resample_endpoints_and_spacing() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..50 {
        let line = random_walk(&mut rng, 30);
        let step = rng.random_range(1.0..20.0);
        let out = resample(&line, step).unwrap();

        assert_eq!(out[0], line[0]);
        assert_eq!(out[out.len() - 1], line[line.len() - 1]);
        let n_regular = out.len() - 1;
        // Regular samples sit every `step` of arc length; chords never exceed it
        for w in out[..n_regular].windows(2) {
            assert!(w[0].distance(w[1]) <= step * (1.0 + 1e-9));
        }
        let expected = (total_length(&line) / step).ceil() as usize + 1;
        assert!(out.len() == expected || out.len() + 1 == expected || out.len() == expected + 1);
    }
}

#[test]
fn test_resample_straight_line_is_idempotent() {
    let line = common::straight(Point2D::new(-40.0, 10.0), Point2D::new(260.0, 410.0), 7);
    let once = resample(&line, 5.0).unwrap();
    let twice = resample(&once, 5.0).unwrap();
    assert_eq!(once.len(), twice.len());
    for (a, b) in once.iter().zip(&twice) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-9);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-9);
    }
}

#[test]
fn test_circle_radius_both_methods() {
    for radius in [25.0, 120.0, 900.0] {
        let arc = common::circle_arc(Point2D::new(500.0, -300.0), radius, 0.3, 2.8, 2000);
        for method in [
            CurvatureMethod::ThreePoint,
            CurvatureMethod::FiniteDifference {
                step_m: radius / 20.0,
            },
        ] {
            let estimator = CurvatureEstimator::new(CurvatureConfig::default().with_method(method));
            let profile = estimator.profile(&arc).unwrap();
            let n = profile.len();
            // Finite differences are one-sided at the ends
            for s in &profile[2..n - 2] {
                assert_relative_eq!(s.radius_m, radius, max_relative = 1e-2);
                assert_relative_eq!(s.curvature_per_m * s.radius_m, 1.0, epsilon = 1e-12);
            }
        }
    }
}

#[test]
fn test_straight_line_has_no_curvature() {
    let line = common::straight(Point2D::new(3.0, 4.0), Point2D::new(803.0, 604.0), 40);
    for method in [
        CurvatureMethod::ThreePoint,
        CurvatureMethod::FiniteDifference { step_m: 5.0 },
    ] {
        let estimator = CurvatureEstimator::new(CurvatureConfig::default().with_method(method));
        let (profile, summary) = estimator.summarize("s", "t", &line).unwrap();
        assert!(profile.iter().all(|s| s.curvature_per_m == 0.0 && s.is_straight()));
        assert!(summary.is_straight);
        assert_eq!(summary.radius_min_m, f64::INFINITY);
        assert_eq!(summary.mean_curvature_per_m, 0.0);
        assert_relative_eq!(summary.length_m, 1000.0, epsilon = 1e-9);
    }
}

#[test]
fn test_projected_straight_line_off_step_has_no_curvature() {
    common::init_logger();
    // Lambert-93 magnitudes, lengths that are not a multiple of the step
    let from = Point2D::new(651_234.123, 6_862_345.456);
    for length in [100.0 + 1e-4, 100.0 + 1e-3, 487.3] {
        let to = Point2D::new(from.x + 0.6 * length, from.y + 0.8 * length);
        let line = common::straight(from, to, 7);
        for method in [
            CurvatureMethod::ThreePoint,
            CurvatureMethod::FiniteDifference { step_m: 5.0 },
        ] {
            let mut config = VakraConfig::default();
            config.curvature.method = method;
            let profiles =
                profile_lines(&[RoadLine::new("s", "ign", line.clone())], &config).unwrap();
            assert_eq!(profiles.len(), 1);
            let profile = &profiles[0];
            assert!(
                profile.samples.iter().all(|s| s.is_straight()),
                "{method:?} length {length}: {:?}",
                profile.samples.iter().find(|s| !s.is_straight())
            );
            assert!(profile.summary.is_straight);
            assert_eq!(profile.summary.mean_curvature_per_m, 0.0);
        }
    }
}

#[test]
fn test_circle_has_flat_clothoid_fit() {
    let arc = common::circle_arc(Point2D::new(0.0, 0.0), 200.0, 0.0, 1.5, 3000);
    let w = ClothoidFitter::default().fit_global(&arc).unwrap().unwrap();
    assert!(w.slope_a.abs() < 1e-6);
    // Intercept is κ at s = 0 of the resampled line
    assert_relative_eq!(w.intercept_b, 1.0 / 200.0, max_relative = 1e-2);
}
