//! Local clothoid detection.
//!
//! A clothoid (Euler spiral) has curvature linear in arc length,
//! `κ(s) = a·s + b`. Windows of a curvature profile are fitted by ordinary
//! least squares and kept when the fit explains the profile well enough
//! (`R² ≥ r2_min`).
//!
//! ```text
//!   κ
//!   │            ╱  slope a (1/m²)
//!   │          ╱
//!   │        ╱
//!   │  b ──╱
//!   └──────────────── s
//!      [ window_m ]
//! ```

use log::trace;
use serde::{Deserialize, Serialize};

use crate::core::math::{DENOM_FLOOR, safe_div};
use crate::core::{Point2D, dedup_consecutive, total_length, validate_finite};
use crate::curvature::{CurvatureSample, finite_difference_profile};
use crate::error::{Result, ensure_positive};
use crate::sampling::resample_uniform;

/// Minimum number of samples in a sliding window.
const MIN_WINDOW_SAMPLES: usize = 3;

/// Duplicate-point epsilon for lines handed straight to [`fit_global`].
const DEDUP_EPSILON: f64 = 1e-6;

/// How a window was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    /// Regular sliding window over the profile.
    Sliding,
    /// The profile was shorter than one window and was fitted whole.
    WholeProfile,
}

/// One linear fit `κ = slope_a · s + intercept_b` over `[s_start, s_end]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClothoidWindow {
    /// Arc length of the first sample in the window (m).
    pub s_start: f64,
    /// Arc length of the last sample in the window (m).
    pub s_end: f64,
    /// Curvature rate (1/m²).
    pub slope_a: f64,
    /// Curvature at `s = 0` (1/m).
    pub intercept_b: f64,
    /// Coefficient of determination of the fit.
    pub r_squared: f64,
    /// Number of samples fitted.
    pub n_samples: usize,
    /// Sliding window or whole-profile fit.
    pub kind: WindowKind,
}

/// Configuration for clothoid fitting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClothoidConfig {
    /// Sample spacing of the profile (m).
    /// Default: 8.0
    pub step_m: f64,

    /// Window length (m).
    /// Default: 60.0
    pub window_m: f64,

    /// Minimum R² for a sliding window to be kept.
    /// Default: 0.9
    pub r2_min: f64,
}

impl Default for ClothoidConfig {
    fn default() -> Self {
        Self {
            step_m: 8.0,
            window_m: 60.0,
            r2_min: 0.9,
        }
    }
}

impl ClothoidConfig {
    /// Builder-style setter for the window length.
    pub fn with_window(mut self, meters: f64) -> Self {
        self.window_m = meters;
        self
    }

    /// Builder-style setter for the sample spacing.
    pub fn with_step(mut self, meters: f64) -> Self {
        self.step_m = meters;
        self
    }

    /// Builder-style setter for the R² threshold.
    pub fn with_r2_min(mut self, r2: f64) -> Self {
        self.r2_min = r2;
        self
    }
}

/// Clothoid fitter bound to a configuration.
#[derive(Clone, Debug, Default)]
pub struct ClothoidFitter {
    config: ClothoidConfig,
}

impl ClothoidFitter {
    /// Create a fitter with the given configuration.
    pub fn new(config: ClothoidConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ClothoidConfig {
        &self.config
    }

    /// Sliding-window fits of a profile. See [`fit_windows`].
    pub fn fit_windows(&self, profile: &[CurvatureSample]) -> Result<Vec<ClothoidWindow>> {
        fit_windows(
            profile,
            self.config.window_m,
            self.config.step_m,
            self.config.r2_min,
        )
    }

    /// Single fit around the middle of a line. See [`fit_global`].
    pub fn fit_global(&self, line: &[Point2D]) -> Result<Option<ClothoidWindow>> {
        fit_global(line, self.config.step_m, self.config.window_m)
    }
}

/// Fit `κ = a·s + b` over windows of `max(round(window_m / step_m), 3)`
/// consecutive samples, sliding one sample at a time.
///
/// Windows with `R² < r2_min`, non-finite samples or zero arc-length spread
/// are dropped. A profile shorter than one window is fitted whole and
/// returned whatever its R² (tagged [`WindowKind::WholeProfile`]).
///
/// # Errors
/// `InvalidInput` if `window_m` or `step_m` is not positive and finite.
pub fn fit_windows(
    profile: &[CurvatureSample],
    window_m: f64,
    step_m: f64,
    r2_min: f64,
) -> Result<Vec<ClothoidWindow>> {
    ensure_positive("window_m", window_m)?;
    ensure_positive("step_m", step_m)?;

    let n = ((window_m / step_m).round() as usize).max(MIN_WINDOW_SAMPLES);

    if profile.len() < n {
        return Ok(fit_profile(profile)
            .map(|mut w| {
                w.kind = WindowKind::WholeProfile;
                w
            })
            .into_iter()
            .collect());
    }

    let mut windows = Vec::new();
    for (start, chunk) in profile.windows(n).enumerate() {
        match regress(chunk) {
            Some(w) if w.r_squared >= r2_min => windows.push(w),
            Some(w) => trace!(
                "[Clothoid] window at sample {} rejected: R²={:.4} < {:.4}",
                start, w.r_squared, r2_min
            ),
            None => trace!("[Clothoid] window at sample {} is singular", start),
        }
    }

    Ok(windows)
}

/// Ordinary least-squares fit over the whole profile.
///
/// Returns `None` for fewer than two usable samples or zero arc-length spread.
pub fn fit_profile(profile: &[CurvatureSample]) -> Option<ClothoidWindow> {
    regress(profile)
}

/// Single clothoid fit of a line.
///
/// The line is resampled at `step_m` and profiled with finite differences.
/// Lines shorter than `window_m` are fitted whole; otherwise only samples
/// within `window_m / 2` of the mid-length are used.
///
/// Returns `Ok(None)` for lines too short to fit.
///
/// # Errors
/// `InvalidInput` for non-finite coordinates or a non-positive step/window.
pub fn fit_global(line: &[Point2D], step_m: f64, window_m: f64) -> Result<Option<ClothoidWindow>> {
    ensure_positive("step_m", step_m)?;
    ensure_positive("window_m", window_m)?;
    validate_finite(line)?;

    let line = dedup_consecutive(line, DEDUP_EPSILON);
    if line.len() < 2 {
        return Ok(None);
    }

    let resampled = resample_uniform(&line, step_m)?;
    let profile = finite_difference_profile(&resampled, f64::INFINITY);

    let length = total_length(&resampled);
    if length < window_m {
        return Ok(fit_profile(&profile).map(|mut w| {
            w.kind = WindowKind::WholeProfile;
            w
        }));
    }

    let mid = 0.5 * length;
    let half = 0.5 * window_m;
    let centred: Vec<CurvatureSample> = profile
        .into_iter()
        .filter(|s| (s.arc_length_m - mid).abs() <= half)
        .collect();

    Ok(fit_profile(&centred))
}

fn regress(samples: &[CurvatureSample]) -> Option<ClothoidWindow> {
    if samples.len() < 2 {
        return None;
    }
    if samples
        .iter()
        .any(|s| !s.arc_length_m.is_finite() || !s.curvature_per_m.is_finite())
    {
        return None;
    }

    let n = samples.len() as f64;
    let mean_s = samples.iter().map(|s| s.arc_length_m).sum::<f64>() / n;
    let mean_k = samples.iter().map(|s| s.curvature_per_m).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut ss_tot = 0.0;
    for s in samples {
        let ds = s.arc_length_m - mean_s;
        let dk = s.curvature_per_m - mean_k;
        sxx += ds * ds;
        sxy += ds * dk;
        ss_tot += dk * dk;
    }
    if sxx <= DENOM_FLOOR {
        return None;
    }

    let slope_a = sxy / sxx;
    let intercept_b = mean_k - slope_a * mean_s;
    let ss_res: f64 = samples
        .iter()
        .map(|s| {
            let r = s.curvature_per_m - (slope_a * s.arc_length_m + intercept_b);
            r * r
        })
        .sum();
    let r_squared = 1.0 - safe_div(ss_res, ss_tot, DENOM_FLOOR);

    Some(ClothoidWindow {
        s_start: samples[0].arc_length_m,
        s_end: samples[samples.len() - 1].arc_length_m,
        slope_a,
        intercept_b,
        r_squared,
        n_samples: samples.len(),
        kind: WindowKind::Sliding,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn synthetic_profile(a: f64, b: f64, step: f64, length: f64) -> Vec<CurvatureSample> {
        let n = (length / step).round() as usize;
        (0..=n)
            .map(|i| {
                let s = i as f64 * step;
                CurvatureSample::from_curvature(s, Point2D::new(s, 0.0), a * s + b, f64::INFINITY)
            })
            .collect()
    }

    /// Integrate a line whose curvature is `a·s + b`, at 0.25 m steps.
    fn clothoid_line(a: f64, b: f64, length: f64) -> Vec<Point2D> {
        let ds = 0.25;
        let n = (length / ds).round() as usize;
        let mut pts = Vec::with_capacity(n + 1);
        let mut p = Point2D::new(500.0, 800.0);
        pts.push(p);
        for i in 0..n {
            let s_mid = (i as f64 + 0.5) * ds;
            let heading = 0.5 * a * s_mid * s_mid + b * s_mid;
            p = Point2D::new(p.x + ds * heading.cos(), p.y + ds * heading.sin());
            pts.push(p);
        }
        pts
    }

    #[test]
    fn test_fit_windows_linear_profile() {
        let profile = synthetic_profile(0.01, 0.02, 5.0, 200.0);
        let windows = fit_windows(&profile, 60.0, 5.0, 0.9).unwrap();
        // 41 samples, 12 per window
        assert_eq!(windows.len(), 41 - 12 + 1);
        for w in &windows {
            assert_relative_eq!(w.slope_a, 0.01, epsilon = 1e-9);
            assert_relative_eq!(w.intercept_b, 0.02, epsilon = 1e-7);
            assert!(w.r_squared > 0.999);
            assert_eq!(w.kind, WindowKind::Sliding);
            assert_eq!(w.n_samples, 12);
        }
        assert_relative_eq!(windows[0].s_start, 0.0);
        assert_relative_eq!(windows[0].s_end, 55.0);
    }

    #[test]
    fn test_fit_whole_profile() {
        let profile = synthetic_profile(0.01, 0.02, 5.0, 200.0);
        let fit = fit_profile(&profile).unwrap();
        assert_relative_eq!(fit.slope_a, 0.01, epsilon = 1e-9);
        assert_relative_eq!(fit.intercept_b, 0.02, epsilon = 1e-7);
        assert!(fit.r_squared > 0.999);
    }

    #[test]
    fn test_short_profile_fitted_whole_regardless_of_r2() {
        // Zig-zag curvature: terrible fit, still returned
        let profile: Vec<CurvatureSample> = [0.01, 0.05, 0.01, 0.05]
            .iter()
            .enumerate()
            .map(|(i, &k)| {
                let s = i as f64 * 8.0;
                CurvatureSample::from_curvature(s, Point2D::default(), k, f64::INFINITY)
            })
            .collect();
        let windows = fit_windows(&profile, 60.0, 8.0, 0.9).unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].kind, WindowKind::WholeProfile);
        assert!(windows[0].r_squared < 0.9);
    }

    #[test]
    fn test_noisy_windows_rejected() {
        let profile: Vec<CurvatureSample> = (0..40)
            .map(|i| {
                let s = i as f64 * 8.0;
                let k = if i % 2 == 0 { 0.01 } else { 0.04 };
                CurvatureSample::from_curvature(s, Point2D::default(), k, f64::INFINITY)
            })
            .collect();
        let windows = fit_windows(&profile, 60.0, 8.0, 0.9).unwrap();
        assert!(windows.is_empty());
    }

    #[test]
    fn test_singular_and_empty_profiles() {
        assert!(fit_profile(&[]).is_none());
        let same_s = vec![
            CurvatureSample::from_curvature(3.0, Point2D::default(), 0.01, f64::INFINITY);
            4
        ];
        assert!(fit_profile(&same_s).is_none());
        assert!(fit_windows(&same_s, 60.0, 8.0, 0.9).unwrap().is_empty());
    }

    #[test]
    fn test_constant_curvature_is_perfect_fit() {
        let profile = synthetic_profile(0.0, 0.01, 8.0, 100.0);
        let fit = fit_profile(&profile).unwrap();
        assert_relative_eq!(fit.slope_a, 0.0, epsilon = 1e-12);
        assert!(fit.r_squared > 0.999);
    }

    #[test]
    fn test_fit_windows_rejects_bad_parameters() {
        let profile = synthetic_profile(0.01, 0.02, 5.0, 50.0);
        assert!(fit_windows(&profile, 0.0, 5.0, 0.9).is_err());
        assert!(fit_windows(&profile, 60.0, -5.0, 0.9).is_err());
    }

    #[test]
    fn test_fit_global_on_integrated_clothoid() {
        let line = clothoid_line(1e-4, 0.002, 300.0);
        let fitter = ClothoidFitter::new(ClothoidConfig::default().with_step(4.0));
        let fit = fitter.fit_global(&line).unwrap().unwrap();

        assert_eq!(fit.kind, WindowKind::Sliding);
        assert!((fit.slope_a - 1e-4).abs() < 2e-5, "slope {}", fit.slope_a);
        assert!((fit.intercept_b - 0.002).abs() < 5e-4, "intercept {}", fit.intercept_b);
        assert!(fit.r_squared > 0.99);
        // Centred on the middle of the line
        assert!(fit.s_start >= 119.0 && fit.s_start <= 125.0);
        assert!(fit.s_end >= 175.0 && fit.s_end <= 181.0);
    }

    #[test]
    fn test_fit_global_short_line_uses_whole_profile() {
        let line = clothoid_line(1e-4, 0.01, 40.0);
        let fit = fit_global(&line, 4.0, 60.0).unwrap().unwrap();
        assert_eq!(fit.kind, WindowKind::WholeProfile);
    }

    #[test]
    fn test_fit_global_degenerate_line() {
        assert!(fit_global(&[Point2D::new(1.0, 1.0)], 8.0, 60.0).unwrap().is_none());
        assert!(fit_global(&[Point2D::new(f64::NAN, 1.0)], 8.0, 60.0).is_err());
    }

    #[test]
    fn test_fit_global_projected_straight_line() {
        let origin = Point2D::new(651_234.123, 6_862_345.456);
        let dir = Point2D::new(0.6, 0.8);
        for length in [200.0 + 1e-4, 200.0 + 1e-3, 45.0 + 1e-4] {
            let line = [origin, origin + dir * length];
            let fit = fit_global(&line, 8.0, 60.0).unwrap().unwrap();
            assert!(fit.slope_a.abs() < 1e-6, "length {length}: slope {}", fit.slope_a);
            assert!(
                fit.intercept_b.abs() < 1e-4,
                "length {length}: intercept {}",
                fit.intercept_b
            );
        }
    }
}
