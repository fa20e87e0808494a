//! Main VakraConfig and validation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ConfigLoadError;
use crate::clothoid::ClothoidConfig;
use crate::curvature::{CurvatureConfig, CurvatureMethod};
use crate::curves::CurveConfig;
use crate::matching::MatchingConfig;
use crate::pipeline::PreprocessConfig;

/// Full configuration loaded from YAML
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct VakraConfig {
    /// Line preprocessing
    #[serde(default)]
    pub preprocess: PreprocessConfig,

    /// Curvature estimation and line summaries
    #[serde(default)]
    pub curvature: CurvatureConfig,

    /// Clothoid fitting
    #[serde(default)]
    pub clothoid: ClothoidConfig,

    /// Curve extraction
    #[serde(default)]
    pub curves: CurveConfig,

    /// Spatial and curve matching
    #[serde(default)]
    pub matching: MatchingConfig,
}

impl VakraConfig {
    /// Load and validate configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigLoadError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        serde_yaml::to_string(self).map_err(|e| ConfigLoadError::Parse(e.to_string()))
    }

    /// Check every threshold is in range.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        let p = &self.preprocess;
        non_negative("preprocess.min_line_length_m", p.min_line_length_m)?;
        non_negative("preprocess.simplify_tolerance_m", p.simplify_tolerance_m)?;
        positive("preprocess.densify_step_m", p.densify_step_m)?;

        let c = &self.curvature;
        if let CurvatureMethod::FiniteDifference { step_m } = c.method {
            positive("curvature.method.step_m", step_m)?;
        }
        non_negative("curvature.dedup_epsilon_m", c.dedup_epsilon_m)?;
        positive("curvature.min_radius_m", c.min_radius_m)?;
        positive("curvature.straight_radius_m", c.straight_radius_m)?;
        if c.min_radius_m > c.straight_radius_m {
            return Err(ConfigLoadError::Validation(format!(
                "curvature.min_radius_m ({}) exceeds curvature.straight_radius_m ({})",
                c.min_radius_m, c.straight_radius_m
            )));
        }
        percent("curvature.robust_percentile", c.robust_percentile)?;

        let k = &self.clothoid;
        positive("clothoid.step_m", k.step_m)?;
        positive("clothoid.window_m", k.window_m)?;
        if k.r2_min.is_nan() {
            return Err(ConfigLoadError::Validation("clothoid.r2_min is NaN".into()));
        }

        let v = &self.curves;
        non_negative("curves.kappa_min", v.kappa_min)?;
        non_negative("curves.radius_max_m", v.radius_max_m)?;
        if !(0.0..=1.0).contains(&v.fallback_fraction) {
            return Err(ConfigLoadError::Validation(format!(
                "curves.fallback_fraction must be in [0, 1], got {}",
                v.fallback_fraction
            )));
        }
        if v.profile_bins == 0 {
            return Err(ConfigLoadError::Validation(
                "curves.profile_bins must be at least 1".into(),
            ));
        }

        let m = &self.matching;
        non_negative("matching.max_dist_m", m.max_dist_m)?;
        non_negative("matching.len_ratio_max", m.len_ratio_max)?;

        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<(), ConfigLoadError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigLoadError::Validation(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), ConfigLoadError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigLoadError::Validation(format!(
            "{name} must be non-negative, got {value}"
        )))
    }
}

fn percent(name: &str, value: f64) -> Result<(), ConfigLoadError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigLoadError::Validation(format!(
            "{name} must be in [0, 100], got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::MatcherBackend;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = VakraConfig::default();
        assert_eq!(config.curvature.min_radius_m, 5.0);
        assert_eq!(config.curvature.straight_radius_m, 5000.0);
        assert_eq!(config.curves.kappa_min, 1e-4);
        assert_eq!(config.curves.radius_max_m, 150.0);
        assert_eq!(config.matching.max_dist_m, 50.0);
        assert_eq!(config.matching.len_ratio_max, 2.0);
        assert_eq!(config.clothoid.window_m, 60.0);
        assert_eq!(config.clothoid.step_m, 8.0);
        assert_eq!(config.clothoid.r2_min, 0.9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = VakraConfig::default();
        let yaml = config.to_yaml().unwrap();
        let parsed = VakraConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
curvature:
  method:
    kind: finite_difference
    step_m: 5.0
matching:
  backend: grid
  max_dist_m: 25.0
"#;
        let config = VakraConfig::from_yaml(yaml).unwrap();
        assert_eq!(
            config.curvature.method,
            CurvatureMethod::FiniteDifference { step_m: 5.0 }
        );
        assert_eq!(config.curvature.straight_radius_m, 5000.0);
        assert_eq!(config.matching.backend, MatcherBackend::Grid);
        assert_eq!(config.matching.max_dist_m, 25.0);
        assert_eq!(config.matching.len_ratio_max, 2.0);
        assert_eq!(config.preprocess.densify_step_m, 5.0);
    }

    #[test]
    fn test_validation_errors() {
        let bad = [
            "matching:\n  max_dist_m: -1.0\n",
            "clothoid:\n  step_m: 0.0\n",
            "curvature:\n  robust_percentile: 120.0\n",
            "curvature:\n  min_radius_m: 6000.0\n",
            "curves:\n  fallback_fraction: 1.5\n",
            "curvature:\n  dedup_epsilon_m: -1.0\n",
            "curvature:\n  method:\n    kind: finite_difference\n    step_m: -2.0\n",
        ];
        for yaml in bad {
            let err = VakraConfig::from_yaml(yaml).unwrap_err();
            assert!(matches!(err, ConfigLoadError::Validation(_)), "{yaml}: {err}");
        }
    }

    #[test]
    fn test_single_dedup_epsilon() {
        let config = VakraConfig::from_yaml("curvature:\n  dedup_epsilon_m: 0.01\n").unwrap();
        assert_eq!(config.curvature.dedup_epsilon_m, 0.01);
        let yaml = config.to_yaml().unwrap();
        assert_eq!(yaml.matches("dedup_epsilon_m").count(), 1);
    }

    #[test]
    fn test_parse_error() {
        let err = VakraConfig::from_yaml("matching: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Parse(_)));
        let err = VakraConfig::from_yaml("matching:\n  backend: quadtree\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "curves:\n  radius_max_m: 200.0").unwrap();
        let config = VakraConfig::load(file.path()).unwrap();
        assert_eq!(config.curves.radius_max_m, 200.0);

        let err = VakraConfig::load("/nonexistent/vakra.yaml").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Io(_)));
    }
}
