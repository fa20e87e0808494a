//! Error types for curvature computation and matching.
//!
//! Only caller contract violations surface as errors. Degenerate geometry
//! (colinear triangles, zero-length lines, singular regressions) is absorbed
//! into sentinel values where it occurs, and a missing match is simply absent
//! from the result.

use thiserror::Error;

use crate::config::ConfigLoadError;

/// Result type alias for vakra operations.
pub type Result<T> = std::result::Result<T, VakraError>;

/// Errors surfaced to the caller.
#[derive(Debug, Error)]
pub enum VakraError {
    /// Malformed geometry or parameters: too few points, non-positive step
    /// or window sizes, negative distances, NaN coordinates.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigLoadError),
}

impl VakraError {
    /// Create an invalid input error.
    pub fn invalid_input(details: impl Into<String>) -> Self {
        Self::InvalidInput(details.into())
    }
}

/// Reject non-finite or non-positive step-like parameters.
pub(crate) fn ensure_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(VakraError::invalid_input(format!(
            "{name} must be a positive finite number, got {value}"
        )))
    }
}

/// Reject NaN or negative distance-like parameters. `+∞` is allowed.
pub(crate) fn ensure_non_negative(name: &str, value: f64) -> Result<()> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(VakraError::invalid_input(format!(
            "{name} must be non-negative, got {value}"
        )))
    }
}
