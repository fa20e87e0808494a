//! Unified configuration for curvature comparison runs.
//!
//! All thresholds live in one YAML file with documented defaults; missing
//! sections and fields fall back to those defaults.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vakra::config::VakraConfig;
//!
//! // Load and validate a file
//! let config = VakraConfig::load("configs/vakra.yaml")?;
//!
//! // Or use built-in defaults (no file needed)
//! let config = VakraConfig::default();
//! ```
//!
//! ## Configuration Sections
//!
//! | Section | Description |
//! |---------|-------------|
//! | `preprocess` | Duplicate removal, minimum length, simplification, densification |
//! | `curvature` | Estimation method, radius floor and straight ceiling |
//! | `clothoid` | Window, step and R² threshold |
//! | `curves` | Flagging thresholds and fallback share |
//! | `matching` | Backend, distance and length-ratio limits |
//!
//! ## Example YAML
//!
//! ```yaml
//! curvature:
//!   method:
//!     kind: finite_difference
//!     step_m: 5.0
//!   straight_radius_m: 5000.0
//! curves:
//!   kappa_min: 0.0001
//!   radius_max_m: 150.0
//! matching:
//!   backend: grid
//!   max_dist_m: 50.0
//! ```

mod error;
mod vakra;

pub use error::ConfigLoadError;
pub use vakra::VakraConfig;
