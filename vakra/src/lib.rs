//! # Vakra: Road Curvature Comparison
//!
//! Geometric engine for comparing the curvature of two road datasets
//! describing the same network (for example an authoritative map and a
//! crowd-sourced one).
//!
//! ## Features
//!
//! - **Curvature profiles**: three-point circumradius or finite differences
//!   on uniformly resampled lines
//! - **Clothoid detection**: sliding-window linear fits of `κ(s)`
//! - **Spatial matching**: nearest neighbour within a distance, R-tree or
//!   hash-grid backend with identical results
//! - **Curve features**: grouping of high-curvature runs into curves and
//!   cross-source curve pairing
//!
//! ## Quick Start
//!
//! ```rust
//! use vakra::core::Point2D;
//! use vakra::pipeline::{RoadLine, profile_lines};
//! use vakra::VakraConfig;
//!
//! let line: Vec<Point2D> = (0..=90)
//!     .map(|i| {
//!         let t = (i as f64).to_radians();
//!         Point2D::new(100.0 * t.cos(), 100.0 * t.sin())
//!     })
//!     .collect();
//! let profiles = profile_lines(&[RoadLine::new("r1", "osm", line)], &VakraConfig::default())?;
//! assert_eq!(profiles.len(), 1);
//! assert!(!profiles[0].summary.is_straight);
//! # Ok::<(), vakra::VakraError>(())
//! ```
//!
//! ## Coordinates
//!
//! All coordinates are planar, in meters, in a metric projection shared by
//! both datasets. Curvature is unsigned (1/m); a straight stretch has zero
//! curvature and infinite radius.
//!
//! ## Data Flow
//!
//! ```text
//!        ┌──────────────┐                     ┌──────────────┐
//!        │   Lines A    │                     │   Lines B    │
//!        └──────┬───────┘                     └──────┬───────┘
//!               │ pipeline (dedup, simplify, densify)│
//!               ▼                                    ▼
//!        ┌──────────────┐                     ┌──────────────┐
//!        │  Curvature   │──► clothoid fits    │  Curvature   │
//!        │   profiles   │                     │   profiles   │
//!        └──────┬───────┘                     └──────┬───────┘
//!               │                                    │
//!       ┌───────┴────────┐                  ┌────────┴───────┐
//!       ▼                ▼                  ▼                ▼
//!  LineSummary     CurveExtractor      CurveExtractor    LineSummary
//!       │                │                  │                │
//!       │                └──► CurveMatcher ◄┘                │
//!       │                          │                         │
//!       └────► compare_lines ◄─────┼─────────────────────────┘
//!                    │             ▼
//!                    ▼        CurvePairDiff (radius, κ, lateral accel.)
//!              LinePairDiff
//! ```
//!
//! Every stage is a pure function of its inputs and configuration; no state
//! is kept between calls.

#![warn(missing_docs)]

pub mod clothoid;
pub mod config;
pub mod core;
pub mod curvature;
pub mod curves;
pub mod error;
pub mod matching;
pub mod pipeline;
pub mod sampling;

// Re-export main types at crate root
pub use config::{ConfigLoadError, VakraConfig};
pub use error::{Result, VakraError};

pub use clothoid::{ClothoidConfig, ClothoidFitter, ClothoidWindow};
pub use curvature::{CurvatureConfig, CurvatureEstimator, CurvatureMethod, CurvatureSample};
pub use curves::{CurveConfig, CurveExtractor, CurveMatcher, CurveRecord, CurveSample};
pub use matching::{MatchRecord, MatcherBackend, MatchingConfig, SpatialMatcher};
pub use pipeline::{LineProfile, RoadLine, profile_lines};
