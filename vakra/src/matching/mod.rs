//! Nearest-neighbour matching between two point sets.
//!
//! For every point of A the closest point of B is searched among
//! class-compatible candidates and kept when it lies within `max_dist`.
//! Two interchangeable backends answer the per-point queries:
//!
//! | Backend | Index                         | Query                         |
//! |---------|-------------------------------|-------------------------------|
//! | Tree    | R-tree (`rstar`) over B       | incremental nearest iterator  |
//! | Grid    | hash grid, cell ≥ `max_dist`  | 3×3 neighbourhood scan        |
//!
//! Both evaluate distances with [`Point2D::distance_sq`] and break ties on
//! the lowest B index, so they return bit-identical records.

pub mod class;
mod grid;
mod tree;

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{Point2D, validate_finite};
use crate::error::{Result, VakraError, ensure_non_negative};

pub use class::{ClassCompatibility, ClassMapping, NormalizedClass, normalize_class};
use grid::GridIndex;
use tree::TreeIndex;

/// One accepted nearest-neighbour pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Index in A.
    pub index_a: usize,
    /// Index of the nearest compatible point in B.
    pub index_b: usize,
    /// Euclidean distance (m).
    pub distance_m: f64,
    /// Secondary compatibility score (arc-length ratio for curve matches).
    pub compatibility_ratio: Option<f64>,
}

/// Spatial index used to answer nearest-neighbour queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherBackend {
    /// Balanced R-tree.
    #[default]
    Tree,
    /// Uniform hash grid.
    Grid,
}

/// Configuration for spatial matching.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Index backend.
    /// Default: tree
    pub backend: MatcherBackend,

    /// Maximum accepted distance (m).
    /// Default: 50.0
    pub max_dist_m: f64,

    /// Maximum arc-length ratio between matched curves.
    /// Default: 2.0
    pub len_ratio_max: f64,

    /// Only match elements whose classes are compatible.
    /// Default: false
    pub match_class: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            backend: MatcherBackend::Tree,
            max_dist_m: 50.0,
            len_ratio_max: 2.0,
            match_class: false,
        }
    }
}

impl MatchingConfig {
    /// Builder-style setter for the backend.
    pub fn with_backend(mut self, backend: MatcherBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Builder-style setter for the maximum distance.
    pub fn with_max_dist(mut self, meters: f64) -> Self {
        self.max_dist_m = meters;
        self
    }
}

/// Class labels of both point sets plus the rule that compares them.
///
/// Labels are canonicalised once at construction.
pub struct ClassFilter {
    keys_a: Vec<Option<String>>,
    keys_b: Vec<Option<String>>,
}

impl ClassFilter {
    /// Canonicalise the labels of A and B with `rule`.
    pub fn new<C: ClassCompatibility + ?Sized>(
        classes_a: &[Option<String>],
        classes_b: &[Option<String>],
        rule: &C,
    ) -> Self {
        let canon = |labels: &[Option<String>]| -> Vec<Option<String>> {
            labels
                .iter()
                .map(|c| c.as_deref().and_then(|raw| rule.canonical(raw)))
                .collect()
        };
        Self {
            keys_a: canon(classes_a),
            keys_b: canon(classes_b),
        }
    }

    fn check_lengths(&self, len_a: usize, len_b: usize) -> Result<()> {
        if self.keys_a.len() != len_a || self.keys_b.len() != len_b {
            return Err(VakraError::invalid_input(format!(
                "class labels ({}, {}) do not match point counts ({len_a}, {len_b})",
                self.keys_a.len(),
                self.keys_b.len()
            )));
        }
        Ok(())
    }

    #[inline]
    fn compatible(&self, i: usize, j: usize) -> bool {
        match (&self.keys_a[i], &self.keys_b[j]) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// Nearest-neighbour query over an indexed point set B.
trait NearestIndex: Sync {
    /// Nearest accepted point within `max_dist` of `query`, as `(index, d²)`.
    fn nearest(
        &self,
        query: Point2D,
        max_dist: f64,
        accept: &dyn Fn(usize) -> bool,
    ) -> Option<(usize, f64)>;
}

/// Running minimum over `(d², index)` with lowest-index tie-break.
#[derive(Clone, Copy, Debug)]
struct Best {
    index: usize,
    dist_sq: f64,
}

impl Best {
    #[inline]
    fn offer(best: &mut Option<Best>, index: usize, dist_sq: f64) {
        let better = match best {
            None => true,
            Some(b) => dist_sq < b.dist_sq || (dist_sq == b.dist_sq && index < b.index),
        };
        if better {
            *best = Some(Best { index, dist_sq });
        }
    }

    #[inline]
    fn within(best: Option<Best>, max_dist: f64) -> Option<(usize, f64)> {
        best.filter(|b| b.dist_sq.sqrt() <= max_dist)
            .map(|b| (b.index, b.dist_sq))
    }
}

/// Nearest-neighbour matcher with a selectable backend.
///
/// # Example
/// ```
/// use vakra::core::Point2D;
/// use vakra::matching::{MatcherBackend, SpatialMatcher};
///
/// let a = [Point2D::new(0.0, 0.0), Point2D::new(100.0, 0.0)];
/// let b = [Point2D::new(3.0, 4.0), Point2D::new(0.0, 5.0)];
///
/// let matches = SpatialMatcher::new(MatcherBackend::Grid)
///     .nearest_within(&a, &b, 10.0, None)
///     .unwrap();
/// assert_eq!(matches.len(), 1);
/// // Both B points are 5 m away: lowest index wins
/// assert_eq!(matches[0].index_b, 0);
/// assert_eq!(matches[0].distance_m, 5.0);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct SpatialMatcher {
    backend: MatcherBackend,
}

impl SpatialMatcher {
    /// Create a matcher using `backend`.
    pub fn new(backend: MatcherBackend) -> Self {
        Self { backend }
    }

    /// Backend in use.
    pub fn backend(&self) -> MatcherBackend {
        self.backend
    }

    /// Match every point of `a` to its nearest compatible point of `b`.
    ///
    /// Records come out in increasing `index_a`; points of A without a
    /// compatible B point within `max_dist` are omitted.
    ///
    /// # Errors
    /// `InvalidInput` for a negative or NaN `max_dist`, non-finite
    /// coordinates, or class labels whose lengths differ from the point sets.
    pub fn nearest_within(
        &self,
        a: &[Point2D],
        b: &[Point2D],
        max_dist: f64,
        classes: Option<&ClassFilter>,
    ) -> Result<Vec<MatchRecord>> {
        ensure_non_negative("max_dist", max_dist)?;
        validate_finite(a)?;
        validate_finite(b)?;
        if let Some(filter) = classes {
            filter.check_lengths(a.len(), b.len())?;
        }

        if a.is_empty() || b.is_empty() {
            return Ok(Vec::new());
        }

        let records = match self.backend {
            MatcherBackend::Tree => query_all(&TreeIndex::build(b), a, max_dist, classes),
            MatcherBackend::Grid => query_all(&GridIndex::build(b, max_dist), a, max_dist, classes),
        };

        debug!(
            "[Matching] {:?}: {}/{} points matched within {:.1} m",
            self.backend,
            records.len(),
            a.len(),
            max_dist
        );
        Ok(records)
    }
}

fn query_all<I: NearestIndex>(
    index: &I,
    a: &[Point2D],
    max_dist: f64,
    classes: Option<&ClassFilter>,
) -> Vec<MatchRecord> {
    a.par_iter()
        .enumerate()
        .filter_map(|(i, &query)| {
            let accept = |j: usize| classes.is_none_or(|f| f.compatible(i, j));
            index
                .nearest(query, max_dist, &accept)
                .map(|(j, dist_sq)| MatchRecord {
                    index_a: i,
                    index_b: j,
                    distance_m: dist_sq.sqrt(),
                    compatibility_ratio: None,
                })
        })
        .collect()
}
