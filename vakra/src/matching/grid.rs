//! Uniform hash-grid backend.
//!
//! Cells are at least `max_dist` wide, so every B point within `max_dist` of
//! a query lies in the query's cell or one of its eight neighbours.

use std::collections::HashMap;

use super::{Best, NearestIndex};
use crate::core::Point2D;

/// Smallest cell size (m), used when `max_dist` is zero.
const MIN_CELL_SIZE: f64 = 1e-9;

/// Relative growth of the cell so that rounding in `x / cell` can never push
/// a point within `max_dist` two cells away.
const CELL_SLACK: f64 = 1e-9;

/// Integer cell coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct CellCoord {
    x: i64,
    y: i64,
}

impl CellCoord {
    #[inline]
    fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// This cell and its eight neighbours.
    #[inline]
    fn neighborhood(self) -> impl Iterator<Item = CellCoord> {
        (-1..=1).flat_map(move |dx| {
            (-1..=1).map(move |dy| {
                CellCoord::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
            })
        })
    }
}

/// Hash grid over the points of B.
pub(super) struct GridIndex<'a> {
    points: &'a [Point2D],
    inv_cell_size: f64,
    cells: HashMap<CellCoord, Vec<usize>>,
}

impl<'a> GridIndex<'a> {
    pub(super) fn build(points: &'a [Point2D], max_dist: f64) -> Self {
        let cell_size = (max_dist * (1.0 + CELL_SLACK)).max(MIN_CELL_SIZE);
        let inv_cell_size = 1.0 / cell_size;

        let mut cells: HashMap<CellCoord, Vec<usize>> = HashMap::new();
        for (i, &p) in points.iter().enumerate() {
            cells
                .entry(point_to_cell(p, inv_cell_size))
                .or_default()
                .push(i);
        }

        Self {
            points,
            inv_cell_size,
            cells,
        }
    }
}

#[inline]
fn point_to_cell(p: Point2D, inv_cell_size: f64) -> CellCoord {
    // `as` saturates for coordinates far outside the i64 range
    CellCoord::new(
        (p.x * inv_cell_size).floor() as i64,
        (p.y * inv_cell_size).floor() as i64,
    )
}

impl NearestIndex for GridIndex<'_> {
    fn nearest(
        &self,
        query: Point2D,
        max_dist: f64,
        accept: &dyn Fn(usize) -> bool,
    ) -> Option<(usize, f64)> {
        let mut best: Option<Best> = None;

        for cell in point_to_cell(query, self.inv_cell_size).neighborhood() {
            let Some(indices) = self.cells.get(&cell) else {
                continue;
            };
            for &j in indices {
                if accept(j) {
                    Best::offer(&mut best, j, query.distance_sq(self.points[j]));
                }
            }
        }

        Best::within(best, max_dist)
    }
}
