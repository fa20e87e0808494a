//! R-tree backend.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use super::{Best, NearestIndex};
use crate::core::Point2D;

/// Relative slack on the stopping radius of the incremental search. Node
/// envelopes and points may round differently by an ulp.
const STOP_SLACK: f64 = 1e-9;

/// A B point stored in the tree together with its index.
#[derive(Clone, Copy, Debug)]
struct IndexedPoint {
    point: Point2D,
    index: usize,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point.to_array())
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        Point2D::new(point[0], point[1]).distance_sq(self.point)
    }
}

/// R-tree over the points of B.
pub(super) struct TreeIndex {
    tree: RTree<IndexedPoint>,
}

impl TreeIndex {
    pub(super) fn build(points: &[Point2D]) -> Self {
        let indexed: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .map(|(index, &point)| IndexedPoint { point, index })
            .collect();
        Self {
            tree: RTree::bulk_load(indexed),
        }
    }
}

impl NearestIndex for TreeIndex {
    fn nearest(
        &self,
        query: Point2D,
        max_dist: f64,
        accept: &dyn Fn(usize) -> bool,
    ) -> Option<(usize, f64)> {
        let stop_sq = max_dist * max_dist * (1.0 + STOP_SLACK);
        let mut best: Option<Best> = None;

        // Candidates arrive in increasing distance; keep going past the first
        // hit so equidistant points with a lower index are still seen.
        for (candidate, _) in self
            .tree
            .nearest_neighbor_iter_with_distance_2(&query.to_array())
        {
            let dist_sq = query.distance_sq(candidate.point);
            if dist_sq > stop_sq {
                break;
            }
            if let Some(b) = best {
                if dist_sq > b.dist_sq * (1.0 + STOP_SLACK) {
                    break;
                }
            }
            if accept(candidate.index) {
                Best::offer(&mut best, candidate.index, dist_sq);
            }
        }

        Best::within(best, max_dist)
    }
}
