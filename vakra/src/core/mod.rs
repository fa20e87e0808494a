//! Core geometric types and numeric helpers.

pub mod math;
pub mod point;
pub mod polyline;

pub use math::{AREA_SQ_FLOOR, DENOM_FLOOR, LENGTH_RATIO_FLOOR, percentile, safe_div};
pub use point::Point2D;
pub use polyline::{
    centroid, cumulative_lengths, dedup_consecutive, simplify, total_length, validate_finite,
};
