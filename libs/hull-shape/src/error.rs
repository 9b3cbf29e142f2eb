//! # Hull Rejections
//!
//! Reasons a point set did not produce a runtime hull.

use config::constants::{MAX_HULL_EDGES, MAX_HULL_VERTICES};
use hull_builder::TopologyError;
use thiserror::Error;

/// Why [`ConvexHull::try_set`](crate::ConvexHull::try_set) left the hull
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HullRejection {
    /// Fewer than four points remain after removing coincident ones.
    #[error("Only {unique} unique points, need at least 4")]
    Degenerate {
        /// Points left after deduplication.
        unique: usize,
    },

    /// The points are collinear or coplanar within tolerance.
    #[error("Points do not enclose a volume")]
    NoVolume,

    /// The constructed hull has more vertices than a runtime hull holds.
    #[error("Hull exceeds {} vertices", MAX_HULL_VERTICES)]
    TooManyVertices,

    /// The constructed hull has more half-edges than a runtime hull holds.
    #[error("Hull exceeds {} half-edges", MAX_HULL_EDGES)]
    TooManyEdges,

    /// The constructed hull has more faces than a runtime hull holds.
    #[error("Hull has {count} faces, at most {max} allowed")]
    TooManyFaces {
        /// Faces of the constructed hull.
        count: usize,
        /// Face capacity of a runtime hull.
        max: usize,
    },

    /// The compacted hull failed validation.
    #[error("Invalid hull topology: {0}")]
    InvalidTopology(#[from] TopologyError),
}
