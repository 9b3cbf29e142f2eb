//! # Hull Shape
//!
//! Fixed-capacity runtime convex hulls for collision detection.
//! Converts point clouds into compact, byte-indexed half-edge polyhedra.
//!
//! ## Architecture
//!
//! ```text
//! points → hull-builder (QuickHull) → hull-shape (ConvexHull)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use glam::DVec3;
//! use hull_shape::{ConvexHull, HullRejection};
//!
//! let cylinder = ConvexHull::cylinder(0.5, 2.0);
//! assert_eq!(cylinder.vertex_count(), 40);
//!
//! let mut hull = ConvexHull::new();
//! let flat = [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::new(1.0, 1.0, 0.0)];
//! assert_eq!(hull.try_set(&flat), Err(HullRejection::NoVolume));
//! assert!(hull.is_empty());
//! ```

pub mod convert;
pub mod error;
pub mod hull;
pub mod mass;
pub mod primitives;

pub use convert::{dedup_points, ARENA_BUFFER_SIZE};
pub use error::HullRejection;
pub use hull::{ConvexHull, HullEdge, HullFace, HullFaceEdges, NULL_FEATURE};
pub use hull_builder::{BuildStats, HullArena, Plane};
pub use mass::{compute_mass_properties, MassProperties};
