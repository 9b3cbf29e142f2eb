//! # Hull Builder
//!
//! Construction-time convex hull kernel.
//! Builds the convex hull of a point cloud as a half-edge mesh of convex
//! polygonal faces, using storage from a caller-owned arena.
//!
//! ## Architecture
//!
//! ```text
//! points → HullArena (pools + free-lists) → QuickHull (half-edge mesh)
//! ```
//!
//! ## Modules
//!
//! - **list**: Intrusive doubly-linked lists over element indices
//! - **arena**: Pre-sized pools with O(1) free-lists and `buffer_size`
//! - **mesh**: Vertex, half-edge and face records
//! - **hull**: The incremental QuickHull builder
//!
//! ## Usage
//!
//! ```rust
//! use glam::DVec3;
//! use hull_builder::{HullArena, QuickHull};
//!
//! let cube: Vec<DVec3> = (0..8)
//!     .map(|i| DVec3::new((i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64))
//!     .collect();
//! let mut arena = HullArena::new(cube.len());
//! let hull = QuickHull::construct_default(&mut arena, &cube);
//! assert_eq!(hull.face_count(), 6);
//! assert_eq!(hull.vertex_count(), 8);
//! ```

pub mod arena;
pub mod error;
pub mod hull;
pub mod list;
pub mod mesh;

pub use arena::{buffer_size, ArenaCapacity, HullArena, Pool};
pub use error::{TopologyError, TopologyResult};
pub use hull::{BuildStats, FaceEdges, QuickHull};
pub use list::List;
pub use mesh::{EdgeId, ElementId, Face, FaceId, FaceState, HalfEdge, Plane, Vertex, VertexId};
