//! # Half-Edge Primitives
//!
//! Vertex, half-edge and face records of the construction-time mesh.
//!
//! Elements refer to each other through typed indices into the arena pools
//! rather than pointers. Unset references hold the `NONE` sentinel of their
//! id type; list and free-list links use `Option`.

use crate::list::{Linked, Links, List};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Index types addressing a pool slot.
pub trait ElementId: Copy + Eq + Debug {
    /// Sentinel for "no element".
    const NONE: Self;

    /// Creates an id from a slot index.
    fn from_index(index: usize) -> Self;

    /// Returns the slot index.
    fn index(self) -> usize;

    /// Returns true for the sentinel.
    #[inline]
    fn is_none(self) -> bool {
        self == Self::NONE
    }
}

macro_rules! element_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl ElementId for $name {
            const NONE: Self = Self(u32::MAX);

            #[inline]
            fn from_index(index: usize) -> Self {
                debug_assert!(index < u32::MAX as usize, "index {} too large", index);
                Self(index as u32)
            }

            #[inline]
            fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

element_id!(
    /// Identifier of a vertex slot.
    VertexId
);
element_id!(
    /// Identifier of a half-edge slot.
    EdgeId
);
element_id!(
    /// Identifier of a face slot.
    FaceId
);

// =============================================================================
// PLANE
// =============================================================================

/// A plane `normal · x = offset` with unit normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal, pointing out of the hull.
    pub normal: DVec3,
    /// Signed distance of the plane from the origin along `normal`.
    pub offset: f64,
}

impl Plane {
    /// Creates a plane from a unit normal and offset.
    pub fn new(normal: DVec3, offset: f64) -> Self {
        Self { normal, offset }
    }

    /// Creates the plane through `point` with the given unit normal.
    pub fn from_normal_and_point(normal: DVec3, point: DVec3) -> Self {
        Self {
            normal,
            offset: normal.dot(point),
        }
    }

    /// Returns the signed distance of `point`; positive means in front.
    #[inline]
    pub fn distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point) - self.offset
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self {
            normal: DVec3::ZERO,
            offset: 0.0,
        }
    }
}

/// One term of Newell's normal for the polygon edge `a -> b`.
///
/// Summed over a closed loop this yields twice the area-weighted normal,
/// oriented by the loop's winding.
#[inline]
pub fn newell(a: DVec3, b: DVec3) -> DVec3 {
    DVec3::new(
        (a.y - b.y) * (a.z + b.z),
        (a.z - b.z) * (a.x + b.x),
        (a.x - b.x) * (a.y + b.y),
    )
}

/// Fits a plane to the closed polygon through `points`, given in winding
/// order.
///
/// Returns the plane and the average of the points, or `None` for fewer
/// than three points or a polygon without area.
pub fn fit_polygon(points: impl IntoIterator<Item = DVec3>) -> Option<(Plane, DVec3)> {
    let mut points = points.into_iter();
    let first = points.next()?;
    let mut prev = first;
    let mut normal = DVec3::ZERO;
    let mut sum = first;
    let mut count = 1usize;
    for point in points {
        normal += newell(prev, point);
        sum += point;
        count += 1;
        prev = point;
    }
    normal += newell(prev, first);

    let normal = normal.normalize_or_zero();
    if count < 3 || normal == DVec3::ZERO {
        return None;
    }
    let center = sum / count as f64;
    Some((Plane::from_normal_and_point(normal, center), center))
}

// =============================================================================
// ELEMENTS
// =============================================================================

/// A point of the input set; a hull vertex once referenced by an edge.
///
/// While unclaimed it sits in the conflict list of the face it lies outside.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Position in 3D space.
    pub position: DVec3,
    /// Conflict-list links.
    pub links: Links<VertexId>,
    /// Free-list link, distinct from `links`.
    pub free_next: Option<VertexId>,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            links: Links::default(),
            free_next: None,
        }
    }
}

impl Linked<VertexId> for Vertex {
    fn links(&self) -> &Links<VertexId> {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links<VertexId> {
        &mut self.links
    }
}

/// A directed edge bounding exactly one face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfEdge {
    /// Origin vertex.
    pub tail: VertexId,
    /// Opposite half-edge of the same undirected edge.
    pub twin: EdgeId,
    /// Next half-edge around the face.
    pub next: EdgeId,
    /// Face this half-edge bounds.
    pub face: FaceId,
    /// Free-list link.
    pub free_next: Option<EdgeId>,
}

impl Default for HalfEdge {
    fn default() -> Self {
        Self {
            tail: VertexId::NONE,
            twin: EdgeId::NONE,
            next: EdgeId::NONE,
            face: FaceId::NONE,
            free_next: None,
        }
    }
}

/// Lifecycle of a face slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceState {
    /// On the hull boundary.
    Active,
    /// Visible from an eye point or merged away; storage pending reuse.
    Deleted,
}

/// A convex polygonal face.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// Representative boundary half-edge.
    pub edge: EdgeId,
    /// Plane fitted to the boundary loop.
    pub plane: Plane,
    /// Average of the boundary vertices.
    pub center: DVec3,
    /// Lifecycle tag.
    pub state: FaceState,
    /// Face-list links.
    pub links: Links<FaceId>,
    /// Points outside this face that it is responsible for.
    pub conflicts: List<VertexId>,
    /// Free-list link.
    pub free_next: Option<FaceId>,
}

impl Default for Face {
    fn default() -> Self {
        Self {
            edge: EdgeId::NONE,
            plane: Plane::default(),
            center: DVec3::ZERO,
            state: FaceState::Active,
            links: Links::default(),
            conflicts: List::new(),
            free_next: None,
        }
    }
}

impl Linked<FaceId> for Face {
    fn links(&self) -> &Links<FaceId> {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links<FaceId> {
        &mut self.links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plane_distance_sign() {
        let plane = Plane::from_normal_and_point(DVec3::Z, DVec3::new(0.0, 0.0, 2.0));
        assert_relative_eq!(plane.offset, 2.0);
        assert_relative_eq!(plane.distance(DVec3::new(5.0, -1.0, 3.0)), 1.0);
        assert_relative_eq!(plane.distance(DVec3::ZERO), -2.0);
    }

    #[test]
    fn test_newell_follows_winding() {
        // Counter-clockwise unit square seen from +Z
        let loop_ = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ];
        let mut n = DVec3::ZERO;
        for i in 0..loop_.len() {
            n += newell(loop_[i], loop_[(i + 1) % loop_.len()]);
        }
        // Twice the area along +Z
        assert!(n.abs_diff_eq(DVec3::new(0.0, 0.0, 2.0), 1e-12));
    }

    #[test]
    fn test_fit_polygon_averages_and_orients() {
        let square = [
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(2.0, 0.0, 1.0),
            DVec3::new(2.0, 2.0, 1.0),
            DVec3::new(0.0, 2.0, 1.0),
        ];
        let (plane, center) = fit_polygon(square).unwrap();
        assert!(plane.normal.abs_diff_eq(DVec3::Z, 1e-12));
        assert_relative_eq!(plane.offset, 1.0);
        assert!(center.abs_diff_eq(DVec3::new(1.0, 1.0, 1.0), 1e-12));

        // Reversed winding flips the normal
        let (flipped, _) = fit_polygon(square.into_iter().rev()).unwrap();
        assert!(flipped.normal.abs_diff_eq(DVec3::NEG_Z, 1e-12));
    }

    #[test]
    fn test_fit_polygon_rejects_degenerate_loops() {
        assert!(fit_polygon([DVec3::ZERO, DVec3::X]).is_none());
        assert!(fit_polygon([DVec3::ZERO, DVec3::X, DVec3::X * 2.0]).is_none());
    }

    #[test]
    fn test_ids_round_trip_index() {
        assert_eq!(FaceId::from_index(7).index(), 7);
        assert!(EdgeId::NONE.is_none());
        assert!(!VertexId(0).is_none());
    }

    #[test]
    fn test_default_elements_are_unlinked() {
        let edge = HalfEdge::default();
        assert!(edge.twin.is_none() && edge.next.is_none() && edge.face.is_none());
        let face = Face::default();
        assert!(face.conflicts.is_empty());
        assert_eq!(face.state, FaceState::Active);
    }
}
