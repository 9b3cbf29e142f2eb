//! # Runtime Hull
//!
//! A convex polyhedron stored in fixed-capacity arrays with byte indices.
//!
//! Half-edges come in twin pairs and each face is a closed loop of
//! half-edges reached through its representative edge. Index `0xFF`
//! ([`NULL_FEATURE`]) marks an unset reference.
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec3;
//! use hull_shape::ConvexHull;
//!
//! let corners: Vec<DVec3> = (0..8)
//!     .map(|i| DVec3::new((i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64))
//!     .collect();
//! let hull = ConvexHull::from_points(&corners);
//! assert_eq!(hull.face_count(), 6);
//! assert_eq!(hull.edge_count(), 24);
//! assert!((hull.centroid() - DVec3::splat(0.5)).length() < 1e-9);
//! ```

use crate::mass::{compute_mass_properties, MassProperties};
use config::constants::{MAX_HULL_EDGES, MAX_HULL_FACES, MAX_HULL_VERTICES};
use glam::DVec3;
use hull_builder::{Plane, TopologyError, TopologyResult};
use serde::{Deserialize, Serialize};

/// Sentinel for "no vertex, edge or face".
pub const NULL_FEATURE: u8 = 0xFF;

/// A directed edge of a runtime hull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HullEdge {
    /// Index of the vertex the edge starts at.
    pub origin: u8,
    /// Index of the opposite half-edge.
    pub twin: u8,
    /// Index of the next half-edge around the face.
    pub next: u8,
    /// Index of the face the edge bounds.
    pub face: u8,
}

impl Default for HullEdge {
    fn default() -> Self {
        Self {
            origin: NULL_FEATURE,
            twin: NULL_FEATURE,
            next: NULL_FEATURE,
            face: NULL_FEATURE,
        }
    }
}

/// A face of a runtime hull, reached through one boundary half-edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HullFace {
    /// Index of the representative half-edge.
    pub edge: u8,
}

impl Default for HullFace {
    fn default() -> Self {
        Self { edge: NULL_FEATURE }
    }
}

/// A convex polyhedron with at most [`MAX_HULL_VERTICES`] vertices,
/// [`MAX_HULL_EDGES`] half-edges and [`MAX_HULL_FACES`] faces.
///
/// Built from a point cloud through [`ConvexHull::set`] and friends. A hull
/// whose counts are all zero is empty; `set` leaves it that way when the
/// input is degenerate or the result does not fit.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexHull {
    pub(crate) vertices: [DVec3; MAX_HULL_VERTICES],
    pub(crate) edges: [HullEdge; MAX_HULL_EDGES],
    pub(crate) faces: [HullFace; MAX_HULL_FACES],
    pub(crate) planes: [Plane; MAX_HULL_FACES],
    pub(crate) centroid: DVec3,
    pub(crate) vertex_count: usize,
    pub(crate) edge_count: usize,
    pub(crate) face_count: usize,
}

impl Default for ConvexHull {
    fn default() -> Self {
        Self {
            vertices: [DVec3::ZERO; MAX_HULL_VERTICES],
            edges: [HullEdge::default(); MAX_HULL_EDGES],
            faces: [HullFace::default(); MAX_HULL_FACES],
            planes: [Plane::default(); MAX_HULL_FACES],
            centroid: DVec3::ZERO,
            vertex_count: 0,
            edge_count: 0,
            face_count: 0,
        }
    }
}

impl ConvexHull {
    /// Creates an empty hull.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the hull.
    pub fn clear(&mut self) {
        self.vertex_count = 0;
        self.edge_count = 0;
        self.face_count = 0;
        self.centroid = DVec3::ZERO;
    }

    /// Returns true if the hull has no faces.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.face_count == 0
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of half-edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Number of faces.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.face_count
    }

    /// Returns a vertex position.
    #[inline]
    pub fn vertex(&self, index: u8) -> DVec3 {
        self.vertices()[index as usize]
    }

    /// Returns a half-edge.
    #[inline]
    pub fn edge(&self, index: u8) -> &HullEdge {
        &self.edges()[index as usize]
    }

    /// Returns a face.
    #[inline]
    pub fn face(&self, index: u8) -> &HullFace {
        &self.faces()[index as usize]
    }

    /// Returns the plane of a face.
    #[inline]
    pub fn plane(&self, index: u8) -> &Plane {
        &self.planes()[index as usize]
    }

    /// Live vertex positions.
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices[..self.vertex_count]
    }

    /// Live half-edges.
    pub fn edges(&self) -> &[HullEdge] {
        &self.edges[..self.edge_count]
    }

    /// Live faces.
    pub fn faces(&self) -> &[HullFace] {
        &self.faces[..self.face_count]
    }

    /// Face planes, parallel to [`faces`](Self::faces).
    pub fn planes(&self) -> &[Plane] {
        &self.planes[..self.face_count]
    }

    /// Center of mass, assuming uniform density.
    #[inline]
    pub fn centroid(&self) -> DVec3 {
        self.centroid
    }

    /// Iterates the half-edge indices around a face.
    pub fn face_edges(&self, face: u8) -> HullFaceEdges<'_> {
        let start = self.face(face).edge;
        HullFaceEdges {
            hull: self,
            start,
            current: Some(start),
        }
    }

    /// Number of half-edges bounding a face.
    pub fn face_edge_count(&self, face: u8) -> usize {
        self.face_edges(face).count()
    }

    /// Number of vertices of a face; equal to its edge count.
    pub fn face_vertex_count(&self, face: u8) -> usize {
        self.face_edges(face).count()
    }

    /// Axis-aligned extents as `(min, max)`, or `None` for an empty hull.
    pub fn bounds(&self) -> Option<(DVec3, DVec3)> {
        let (first, rest) = self.vertices().split_first()?;
        Some(
            rest.iter()
                .fold((*first, *first), |(min, max), &v| (min.min(v), max.max(v))),
        )
    }

    /// Volume and centroid, or `None` for an empty hull.
    pub fn mass_properties(&self) -> Option<MassProperties> {
        (!self.is_empty()).then(|| compute_mass_properties(self))
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// Checks the structural invariants of the hull.
    ///
    /// Every reference is in range, twins are involutions running between
    /// the same vertices, and every face loop closes, owns its edges and has
    /// at least three of them.
    pub fn validate(&self) -> TopologyResult<()> {
        for (index, edge) in self.edges().iter().enumerate() {
            if edge.twin == NULL_FEATURE {
                return Err(TopologyError::MissingTwin { edge: index });
            }
            self.check_range("vertex", edge.origin, self.vertex_count)?;
            self.check_range("half-edge", edge.twin, self.edge_count)?;
            self.check_range("half-edge", edge.next, self.edge_count)?;
            self.check_range("face", edge.face, self.face_count)?;

            let twin = self.edge(edge.twin);
            if twin.twin as usize != index {
                return Err(TopologyError::TwinMismatch { edge: index });
            }
            if twin.origin != self.edge(edge.next).origin {
                return Err(TopologyError::TwinEndpoints { edge: index });
            }
        }

        for (index, face) in self.faces().iter().enumerate() {
            self.check_range("half-edge", face.edge, self.edge_count)?;

            let mut edge = face.edge;
            let mut count = 0;
            loop {
                if self.edge(edge).face as usize != index {
                    return Err(TopologyError::FaceMismatch {
                        edge: edge as usize,
                        face: index,
                    });
                }
                count += 1;
                edge = self.edge(edge).next;
                if edge == face.edge {
                    break;
                }
                if count > self.edge_count {
                    return Err(TopologyError::OpenLoop { face: index });
                }
            }

            if count < 3 {
                return Err(TopologyError::DegenerateFace {
                    face: index,
                    edges: count,
                });
            }
        }
        Ok(())
    }

    fn check_range(&self, kind: &'static str, index: u8, count: usize) -> TopologyResult<()> {
        if (index as usize) < count {
            Ok(())
        } else {
            Err(TopologyError::IndexOutOfRange {
                kind,
                index: index as usize,
            })
        }
    }
}

/// Iterator over the half-edge indices of a runtime hull face.
pub struct HullFaceEdges<'h> {
    hull: &'h ConvexHull,
    start: u8,
    current: Option<u8>,
}

impl Iterator for HullFaceEdges<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let edge = self.current?;
        let next = self.hull.edge(edge).next;
        self.current = (next != self.start).then_some(next);
        Some(edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tetrahedron (0,0,0), (1,0,0), (0,1,0), (0,0,1) laid out by hand.
    fn tetrahedron() -> ConvexHull {
        let mut hull = ConvexHull::new();
        hull.vertices[..4].copy_from_slice(&[DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z]);
        hull.vertex_count = 4;

        // Faces as vertex loops, outward winding
        let loops: [[u8; 3]; 4] = [[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]];
        for (f, vs) in loops.iter().enumerate() {
            for i in 0..3 {
                let e = f * 3 + i;
                hull.edges[e] = HullEdge {
                    origin: vs[i],
                    twin: NULL_FEATURE,
                    next: (f * 3 + (i + 1) % 3) as u8,
                    face: f as u8,
                };
            }
            hull.faces[f] = HullFace {
                edge: (f * 3) as u8,
            };
        }
        hull.edge_count = 12;
        hull.face_count = 4;

        for e in 0..12u8 {
            let tail = hull.edges[e as usize].origin;
            let head = hull.edges[hull.edges[e as usize].next as usize].origin;
            let twin = (0..12u8)
                .find(|&t| {
                    hull.edges[t as usize].origin == head
                        && hull.edges[hull.edges[t as usize].next as usize].origin == tail
                })
                .unwrap();
            hull.edges[e as usize].twin = twin;
        }
        hull
    }

    #[test]
    fn test_default_is_empty() {
        let hull = ConvexHull::default();
        assert!(hull.is_empty());
        assert!(hull.vertices().is_empty());
        assert!(hull.bounds().is_none());
        assert!(hull.mass_properties().is_none());
        assert!(hull.validate().is_ok());
    }

    #[test]
    fn test_hand_built_tetrahedron_validates() {
        let hull = tetrahedron();
        assert!(hull.validate().is_ok());
        for face in 0..4 {
            assert_eq!(hull.face_edge_count(face), 3);
            assert_eq!(hull.face_vertex_count(face), 3);
        }
        assert_eq!(hull.bounds(), Some((DVec3::ZERO, DVec3::ONE)));
    }

    #[test]
    fn test_validate_reports_missing_twin() {
        let mut hull = tetrahedron();
        hull.edges[5].twin = NULL_FEATURE;
        assert_eq!(
            hull.validate(),
            Err(TopologyError::MissingTwin { edge: 5 })
        );
    }

    #[test]
    fn test_validate_reports_twin_mismatch() {
        let mut hull = tetrahedron();
        let twin = hull.edges[0].twin;
        hull.edges[twin as usize].twin = 1;
        assert!(matches!(
            hull.validate(),
            Err(TopologyError::TwinMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_reports_foreign_loop_edge() {
        let mut hull = tetrahedron();
        hull.edges[1].face = 2;
        assert!(matches!(
            hull.validate(),
            Err(TopologyError::FaceMismatch { edge: 1, face: 0 })
        ));
    }

    #[test]
    fn test_validate_reports_out_of_range_vertex() {
        let mut hull = tetrahedron();
        hull.edges[0].origin = 9;
        assert_eq!(
            hull.validate(),
            Err(TopologyError::IndexOutOfRange {
                kind: "vertex",
                index: 9
            })
        );
    }

    #[test]
    fn test_clear_resets_counts() {
        let mut hull = tetrahedron();
        hull.clear();
        assert_eq!(
            (hull.vertex_count(), hull.edge_count(), hull.face_count()),
            (0, 0, 0)
        );
        assert!(hull.is_empty());
    }
}
