//! # Incremental Hull Builder
//!
//! Quickhull over an arena-backed half-edge mesh.
//!
//! ## Algorithm
//!
//! 1. Seed a tetrahedron from the axis extremes of the input.
//! 2. Hand every remaining point to the face it lies farthest outside of.
//! 3. Repeatedly take the farthest outstanding point (the eye), carve out the
//!    faces it can see, and cone the horizon to the eye with new triangles.
//!    Visibility uses an exact orientation test, so the hull stays a convex
//!    triangulation throughout.
//! 4. When no point lies beyond the tolerance, check the leftovers against
//!    the whole hull once more, then keep them as surface points.
//! 5. Merge neighbouring triangles into convex polygons wherever every hull
//!    vertex and surface point stays within the tolerance of the merged
//!    plane.
//!
//! All storage comes from a caller-owned [`HullArena`].
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec3;
//! use hull_builder::{HullArena, QuickHull};
//!
//! let points = [
//!     DVec3::new(0.0, 0.0, 0.0),
//!     DVec3::new(1.0, 0.0, 0.0),
//!     DVec3::new(0.0, 1.0, 0.0),
//!     DVec3::new(0.0, 0.0, 1.0),
//!     DVec3::new(0.1, 0.1, 0.1),
//! ];
//! let mut arena = HullArena::new(points.len());
//! let hull = QuickHull::construct(&mut arena, &points, 1e-6);
//! assert_eq!(hull.face_count(), 4);
//! assert_eq!(hull.vertex_count(), 4);
//! assert!(hull.validate().is_ok());
//! ```

mod horizon;
mod merge;
mod simplex;


use crate::arena::{HullArena, Pool};
use crate::error::{TopologyError, TopologyResult};
use crate::list::List;
use crate::mesh::{
    fit_polygon, EdgeId, ElementId, Face, FaceId, FaceState, HalfEdge, Vertex, VertexId,
};
use config::constants::HULL_TOLERANCE;
use glam::DVec3;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// Counters collected while building one hull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    /// Points added to the hull after the initial tetrahedron.
    pub iterations: u32,
    /// Faces absorbed into a neighbour.
    pub merged_faces: u32,
    /// Vertices removed from the hull while merging faces.
    pub collapsed_vertices: u32,
    /// Input points found inside the hull or within the tolerance of it.
    pub discarded_points: u32,
}

/// A convex hull under construction, or finished, inside a [`HullArena`].
///
/// An empty hull (no faces) is the result for fewer than four points or
/// for collinear and coplanar input.
#[derive(Debug)]
pub struct QuickHull<'a> {
    arena: &'a mut HullArena,
    face_list: List<FaceId>,
    orphans: List<VertexId>,
    surface: List<VertexId>,
    tolerance: f64,
    stats: BuildStats,
}

impl<'a> QuickHull<'a> {
    /// Builds the convex hull of `points` in `arena`.
    ///
    /// The arena is reset first. `tolerance` is the distance below which a
    /// point is considered on a plane rather than in front of it.
    ///
    /// # Panics
    ///
    /// If `points` exceeds the arena's point capacity.
    pub fn construct(arena: &'a mut HullArena, points: &[DVec3], tolerance: f64) -> Self {
        assert!(
            points.len() <= arena.point_capacity(),
            "{} points exceed arena capacity of {}",
            points.len(),
            arena.point_capacity()
        );
        arena.reset();

        let mut hull = Self {
            arena,
            face_list: List::new(),
            orphans: List::new(),
            surface: List::new(),
            tolerance,
            stats: BuildStats::default(),
        };

        if points.len() < 4 {
            debug!("Hull of {} points is degenerate", points.len());
            return hull;
        }

        let Some(simplex) = hull.find_initial_simplex(points) else {
            debug!(
                "Hull of {} points is degenerate: no tetrahedron above tolerance {}",
                points.len(),
                tolerance
            );
            return hull;
        };
        hull.build_initial_tetrahedron(points, simplex);

        let mut rechecked = false;
        while let Some((eye, face, distance)) = hull.next_conflict_vertex() {
            if distance > hull.tolerance {
                hull.add_point(eye, face);
                rechecked = false;
                trace!(
                    "Hull iteration {}: {} faces, eye at {:?} ({:.6} out)",
                    hull.stats.iterations,
                    hull.face_list.len(),
                    hull.arena.vertices[eye].position,
                    distance
                );
            } else if !rechecked {
                hull.reassign_conflicts();
                rechecked = true;
            } else {
                hull.settle_conflicts();
            }
        }

        hull.merge_coplanar_faces();
        hull.release_surface_points();
        debug_assert!(hull.validate().is_ok(), "finished hull is malformed");
        debug!(
            "Hull of {} points: {} vertices, {} faces after {} iterations",
            points.len(),
            hull.vertex_count(),
            hull.face_count(),
            hull.stats.iterations
        );

        hull
    }

    /// Builds the convex hull of `points` with [`HULL_TOLERANCE`].
    pub fn construct_default(arena: &'a mut HullArena, points: &[DVec3]) -> Self {
        Self::construct(arena, points, HULL_TOLERANCE)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Iterates the live faces.
    pub fn faces(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.face_list.iter(&self.arena.faces)
    }

    /// The live-face list.
    pub fn face_list(&self) -> &List<FaceId> {
        &self.face_list
    }

    /// Returns a face record.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.arena.faces[id]
    }

    /// Returns a half-edge record.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &HalfEdge {
        &self.arena.edges[id]
    }

    /// Returns a vertex record.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.arena.vertices[id]
    }

    /// Returns the vertex a half-edge points to.
    #[inline]
    pub fn head(&self, edge: EdgeId) -> VertexId {
        let edges = &self.arena.edges;
        edges[edges[edge].next].tail
    }

    /// Iterates the boundary half-edges of a face, starting at its
    /// representative edge.
    pub fn face_edges(&self, face: FaceId) -> FaceEdges<'_> {
        let start = self.arena.faces[face].edge;
        FaceEdges {
            edges: &self.arena.edges,
            start,
            current: (!start.is_none()).then_some(start),
        }
    }

    /// Number of half-edges bounding a face.
    pub fn face_edge_count(&self, face: FaceId) -> usize {
        self.face_edges(face).count()
    }

    /// Number of vertices of a face; equal to its edge count.
    pub fn face_vertex_count(&self, face: FaceId) -> usize {
        self.face_edges(face).count()
    }

    /// Finds the live half-edge running from `tail` to `head`.
    ///
    /// Linear in the size of the hull.
    pub fn find_twin(&self, tail: VertexId, head: VertexId) -> Option<EdgeId> {
        self.faces()
            .flat_map(|face| self.face_edges(face))
            .find(|&edge| self.arena.edges[edge].tail == tail && self.head(edge) == head)
    }

    /// Number of live faces.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.face_list.len()
    }

    /// Number of live half-edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.arena.edges.live()
    }

    /// Number of live vertices. Once construction returns, every live
    /// vertex is a hull vertex.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.arena.vertices.live()
    }

    /// Number of points added after the initial tetrahedron.
    #[inline]
    pub fn iterations(&self) -> u32 {
        self.stats.iterations
    }

    /// Counters of this build.
    #[inline]
    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Tolerance the hull was built with.
    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Returns true if no hull was produced.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.face_list.is_empty()
    }

    /// Checks the structural invariants of every live face.
    ///
    /// Each boundary loop must close within the edge capacity, own its
    /// edges and contain at least three of them; each half-edge must have a
    /// live twin that points back and runs between the same two vertices.
    pub fn validate(&self) -> TopologyResult<()> {
        let edges = &self.arena.edges;
        let faces = &self.arena.faces;
        let vertices = &self.arena.vertices;
        let max_loop = edges.capacity();

        for face in self.faces() {
            if !faces.is_allocated(face) || faces[face].state != FaceState::Active {
                return Err(TopologyError::IndexOutOfRange {
                    kind: "face",
                    index: face.index(),
                });
            }

            let start = faces[face].edge;
            let mut edge = start;
            let mut count = 0;
            loop {
                if !edges.is_allocated(edge) {
                    return Err(TopologyError::IndexOutOfRange {
                        kind: "half-edge",
                        index: edge.index(),
                    });
                }
                let half_edge = &edges[edge];
                if half_edge.face != face {
                    return Err(TopologyError::FaceMismatch {
                        edge: edge.index(),
                        face: face.index(),
                    });
                }
                if !vertices.is_allocated(half_edge.tail) {
                    return Err(TopologyError::IndexOutOfRange {
                        kind: "vertex",
                        index: half_edge.tail.index(),
                    });
                }
                if half_edge.twin.is_none() || !edges.is_allocated(half_edge.twin) {
                    return Err(TopologyError::MissingTwin { edge: edge.index() });
                }
                let twin = &edges[half_edge.twin];
                if twin.twin != edge {
                    return Err(TopologyError::TwinMismatch { edge: edge.index() });
                }
                if !edges.is_allocated(half_edge.next) {
                    return Err(TopologyError::OpenLoop { face: face.index() });
                }
                if twin.tail != edges[half_edge.next].tail {
                    return Err(TopologyError::TwinEndpoints { edge: edge.index() });
                }

                count += 1;
                edge = half_edge.next;
                if edge == start {
                    break;
                }
                if count > max_loop {
                    return Err(TopologyError::OpenLoop { face: face.index() });
                }
            }

            if count < 3 {
                return Err(TopologyError::DegenerateFace {
                    face: face.index(),
                    edges: count,
                });
            }
        }
        Ok(())
    }

    // =========================================================================
    // SHARED HELPERS
    // =========================================================================

    /// Refits the plane and center of a face to its boundary loop.
    fn compute_center_and_plane(&mut self, face: FaceId) {
        let fit = fit_polygon(self.face_edges(face).map(|edge| self.position(edge)));
        debug_assert!(fit.is_some(), "face {:?} has no area", face);

        let (plane, center) = fit.unwrap_or_default();
        let record = &mut self.arena.faces[face];
        record.plane = plane;
        record.center = center;
    }

    /// Position of the tail of `edge`.
    #[inline]
    fn position(&self, edge: EdgeId) -> DVec3 {
        self.arena.vertices[self.arena.edges[edge].tail].position
    }

    /// Returns the half-edge whose `next` is `edge`.
    fn prev_edge(&self, edge: EdgeId) -> EdgeId {
        let edges = &self.arena.edges;
        let mut prev = edge;
        loop {
            let next = edges[prev].next;
            if next == edge {
                return prev;
            }
            prev = next;
        }
    }

    /// Creates the triangle `a -> b -> c` with unset twins and links it
    /// into the face list.
    fn create_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId) -> FaceId {
        let face = self.arena.allocate_face();
        let e0 = self.arena.allocate_edge();
        let e1 = self.arena.allocate_edge();
        let e2 = self.arena.allocate_edge();

        for (edge, tail, next) in [(e0, a, e1), (e1, b, e2), (e2, c, e0)] {
            let half_edge = &mut self.arena.edges[edge];
            half_edge.tail = tail;
            half_edge.next = next;
            half_edge.face = face;
        }
        self.arena.faces[face].edge = e0;
        self.compute_center_and_plane(face);
        self.face_list.push_front(&mut self.arena.faces, face);
        face
    }

    /// Moves every conflict point of `face` to the orphan list.
    fn orphan_conflicts(&mut self, face: FaceId) {
        while let Some(vertex) = self.arena.faces[face]
            .conflicts
            .pop_front(&mut self.arena.vertices)
        {
            self.orphans.push_front(&mut self.arena.vertices, vertex);
        }
    }

    /// Returns the live face `point` lies farthest in front of, with the
    /// distance, or `None` if the point is behind every face.
    fn best_face_for(&self, point: DVec3) -> Option<(FaceId, f64)> {
        let mut best = None;
        let mut max_distance = 0.0;
        for face in self.faces() {
            let distance = self.arena.faces[face].plane.distance(point);
            if distance > max_distance {
                max_distance = distance;
                best = Some((face, distance));
            }
        }
        best
    }

    /// Frees the surface points once merging no longer needs them.
    fn release_surface_points(&mut self) {
        while let Some(vertex) = self.surface.pop_front(&mut self.arena.vertices) {
            self.arena.free_vertex(vertex);
        }
    }
}

/// Iterator over the boundary half-edges of a face.
pub struct FaceEdges<'h> {
    edges: &'h Pool<HalfEdge>,
    start: EdgeId,
    current: Option<EdgeId>,
}

impl Iterator for FaceEdges<'_> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<EdgeId> {
        let edge = self.current?;
        let next = self.edges[edge].next;
        self.current = (next != self.start).then_some(next);
        Some(edge)
    }
}
