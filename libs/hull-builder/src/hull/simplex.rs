//! Initial tetrahedron and first conflict assignment.

use super::QuickHull;
use crate::mesh::{ElementId, VertexId};
use glam::DVec3;

/// Indices of four input points spanning a non-degenerate tetrahedron,
/// wound so that the first three face away from the fourth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Simplex {
    pub(super) indices: [usize; 4],
}

impl QuickHull<'_> {
    /// Picks the tetrahedron from the axis extremes.
    ///
    /// Returns `None` when the points are coincident, collinear or coplanar
    /// within the tolerance.
    pub(super) fn find_initial_simplex(&self, points: &[DVec3]) -> Option<Simplex> {
        // Extreme point indices per axis: min_x, max_x, min_y, max_y, min_z, max_z
        let mut extremes = [0usize; 6];
        for (i, p) in points.iter().enumerate() {
            for axis in 0..3 {
                if p[axis] < points[extremes[2 * axis]][axis] {
                    extremes[2 * axis] = i;
                }
                if p[axis] > points[extremes[2 * axis + 1]][axis] {
                    extremes[2 * axis + 1] = i;
                }
            }
        }

        // Two most distant points among the extremes
        let mut max_dist = 0.0f64;
        let (mut p0, mut p1) = (0, 0);
        for i in 0..extremes.len() {
            for j in (i + 1)..extremes.len() {
                let dist = points[extremes[i]].distance_squared(points[extremes[j]]);
                if dist > max_dist {
                    max_dist = dist;
                    p0 = extremes[i];
                    p1 = extremes[j];
                }
            }
        }
        if max_dist.sqrt() <= self.tolerance {
            return None;
        }

        // Farthest from the line p0-p1
        let a = points[p0];
        let direction = (points[p1] - a).normalize();
        let mut max_dist = 0.0f64;
        let mut p2 = 0;
        for (i, p) in points.iter().enumerate() {
            let dist = (*p - a).cross(direction).length();
            if dist > max_dist {
                max_dist = dist;
                p2 = i;
            }
        }
        if max_dist <= self.tolerance {
            return None;
        }

        // Farthest from the plane p0-p1-p2
        let normal = (points[p1] - a).cross(points[p2] - a).normalize();
        let mut max_dist = 0.0f64;
        let mut p3 = 0;
        for (i, p) in points.iter().enumerate() {
            let dist = (*p - a).dot(normal).abs();
            if dist > max_dist {
                max_dist = dist;
                p3 = i;
            }
        }
        if max_dist <= self.tolerance {
            return None;
        }

        // The base triangle must face away from the apex
        let indices = if (points[p3] - a).dot(normal) > 0.0 {
            [p0, p2, p1, p3]
        } else {
            [p0, p1, p2, p3]
        };
        Some(Simplex { indices })
    }

    /// Builds the tetrahedron and hands every other point to the face it
    /// lies farthest in front of. Points behind all four faces are dropped.
    pub(super) fn build_initial_tetrahedron(&mut self, points: &[DVec3], simplex: Simplex) {
        let [i0, i1, i2, i3] = simplex.indices;
        let [v0, v1, v2, v3]: [VertexId; 4] = simplex
            .indices
            .map(|index| self.arena.allocate_vertex(points[index]));

        // Base (v0, v1, v2) has its normal pointing away from v3; the sides
        // reuse each base edge reversed.
        let faces = [
            self.create_triangle(v0, v1, v2),
            self.create_triangle(v1, v0, v3),
            self.create_triangle(v2, v1, v3),
            self.create_triangle(v0, v2, v3),
        ];

        for face in faces {
            let e0 = self.arena.faces[face].edge;
            let e1 = self.arena.edges[e0].next;
            let e2 = self.arena.edges[e1].next;
            for edge in [e0, e1, e2] {
                if !self.arena.edges[edge].twin.is_none() {
                    continue;
                }
                let tail = self.arena.edges[edge].tail;
                let head = self.head(edge);
                if let Some(twin) = self.find_twin(head, tail) {
                    self.arena.edges[edge].twin = twin;
                    self.arena.edges[twin].twin = edge;
                }
            }
        }
        debug_assert!(self.validate().is_ok(), "initial tetrahedron is malformed");

        for (index, &point) in points.iter().enumerate() {
            if index == i0 || index == i1 || index == i2 || index == i3 {
                continue;
            }
            match self.best_face_for(point) {
                Some((face, _)) => {
                    let vertex = self.arena.allocate_vertex(point);
                    self.arena.faces[face]
                        .conflicts
                        .push_front(&mut self.arena.vertices, vertex);
                }
                None => self.stats.discarded_points += 1,
            }
        }
    }
}
