//! Eye selection, horizon traversal, cone construction and conflict
//! bookkeeping.

use super::QuickHull;
use crate::list::List;
use crate::mesh::{EdgeId, ElementId, FaceId, FaceState, VertexId};
use glam::DVec3;
use robust::{orient3d, Coord3D};

impl QuickHull<'_> {
    /// Returns the outstanding point farthest in front of its face, with
    /// that face and the distance.
    pub(super) fn next_conflict_vertex(&self) -> Option<(VertexId, FaceId, f64)> {
        let mut best = None;
        let mut max_distance = f64::NEG_INFINITY;
        for face in self.faces() {
            let record = &self.arena.faces[face];
            for vertex in record.conflicts.iter(&self.arena.vertices) {
                let distance = record.plane.distance(self.arena.vertices[vertex].position);
                if distance > max_distance {
                    max_distance = distance;
                    best = Some((vertex, face, distance));
                }
            }
        }
        best
    }

    /// Adds `eye`, which lies outside `eye_face`, to the hull.
    pub(super) fn add_point(&mut self, eye: VertexId, eye_face: FaceId) {
        self.arena.faces[eye_face]
            .conflicts
            .remove(&mut self.arena.vertices, eye);
        let eye_point = self.arena.vertices[eye].position;

        self.arena.horizon.clear();
        let mut visible = List::new();
        self.find_horizon(eye_point, EdgeId::NONE, eye_face, &mut visible);
        debug_assert!(
            self.arena.horizon.len() >= 3,
            "horizon of {} edges",
            self.arena.horizon.len()
        );

        self.free_interior_vertices(&visible);
        self.add_new_faces(eye);
        self.free_visible_faces(&mut visible);
        self.resolve_orphans();

        self.stats.iterations += 1;
    }

    /// Depth-first search over the faces visible from `eye`.
    ///
    /// Marks `face` visible, then walks its loop starting after the edge it
    /// was entered through. Edges whose neighbour is not visible form the
    /// horizon, collected counter-clockwise as seen from the eye.
    fn find_horizon(
        &mut self,
        eye: DVec3,
        crossed: EdgeId,
        face: FaceId,
        visible: &mut List<FaceId>,
    ) {
        self.face_list.remove(&mut self.arena.faces, face);
        self.arena.faces[face].state = FaceState::Deleted;
        visible.push_front(&mut self.arena.faces, face);
        self.orphan_conflicts(face);

        let (start, stop) = if crossed.is_none() {
            let edge = self.arena.faces[face].edge;
            (edge, edge)
        } else {
            (self.arena.edges[crossed].next, crossed)
        };

        let mut edge = start;
        loop {
            let twin = self.arena.edges[edge].twin;
            let neighbour = self.arena.edges[twin].face;
            if self.arena.faces[neighbour].state == FaceState::Active {
                if self.sees(eye, neighbour) {
                    self.find_horizon(eye, twin, neighbour, visible);
                } else {
                    self.arena.horizon.push(edge);
                }
            }

            edge = self.arena.edges[edge].next;
            if edge == stop {
                break;
            }
        }
    }

    /// Returns true if `eye` lies strictly in front of the triangle `face`.
    ///
    /// Decided with an exact orientation test, so the visible region is
    /// always a disk bounded by a single horizon loop and points coplanar
    /// with a face never see it.
    fn sees(&self, eye: DVec3, face: FaceId) -> bool {
        let edges = &self.arena.edges;
        let e0 = self.arena.faces[face].edge;
        let e1 = edges[e0].next;
        let e2 = edges[e1].next;
        debug_assert_eq!(edges[e2].next, e0, "face {:?} is not a triangle", face);

        let corner = |edge: EdgeId| coord(self.arena.vertices[edges[edge].tail].position);
        orient3d(corner(e0), corner(e1), corner(e2), coord(eye)) < 0.0
    }

    /// Frees the vertices surrounded only by visible faces.
    ///
    /// Runs before the cone is stitched, while vertex rings are intact.
    fn free_interior_vertices(&mut self, visible: &List<FaceId>) {
        let mut cursor = visible.head();
        while let Some(face) = cursor {
            let start = self.arena.faces[face].edge;
            let mut edge = start;
            loop {
                let vertex = self.arena.edges[edge].tail;
                if self.arena.vertices.is_allocated(vertex)
                    && self.is_surrounded_by_deleted(edge)
                {
                    self.arena.free_vertex(vertex);
                }
                edge = self.arena.edges[edge].next;
                if edge == start {
                    break;
                }
            }
            cursor = self.arena.faces[face].links.next;
        }
    }

    /// Returns true if every face around the tail of `edge` is deleted.
    fn is_surrounded_by_deleted(&self, edge: EdgeId) -> bool {
        let edges = &self.arena.edges;
        let mut current = edge;
        loop {
            if self.arena.faces[edges[current].face].state == FaceState::Active {
                return false;
            }
            current = edges[edges[current].twin].next;
            if current == edge {
                return true;
            }
        }
    }

    /// Cones the horizon to `eye` with one triangle per horizon edge.
    ///
    /// Each triangle `(tail, head, eye)` takes over the horizon edge's twin
    /// and is stitched to its predecessor along the edge through the eye.
    fn add_new_faces(&mut self, eye: VertexId) {
        self.arena.new_faces.clear();

        let mut first_side = EdgeId::NONE;
        let mut prev_side = EdgeId::NONE;
        for i in 0..self.arena.horizon.len() {
            let horizon = self.arena.horizon[i];
            let tail = self.arena.edges[horizon].tail;
            let head = self.head(horizon);
            let outer = self.arena.edges[horizon].twin;

            let face = self.create_triangle(tail, head, eye);
            let base = self.arena.faces[face].edge;
            let side_out = self.arena.edges[base].next;
            let side_in = self.arena.edges[side_out].next;

            self.arena.edges[base].twin = outer;
            self.arena.edges[outer].twin = base;

            if prev_side.is_none() {
                first_side = side_in;
            } else {
                self.arena.edges[side_in].twin = prev_side;
                self.arena.edges[prev_side].twin = side_in;
            }
            prev_side = side_out;
            self.arena.new_faces.push(face);
        }

        if !first_side.is_none() {
            self.arena.edges[first_side].twin = prev_side;
            self.arena.edges[prev_side].twin = first_side;
        }
    }

    /// Releases the visible faces and their edges.
    fn free_visible_faces(&mut self, visible: &mut List<FaceId>) {
        while let Some(face) = visible.pop_front(&mut self.arena.faces) {
            let start = self.arena.faces[face].edge;
            let mut edge = start;
            loop {
                let next = self.arena.edges[edge].next;
                self.arena.free_edge(edge);
                edge = next;
                if edge == start {
                    break;
                }
            }
            self.arena.free_face(face);
        }
    }

    /// Hands each orphaned point to a face it lies in front of, or frees it
    /// if it is inside the hull.
    ///
    /// A face of the latest cone is preferred when the point lies beyond
    /// the tolerance in front of one; otherwise every live face is searched.
    pub(super) fn resolve_orphans(&mut self) {
        while let Some(vertex) = self.orphans.pop_front(&mut self.arena.vertices) {
            let point = self.arena.vertices[vertex].position;
            let target = self
                .best_new_face_for(point)
                .filter(|&(_, distance)| distance > self.tolerance)
                .or_else(|| self.best_face_for(point));
            match target {
                Some((face, _)) => {
                    self.arena.faces[face]
                        .conflicts
                        .push_front(&mut self.arena.vertices, vertex);
                }
                None => {
                    self.arena.free_vertex(vertex);
                    self.stats.discarded_points += 1;
                }
            }
        }
    }

    /// Sends every outstanding point back through [`Self::resolve_orphans`]
    /// against the whole hull.
    ///
    /// Conflict assignments go stale as faces appear around a point whose
    /// own face stays hidden from the eye.
    pub(super) fn reassign_conflicts(&mut self) {
        let mut cursor = self.face_list.head();
        while let Some(face) = cursor {
            self.orphan_conflicts(face);
            cursor = self.arena.faces[face].links.next;
        }
        self.arena.new_faces.clear();
        self.resolve_orphans();
    }

    /// Moves the outstanding points, all within the tolerance of the hull,
    /// onto the surface list.
    pub(super) fn settle_conflicts(&mut self) {
        let mut cursor = self.face_list.head();
        while let Some(face) = cursor {
            while let Some(vertex) = self.arena.faces[face]
                .conflicts
                .pop_front(&mut self.arena.vertices)
            {
                self.surface.push_front(&mut self.arena.vertices, vertex);
                self.stats.discarded_points += 1;
            }
            cursor = self.arena.faces[face].links.next;
        }
    }

    /// The face of the latest cone `point` lies farthest in front of.
    fn best_new_face_for(&self, point: DVec3) -> Option<(FaceId, f64)> {
        self.arena
            .new_faces
            .iter()
            .filter(|&&face| self.arena.faces[face].state == FaceState::Active)
            .map(|&face| (face, self.arena.faces[face].plane.distance(point)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}

fn coord(point: DVec3) -> Coord3D<f64> {
    Coord3D {
        x: point.x,
        y: point.y,
        z: point.z,
    }
}
