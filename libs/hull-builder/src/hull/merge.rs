//! Coplanar face merging.
//!
//! Construction leaves a triangulated hull. This pass merges neighbouring
//! faces into one polygon when they are coplanar within the tolerance and
//! the result is convex, then removes vertices left on a straight line
//! between two faces. A merge or removal only goes ahead if no hull vertex
//! or surface point ends up more than the tolerance in front of a refitted
//! plane.
//!
//! Vertices that leave the hull move to the surface list, so later merges
//! still have to keep them behind their planes.

use super::QuickHull;
use crate::arena::Pool;
use crate::mesh::{fit_polygon, EdgeId, FaceId, HalfEdge, Plane};
use glam::DVec3;
use log::{debug, trace};

/// The run of edges `first..=last` that a face shares with `other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Merge {
    other: FaceId,
    first: EdgeId,
    last: EdgeId,
}

impl QuickHull<'_> {
    /// Merges faces across the whole hull until no admissible merge is left.
    pub(super) fn merge_coplanar_faces(&mut self) {
        let mut cursor = self.face_list.head();
        while let Some(face) = cursor {
            while let Some(merge) = self.find_merge(face) {
                self.absorb(face, merge);
                self.remove_redundant_vertices(face);
            }
            cursor = self.arena.faces[face].links.next;
        }
        debug!(
            "Merged {} faces and removed {} vertices, {} faces left",
            self.stats.merged_faces,
            self.stats.collapsed_vertices,
            self.face_list.len()
        );
    }

    /// Returns the first neighbour of `face` that can be merged into it.
    fn find_merge(&self, face: FaceId) -> Option<Merge> {
        self.face_edges(face).find_map(|edge| self.plan_merge(face, edge))
    }

    /// Checks whether the neighbour across `edge` can be merged into `face`.
    ///
    /// The two faces must share one contiguous run of edges and each must
    /// have its vertices within the tolerance of the other's plane. The
    /// merged polygon must keep its orientation, stay flat within the
    /// tolerance and turn the same way at every corner.
    fn plan_merge(&self, face: FaceId, edge: EdgeId) -> Option<Merge> {
        let edges = &self.arena.edges;
        let other = self.neighbour(edge);
        if other == face {
            return None;
        }

        let shared = self
            .face_edges(face)
            .filter(|&e| self.neighbour(e) == other)
            .count();
        if shared >= self.face_edge_count(face) || shared >= self.face_edge_count(other) {
            return None;
        }

        let mut first = edge;
        loop {
            let prev = self.prev_edge(first);
            if self.neighbour(prev) != other {
                break;
            }
            first = prev;
        }
        let mut last = first;
        let mut run = 1;
        loop {
            let next = edges[last].next;
            if self.neighbour(next) != other {
                break;
            }
            // The twins must meet at a vertex only these two faces share
            if edges[edges[next].twin].next != edges[last].twin {
                return None;
            }
            last = next;
            run += 1;
        }
        if run != shared {
            return None;
        }

        let faces = &self.arena.faces;
        let near = |e: EdgeId, f: FaceId| {
            faces[f].plane.distance(self.position(e)).abs() <= self.tolerance
        };
        if !self.face_edges(other).all(|e| near(e, face))
            || !self.face_edges(face).all(|e| near(e, other))
        {
            return None;
        }

        let merge = Merge { other, first, last };
        let boundary = self.merged_boundary(merge);
        let (plane, _) = fit_polygon(boundary.clone().map(|e| self.position(e)))?;

        if plane.normal.dot(faces[face].plane.normal) <= 0.0
            || plane.normal.dot(faces[other].plane.normal) <= 0.0
        {
            return None;
        }

        let on_plane = |e: EdgeId| plane.distance(self.position(e)).abs() <= self.tolerance;
        let mut dropped = EdgeRun::new(edges, first, last).skip(1);
        if !boundary.clone().all(on_plane) || !dropped.all(on_plane) {
            return None;
        }
        if !self.corners_are_convex(boundary.map(|e| self.position(e)), plane.normal) {
            return None;
        }
        self.supports_all(&plane).then_some(merge)
    }

    /// Boundary of `face` merged with `merge.other`, in winding order.
    fn merged_boundary(&self, merge: Merge) -> impl Iterator<Item = EdgeId> + Clone + '_ {
        let edges = &self.arena.edges;
        let after = edges[merge.last].next;
        let before = self.prev_edge(merge.first);
        let other_after = edges[edges[merge.first].twin].next;
        let other_before = self.prev_edge(edges[merge.last].twin);
        EdgeRun::new(edges, after, before).chain(EdgeRun::new(edges, other_after, other_before))
    }

    /// Returns true if the closed polygon through `points` bends no more
    /// than the tolerance the wrong way around `normal` at any corner.
    fn corners_are_convex(&self, mut points: impl Iterator<Item = DVec3>, normal: DVec3) -> bool {
        let (Some(first), Some(second)) = (points.next(), points.next()) else {
            return false;
        };
        let (mut a, mut b) = (first, second);
        for c in points.chain([first, second]) {
            let span = c - a;
            if (b - a).cross(span).dot(normal) < -self.tolerance * span.length() {
                return false;
            }
            a = b;
            b = c;
        }
        true
    }

    /// Returns true if no hull vertex or surface point lies more than the
    /// tolerance in front of `plane`.
    fn supports_all(&self, plane: &Plane) -> bool {
        let vertices = &self.arena.vertices;
        vertices
            .allocated_ids()
            .all(|v| plane.distance(vertices[v].position) <= self.tolerance)
    }

    /// Merges `merge.other` into `face`.
    ///
    /// The shared run is removed and the neighbour's remaining boundary is
    /// spliced in its place.
    fn absorb(&mut self, face: FaceId, merge: Merge) {
        let Merge { other, first, last } = merge;
        let before = self.prev_edge(first);
        let after = self.arena.edges[last].next;
        let other_first = self.arena.edges[last].twin;
        let other_last = self.arena.edges[first].twin;
        let other_before = self.prev_edge(other_first);
        let other_after = self.arena.edges[other_last].next;

        // Hand the neighbour's remaining boundary over to `face`
        let mut moved = other_after;
        while moved != other_first {
            self.arena.edges[moved].face = face;
            moved = self.arena.edges[moved].next;
        }
        self.arena.edges[before].next = other_after;
        self.arena.edges[other_before].next = after;

        // Drop the run, its twins and the vertices strictly inside it
        let mut chain = first;
        loop {
            let next = self.arena.edges[chain].next;
            let twin = self.arena.edges[chain].twin;
            if chain != first {
                let vertex = self.arena.edges[chain].tail;
                self.surface.push_front(&mut self.arena.vertices, vertex);
                self.stats.collapsed_vertices += 1;
            }
            self.arena.free_edge(twin);
            self.arena.free_edge(chain);
            if chain == last {
                break;
            }
            chain = next;
        }

        self.face_list.remove(&mut self.arena.faces, other);
        self.arena.free_face(other);
        self.stats.merged_faces += 1;

        self.arena.faces[face].edge = before;
        self.compute_center_and_plane(face);
        trace!("Merged face {:?} into {:?}", other, face);
    }

    /// Removes the vertices of `face` that sit on a straight line between
    /// two edges bordering the same neighbour.
    fn remove_redundant_vertices(&mut self, face: FaceId) {
        loop {
            let redundant = self
                .face_edges(face)
                .find(|&edge| self.can_collapse(face, edge));
            let Some(edge) = redundant else {
                return;
            };
            self.collapse_vertex(face, edge);
        }
    }

    /// Returns true if the vertex between `edge` and its successor can be
    /// removed from the hull.
    fn can_collapse(&self, face: FaceId, edge: EdgeId) -> bool {
        let edges = &self.arena.edges;
        let next = edges[edge].next;
        let other = self.neighbour(edge);
        if other == face || self.neighbour(next) != other {
            return false;
        }
        if edges[edges[next].twin].next != edges[edge].twin {
            return false;
        }
        if self.face_edge_count(face) <= 3 || self.face_edge_count(other) <= 3 {
            return false;
        }

        let vertex = edges[next].tail;
        let point = self.position(next);
        let a = self.position(edge);
        let span = self.position(edges[next].next) - a;
        if (point - a).cross(span).length() > self.tolerance * span.length() {
            return false;
        }

        // Both faces are refitted without the vertex
        [face, other].into_iter().all(|f| {
            let remaining = self
                .face_edges(f)
                .filter(|&e| edges[e].tail != vertex)
                .map(|e| self.position(e));
            fit_polygon(remaining).is_some_and(|(plane, _)| {
                plane.normal.dot(self.arena.faces[f].plane.normal) > 0.0
                    && plane.distance(point).abs() <= self.tolerance
                    && self.supports_all(&plane)
            })
        })
    }

    /// Removes the vertex between `edge` and its successor, both bordering
    /// the same neighbour.
    fn collapse_vertex(&mut self, face: FaceId, edge: EdgeId) {
        let next = self.arena.edges[edge].next;
        let twin_edge = self.arena.edges[edge].twin;
        let twin_next = self.arena.edges[next].twin;
        let other = self.arena.edges[twin_edge].face;
        let vertex = self.arena.edges[next].tail;

        // `face`: edge now runs to the head of next
        self.arena.edges[edge].next = self.arena.edges[next].next;
        // `other`: twin_edge now starts at the tail of twin_next
        let before_twin_next = self.prev_edge(twin_next);
        self.arena.edges[before_twin_next].next = twin_edge;
        self.arena.edges[twin_edge].tail = self.arena.edges[twin_next].tail;

        if self.arena.faces[face].edge == next {
            self.arena.faces[face].edge = edge;
        }
        if self.arena.faces[other].edge == twin_next {
            self.arena.faces[other].edge = twin_edge;
        }

        self.arena.free_edge(next);
        self.arena.free_edge(twin_next);
        self.surface.push_front(&mut self.arena.vertices, vertex);
        self.stats.collapsed_vertices += 1;

        self.compute_center_and_plane(face);
        self.compute_center_and_plane(other);
        trace!("Removed vertex {:?} between {:?} and {:?}", vertex, face, other);
    }

    /// Face across `edge`.
    #[inline]
    fn neighbour(&self, edge: EdgeId) -> FaceId {
        let edges = &self.arena.edges;
        edges[edges[edge].twin].face
    }
}

/// Half-edges from `current` through `last`, following `next`.
#[derive(Clone)]
struct EdgeRun<'h> {
    edges: &'h Pool<HalfEdge>,
    current: Option<EdgeId>,
    last: EdgeId,
}

impl<'h> EdgeRun<'h> {
    fn new(edges: &'h Pool<HalfEdge>, first: EdgeId, last: EdgeId) -> Self {
        Self {
            edges,
            current: Some(first),
            last,
        }
    }
}

impl Iterator for EdgeRun<'_> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<EdgeId> {
        let edge = self.current?;
        let edges = self.edges;
        self.current = (edge != self.last).then(|| edges[edge].next);
        Some(edge)
    }
}
