//! # Compaction
//!
//! Builds a runtime hull from a point cloud.
//!
//! ## Pipeline
//!
//! ```text
//! points → dedup → QuickHull (arena) → capacity check → flatten → validate → centroid
//! ```
//!
//! Flattening walks the constructed faces in list order. Vertices get an
//! index the first time they are seen; half-edges are created in twin pairs
//! when a pair is first seen, and the second sighting fills in the twin's
//! face. Each face loop is then relinked in visit order with the first
//! visited edge as its representative.
//!
//! Any failure leaves the hull empty.

use crate::error::HullRejection;
use crate::hull::{ConvexHull, HullEdge, HullFace, NULL_FEATURE};
use crate::mass::compute_mass_properties;
use config::constants::{HullConfig, MAX_HULL_EDGES, MAX_HULL_FACES, MAX_HULL_VERTICES};
use glam::DVec3;
use hull_builder::{buffer_size, BuildStats, EdgeId, ElementId, HullArena, QuickHull, VertexId};
use log::debug;

/// Arena bytes needed for the largest accepted point set.
pub const ARENA_BUFFER_SIZE: usize = buffer_size(MAX_HULL_VERTICES);

/// Linear map from construction ids to runtime indices.
///
/// Hulls are small enough that a scan beats hashing.
#[derive(Debug, Clone)]
pub(crate) struct IndexMap<K: ElementId, const N: usize> {
    keys: [K; N],
    indices: [u8; N],
    len: usize,
}

impl<K: ElementId, const N: usize> IndexMap<K, N> {
    pub(crate) fn new() -> Self {
        Self {
            keys: [K::NONE; N],
            indices: [NULL_FEATURE; N],
            len: 0,
        }
    }

    pub(crate) fn find(&self, key: K) -> Option<u8> {
        self.keys[..self.len]
            .iter()
            .position(|&k| k == key)
            .map(|slot| self.indices[slot])
    }

    pub(crate) fn insert(&mut self, key: K, index: u8) {
        assert!(self.len < N, "index map full ({} entries)", N);
        debug_assert!(self.find(key).is_none(), "{:?} mapped twice", key);
        self.keys[self.len] = key;
        self.indices[self.len] = index;
        self.len += 1;
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

/// Copies the points that are not within `tolerance` of an earlier point
/// into `out` and returns them.
///
/// Keeps the first point of every cluster, in input order.
///
/// # Panics
///
/// If `out` is too small for the unique points.
pub fn dedup_points<'o>(points: &[DVec3], tolerance: f64, out: &'o mut [DVec3]) -> &'o [DVec3] {
    let tolerance_sq = tolerance * tolerance;
    let mut count = 0;
    for &point in points {
        let unique = out[..count]
            .iter()
            .all(|kept| point.distance_squared(*kept) >= tolerance_sq);
        if unique {
            assert!(count < out.len(), "more than {} unique points", out.len());
            out[count] = point;
            count += 1;
        }
    }
    &out[..count]
}

impl ConvexHull {
    /// Builds the hull of `points`, leaving it empty if the points are
    /// degenerate or the hull does not fit.
    ///
    /// # Panics
    ///
    /// If the point count is outside `4..=MAX_HULL_VERTICES`.
    pub fn set(&mut self, points: &[DVec3]) {
        // Rejections are logged by try_set_in
        let _ = self.try_set(points);
    }

    /// Like [`set`](Self::set), reporting why the hull is empty.
    pub fn try_set(&mut self, points: &[DVec3]) -> Result<BuildStats, HullRejection> {
        self.try_set_with(points, &HullConfig::default())
    }

    /// Like [`try_set`](Self::try_set) with an explicit configuration.
    pub fn try_set_with(
        &mut self,
        points: &[DVec3],
        config: &HullConfig,
    ) -> Result<BuildStats, HullRejection> {
        let mut arena = HullArena::new(MAX_HULL_VERTICES);
        self.try_set_in(&mut arena, points, config)
    }

    /// Like [`try_set_with`](Self::try_set_with), building in a caller-owned
    /// arena that can be reused across calls.
    ///
    /// # Panics
    ///
    /// If the point count is outside `4..=MAX_HULL_VERTICES`, or exceeds the
    /// arena's point capacity after deduplication.
    pub fn try_set_in(
        &mut self,
        arena: &mut HullArena,
        points: &[DVec3],
        config: &HullConfig,
    ) -> Result<BuildStats, HullRejection> {
        assert!(
            (4..=MAX_HULL_VERTICES).contains(&points.len()),
            "hull needs 4..={} points, got {}",
            MAX_HULL_VERTICES,
            points.len()
        );

        self.clear();
        let result = self.build(arena, points, config);
        if let Err(rejection) = &result {
            self.clear();
            debug!("Hull of {} points rejected: {}", points.len(), rejection);
        }
        result
    }

    fn build(
        &mut self,
        arena: &mut HullArena,
        points: &[DVec3],
        config: &HullConfig,
    ) -> Result<BuildStats, HullRejection> {
        let tolerance = config.tolerance();
        let mut buffer = [DVec3::ZERO; MAX_HULL_VERTICES];
        let unique = dedup_points(points, tolerance, &mut buffer);
        if unique.len() < 4 {
            return Err(HullRejection::Degenerate {
                unique: unique.len(),
            });
        }

        let hull = QuickHull::construct(arena, unique, tolerance);
        if hull.is_empty() {
            return Err(HullRejection::NoVolume);
        }
        if hull.face_count() > MAX_HULL_FACES {
            return Err(HullRejection::TooManyFaces {
                count: hull.face_count(),
                max: MAX_HULL_FACES,
            });
        }

        self.flatten(&hull)?;
        self.validate()?;
        self.centroid = compute_mass_properties(self).centroid;
        Ok(hull.stats())
    }

    /// Copies the constructed hull into the fixed arrays.
    fn flatten(&mut self, hull: &QuickHull<'_>) -> Result<(), HullRejection> {
        let mut vertex_map: IndexMap<VertexId, MAX_HULL_VERTICES> = IndexMap::new();
        let mut edge_map: IndexMap<EdgeId, MAX_HULL_EDGES> = IndexMap::new();
        let mut loop_edges = [NULL_FEATURE; MAX_HULL_EDGES];

        for face in hull.faces() {
            let face_index = self.face_count as u8;
            let mut loop_len = 0;

            for edge in hull.face_edges(face) {
                let twin = hull.edge(edge).twin;
                let origin = self.map_vertex(&mut vertex_map, hull, hull.edge(edge).tail)?;
                let twin_origin = self.map_vertex(&mut vertex_map, hull, hull.edge(twin).tail)?;

                let index = match edge_map.find(edge) {
                    Some(index) => {
                        // Created as the twin of an earlier face's edge
                        let half_edge = &mut self.edges[index as usize];
                        debug_assert_eq!(half_edge.face, NULL_FEATURE);
                        half_edge.face = face_index;
                        index
                    }
                    None => {
                        if self.edge_count + 2 > MAX_HULL_EDGES {
                            return Err(HullRejection::TooManyEdges);
                        }
                        let index = self.edge_count as u8;
                        let twin_index = index + 1;
                        self.edges[index as usize] = HullEdge {
                            origin,
                            twin: twin_index,
                            next: NULL_FEATURE,
                            face: face_index,
                        };
                        self.edges[twin_index as usize] = HullEdge {
                            origin: twin_origin,
                            twin: index,
                            next: NULL_FEATURE,
                            face: NULL_FEATURE,
                        };
                        self.edge_count += 2;
                        edge_map.insert(edge, index);
                        edge_map.insert(twin, twin_index);
                        index
                    }
                };

                loop_edges[loop_len] = index;
                loop_len += 1;
            }

            debug_assert!(loop_len > 0, "face {:?} has no edges", face);
            for i in 0..loop_len {
                let next = loop_edges[(i + 1) % loop_len];
                self.edges[loop_edges[i] as usize].next = next;
            }
            self.faces[face_index as usize] = HullFace {
                edge: loop_edges[0],
            };
            self.planes[face_index as usize] = hull.face(face).plane;
            self.face_count += 1;
        }

        debug_assert_eq!(vertex_map.len(), self.vertex_count);
        debug_assert_eq!(edge_map.len(), self.edge_count);
        Ok(())
    }

    /// Returns the runtime index of a constructed vertex, adding it on first
    /// sight.
    fn map_vertex(
        &mut self,
        map: &mut IndexMap<VertexId, MAX_HULL_VERTICES>,
        hull: &QuickHull<'_>,
        vertex: VertexId,
    ) -> Result<u8, HullRejection> {
        if let Some(index) = map.find(vertex) {
            return Ok(index);
        }
        if self.vertex_count == MAX_HULL_VERTICES {
            return Err(HullRejection::TooManyVertices);
        }
        let index = self.vertex_count as u8;
        self.vertices[index as usize] = hull.vertex(vertex).position;
        self.vertex_count += 1;
        map.insert(vertex, index);
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_map_finds_inserted_keys() {
        let mut map: IndexMap<VertexId, 4> = IndexMap::new();
        map.insert(VertexId(10), 0);
        map.insert(VertexId(3), 1);
        assert_eq!(map.find(VertexId(3)), Some(1));
        assert_eq!(map.find(VertexId(10)), Some(0));
        assert_eq!(map.find(VertexId(4)), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    #[should_panic(expected = "index map full")]
    fn test_index_map_overflow_panics() {
        let mut map: IndexMap<EdgeId, 1> = IndexMap::new();
        map.insert(EdgeId(0), 0);
        map.insert(EdgeId(1), 1);
    }

    #[test]
    fn test_dedup_keeps_first_of_each_cluster() {
        let points = [
            DVec3::ZERO,
            DVec3::new(0.001, 0.0, 0.0),
            DVec3::X,
            DVec3::new(1.0, 0.002, 0.0),
            DVec3::Y,
        ];
        let mut out = [DVec3::ZERO; 5];
        let unique = dedup_points(&points, 0.0025, &mut out);
        assert_eq!(unique, &[DVec3::ZERO, DVec3::X, DVec3::Y]);
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let points: Vec<DVec3> = (0..20)
            .map(|i| DVec3::new((i / 2) as f64, 0.0, (i % 2) as f64 * 1e-4))
            .collect();
        let mut once = [DVec3::ZERO; 20];
        let first = dedup_points(&points, 0.0025, &mut once).to_vec();
        let mut twice = [DVec3::ZERO; 20];
        let second = dedup_points(&first, 0.0025, &mut twice);
        assert_eq!(first.len(), 10);
        assert_eq!(first, second);
    }

    #[test]
    fn test_arena_buffer_covers_max_points() {
        assert_eq!(
            HullArena::new(MAX_HULL_VERTICES).byte_size(),
            ARENA_BUFFER_SIZE
        );
    }
}
