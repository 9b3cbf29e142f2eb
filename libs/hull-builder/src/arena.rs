//! # Arena Allocation
//!
//! Pre-sized element pools with index free-lists.
//!
//! A build never touches the global allocator: all vertices, half-edges and
//! faces come from a [`HullArena`] whose pools are sized once from the
//! maximum point count. Freed slots are threaded onto a singly-linked
//! free-list through the element's `free_next` field, so allocation and
//! release are O(1) and slots are reused within and across builds.

use crate::list::{Linked, Links, ListStorage};
use crate::mesh::{EdgeId, ElementId, Face, FaceId, FaceState, HalfEdge, Vertex, VertexId};
use std::mem::size_of;
use std::ops::{Index, IndexMut};

// =============================================================================
// CAPACITY
// =============================================================================

/// Pool sizes needed to build the hull of up to `points` points.
///
/// A closed triangulated hull of `V` vertices has at most `E = 3V - 6` edges
/// and `F = 2V - 4` faces. Half-edges and faces are doubled because new faces
/// are created before the visible ones are released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaCapacity {
    /// Maximum number of input points.
    pub points: usize,
    /// Vertex slots.
    pub vertices: usize,
    /// Half-edge slots.
    pub half_edges: usize,
    /// Face slots.
    pub faces: usize,
    /// Horizon and new-face scratch entries.
    pub scratch: usize,
}

impl ArenaCapacity {
    /// Computes the pool sizes for `points` input points.
    pub const fn for_points(points: usize) -> Self {
        let edges = (3 * points).saturating_sub(6);
        let half_edges = 2 * edges;
        let faces = (2 * points).saturating_sub(4);
        Self {
            points,
            vertices: points,
            half_edges: 2 * half_edges,
            faces: 2 * faces,
            scratch: half_edges,
        }
    }

    /// Total bytes of element storage described by this capacity.
    pub const fn byte_size(&self) -> usize {
        self.vertices * size_of::<Vertex>()
            + self.half_edges * size_of::<HalfEdge>()
            + self.faces * size_of::<Face>()
            + self.scratch * size_of::<EdgeId>()
            + self.scratch * size_of::<FaceId>()
    }
}

/// Bytes of arena storage needed to hull up to `points` points.
///
/// Usable in constant context for statically sized buffers.
///
/// # Example
///
/// ```rust
/// use hull_builder::arena::{buffer_size, HullArena};
///
/// const BYTES: usize = buffer_size(16);
/// assert_eq!(HullArena::new(16).byte_size(), BYTES);
/// ```
pub const fn buffer_size(points: usize) -> usize {
    ArenaCapacity::for_points(points).byte_size()
}

// =============================================================================
// POOL
// =============================================================================

/// Elements stored in a [`Pool`].
pub trait PoolSlot: Default {
    /// Id type addressing the slot.
    type Id: ElementId;

    /// Element kind, for diagnostics.
    const KIND: &'static str;

    /// Free-list successor.
    fn free_next(&self) -> Option<Self::Id>;

    /// Sets the free-list successor.
    fn set_free_next(&mut self, next: Option<Self::Id>);
}

macro_rules! pool_slot {
    ($ty:ty, $id:ty, $kind:literal) => {
        impl PoolSlot for $ty {
            type Id = $id;
            const KIND: &'static str = $kind;

            #[inline]
            fn free_next(&self) -> Option<$id> {
                self.free_next
            }

            #[inline]
            fn set_free_next(&mut self, next: Option<$id>) {
                self.free_next = next;
            }
        }
    };
}

pool_slot!(Vertex, VertexId, "vertex");
pool_slot!(HalfEdge, EdgeId, "half-edge");
pool_slot!(Face, FaceId, "face");

/// Fixed-capacity slot storage with an O(1) free-list.
///
/// Running out of slots or releasing a slot twice is a contract violation
/// and panics.
#[derive(Debug, Clone)]
pub struct Pool<T: PoolSlot> {
    slots: Vec<T>,
    allocated: Vec<bool>,
    free_head: Option<T::Id>,
    live: usize,
}

impl<T: PoolSlot> Pool<T> {
    /// Creates a pool with `capacity` free slots.
    pub fn new(capacity: usize) -> Self {
        let mut pool = Self {
            slots: (0..capacity).map(|_| T::default()).collect(),
            allocated: vec![false; capacity],
            free_head: None,
            live: 0,
        };
        pool.reset();
        pool
    }

    /// Releases every slot at once.
    pub fn reset(&mut self) {
        let capacity = self.slots.len();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            *slot = T::default();
            let next = index + 1;
            slot.set_free_next((next < capacity).then(|| T::Id::from_index(next)));
        }
        self.allocated.iter_mut().for_each(|flag| *flag = false);
        self.free_head = (capacity > 0).then(|| T::Id::from_index(0));
        self.live = 0;
    }

    /// Takes a slot off the free-list and resets it to its default.
    ///
    /// # Panics
    ///
    /// If every slot is allocated.
    #[allow(clippy::panic)]
    pub fn allocate(&mut self) -> T::Id {
        let Some(id) = self.free_head else {
            panic!(
                "{} pool exhausted ({} slots)",
                T::KIND,
                self.slots.len()
            );
        };
        let slot = &mut self.slots[id.index()];
        self.free_head = slot.free_next();
        *slot = T::default();
        self.allocated[id.index()] = true;
        self.live += 1;
        id
    }

    /// Returns a slot to the free-list. Its contents stay readable until
    /// the slot is reused.
    ///
    /// # Panics
    ///
    /// If `id` is not allocated.
    pub fn free(&mut self, id: T::Id) {
        assert!(
            self.is_allocated(id),
            "{} {:?} freed while not allocated",
            T::KIND,
            id
        );
        self.slots[id.index()].set_free_next(self.free_head);
        self.allocated[id.index()] = false;
        self.free_head = Some(id);
        self.live -= 1;
    }

    /// Returns true if `id` addresses an allocated slot.
    #[inline]
    pub fn is_allocated(&self, id: T::Id) -> bool {
        self.allocated.get(id.index()).copied().unwrap_or(false)
    }

    /// Returns the element if `id` is allocated.
    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.is_allocated(id).then(|| &self.slots[id.index()])
    }

    /// Number of allocated slots.
    #[inline]
    pub fn live(&self) -> usize {
        self.live
    }

    /// Total number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Ids of all allocated slots in index order.
    pub fn allocated_ids(&self) -> impl Iterator<Item = T::Id> + '_ {
        self.allocated
            .iter()
            .enumerate()
            .filter(|&(_, &flag)| flag)
            .map(|(index, _)| T::Id::from_index(index))
    }
}

impl<T: PoolSlot> Index<T::Id> for Pool<T> {
    type Output = T;

    #[inline]
    fn index(&self, id: T::Id) -> &T {
        &self.slots[id.index()]
    }
}

impl<T: PoolSlot> IndexMut<T::Id> for Pool<T> {
    #[inline]
    fn index_mut(&mut self, id: T::Id) -> &mut T {
        &mut self.slots[id.index()]
    }
}

impl<T> ListStorage<T::Id> for Pool<T>
where
    T: PoolSlot + Linked<T::Id>,
{
    #[inline]
    fn node_links(&self, key: T::Id) -> &Links<T::Id> {
        self.slots[key.index()].links()
    }

    #[inline]
    fn node_links_mut(&mut self, key: T::Id) -> &mut Links<T::Id> {
        self.slots[key.index()].links_mut()
    }
}

// =============================================================================
// HULL ARENA
// =============================================================================

/// Caller-owned storage for hull construction.
///
/// One arena serves any number of sequential builds of up to
/// [`point_capacity`](Self::point_capacity) points; each build resets it.
#[derive(Debug, Clone)]
pub struct HullArena {
    pub(crate) vertices: Pool<Vertex>,
    pub(crate) edges: Pool<HalfEdge>,
    pub(crate) faces: Pool<Face>,
    pub(crate) horizon: Vec<EdgeId>,
    pub(crate) new_faces: Vec<FaceId>,
    capacity: ArenaCapacity,
}

impl HullArena {
    /// Creates an arena able to hull up to `points` points.
    pub fn new(points: usize) -> Self {
        Self::with_capacity(ArenaCapacity::for_points(points))
    }

    /// Creates an arena with explicit pool sizes.
    pub fn with_capacity(capacity: ArenaCapacity) -> Self {
        Self {
            vertices: Pool::new(capacity.vertices),
            edges: Pool::new(capacity.half_edges),
            faces: Pool::new(capacity.faces),
            horizon: Vec::with_capacity(capacity.scratch),
            new_faces: Vec::with_capacity(capacity.scratch),
            capacity,
        }
    }

    /// Maximum number of points a build may be given.
    #[inline]
    pub fn point_capacity(&self) -> usize {
        self.capacity.points
    }

    /// Pool sizes of this arena.
    #[inline]
    pub fn capacity(&self) -> ArenaCapacity {
        self.capacity
    }

    /// Bytes of element storage held by the arena.
    pub fn byte_size(&self) -> usize {
        self.capacity.byte_size()
    }

    /// Releases every element.
    pub fn reset(&mut self) {
        self.vertices.reset();
        self.edges.reset();
        self.faces.reset();
        self.horizon.clear();
        self.new_faces.clear();
    }

    /// Allocates a vertex at `position`.
    pub fn allocate_vertex(&mut self, position: glam::DVec3) -> VertexId {
        let id = self.vertices.allocate();
        self.vertices[id].position = position;
        id
    }

    /// Allocates an unlinked half-edge.
    pub fn allocate_edge(&mut self) -> EdgeId {
        self.edges.allocate()
    }

    /// Allocates an active face with no boundary.
    pub fn allocate_face(&mut self) -> FaceId {
        self.faces.allocate()
    }

    /// Releases a vertex.
    pub fn free_vertex(&mut self, id: VertexId) {
        self.vertices.free(id);
    }

    /// Releases a half-edge.
    pub fn free_edge(&mut self, id: EdgeId) {
        self.edges.free(id);
    }

    /// Releases a face and tags it deleted.
    pub fn free_face(&mut self, id: FaceId) {
        debug_assert!(
            self.faces[id].conflicts.is_empty(),
            "face {:?} freed with pending conflict points",
            id
        );
        self.faces[id].state = FaceState::Deleted;
        self.faces.free(id);
    }

    /// Vertex pool.
    pub fn vertices(&self) -> &Pool<Vertex> {
        &self.vertices
    }

    /// Half-edge pool.
    pub fn edges(&self) -> &Pool<HalfEdge> {
        &self.edges
    }

    /// Face pool.
    pub fn faces(&self) -> &Pool<Face> {
        &self.faces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::List;
    use glam::DVec3;

    #[test]
    fn test_byte_size_matches_buffer_size() {
        for points in [0, 3, 4, 8, 64] {
            assert_eq!(HullArena::new(points).byte_size(), buffer_size(points));
        }
    }

    #[test]
    fn test_buffer_size_formula() {
        let v = 10;
        let e = 3 * v - 6;
        let he = 2 * e;
        let f = 2 * v - 4;
        let expected = v * size_of::<Vertex>()
            + 2 * he * size_of::<HalfEdge>()
            + 2 * f * size_of::<Face>()
            + he * size_of::<EdgeId>()
            + he * size_of::<FaceId>();
        assert_eq!(buffer_size(v), expected);
    }

    #[test]
    fn test_buffer_size_saturates_below_four() {
        assert_eq!(buffer_size(0), 0);
        assert_eq!(buffer_size(2), 2 * size_of::<Vertex>());
    }

    #[test]
    fn test_pool_reuses_freed_slot_first() {
        let mut pool: Pool<HalfEdge> = Pool::new(3);
        let a = pool.allocate();
        let b = pool.allocate();
        assert_eq!((a, b), (EdgeId(0), EdgeId(1)));
        pool.free(a);
        assert!(!pool.is_allocated(a));
        assert_eq!(pool.allocate(), a);
        assert_eq!(pool.live(), 2);
        assert_eq!(pool.allocated_ids().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn test_allocate_resets_slot() {
        let mut pool: Pool<HalfEdge> = Pool::new(1);
        let a = pool.allocate();
        pool[a].twin = EdgeId(7);
        pool.free(a);
        let b = pool.allocate();
        assert_eq!(pool[b], HalfEdge::default());
    }

    #[test]
    #[should_panic(expected = "face pool exhausted")]
    fn test_pool_exhaustion_panics() {
        let mut pool: Pool<Face> = Pool::new(1);
        pool.allocate();
        pool.allocate();
    }

    #[test]
    #[should_panic(expected = "freed while not allocated")]
    fn test_double_free_panics() {
        let mut pool: Pool<Vertex> = Pool::new(2);
        let a = pool.allocate();
        pool.free(a);
        pool.free(a);
    }

    #[test]
    fn test_reset_releases_everything() {
        let mut arena = HullArena::new(8);
        let v = arena.allocate_vertex(DVec3::X);
        let f = arena.allocate_face();
        arena.allocate_edge();
        assert_eq!(arena.vertices()[v].position, DVec3::X);
        arena.free_face(f);
        assert_eq!(arena.faces()[f].state, FaceState::Deleted);

        arena.reset();
        assert_eq!(arena.vertices().live(), 0);
        assert_eq!(arena.edges().live(), 0);
        assert_eq!(arena.faces().live(), 0);
        assert_eq!(arena.allocate_vertex(DVec3::Y), VertexId(0));
    }

    #[test]
    fn test_pool_backs_intrusive_list() {
        let mut arena = HullArena::new(8);
        let mut list = List::new();
        let ids: Vec<_> = (0..3).map(|i| arena.allocate_vertex(DVec3::splat(i as f64))).collect();
        for &id in &ids {
            list.push_front(&mut arena.vertices, id);
        }
        list.remove(&mut arena.vertices, ids[1]);
        assert_eq!(
            list.iter(&arena.vertices).collect::<Vec<_>>(),
            vec![ids[2], ids[0]]
        );
    }
}
