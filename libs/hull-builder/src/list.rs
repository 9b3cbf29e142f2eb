//! # Intrusive Lists
//!
//! Doubly-linked lists whose links live inside the listed elements.
//!
//! A [`List`] only stores its head and length. The `prev`/`next` links of
//! each node are reached through [`ListStorage`], which is implemented by the
//! arena pools, so the same list type tracks live faces, per-face conflict
//! points and scratch sets without owning any of them.

/// Previous/next links embedded in a list node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Links<K> {
    /// Node closer to the head, `None` for the head itself.
    pub prev: Option<K>,
    /// Node further from the head, `None` for the tail.
    pub next: Option<K>,
}

impl<K> Default for Links<K> {
    fn default() -> Self {
        Self {
            prev: None,
            next: None,
        }
    }
}

/// Elements carrying their own list links.
pub trait Linked<K> {
    /// Links of this element.
    fn links(&self) -> &Links<K>;
    /// Mutable links of this element.
    fn links_mut(&mut self) -> &mut Links<K>;
}

/// Storage resolving a node key to its links.
pub trait ListStorage<K> {
    /// Links of the node `key`.
    fn node_links(&self, key: K) -> &Links<K>;
    /// Mutable links of the node `key`.
    fn node_links_mut(&mut self, key: K) -> &mut Links<K>;
}

/// An intrusive doubly-linked list over node keys.
///
/// The most recently pushed node is the head; no other ordering is kept.
///
/// # Example
///
/// ```rust
/// use hull_builder::list::{Links, List, ListStorage};
///
/// struct Nodes(Vec<Links<usize>>);
///
/// impl ListStorage<usize> for Nodes {
///     fn node_links(&self, key: usize) -> &Links<usize> { &self.0[key] }
///     fn node_links_mut(&mut self, key: usize) -> &mut Links<usize> { &mut self.0[key] }
/// }
///
/// let mut nodes = Nodes(vec![Links::default(); 3]);
/// let mut list = List::new();
/// list.push_front(&mut nodes, 0);
/// list.push_front(&mut nodes, 2);
/// assert_eq!(list.iter(&nodes).collect::<Vec<_>>(), vec![2, 0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct List<K> {
    head: Option<K>,
    count: usize,
}

impl<K> Default for List<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> List<K> {
    /// Creates an empty list.
    pub const fn new() -> Self {
        Self {
            head: None,
            count: 0,
        }
    }

    /// Returns the number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the list has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl<K: Copy + Eq> List<K> {
    /// Returns the most recently pushed node.
    #[inline]
    pub fn head(&self) -> Option<K> {
        self.head
    }

    /// Inserts `key` at the head in O(1).
    ///
    /// The node must not currently be a member of any list.
    pub fn push_front<S>(&mut self, storage: &mut S, key: K)
    where
        S: ListStorage<K> + ?Sized,
    {
        let links = storage.node_links_mut(key);
        links.prev = None;
        links.next = self.head;
        if let Some(head) = self.head {
            storage.node_links_mut(head).prev = Some(key);
        }
        self.head = Some(key);
        self.count += 1;
    }

    /// Splices `key` out in O(1) and returns the node that followed it.
    ///
    /// The removed node's links are reset.
    pub fn remove<S>(&mut self, storage: &mut S, key: K) -> Option<K>
    where
        S: ListStorage<K> + ?Sized,
    {
        let Links { prev, next } = *storage.node_links(key);

        if let Some(prev) = prev {
            storage.node_links_mut(prev).next = next;
        }
        if let Some(next) = next {
            storage.node_links_mut(next).prev = prev;
        }
        if self.head == Some(key) {
            self.head = next;
        }

        *storage.node_links_mut(key) = Links::default();
        debug_assert!(self.count > 0, "remove from an empty list");
        self.count -= 1;
        next
    }

    /// Removes and returns the head.
    pub fn pop_front<S>(&mut self, storage: &mut S) -> Option<K>
    where
        S: ListStorage<K> + ?Sized,
    {
        let head = self.head?;
        self.remove(storage, head);
        Some(head)
    }

    /// Iterates the node keys from head to tail.
    pub fn iter<'s, S>(&self, storage: &'s S) -> Iter<'s, K, S>
    where
        S: ListStorage<K> + ?Sized,
    {
        Iter {
            storage,
            cursor: self.head,
            remaining: self.count,
        }
    }

    /// Returns true if `key` is reachable from the head.
    pub fn contains<S>(&self, storage: &S, key: K) -> bool
    where
        S: ListStorage<K> + ?Sized,
    {
        self.iter(storage).any(|k| k == key)
    }
}

/// Iterator over the keys of a [`List`].
pub struct Iter<'s, K, S: ?Sized> {
    storage: &'s S,
    cursor: Option<K>,
    remaining: usize,
}

impl<K, S> Iterator for Iter<'_, K, S>
where
    K: Copy + Eq,
    S: ListStorage<K> + ?Sized,
{
    type Item = K;

    fn next(&mut self) -> Option<K> {
        let key = self.cursor?;
        self.cursor = self.storage.node_links(key).next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
