//! LRU Recency List Module
//!
//! Doubly-linked recency ordering for cache eviction.
//!
//! Nodes live in a slot arena and link to each other by index, so moving an
//! entry to the front or unlinking it is O(1) without any unsafe code.

use crate::cache::CacheEntry;

// == Slot Handle ==
/// Stable handle to an entry inside a [`RecencyList`].
///
/// A slot stays valid until the entry is removed from the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot(usize);

#[derive(Debug)]
struct Node {
    entry: CacheEntry,
    prev: Option<usize>,
    next: Option<usize>,
}

// == Recency List ==
/// Orders entries from most recently used (front) to least recently used
/// (back).
#[derive(Debug, Default)]
pub struct RecencyList {
    /// Node storage, `None` marks a free slot
    nodes: Vec<Option<Node>>,
    /// Recycled slot indices
    free: Vec<usize>,
    /// Most recently used
    head: Option<usize>,
    /// Least recently used
    tail: Option<usize>,
    len: usize,
}

impl RecencyList {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty list with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    // == Push Front ==
    /// Inserts an entry as the most recently used and returns its slot.
    pub fn push_front(&mut self, entry: CacheEntry) -> Slot {
        let node = Node {
            entry,
            prev: None,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = Some(node);
                idx
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        self.link_front(idx);
        self.len += 1;
        Slot(idx)
    }

    // == Move To Front ==
    /// Marks the entry at `slot` as most recently used.
    pub fn move_to_front(&mut self, slot: Slot) {
        if self.head == Some(slot.0) {
            return;
        }
        self.unlink(slot.0);
        self.link_front(slot.0);
    }

    // == Remove ==
    /// Unlinks the entry at `slot` and returns it.
    ///
    /// # Panics
    /// Panics if `slot` does not refer to a live entry.
    pub fn remove(&mut self, slot: Slot) -> CacheEntry {
        self.unlink(slot.0);
        let node = self.nodes[slot.0]
            .take()
            .expect("slot handle refers to a removed entry");
        self.free.push(slot.0);
        self.len -= 1;
        node.entry
    }

    // == Pop Back ==
    /// Removes and returns the least recently used entry.
    pub fn pop_back(&mut self) -> Option<CacheEntry> {
        let idx = self.tail?;
        Some(self.remove(Slot(idx)))
    }

    /// Returns the entry at `slot`.
    pub fn get(&self, slot: Slot) -> &CacheEntry {
        &self.node(slot.0).entry
    }

    /// Returns the entry at `slot` mutably.
    pub fn get_mut(&mut self, slot: Slot) -> &mut CacheEntry {
        &mut self.node_mut(slot.0).entry
    }

    // == Length ==
    /// Returns the number of linked entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Iteration ==
    /// Iterates from most recently used to least recently used.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            current: self.head,
        }
    }

    // == Internal Linking ==
    fn node(&self, idx: usize) -> &Node {
        self.nodes[idx]
            .as_ref()
            .expect("slot handle refers to a removed entry")
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node {
        self.nodes[idx]
            .as_mut()
            .expect("slot handle refers to a removed entry")
    }

    fn link_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let node = self.node_mut(idx);
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(h) => self.node_mut(h).prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }
        let node = self.node_mut(idx);
        node.prev = None;
        node.next = None;
    }
}

// == Iterator ==
/// Iterator over entries from most to least recently used.
pub struct Iter<'a> {
    list: &'a RecencyList,
    current: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a CacheEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.current?;
        let node = self.list.node(idx);
        self.current = node.next;
        Some(&node.entry)
    }
}
