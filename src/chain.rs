//! Slab-backed node chain with permanent boundary sentinels.
//!
//! Nodes live in a `slab::Slab` and reference each other by slot key, so a
//! node never moves in memory; structural operations only rewire links. Two
//! sentinel slots are allocated at construction and live for the chain's
//! whole lifetime: the head sentinel sits before the first element, the tail
//! sentinel after the last. An empty chain links the sentinels directly to
//! each other.
//!
//! # Node positions
//!
//! Walk-based lookup uses *node positions*: the head sentinel is position 0,
//! element `i` is position `i + 1`, and the tail sentinel is position
//! `len + 1`. This keeps boundary lookups (the node *before* an element, the
//! node *after* a range) in unsigned arithmetic.

use slab::Slab;

use crate::Index;

/// A single node: a value plus links to its neighbors.
///
/// Sentinel nodes hold `None`; every element node holds `Some`.
#[derive(Debug)]
pub(crate) struct Node<T> {
    pub(crate) value: Option<T>,
    pub(crate) prev: usize,
    pub(crate) next: usize,
}

/// The node chain: slab storage, the two sentinels, and the canonical size.
#[derive(Debug)]
pub(crate) struct Chain<T> {
    nodes: Slab<Node<T>>,
    head: usize,
    tail: usize,
    len: usize,
}

/// A known `(node position, node key)` pair used to shortcut walks.
pub(crate) type Anchor = (usize, usize);

impl<T> Chain<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        // +2 so the sentinels never force a reallocation on a sized chain.
        let mut nodes = Slab::with_capacity(capacity.saturating_add(2));
        let head = nodes.insert(Node {
            value: None,
            prev: usize::NONE,
            next: usize::NONE,
        });
        let tail = nodes.insert(Node {
            value: None,
            prev: head,
            next: usize::NONE,
        });
        nodes[head].next = tail;
        Self {
            nodes,
            head,
            tail,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn head(&self) -> usize {
        self.head
    }

    #[inline]
    pub(crate) fn tail(&self) -> usize {
        self.tail
    }

    // ========================================================================
    // Link access
    // ========================================================================

    #[inline]
    pub(crate) fn next(&self, key: usize) -> usize {
        self.nodes[key].next
    }

    #[inline]
    pub(crate) fn prev(&self, key: usize) -> usize {
        self.nodes[key].prev
    }

    #[inline]
    pub(crate) fn set_next(&mut self, key: usize, next: usize) {
        self.nodes[key].next = next;
    }

    #[inline]
    pub(crate) fn set_prev(&mut self, key: usize, prev: usize) {
        self.nodes[key].prev = prev;
    }

    /// Links `a -> b` in both directions.
    #[inline]
    pub(crate) fn relink(&mut self, a: usize, b: usize) {
        self.nodes[a].next = b;
        self.nodes[b].prev = a;
    }

    // ========================================================================
    // Value access
    // ========================================================================

    #[inline]
    pub(crate) fn value(&self, key: usize) -> &T {
        self.nodes[key].value.as_ref().expect("sentinel holds no value")
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, key: usize) -> &mut T {
        self.nodes[key].value.as_mut().expect("sentinel holds no value")
    }

    #[inline]
    pub(crate) fn replace_value(&mut self, key: usize, value: T) -> T {
        self.nodes[key]
            .value
            .replace(value)
            .expect("sentinel holds no value")
    }

    /// Takes the value out of an element node, leaving the node linked.
    ///
    /// The caller must restore a value with [`put_value`](Self::put_value)
    /// before the node is observed again.
    #[inline]
    pub(crate) fn take_value(&mut self, key: usize) -> T {
        self.nodes[key].value.take().expect("sentinel holds no value")
    }

    #[inline]
    pub(crate) fn put_value(&mut self, key: usize, value: T) {
        debug_assert!(self.nodes[key].value.is_none());
        self.nodes[key].value = Some(value);
    }

    // ========================================================================
    // Structural operations
    // ========================================================================

    /// Inserts a new element node directly after `after`, which may be the
    /// head sentinel. Returns the new node's key.
    pub(crate) fn insert_after(&mut self, after: usize, value: T) -> usize {
        let next = self.nodes[after].next;
        let key = self.nodes.insert(Node {
            value: Some(value),
            prev: after,
            next,
        });
        self.nodes[after].next = key;
        self.nodes[next].prev = key;
        self.len += 1;
        key
    }

    /// Unlinks an element node, freeing its slot and returning its value.
    pub(crate) fn unlink(&mut self, key: usize) -> T {
        let node = self.nodes.remove(key);
        self.nodes[node.prev].next = node.next;
        self.nodes[node.next].prev = node.prev;
        self.len -= 1;
        node.value.expect("sentinel holds no value")
    }

    /// Frees a node's slot without touching its neighbors' links.
    ///
    /// Used by the batch removal scan, which splices whole runs at once and
    /// accounts for the length itself.
    #[inline]
    pub(crate) fn remove_detached(&mut self, key: usize) -> T {
        self.nodes.remove(key).value.expect("sentinel holds no value")
    }

    /// Adjusts the canonical size after a batch splice removed `n` nodes.
    #[inline]
    pub(crate) fn shrink(&mut self, n: usize) {
        self.len -= n;
    }

    /// Removes every element node and relinks the sentinels.
    pub(crate) fn clear(&mut self) {
        let mut key = self.nodes[self.head].next;
        while key != self.tail {
            let next = self.nodes[key].next;
            self.nodes.remove(key);
            key = next;
        }
        let (head, tail) = (self.head, self.tail);
        self.relink(head, tail);
        self.len = 0;
    }

    // ========================================================================
    // Positional indexing
    // ========================================================================

    /// Returns the node at `pos`, walking from the nearest of the given
    /// `(position, node)` anchors. Position 0 is the head sentinel, `len + 1`
    /// the tail.
    ///
    /// Anchors let a view locate boundary nodes in time proportional to the
    /// distance from an already-known node (its enclosing range's boundaries)
    /// instead of from an end of the whole chain. With just the sentinel
    /// anchors this degrades to the classic walk from the nearer end.
    pub(crate) fn node_at_anchored(&self, pos: usize, anchors: &[Anchor]) -> usize {
        debug_assert!(!anchors.is_empty());
        let (mut best_pos, mut best_key) = anchors[0];
        let mut best_dist = pos.abs_diff(best_pos);
        for &(apos, akey) in &anchors[1..] {
            let dist = pos.abs_diff(apos);
            if dist < best_dist {
                best_dist = dist;
                best_pos = apos;
                best_key = akey;
            }
        }

        let mut key = best_key;
        if pos >= best_pos {
            for _ in 0..pos - best_pos {
                key = self.nodes[key].next;
            }
        } else {
            for _ in 0..best_pos - pos {
                key = self.nodes[key].prev;
            }
        }
        key
    }

    /// Resolves two node positions together, reusing whichever is nearer to
    /// an anchor as an extra anchor for the other.
    pub(crate) fn node_pair(&self, p1: usize, p2: usize, anchors: &[Anchor]) -> (usize, usize) {
        let d1 = anchors.iter().map(|&(p, _)| p1.abs_diff(p)).min();
        let d2 = anchors.iter().map(|&(p, _)| p2.abs_diff(p)).min();
        if d1 <= d2 {
            let n1 = self.node_at_anchored(p1, anchors);
            let n2 = self.node_at_anchored(p2, &[(p1, n1)]);
            (n1, n2)
        } else {
            let n2 = self.node_at_anchored(p2, anchors);
            let n1 = self.node_at_anchored(p1, &[(p2, n2)]);
            (n1, n2)
        }
    }
}
