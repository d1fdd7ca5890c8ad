//! View handles, the sibling registry, and per-mutation synchronization.
//!
//! A view is a lightweight secondary handle onto a root's node chain: two
//! boundary node keys (the node *before* its first element and the node
//! *after* its last), a root-relative offset, and a cached length. Views
//! never own nodes.
//!
//! The registry is a slab of [`ViewState`] held by the root. Handles carry a
//! generation stamp so that a disposed view's reused slot can never be
//! reached through a stale [`ViewKey`]: disposing a view removes its slot
//! from the registry, and every later operation through its key fails.

use slab::Slab;

use crate::Index;

/// Handle to a root or to one of its views.
///
/// Handles are plain `Copy` values. They are validated on every operation:
/// a key minted by a different root fails with
/// [`Error::IncompatibleView`](crate::Error::IncompatibleView), a key whose
/// view (or root) has been disposed fails with
/// [`Error::InvalidView`](crate::Error::InvalidView).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewKey {
    pub(crate) list: u64,
    pub(crate) slot: u32,
    pub(crate) gen: u32,
}

/// Registry slot for the root handle: the slot index's sentinel, never
/// allocated by the registry slab.
pub(crate) const ROOT_SLOT: u32 = u32::NONE;

impl ViewKey {
    /// Returns `true` if this handle names a root rather than a view.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.slot.is_none()
    }
}

/// Registered state of one live view.
#[derive(Debug, Clone)]
pub(crate) struct ViewState {
    pub(crate) gen: u32,
    /// Boundary node before the first element.
    pub(crate) front: usize,
    /// Boundary node after the last element.
    pub(crate) back: usize,
    /// Root-relative index of the first element.
    pub(crate) offset: usize,
    /// Cached element count.
    pub(crate) len: usize,
}

// =============================================================================
// Geometry
// =============================================================================

/// Mutual geometry of two ranges sharing a root.
///
/// Empty or degenerate ranges classify as contained, never overlapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// The ranges share no index.
    Disjoint,
    /// `self` fully covers `other`.
    Contains,
    /// `other` fully covers `self`.
    ContainedIn,
    /// The ranges intersect without either containing the other.
    Overlapping,
}

/// Classifies `(offset, len)` range `a` relative to range `b`.
pub(crate) fn classify(a: (usize, usize), b: (usize, usize)) -> Position {
    let (a1, a2) = (a.0, a.0 + a.1);
    let (b1, b2) = (b.0, b.0 + b.1);
    if a1 >= b1 && a2 <= b2 {
        Position::ContainedIn
    } else if b1 >= a1 && b2 <= a2 {
        Position::Contains
    } else if a2 <= b1 || b2 <= a1 {
        Position::Disjoint
    } else {
        Position::Overlapping
    }
}

// =============================================================================
// Per-mutation synchronization
// =============================================================================

/// Adjusts every registered view after `k` nodes were inserted at root index
/// `r`, between predecessor `pred` and successor `succ`. The freshly linked
/// run spans `first_new ..= last_new`.
///
/// The issuing view (if any) is skipped: it grows instead of shifting, and
/// the caller has already adjusted it.
///
/// Derived from the boundary invariant (`front.next` walked `len` times ends
/// at `back.prev`):
/// - a view past the insertion shifts right;
/// - a non-empty view starting exactly at `r` shifts right and re-fronts onto
///   the last inserted node (its old front was `pred`);
/// - a view strictly straddling `r` absorbs the run into its length;
/// - a view ending exactly at `r` (including an empty view sitting at `r`)
///   re-backs onto the first inserted node so the run stays outside it.
pub(crate) fn sync_insert(
    views: &mut Slab<ViewState>,
    skip: Option<usize>,
    r: usize,
    k: usize,
    first_new: usize,
    last_new: usize,
) {
    for (slot, v) in views.iter_mut() {
        if Some(slot) == skip {
            continue;
        }
        if v.offset > r {
            v.offset += k;
        } else if v.offset == r && v.len > 0 {
            v.offset += k;
            v.front = last_new;
        } else if r > v.offset && r < v.offset + v.len {
            v.len += k;
        } else if r == v.offset + v.len {
            v.back = first_new;
        }
    }
}

/// Adjusts every registered view before the node at root index `r` (slab key
/// `node`, neighbors `prev`/`next`) is unlinked. Must run while the node's
/// links are still intact.
///
/// The issuing view needs no special casing: `r` always falls inside it, so
/// the straddling rule shrinks it like any other sibling.
pub(crate) fn sync_remove(
    views: &mut Slab<ViewState>,
    r: usize,
    node: usize,
    prev: usize,
    next: usize,
) {
    for (_, v) in views.iter_mut() {
        if r < v.offset {
            v.offset -= 1;
            if v.front == node {
                v.front = prev;
            }
        } else if r < v.offset + v.len {
            v.len -= 1;
        } else if v.back == node {
            v.back = next;
        }
    }
}
