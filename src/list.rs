//! The root sequence and its public operation surface.
//!
//! A [`ViewList`] owns the node chain, the canonical size, the revision
//! stamp, and the view registry. All access, root or view, goes through a
//! [`ViewKey`] handle, validated on every call. Exactly one `ViewList` is the
//! root for a given chain; every view is a registered `(boundary, boundary,
//! offset, len)` quadruple into it, never a second owner.
//!
//! # Example
//!
//! ```
//! use viewlist::ViewList;
//!
//! let mut list: ViewList<u64> = ViewList::new();
//! let root = list.root();
//!
//! for v in [10, 20, 30, 40, 50] {
//!     list.push_back(root, v).unwrap();
//! }
//!
//! // A live sub-range view: elements 1..4.
//! let v = list.view(root, 1, 3).unwrap();
//! assert_eq!(list.to_vec(v).unwrap(), vec![20, 30, 40]);
//!
//! // Structural changes through the root keep the view consistent.
//! list.insert(root, 1, 99).unwrap();
//! assert_eq!(list.to_vec(v).unwrap(), vec![20, 30, 40]);
//! assert_eq!(list.offset(v).unwrap(), 2);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use slab::Slab;
use smallvec::SmallVec;

use crate::chain::{Anchor, Chain};
use crate::event::{Change, Listener};
use crate::view::{self, ViewKey, ViewState, ROOT_SLOT};
use crate::{Error, Index};

static NEXT_LIST_ID: AtomicU64 = AtomicU64::new(1);

/// Resolved operation target: the root itself, or a registered view slot.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Target {
    Root,
    View(usize),
}

impl Target {
    /// The registry slot, if the target is a proper view.
    #[inline]
    pub(crate) fn view_slot(self) -> Option<usize> {
        match self {
            Target::Root => None,
            Target::View(slot) => Some(slot),
        }
    }
}

/// A target's resolved geometry: offset, length, and boundary nodes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Extent {
    pub(crate) offset: usize,
    pub(crate) len: usize,
    /// Boundary node before the first element.
    pub(crate) front: usize,
    /// Boundary node after the last element.
    pub(crate) back: usize,
}

/// A doubly linked sequence supporting multiple live sub-range views.
///
/// Views share the root's storage. Every structural mutation, whether made
/// through the root or through any view, synchronizes every sibling view's offset,
/// length, and boundary nodes before it returns, and bumps the root's
/// revision stamp so in-flight [`Cursor`](crate::Cursor)s fail instead of
/// walking stale structure.
///
/// This is not a concurrent structure: "concurrency" here means multiple
/// cooperating logical views of one sequence, not multiple threads.
pub struct ViewList<T> {
    pub(crate) chain: Chain<T>,
    pub(crate) views: Slab<ViewState>,
    pub(crate) stamp: u64,
    pub(crate) id: u64,
    pub(crate) next_gen: u32,
    pub(crate) disposed: bool,
    pub(crate) listener: Option<Listener<T>>,
}

impl<T> Default for ViewList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for ViewList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewList")
            .field("len", &self.chain.len())
            .field("views", &self.views.len())
            .field("stamp", &self.stamp)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl<T> ViewList<T> {
    /// Creates an empty root with stamp 0.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty root with node capacity pre-allocated.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chain: Chain::with_capacity(capacity),
            views: Slab::new(),
            stamp: 0,
            id: NEXT_LIST_ID.fetch_add(1, Ordering::Relaxed),
            next_gen: 0,
            disposed: false,
            listener: None,
        }
    }

    /// Returns the handle naming the root itself.
    #[inline]
    pub fn root(&self) -> ViewKey {
        ViewKey {
            list: self.id,
            slot: ROOT_SLOT,
            gen: 0,
        }
    }

    /// Installs the change listener, replacing any previous one.
    pub fn set_listener(&mut self, listener: Listener<T>) {
        self.listener = Some(listener);
    }

    /// Removes the change listener.
    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    /// Current revision stamp. Bumped by every mutating operation.
    #[inline]
    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    /// Number of live registered views (the root is not counted).
    #[inline]
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    // ========================================================================
    // Handle resolution
    // ========================================================================

    pub(crate) fn resolve(&self, key: ViewKey) -> Result<Target, Error> {
        if key.list != self.id {
            return Err(Error::IncompatibleView);
        }
        if self.disposed {
            return Err(Error::InvalidView);
        }
        if key.slot == ROOT_SLOT {
            return Ok(Target::Root);
        }
        match self.views.get(key.slot as usize) {
            Some(state) if state.gen == key.gen => Ok(Target::View(key.slot as usize)),
            _ => Err(Error::InvalidView),
        }
    }

    pub(crate) fn extent(&self, target: Target) -> Extent {
        match target {
            Target::Root => Extent {
                offset: 0,
                len: self.chain.len(),
                front: self.chain.head(),
                back: self.chain.tail(),
            },
            Target::View(slot) => {
                let v = &self.views[slot];
                Extent {
                    offset: v.offset,
                    len: v.len,
                    front: v.front,
                    back: v.back,
                }
            }
        }
    }

    /// Anchor set for positional lookup inside `e`: the target's two
    /// boundaries plus the chain's sentinels.
    pub(crate) fn anchors(&self, e: Extent) -> SmallVec<[Anchor; 5]> {
        let mut anchors: SmallVec<[Anchor; 5]> = SmallVec::new();
        anchors.push((e.offset, e.front));
        anchors.push((e.offset + e.len + 1, e.back));
        anchors.push((0, self.chain.head()));
        anchors.push((self.chain.len() + 1, self.chain.tail()));
        anchors
    }

    /// Node key of element `index` within `e`.
    pub(crate) fn locate(&self, e: Extent, index: usize) -> usize {
        let anchors = self.anchors(e);
        self.chain.node_at_anchored(e.offset + index + 1, &anchors)
    }

    // ========================================================================
    // Event dispatch
    // ========================================================================

    /// Emits a change whose payload borrows the chain. The listener is taken
    /// out of its slot for the call, so the borrow cannot conflict.
    pub(crate) fn emit(&mut self, make: impl FnOnce(&Chain<T>) -> Change<'_, T>) {
        if let Some(mut cb) = self.listener.take() {
            cb(make(&self.chain));
            self.listener = Some(cb);
        }
    }

    /// Emits a change whose payload does not borrow the list.
    pub(crate) fn emit_value(&mut self, change: Change<'_, T>) {
        if let Some(cb) = self.listener.as_mut() {
            cb(change);
        }
    }

    // ========================================================================
    // Read accessors
    // ========================================================================

    /// Element count of the root or view named by `key`.
    pub fn len(&self, key: ViewKey) -> Result<usize, Error> {
        let target = self.resolve(key)?;
        Ok(self.extent(target).len)
    }

    /// Returns `true` if the target holds no elements.
    pub fn is_empty(&self, key: ViewKey) -> Result<bool, Error> {
        Ok(self.len(key)? == 0)
    }

    /// Root-relative index of the target's first element (0 for the root).
    pub fn offset(&self, key: ViewKey) -> Result<usize, Error> {
        let target = self.resolve(key)?;
        Ok(self.extent(target).offset)
    }

    /// The root handle for a view; `None` for the root itself.
    pub fn underlying(&self, key: ViewKey) -> Result<Option<ViewKey>, Error> {
        match self.resolve(key)? {
            Target::Root => Ok(None),
            Target::View(_) => Ok(Some(self.root())),
        }
    }

    /// Returns `true` if the handle still resolves.
    pub fn is_valid(&self, key: ViewKey) -> bool {
        self.resolve(key).is_ok()
    }

    /// Reference to the element at `index` (target-relative).
    pub fn get(&self, key: ViewKey, index: usize) -> Result<&T, Error> {
        let target = self.resolve(key)?;
        let e = self.extent(target);
        if index >= e.len {
            return Err(Error::IndexOutOfRange { index, len: e.len });
        }
        Ok(self.chain.value(self.locate(e, index)))
    }

    /// Mutable reference to the element at `index` (target-relative).
    pub fn get_mut(&mut self, key: ViewKey, index: usize) -> Result<&mut T, Error> {
        let target = self.resolve(key)?;
        let e = self.extent(target);
        if index >= e.len {
            return Err(Error::IndexOutOfRange { index, len: e.len });
        }
        let node = self.locate(e, index);
        Ok(self.chain.value_mut(node))
    }

    /// Reference to the first element, or `None` if empty.
    pub fn first(&self, key: ViewKey) -> Result<Option<&T>, Error> {
        let target = self.resolve(key)?;
        let e = self.extent(target);
        if e.len == 0 {
            return Ok(None);
        }
        Ok(Some(self.chain.value(self.chain.next(e.front))))
    }

    /// Reference to the last element, or `None` if empty.
    pub fn last(&self, key: ViewKey) -> Result<Option<&T>, Error> {
        let target = self.resolve(key)?;
        let e = self.extent(target);
        if e.len == 0 {
            return Ok(None);
        }
        Ok(Some(self.chain.value(self.chain.prev(e.back))))
    }

    /// Copies the target's contents into a `Vec`, front to back.
    pub fn to_vec(&self, key: ViewKey) -> Result<Vec<T>, Error>
    where
        T: Clone,
    {
        Ok(self.iter(key)?.cloned().collect())
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Target-relative index of the first occurrence of `item`.
    pub fn index_of(&self, key: ViewKey, item: &T) -> Result<Option<usize>, Error>
    where
        T: PartialEq,
    {
        let target = self.resolve(key)?;
        let e = self.extent(target);
        let mut node = self.chain.next(e.front);
        for i in 0..e.len {
            if self.chain.value(node) == item {
                return Ok(Some(i));
            }
            node = self.chain.next(node);
        }
        Ok(None)
    }

    /// Returns `true` if the target contains `item`.
    pub fn contains(&self, key: ViewKey, item: &T) -> Result<bool, Error>
    where
        T: PartialEq,
    {
        Ok(self.index_of(key, item)?.is_some())
    }

    /// Number of elements equal to `item` (bag semantics).
    pub fn count_eq(&self, key: ViewKey, item: &T) -> Result<usize, Error>
    where
        T: PartialEq,
    {
        let target = self.resolve(key)?;
        let e = self.extent(target);
        let mut node = self.chain.next(e.front);
        let mut count = 0;
        for _ in 0..e.len {
            if self.chain.value(node) == item {
                count += 1;
            }
            node = self.chain.next(node);
        }
        Ok(count)
    }

    // ========================================================================
    // Single-element structural operations
    // ========================================================================

    /// Inserts `value` at target-relative `index` (`0..=len`).
    ///
    /// Every sibling view is synchronized before this returns: views past
    /// the insertion point shift, views straddling it grow, views whose
    /// boundary coincides with it adopt the new run's edge nodes.
    pub fn insert(&mut self, key: ViewKey, index: usize, value: T) -> Result<(), Error> {
        let target = self.resolve(key)?;
        let e = self.extent(target);
        if index > e.len {
            return Err(Error::IndexOutOfRange { index, len: e.len });
        }
        self.stamp += 1;
        let pred = if index == 0 {
            e.front
        } else {
            self.locate(e, index - 1)
        };
        let node = self.chain.insert_after(pred, value);
        let r = e.offset + index;
        if let Target::View(slot) = target {
            self.views[slot].len += 1;
        }
        view::sync_insert(&mut self.views, target.view_slot(), r, 1, node, node);
        self.emit(|chain| Change::Inserted {
            index: r,
            value: chain.value(node),
        });
        Ok(())
    }

    /// Splices every value of `values` in order at target-relative `index`.
    ///
    /// Sibling views are synchronized once, with the whole run. Returns the
    /// number of inserted elements.
    pub fn insert_all<I>(&mut self, key: ViewKey, index: usize, values: I) -> Result<usize, Error>
    where
        I: IntoIterator<Item = T>,
    {
        let target = self.resolve(key)?;
        let e = self.extent(target);
        if index > e.len {
            return Err(Error::IndexOutOfRange { index, len: e.len });
        }
        self.stamp += 1;
        let mut pred = if index == 0 {
            e.front
        } else {
            self.locate(e, index - 1)
        };
        let mut first = usize::NONE;
        let mut count = 0;
        for value in values {
            pred = self.chain.insert_after(pred, value);
            if first.is_none() {
                first = pred;
            }
            count += 1;
        }
        if count == 0 {
            return Ok(0);
        }
        let last = pred;
        let r = e.offset + index;
        if let Target::View(slot) = target {
            self.views[slot].len += count;
        }
        view::sync_insert(&mut self.views, target.view_slot(), r, count, first, last);

        let mut node = first;
        let mut at = r;
        loop {
            self.emit(|chain| Change::Inserted {
                index: at,
                value: chain.value(node),
            });
            if node == last {
                break;
            }
            node = self.chain.next(node);
            at += 1;
        }
        Ok(count)
    }

    /// Appends `value` at the end of the target.
    pub fn push_back(&mut self, key: ViewKey, value: T) -> Result<(), Error> {
        let len = self.len(key)?;
        self.insert(key, len, value)
    }

    /// Prepends `value` at the start of the target.
    pub fn push_front(&mut self, key: ViewKey, value: T) -> Result<(), Error> {
        self.insert(key, 0, value)
    }

    /// Removes and returns the element at target-relative `index`.
    ///
    /// Sibling views are synchronized while the node's links are still
    /// intact, then the node is unlinked.
    pub fn remove_at(&mut self, key: ViewKey, index: usize) -> Result<T, Error> {
        let target = self.resolve(key)?;
        let e = self.extent(target);
        if index >= e.len {
            return Err(Error::IndexOutOfRange { index, len: e.len });
        }
        self.stamp += 1;
        let node = self.locate(e, index);
        let r = e.offset + index;
        let (prev, next) = (self.chain.prev(node), self.chain.next(node));
        view::sync_remove(&mut self.views, r, node, prev, next);
        let value = self.chain.unlink(node);
        self.emit_value(Change::Removed {
            index: r,
            value: &value,
        });
        Ok(value)
    }

    /// Removes the first occurrence of `item`. Returns whether one existed.
    pub fn remove(&mut self, key: ViewKey, item: &T) -> Result<bool, Error>
    where
        T: PartialEq,
    {
        match self.index_of(key, item)? {
            Some(index) => {
                self.remove_at(key, index)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Removes and returns the first element, or `None` if empty.
    pub fn pop_front(&mut self, key: ViewKey) -> Result<Option<T>, Error> {
        if self.len(key)? == 0 {
            return Ok(None);
        }
        self.remove_at(key, 0).map(Some)
    }

    /// Removes and returns the last element, or `None` if empty.
    pub fn pop_back(&mut self, key: ViewKey) -> Result<Option<T>, Error> {
        let len = self.len(key)?;
        if len == 0 {
            return Ok(None);
        }
        self.remove_at(key, len - 1).map(Some)
    }

    /// Replaces the element at `index`, returning the old value.
    pub fn set(&mut self, key: ViewKey, index: usize, value: T) -> Result<T, Error> {
        let target = self.resolve(key)?;
        let e = self.extent(target);
        if index >= e.len {
            return Err(Error::IndexOutOfRange { index, len: e.len });
        }
        self.stamp += 1;
        let node = self.locate(e, index);
        let old = self.chain.replace_value(node, value);
        // Dispatched inline: the payload borrows both the chain and the
        // local `old`, which the chain-borrowing emit helper cannot express.
        if let Some(mut cb) = self.listener.take() {
            cb(Change::Replaced {
                old: &old,
                new: self.chain.value(node),
            });
            self.listener = Some(cb);
        }
        Ok(old)
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Creates a view over `start..start + count` of the target.
    ///
    /// Boundary nodes are located with the anchored pair lookup, so building
    /// a sub-view of a view costs the distance from the enclosing
    /// boundaries, not the distance from an end of the root.
    pub fn view(&mut self, key: ViewKey, start: usize, count: usize) -> Result<ViewKey, Error> {
        let target = self.resolve(key)?;
        let e = self.extent(target);
        let end = match start.checked_add(count) {
            Some(end) if end <= e.len => end,
            _ => {
                return Err(Error::IndexOutOfRange {
                    index: start.saturating_add(count),
                    len: e.len,
                })
            }
        };
        let anchors = self.anchors(e);
        let fpos = e.offset + start;
        let bpos = e.offset + end + 1;
        let (front, back) = self.chain.node_pair(fpos, bpos, &anchors);
        Ok(self.register(front, back, e.offset + start, count))
    }

    /// Wraps the first occurrence of `item` in a 1-element view.
    pub fn view_of(&mut self, key: ViewKey, item: &T) -> Result<Option<ViewKey>, Error>
    where
        T: PartialEq,
    {
        let target = self.resolve(key)?;
        let e = self.extent(target);
        let mut node = self.chain.next(e.front);
        for i in 0..e.len {
            if self.chain.value(node) == item {
                let front = self.chain.prev(node);
                let back = self.chain.next(node);
                return Ok(Some(self.register(front, back, e.offset + i, 1)));
            }
            node = self.chain.next(node);
        }
        Ok(None)
    }

    /// Mutual geometry of two handles into this root.
    pub fn position_of(&self, a: ViewKey, b: ViewKey) -> Result<crate::Position, Error> {
        let ea = self.extent(self.resolve(a)?);
        let eb = self.extent(self.resolve(b)?);
        Ok(view::classify((ea.offset, ea.len), (eb.offset, eb.len)))
    }

    fn register(&mut self, front: usize, back: usize, offset: usize, len: usize) -> ViewKey {
        let gen = self.next_gen;
        self.next_gen = self.next_gen.wrapping_add(1);
        let slot = self.views.insert(ViewState {
            gen,
            front,
            back,
            offset,
            len,
        });
        ViewKey {
            list: self.id,
            slot: slot as u32,
            gen,
        }
    }

    /// Slides a view by `delta` positions, keeping its length.
    ///
    /// Fails with [`Error::InvalidView`] for the root handle.
    pub fn slide(&mut self, key: ViewKey, delta: isize) -> Result<(), Error> {
        self.slide_inner(key, delta, None)
    }

    /// Slides a view by `delta` positions and resizes it to `new_len`.
    pub fn slide_to(&mut self, key: ViewKey, delta: isize, new_len: usize) -> Result<(), Error> {
        self.slide_inner(key, delta, Some(new_len))
    }

    fn slide_inner(
        &mut self,
        key: ViewKey,
        delta: isize,
        new_len: Option<usize>,
    ) -> Result<(), Error> {
        let target = self.resolve(key)?;
        let slot = match target {
            Target::Root => return Err(Error::InvalidView),
            Target::View(slot) => slot,
        };
        let e = self.extent(target);
        let len = new_len.unwrap_or(e.len);
        let new_offset = e.offset as isize + delta;
        let total = self.chain.len();
        if new_offset < 0 {
            return Err(Error::IndexOutOfRange {
                index: 0,
                len: total,
            });
        }
        let offset = new_offset as usize;
        match offset.checked_add(len) {
            Some(end) if end <= total => {}
            _ => {
                return Err(Error::IndexOutOfRange {
                    index: offset.saturating_add(len),
                    len: total,
                })
            }
        }
        self.stamp += 1;
        let anchors = self.anchors(e);
        let (front, back) = self.chain.node_pair(offset, offset + len + 1, &anchors);
        let v = &mut self.views[slot];
        v.front = front;
        v.back = back;
        v.offset = offset;
        v.len = len;
        Ok(())
    }

    // ========================================================================
    // Clear / dispose
    // ========================================================================

    /// Clears the target.
    ///
    /// Clearing the root cascades disposal to every registered view.
    /// Clearing a view removes only its range; siblings stay consistent via
    /// the batch removal protocol, and the view itself survives, empty.
    pub fn clear(&mut self, key: ViewKey) -> Result<(), Error> {
        match self.resolve(key)? {
            Target::Root => {
                self.stamp += 1;
                self.views.clear();
                self.chain.clear();
                self.emit_value(Change::Cleared);
                Ok(())
            }
            Target::View(_) => {
                self.remove_all(key, |_| true)?;
                self.emit_value(Change::Cleared);
                Ok(())
            }
        }
    }

    /// Releases a view from the registry, or disposes the whole root.
    ///
    /// Disposing the root clears storage, cascades disposal to every view,
    /// and permanently invalidates every handle into this list.
    pub fn dispose(&mut self, key: ViewKey) -> Result<(), Error> {
        match self.resolve(key)? {
            Target::View(slot) => {
                self.views.remove(slot);
                Ok(())
            }
            Target::Root => {
                self.stamp += 1;
                self.views.clear();
                self.chain.clear();
                self.disposed = true;
                self.emit_value(Change::Cleared);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn list_of(values: &[u64]) -> (ViewList<u64>, ViewKey) {
        let mut list = ViewList::new();
        let root = list.root();
        for &v in values {
            list.push_back(root, v).unwrap();
        }
        (list, root)
    }

    #[test]
    fn push_and_read() {
        let (list, root) = list_of(&[1, 2, 3]);
        assert_eq!(list.len(root).unwrap(), 3);
        assert_eq!(*list.get(root, 0).unwrap(), 1);
        assert_eq!(*list.get(root, 2).unwrap(), 3);
        assert_eq!(list.first(root).unwrap(), Some(&1));
        assert_eq!(list.last(root).unwrap(), Some(&3));
    }

    #[test]
    fn get_out_of_range() {
        let (list, root) = list_of(&[1, 2]);
        assert_eq!(
            list.get(root, 2),
            Err(Error::IndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn foreign_key_is_incompatible() {
        let (list_a, _) = list_of(&[1]);
        let (list_b, root_b) = list_of(&[1]);
        assert_eq!(list_a.len(root_b), Err(Error::IncompatibleView));
        drop(list_b);
    }

    #[test]
    fn view_reads_sub_range() {
        let (mut list, root) = list_of(&[10, 20, 30, 40, 50]);
        let v = list.view(root, 1, 3).unwrap();
        assert_eq!(list.len(v).unwrap(), 3);
        assert_eq!(list.offset(v).unwrap(), 1);
        assert_eq!(list.to_vec(v).unwrap(), vec![20, 30, 40]);
        assert_eq!(list.underlying(v).unwrap(), Some(root));
        assert_eq!(list.underlying(root).unwrap(), None);
    }

    #[test]
    fn view_of_view() {
        let (mut list, root) = list_of(&[0, 1, 2, 3, 4, 5, 6]);
        let outer = list.view(root, 1, 5).unwrap(); // [1..6)
        let inner = list.view(outer, 1, 2).unwrap(); // root [2..4)
        assert_eq!(list.offset(inner).unwrap(), 2);
        assert_eq!(list.to_vec(inner).unwrap(), vec![2, 3]);
    }

    #[test]
    fn insert_before_view_shifts_it() {
        // Root [10,20,30,40,50], v = view(1,3).
        let (mut list, root) = list_of(&[10, 20, 30, 40, 50]);
        let v = list.view(root, 1, 3).unwrap();
        list.insert(root, 1, 99).unwrap();
        assert_eq!(list.to_vec(root).unwrap(), vec![10, 99, 20, 30, 40, 50]);
        assert_eq!(list.offset(v).unwrap(), 2);
        assert_eq!(list.to_vec(v).unwrap(), vec![20, 30, 40]);
    }

    #[test]
    fn insert_inside_view_grows_it() {
        let (mut list, root) = list_of(&[1, 2, 3, 4, 5]);
        let v = list.view(root, 1, 3).unwrap(); // [2,3,4]
        list.insert(root, 2, 99).unwrap();
        assert_eq!(list.to_vec(v).unwrap(), vec![2, 99, 3, 4]);
        assert_eq!(list.len(v).unwrap(), 4);
        assert_eq!(list.offset(v).unwrap(), 1);
    }

    #[test]
    fn insert_at_view_end_does_not_grow_it() {
        let (mut list, root) = list_of(&[1, 2, 3, 4, 5]);
        let v = list.view(root, 1, 3).unwrap(); // [2,3,4]
        list.insert(root, 4, 99).unwrap(); // at v's trailing edge
        assert_eq!(list.to_vec(v).unwrap(), vec![2, 3, 4]);
        list.insert(root, 1, 77).unwrap(); // at v's leading edge
        assert_eq!(list.to_vec(v).unwrap(), vec![2, 3, 4]);
        assert_eq!(list.offset(v).unwrap(), 2);
    }

    #[test]
    fn insert_through_view_grows_view_and_root() {
        let (mut list, root) = list_of(&[1, 2, 3, 4, 5]);
        let v = list.view(root, 1, 3).unwrap();
        list.insert(v, 0, 10).unwrap();
        list.insert(v, 4, 20).unwrap();
        assert_eq!(list.to_vec(v).unwrap(), vec![10, 2, 3, 4, 20]);
        assert_eq!(list.to_vec(root).unwrap(), vec![1, 10, 2, 3, 4, 20, 5]);
    }

    #[test]
    fn remove_through_root_updates_views() {
        let (mut list, root) = list_of(&[1, 2, 3, 4, 5]);
        let v = list.view(root, 1, 3).unwrap(); // [2,3,4]
        list.remove_at(root, 2).unwrap(); // removes 3, inside v
        assert_eq!(list.to_vec(v).unwrap(), vec![2, 4]);
        list.remove_at(root, 0).unwrap(); // removes 1, before v
        assert_eq!(list.offset(v).unwrap(), 0);
        assert_eq!(list.to_vec(v).unwrap(), vec![2, 4]);
    }

    #[test]
    fn remove_through_view_updates_root() {
        let (mut list, root) = list_of(&[1, 2, 3, 4, 5]);
        let v = list.view(root, 1, 3).unwrap();
        assert_eq!(list.remove_at(v, 1).unwrap(), 3);
        assert_eq!(list.to_vec(root).unwrap(), vec![1, 2, 4, 5]);
        assert_eq!(list.to_vec(v).unwrap(), vec![2, 4]);
    }

    #[test]
    fn sibling_views_stay_consistent_under_interleaving() {
        let (mut list, root) = list_of(&[0, 1, 2, 3, 4, 5, 6, 7]);
        let a = list.view(root, 0, 4).unwrap();
        let b = list.view(root, 2, 4).unwrap();
        let c = list.view(root, 6, 2).unwrap();

        list.insert(a, 2, 100).unwrap();
        list.remove_at(b, 0).unwrap();
        list.insert(c, 0, 200).unwrap();

        let model = list.to_vec(root).unwrap();
        for &(key, _) in &[(a, "a"), (b, "b"), (c, "c")] {
            let off = list.offset(key).unwrap();
            let len = list.len(key).unwrap();
            assert_eq!(list.to_vec(key).unwrap(), model[off..off + len].to_vec());
        }
    }

    #[test]
    fn insert_all_splices_run() {
        let (mut list, root) = list_of(&[1, 5]);
        let v = list.view(root, 1, 1).unwrap(); // [5]
        let n = list.insert_all(root, 1, [2, 3, 4]).unwrap();
        assert_eq!(n, 3);
        assert_eq!(list.to_vec(root).unwrap(), vec![1, 2, 3, 4, 5]);
        assert_eq!(list.offset(v).unwrap(), 4);
        assert_eq!(list.to_vec(v).unwrap(), vec![5]);
    }

    #[test]
    fn set_replaces_in_place() {
        let (mut list, root) = list_of(&[1, 2, 3]);
        let v = list.view(root, 1, 1).unwrap();
        assert_eq!(list.set(v, 0, 99).unwrap(), 2);
        assert_eq!(list.to_vec(root).unwrap(), vec![1, 99, 3]);
    }

    #[test]
    fn view_of_wraps_first_occurrence() {
        let (mut list, root) = list_of(&[5, 7, 9, 7]);
        let v = list.view_of(root, &7).unwrap().unwrap();
        assert_eq!(list.offset(v).unwrap(), 1);
        assert_eq!(list.to_vec(v).unwrap(), vec![7]);
        assert!(list.view_of(root, &42).unwrap().is_none());
    }

    #[test]
    fn slide_moves_view() {
        let (mut list, root) = list_of(&[0, 1, 2, 3, 4, 5]);
        let v = list.view(root, 0, 2).unwrap();
        list.slide(v, 3).unwrap();
        assert_eq!(list.offset(v).unwrap(), 3);
        assert_eq!(list.to_vec(v).unwrap(), vec![3, 4]);
        list.slide_to(v, -1, 4).unwrap();
        assert_eq!(list.to_vec(v).unwrap(), vec![2, 3, 4, 5]);
    }

    #[test]
    fn slide_root_is_invalid() {
        let (mut list, root) = list_of(&[1]);
        assert_eq!(list.slide(root, 0), Err(Error::InvalidView));
    }

    #[test]
    fn slide_out_of_range() {
        let (mut list, root) = list_of(&[0, 1, 2]);
        let v = list.view(root, 1, 2).unwrap();
        assert!(list.slide(v, -2).is_err());
        assert!(list.slide(v, 1).is_err());
        assert_eq!(list.to_vec(v).unwrap(), vec![1, 2]);
    }

    #[test]
    fn view_range_overflow_is_an_error() {
        let (mut list, root) = list_of(&[1, 2, 3]);
        assert_eq!(
            list.view(root, usize::MAX, 2),
            Err(Error::IndexOutOfRange {
                index: usize::MAX,
                len: 3
            })
        );
        let v = list.view(root, 0, 1).unwrap();
        assert_eq!(
            list.slide_to(v, 0, usize::MAX),
            Err(Error::IndexOutOfRange {
                index: usize::MAX,
                len: 3
            })
        );
        assert_eq!(list.to_vec(v).unwrap(), vec![1]);
    }

    #[test]
    fn dispose_view_invalidates_handle() {
        let (mut list, root) = list_of(&[1, 2, 3]);
        let v = list.view(root, 0, 2).unwrap();
        list.dispose(v).unwrap();
        assert_eq!(list.len(v), Err(Error::InvalidView));
        assert_eq!(list.view_count(), 0);
        // The root is untouched.
        assert_eq!(list.len(root).unwrap(), 3);
    }

    #[test]
    fn stale_handle_does_not_alias_reused_slot() {
        let (mut list, root) = list_of(&[1, 2, 3]);
        let old = list.view(root, 0, 1).unwrap();
        list.dispose(old).unwrap();
        let fresh = list.view(root, 1, 1).unwrap();
        assert_eq!(list.len(old), Err(Error::InvalidView));
        assert_eq!(list.to_vec(fresh).unwrap(), vec![2]);
    }

    #[test]
    fn clear_root_cascades_to_views() {
        let (mut list, root) = list_of(&[1, 2, 3]);
        let v = list.view(root, 0, 2).unwrap();
        list.clear(root).unwrap();
        assert_eq!(list.len(root).unwrap(), 0);
        assert_eq!(list.len(v), Err(Error::InvalidView));
    }

    #[test]
    fn dispose_root_invalidates_everything() {
        let (mut list, root) = list_of(&[1, 2, 3]);
        let v = list.view(root, 0, 2).unwrap();
        list.dispose(root).unwrap();
        assert_eq!(list.len(root), Err(Error::InvalidView));
        assert_eq!(list.len(v), Err(Error::InvalidView));
        assert!(!list.is_valid(root));
    }

    #[test]
    fn stamp_bumps_on_mutation_only() {
        let (mut list, root) = list_of(&[1, 2, 3]);
        let before = list.stamp();
        let _ = list.get(root, 0).unwrap();
        let _ = list.len(root).unwrap();
        assert_eq!(list.stamp(), before);
        list.insert(root, 0, 0).unwrap();
        assert!(list.stamp() > before);
    }

    #[test]
    fn failed_op_changes_nothing() {
        let (mut list, root) = list_of(&[1, 2, 3]);
        let before = list.to_vec(root).unwrap();
        assert!(list.insert(root, 9, 0).is_err());
        assert!(list.remove_at(root, 3).is_err());
        assert_eq!(list.to_vec(root).unwrap(), before);
    }

    #[test]
    fn listener_observes_changes() {
        let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let mut list: ViewList<u64> = ViewList::new();
        let root = list.root();
        list.set_listener(Box::new(move |change| {
            let entry = match change {
                Change::Inserted { index, value } => format!("ins {index} {value}"),
                Change::Removed { index, value } => format!("rem {index} {value}"),
                Change::Replaced { old, new } => format!("rep {old} {new}"),
                Change::Cleared => "clear".to_string(),
            };
            sink.borrow_mut().push(entry);
        }));

        list.push_back(root, 5).unwrap();
        list.push_back(root, 6).unwrap();
        list.set(root, 1, 7).unwrap();
        list.remove_at(root, 0).unwrap();
        list.clear(root).unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["ins 0 5", "ins 1 6", "rep 6 7", "rem 0 5", "clear"]
        );
    }

    #[test]
    fn search_helpers() {
        let (list, root) = list_of(&[3, 1, 4, 1, 5]);
        assert_eq!(list.index_of(root, &1).unwrap(), Some(1));
        assert!(list.contains(root, &4).unwrap());
        assert!(!list.contains(root, &9).unwrap());
        assert_eq!(list.count_eq(root, &1).unwrap(), 2);
    }

    #[test]
    fn remove_first_occurrence_only() {
        let (mut list, root) = list_of(&[1, 2, 1, 2]);
        assert!(list.remove(root, &2).unwrap());
        assert_eq!(list.to_vec(root).unwrap(), vec![1, 1, 2]);
        assert!(!list.remove(root, &9).unwrap());
    }
}
