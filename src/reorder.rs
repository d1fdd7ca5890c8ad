//! Reordering: stable sort, reverse, and shuffle over a root or view range.
//!
//! Reordering a range invalidates any sibling view that partially overlaps
//! it: such a view's contents would be an arbitrary mix of moved and
//! unmoved elements, so the view is disposed instead. Disjoint siblings and
//! siblings containing the whole range are untouched. Siblings fully
//! contained in the range survive, with semantics per operation:
//!
//! - `sort` relinks nodes; every boundary node that sat inside the range,
//!   whether it belongs to a contained window or to a disjoint sibling
//!   bordering the range, is relabeled to whatever now sits at its
//!   position;
//! - `reverse` swaps values in place and moves a contained view to the
//!   mirrored window, reassigning both of its boundaries, so it keeps
//!   showing its old content, reversed;
//! - `shuffle` swaps values in place; a contained view keeps its window and
//!   simply observes the new values.

use std::cmp::Ordering;

use rand_core::RngCore;

use crate::list::{Extent, Target, ViewList};
use crate::view::{classify, Position};
use crate::{Error, Index, ViewKey};

impl<T> ViewList<T> {
    /// Sorts the target ascending. Stable: equal elements keep their order.
    pub fn sort(&mut self, key: ViewKey) -> Result<(), Error>
    where
        T: Ord,
    {
        self.sort_by(key, T::cmp)
    }

    /// Sorts the target by a comparator. Stable.
    ///
    /// Bottom-up merge sort over the next links: no allocation, and
    /// `O(n log n)` comparisons even for presorted input runs.
    pub fn sort_by<F>(&mut self, key: ViewKey, mut cmp: F) -> Result<(), Error>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let target = self.resolve(key)?;
        let e = self.extent(target);
        self.stamp += 1;
        self.dispose_overlapping(target, e);

        if e.len > 1 {
            let first = self.chain.next(e.front);
            let last = self.chain.prev(e.back);
            self.chain.set_next(last, usize::NONE);

            let mut list = first;
            let mut insize = 1usize;
            loop {
                let mut p = list;
                list = usize::NONE;
                let mut tail = usize::NONE;
                let mut nmerges = 0usize;

                while p.is_some() {
                    nmerges += 1;
                    let mut q = p;
                    let mut psize = 0usize;
                    for _ in 0..insize {
                        psize += 1;
                        q = self.chain.next(q);
                        if q.is_none() {
                            break;
                        }
                    }
                    let mut qsize = insize;

                    while psize > 0 || (qsize > 0 && q.is_some()) {
                        let from_p = if psize == 0 {
                            false
                        } else if qsize == 0 || q.is_none() {
                            true
                        } else {
                            // Left run wins ties, which is what makes the
                            // sort stable.
                            cmp(self.chain.value(p), self.chain.value(q)) != Ordering::Greater
                        };
                        let picked = if from_p {
                            let n = p;
                            p = self.chain.next(p);
                            psize -= 1;
                            n
                        } else {
                            let n = q;
                            q = self.chain.next(q);
                            qsize -= 1;
                            n
                        };
                        if tail.is_some() {
                            self.chain.set_next(tail, picked);
                        } else {
                            list = picked;
                        }
                        tail = picked;
                    }
                    p = q;
                }
                self.chain.set_next(tail, usize::NONE);

                if nmerges <= 1 {
                    break;
                }
                insize *= 2;
            }

            // Splice the sorted run back between the boundaries and rebuild
            // the prev links in one walk.
            self.chain.set_next(e.front, list);
            let mut prev = e.front;
            let mut node = list;
            while node.is_some() {
                let next = self.chain.next(node);
                self.chain.set_prev(node, prev);
                prev = node;
                node = next;
            }
            self.chain.relink(prev, e.back);
        }

        self.relabel_boundaries(e);
        Ok(())
    }

    /// Returns `true` if the target is ascending.
    pub fn is_sorted(&self, key: ViewKey) -> Result<bool, Error>
    where
        T: Ord,
    {
        self.is_sorted_by(key, T::cmp)
    }

    /// Returns `true` if the target is ordered under `cmp`.
    pub fn is_sorted_by<F>(&self, key: ViewKey, mut cmp: F) -> Result<bool, Error>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let target = self.resolve(key)?;
        let e = self.extent(target);
        let mut node = self.chain.next(e.front);
        for _ in 1..e.len {
            let next = self.chain.next(node);
            if cmp(self.chain.value(node), self.chain.value(next)) == Ordering::Greater {
                return Ok(false);
            }
            node = next;
        }
        Ok(true)
    }

    /// Reverses the target by swapping values from both ends inward. Node
    /// identity is fixed, so boundaries of views outside the range hold.
    ///
    /// A contained sibling moves to the mirrored window
    /// `2 * offset + len - (o + s)` and keeps showing its old content,
    /// reversed along with everything else.
    pub fn reverse(&mut self, key: ViewKey) -> Result<(), Error> {
        let target = self.resolve(key)?;
        let e = self.extent(target);
        self.stamp += 1;
        self.dispose_overlapping(target, e);

        let mut a = self.chain.next(e.front);
        let mut b = self.chain.prev(e.back);
        for _ in 0..e.len / 2 {
            let va = self.chain.take_value(a);
            let vb = self.chain.take_value(b);
            self.chain.put_value(a, vb);
            self.chain.put_value(b, va);
            a = self.chain.next(a);
            b = self.chain.prev(b);
        }

        let mut mirrored: Vec<usize> = Vec::new();
        for (slot, v) in self.views.iter_mut() {
            if classify((v.offset, v.len), (e.offset, e.len)) == Position::ContainedIn {
                v.offset = 2 * e.offset + e.len - v.offset - v.len;
                mirrored.push(slot);
            }
        }

        // A view that moved needs both boundary nodes reassigned. An edge
        // landing on the range edge adopts the range's own boundary, which
        // sits outside the relabel walk.
        let hi = e.offset + e.len;
        let mut marks: Vec<(usize, usize, bool)> = Vec::new();
        for slot in mirrored {
            let (o, s) = {
                let v = &self.views[slot];
                (v.offset, v.len)
            };
            if o == e.offset {
                self.views[slot].front = e.front;
            } else {
                marks.push((o - 1, slot, true));
            }
            if o + s == hi {
                self.views[slot].back = e.back;
            } else {
                marks.push((o + s, slot, false));
            }
        }
        self.walk_assign(e, marks);
        Ok(())
    }

    /// Permutes the target uniformly at random (Fisher-Yates), driven by any
    /// [`RngCore`] source. Values move, nodes stay.
    pub fn shuffle<R: RngCore>(&mut self, key: ViewKey, rng: &mut R) -> Result<(), Error> {
        let target = self.resolve(key)?;
        let e = self.extent(target);
        self.stamp += 1;
        self.dispose_overlapping(target, e);

        if e.len > 1 {
            let mut nodes: Vec<usize> = Vec::with_capacity(e.len);
            let mut values: Vec<T> = Vec::with_capacity(e.len);
            let mut node = self.chain.next(e.front);
            for _ in 0..e.len {
                nodes.push(node);
                values.push(self.chain.take_value(node));
                node = self.chain.next(node);
            }
            for i in (1..values.len()).rev() {
                let j = (rng.next_u64() % (i as u64 + 1)) as usize;
                values.swap(i, j);
            }
            for (node, value) in nodes.into_iter().zip(values) {
                self.chain.put_value(node, value);
            }
        }
        Ok(())
    }

    /// Disposes every sibling view that partially overlaps the reordered
    /// range. The issuing view itself is exempt.
    fn dispose_overlapping(&mut self, target: Target, e: Extent) {
        let skip = target.view_slot();
        let doomed: Vec<usize> = self
            .views
            .iter()
            .filter(|&(slot, v)| {
                Some(slot) != skip
                    && classify((v.offset, v.len), (e.offset, e.len)) == Position::Overlapping
            })
            .map(|(slot, _)| slot)
            .collect();
        for slot in doomed {
            self.views.remove(slot);
        }
    }

    /// Relabels every boundary node whose position fell inside the permuted
    /// range, whatever the owning view's geometry: a disjoint sibling that
    /// borders the range still anchors on a node the sort just relinked.
    fn relabel_boundaries(&mut self, e: Extent) {
        let lo = e.offset;
        let hi = e.offset + e.len;
        // (element position of the boundary node, slot, true for front)
        let mut marks: Vec<(usize, usize, bool)> = Vec::new();
        for (slot, v) in self.views.iter() {
            if v.offset > lo && v.offset - 1 < hi {
                marks.push((v.offset - 1, slot, true));
            }
            let back = v.offset + v.len;
            if back >= lo && back < hi {
                marks.push((back, slot, false));
            }
        }
        self.walk_assign(e, marks);
    }

    /// Assigns boundary nodes from `(position, slot, is_front)` marks in a
    /// single front-to-back walk over the range. Every marked position must
    /// lie inside it.
    fn walk_assign(&mut self, e: Extent, mut marks: Vec<(usize, usize, bool)>) {
        if marks.is_empty() {
            return;
        }
        marks.sort_unstable();

        let mut cur = 0;
        let mut node = self.chain.next(e.front);
        for pos in e.offset..e.offset + e.len {
            while cur < marks.len() && marks[cur].0 == pos {
                let (_, slot, is_front) = marks[cur];
                if is_front {
                    self.views[slot].front = node;
                } else {
                    self.views[slot].back = node;
                }
                cur += 1;
            }
            if cur == marks.len() {
                break;
            }
            node = self.chain.next(node);
        }
    }
}
