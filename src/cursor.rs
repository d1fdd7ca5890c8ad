//! Traversal: a borrowing iterator and a detached cursor.
//!
//! [`Iter`] borrows the list, so the borrow checker already guarantees the
//! structure cannot change underneath it. [`Cursor`] holds no borrow at all;
//! it captures the root's revision stamp instead and revalidates it on every
//! step, failing with
//! [`Error::ConcurrentStructuralChange`](crate::Error::ConcurrentStructuralChange)
//! if any structural mutation happened since. A failed cursor leaves the
//! list itself fully usable.

use std::iter::FusedIterator;

use crate::chain::Chain;
use crate::list::ViewList;
use crate::{Error, ViewKey};

/// Borrowing iterator over a root or view range, front to back.
#[derive(Debug)]
pub struct Iter<'a, T> {
    chain: &'a Chain<T>,
    front: usize,
    back: usize,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.chain.value(self.front);
        self.front = self.chain.next(self.front);
        self.remaining -= 1;
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.chain.value(self.back);
        self.back = self.chain.prev(self.back);
        self.remaining -= 1;
        Some(value)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Detached forward cursor over a root or view range.
///
/// Holds no borrow, so the list can be mutated between steps; the cursor
/// then reports the structural change instead of walking stale links. Reads
/// never move the stamp; every mutating operation, including in-place
/// replacement, does.
#[derive(Debug, Clone)]
pub struct Cursor {
    key: ViewKey,
    stamp: u64,
    node: usize,
    index: usize,
}

impl Cursor {
    /// Target-relative index of the next element to yield.
    #[inline]
    pub fn position(&self) -> usize {
        self.index
    }

    /// Yields the next element, or `None` past the end.
    ///
    /// Fails if the handle no longer resolves or the root's stamp moved
    /// since the cursor was created.
    pub fn next<'a, T>(&mut self, list: &'a ViewList<T>) -> Result<Option<&'a T>, Error> {
        let target = list.resolve(self.key)?;
        if list.stamp != self.stamp {
            return Err(Error::ConcurrentStructuralChange);
        }
        let e = list.extent(target);
        if self.index >= e.len {
            return Ok(None);
        }
        if self.index == 0 {
            self.node = e.front;
        }
        self.node = list.chain.next(self.node);
        self.index += 1;
        Ok(Some(list.chain.value(self.node)))
    }

    /// Steps back over the most recently yielded element and yields it
    /// again, or `None` at the front. Same stamp discipline as
    /// [`next`](Self::next).
    pub fn jump_back<'a, T>(&mut self, list: &'a ViewList<T>) -> Result<Option<&'a T>, Error> {
        list.resolve(self.key)?;
        if list.stamp != self.stamp {
            return Err(Error::ConcurrentStructuralChange);
        }
        if self.index == 0 {
            return Ok(None);
        }
        let value = list.chain.value(self.node);
        self.node = list.chain.prev(self.node);
        self.index -= 1;
        Ok(Some(value))
    }
}

impl<T> ViewList<T> {
    /// Borrowing iterator over the target, front to back.
    pub fn iter(&self, key: ViewKey) -> Result<Iter<'_, T>, Error> {
        let target = self.resolve(key)?;
        let e = self.extent(target);
        Ok(Iter {
            chain: &self.chain,
            front: self.chain.next(e.front),
            back: self.chain.prev(e.back),
            remaining: e.len,
        })
    }

    /// Detached cursor over the target, pinned to the current stamp.
    pub fn cursor(&self, key: ViewKey) -> Result<Cursor, Error> {
        self.resolve(key)?;
        Ok(Cursor {
            key,
            stamp: self.stamp,
            node: self.chain.head(),
            index: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(values: &[u64]) -> (ViewList<u64>, ViewKey) {
        let mut list = ViewList::new();
        let root = list.root();
        for &v in values {
            list.push_back(root, v).unwrap();
        }
        (list, root)
    }

    #[test]
    fn iter_forward_and_back() {
        let (list, root) = list_of(&[1, 2, 3, 4]);
        let forward: Vec<u64> = list.iter(root).unwrap().copied().collect();
        assert_eq!(forward, vec![1, 2, 3, 4]);
        let backward: Vec<u64> = list.iter(root).unwrap().rev().copied().collect();
        assert_eq!(backward, vec![4, 3, 2, 1]);
    }

    #[test]
    fn iter_meets_in_the_middle() {
        let (list, root) = list_of(&[1, 2, 3]);
        let mut it = list.iter(root).unwrap();
        assert_eq!(it.next(), Some(&1));
        assert_eq!(it.next_back(), Some(&3));
        assert_eq!(it.next(), Some(&2));
        assert_eq!(it.next(), None);
        assert_eq!(it.next_back(), None);
    }

    #[test]
    fn iter_scoped_to_view() {
        let (mut list, root) = list_of(&[0, 1, 2, 3, 4]);
        let v = list.view(root, 1, 3).unwrap();
        let got: Vec<u64> = list.iter(v).unwrap().copied().collect();
        assert_eq!(got, vec![1, 2, 3]);
        assert_eq!(list.iter(v).unwrap().len(), 3);
    }

    #[test]
    fn iter_empty() {
        let (mut list, root) = list_of(&[1, 2]);
        let v = list.view(root, 1, 0).unwrap();
        assert_eq!(list.iter(v).unwrap().next(), None);
    }

    #[test]
    fn cursor_walks_to_end() {
        let (list, root) = list_of(&[5, 6, 7]);
        let mut cur = list.cursor(root).unwrap();
        assert_eq!(cur.position(), 0);
        assert_eq!(cur.next(&list).unwrap(), Some(&5));
        assert_eq!(cur.next(&list).unwrap(), Some(&6));
        assert_eq!(cur.next(&list).unwrap(), Some(&7));
        assert_eq!(cur.next(&list).unwrap(), None);
        assert_eq!(cur.position(), 3);
    }

    #[test]
    fn cursor_jump_back_retraces() {
        let (list, root) = list_of(&[1, 2, 3]);
        let mut cur = list.cursor(root).unwrap();
        assert_eq!(cur.jump_back(&list).unwrap(), None);
        assert_eq!(cur.next(&list).unwrap(), Some(&1));
        assert_eq!(cur.next(&list).unwrap(), Some(&2));
        assert_eq!(cur.jump_back(&list).unwrap(), Some(&2));
        assert_eq!(cur.position(), 1);
        assert_eq!(cur.next(&list).unwrap(), Some(&2));
        assert_eq!(cur.next(&list).unwrap(), Some(&3));
    }

    #[test]
    fn cursor_dies_on_structural_change() {
        let (mut list, root) = list_of(&[1, 2, 3]);
        let mut cur = list.cursor(root).unwrap();
        assert_eq!(cur.next(&list).unwrap(), Some(&1));
        list.insert(root, 0, 0).unwrap();
        assert_eq!(cur.next(&list), Err(Error::ConcurrentStructuralChange));
        // The list itself is fine; a fresh cursor works.
        let mut fresh = list.cursor(root).unwrap();
        assert_eq!(fresh.next(&list).unwrap(), Some(&0));
    }

    #[test]
    fn cursor_dies_on_sibling_view_mutation() {
        let (mut list, root) = list_of(&[1, 2, 3, 4]);
        let v = list.view(root, 2, 2).unwrap();
        let mut cur = list.cursor(root).unwrap();
        list.remove_at(v, 0).unwrap();
        assert_eq!(cur.next(&list), Err(Error::ConcurrentStructuralChange));
    }

    #[test]
    fn cursor_survives_reads() {
        let (list, root) = list_of(&[1, 2]);
        let mut cur = list.cursor(root).unwrap();
        let _ = list.get(root, 1).unwrap();
        let _ = list.to_vec(root).unwrap();
        assert_eq!(cur.next(&list).unwrap(), Some(&1));
    }

    #[test]
    fn cursor_on_disposed_view() {
        let (mut list, root) = list_of(&[1, 2, 3]);
        let v = list.view(root, 0, 2).unwrap();
        let mut cur = list.cursor(v).unwrap();
        list.dispose(v).unwrap();
        assert_eq!(cur.next(&list), Err(Error::InvalidView));
    }
}
