//! A doubly linked sequence with live, overlapping sub-range views.
//!
//! [`ViewList`] stores its elements in a slab-backed node chain and hands
//! out [`ViewKey`] handles: one for the root, and any number for *views*,
//! lightweight windows onto a contiguous sub-range of the same storage.
//! Views are first class. They can be read, mutated, nested, slid along the
//! root, and they all stay consistent with each other: every structural
//! change made through any handle synchronizes every sibling view's offset,
//! length, and boundaries before the call returns.
//!
//! # Quick start
//!
//! ```
//! use viewlist::ViewList;
//!
//! let mut list: ViewList<&str> = ViewList::new();
//! let root = list.root();
//! for word in ["the", "quick", "brown", "fox"] {
//!     list.push_back(root, word).unwrap();
//! }
//!
//! let middle = list.view(root, 1, 2).unwrap();
//! assert_eq!(list.to_vec(middle).unwrap(), vec!["quick", "brown"]);
//!
//! // Mutating through the view is mutating the root's storage.
//! list.set(middle, 0, "slow").unwrap();
//! assert_eq!(list.to_vec(root).unwrap(), vec!["the", "slow", "brown", "fox"]);
//!
//! // Mutating the root keeps the view on its elements.
//! list.push_front(root, "behold").unwrap();
//! assert_eq!(list.offset(middle).unwrap(), 2);
//! assert_eq!(list.to_vec(middle).unwrap(), vec!["slow", "brown"]);
//! ```
//!
//! # Handles, not references
//!
//! A [`ViewKey`] is a plain `Copy` value, not a borrow. Handles are
//! validated on every operation: a key from another list fails with
//! [`Error::IncompatibleView`], a disposed view's key fails with
//! [`Error::InvalidView`], and a stale key can never reach a recycled
//! registry slot thanks to a generation stamp. Invalid handles fail calls;
//! they never panic and never corrupt the structure.
//!
//! # Traversal
//!
//! [`ViewList::iter`] borrows the list and is immune to mutation by
//! construction. [`Cursor`] is detached: it pins the root's revision stamp
//! and fails a step with [`Error::ConcurrentStructuralChange`] if the
//! structure moved underneath it, instead of walking freed or relinked
//! nodes.
//!
//! # Costs
//!
//! Positional access walks from the nearest known node (a sentinel or a
//! view boundary), so indexing near a view's edges is cheap regardless of
//! where the view sits in the root. Structural mutations are `O(1)` once
//! located, plus `O(views)` synchronization. Batch removal settles every
//! view in a single pass over the range. Sorting is a stable `O(n log n)`
//! merge over the links with no allocation.

mod batch;
mod chain;
mod cursor;
mod error;
mod event;
mod index;
mod list;
mod reorder;
mod view;

pub use cursor::{Cursor, Iter};
pub use error::Error;
pub use event::{Change, Listener};
pub use index::Index;
pub use list::ViewList;
pub use view::{Position, ViewKey};
