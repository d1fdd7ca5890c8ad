//! Post-mutation change notification.
//!
//! A root can carry one listener, invoked after each successful structural
//! change with a borrowed payload. Listeners observe; they cannot veto or
//! alter the change, and they run while the list is borrowed, so reentrant
//! mutation is impossible by construction.

/// A completed structural change, reported to the root's listener.
///
/// Indices are root-relative, captured at the moment of the change.
#[derive(Debug, Clone, Copy)]
pub enum Change<'a, T> {
    /// A value was inserted at `index`.
    Inserted {
        /// Root-relative position of the new element.
        index: usize,
        /// The inserted value.
        value: &'a T,
    },
    /// A value was removed from `index`.
    Removed {
        /// Root-relative position the element occupied before removal.
        index: usize,
        /// The removed value.
        value: &'a T,
    },
    /// A value was replaced in place.
    Replaced {
        /// The previous value.
        old: &'a T,
        /// The new value.
        new: &'a T,
    },
    /// A root or view range was cleared.
    Cleared,
}

/// Boxed change listener installed on a root.
pub type Listener<T> = Box<dyn FnMut(Change<'_, T>)>;
