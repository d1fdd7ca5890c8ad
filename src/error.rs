//! Error taxonomy for list and view operations.
//!
//! Every failure is fatal to the call that raised it and is never retried
//! internally. A failed operation makes no structural change: callers observe
//! either the full effect of an operation or none of it.

/// Error returned by fallible list and view operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// The handle refers to a disposed view, or its root has been disposed.
    ///
    /// Also raised when an operation that only makes sense on a proper view
    /// (such as sliding) is given the root handle.
    InvalidView,
    /// The root was structurally modified while a traversal captured an
    /// earlier stamp. The structure itself remains valid; only the traversal
    /// is dead.
    ConcurrentStructuralChange,
    /// A position outside `[0, len)` (or `[0, len]` for insertion).
    IndexOutOfRange {
        /// The offending position.
        index: usize,
        /// The length of the sequence or view it was checked against.
        len: usize,
    },
    /// The handle was minted by a different root.
    IncompatibleView,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidView => write!(f, "operation on a disposed or invalidated view"),
            Error::ConcurrentStructuralChange => {
                write!(f, "structure was modified during traversal")
            }
            Error::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            Error::IncompatibleView => write!(f, "view does not belong to this root"),
        }
    }
}

impl std::error::Error for Error {}
