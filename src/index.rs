//! Sentinel-based index helpers for slab slot references.
//!
//! Node links and boundary references are plain slab keys. A reserved
//! sentinel value (`usize::MAX`) stands in for "no slot" during node
//! construction, saving the space an `Option<usize>` would cost per link.

/// A copyable slot index with a sentinel "none" value.
///
/// # Example
///
/// ```
/// use viewlist::Index;
///
/// let idx: usize = 5;
/// let none: usize = usize::NONE;
///
/// assert!(idx.is_some());
/// assert!(none.is_none());
/// ```
pub trait Index: Copy + Eq {
    /// Sentinel value representing "no slot" / null.
    const NONE: Self;

    /// Returns `true` if this is the sentinel value.
    #[inline]
    fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Returns `true` if this is not the sentinel value.
    #[inline]
    fn is_some(self) -> bool {
        !self.is_none()
    }
}

macro_rules! impl_index_for_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Index for $ty {
                const NONE: Self = <$ty>::MAX;
            }
        )*
    };
}

impl_index_for_unsigned!(u32, usize);
