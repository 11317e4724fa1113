//! Sentinel-based key trait for zero-cost optional indices.
//!
//! Links and chain boundaries use a reserved sentinel value (e.g. `u32::MAX`)
//! instead of `Option<K>` so a link field stays two words wide.

/// A copyable storage key with a reserved "none" value.
///
/// `NONE` plays the role a null or tagged pointer would play in a
/// pointer-based chain: it marks the boundary of a chain and the empty
/// state of a container. It is never a valid storage slot.
///
/// # Example
///
/// ```
/// use weft_collections::Key;
///
/// let key: u32 = 5;
/// assert!(key.is_some());
/// assert!(u32::NONE.is_none());
/// ```
pub trait Key: Copy + Eq {
    /// Sentinel value representing "no key".
    const NONE: Self;

    /// Creates a key from a `usize` slot index.
    fn from_usize(val: usize) -> Self;

    /// Returns the key as a `usize` slot index.
    fn as_usize(self) -> usize;

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

macro_rules! impl_key_for_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Key for $ty {
                const NONE: Self = <$ty>::MAX;

                #[inline]
                fn from_usize(val: usize) -> Self {
                    val as Self
                }

                #[inline]
                fn as_usize(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_key_for_unsigned!(u8, u16, u32, u64, usize);
