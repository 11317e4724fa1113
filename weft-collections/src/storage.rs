//! Storage trait and the built-in slot storage.
//!
//! Storage owns the elements; lists and hash tables only coordinate keys
//! into it. Keys are stable: a key remains valid until the element is
//! explicitly removed, and vacated slots are reused by later inserts.

use crate::Key;

/// Slab-like element storage with stable keys.
///
/// # Requirements
///
/// Implementations must provide:
/// - **Stable keys**: a key remains valid until explicitly removed
/// - **O(1)** insert, remove, get operations
/// - **Slot reuse**: removed slots can be reused by future inserts
///
/// # Implementations
///
/// - [`SlotStorage<T, K>`] - growable, vacant free-list (in this crate)
/// - `slab::Slab<T>` - growable (feature `slab`)
///
/// # Critical Invariant: Same Storage Instance
///
/// Every chain over a storage must always be used with that same storage
/// instance. Passing a different storage to a list or hash table that holds
/// keys into the first one is a logic error the containers cannot detect.
pub trait Storage<T> {
    /// Key type for this storage.
    type Key: Key;

    /// Inserts an element, returning its stable key.
    fn insert(&mut self, value: T) -> Self::Key;

    /// Removes and returns the element at `key`, if present.
    fn remove(&mut self, key: Self::Key) -> Option<T>;

    /// Returns a reference to the element at `key`, if present.
    fn get(&self, key: Self::Key) -> Option<&T>;

    /// Returns a mutable reference to the element at `key`, if present.
    fn get_mut(&mut self, key: Self::Key) -> Option<&mut T>;

    /// Returns the number of stored elements.
    fn len(&self) -> usize;

    /// Returns `true` if no elements are stored.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

enum Slot<T, K: Key> {
    Vacant { next_free: K },
    Occupied(T),
}

/// Growable storage backed by a `Vec` with a vacant free-list.
///
/// The default storage for this crate's containers. Removed slots go onto
/// a free-list and are reused LIFO, so keys stay dense under churn.
///
/// # Example
///
/// ```
/// use weft_collections::{SlotStorage, Storage};
///
/// let mut storage: SlotStorage<u64> = SlotStorage::new();
///
/// let key = storage.insert(42);
/// assert_eq!(storage.get(key), Some(&42));
///
/// assert_eq!(storage.remove(key), Some(42));
/// assert_eq!(storage.get(key), None);
/// ```
pub struct SlotStorage<T, K: Key = u32> {
    slots: Vec<Slot<T, K>>,
    free_head: K,
    len: usize,
}

impl<T, K: Key> SlotStorage<T, K> {
    /// Creates empty storage.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: K::NONE,
            len: 0,
        }
    }

    /// Creates empty storage with room for `capacity` elements before
    /// reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: K::NONE,
            len: 0,
        }
    }

    /// Returns the number of slots the storage can hold without
    /// reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }
}

impl<T, K: Key> Default for SlotStorage<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K: Key> Storage<T> for SlotStorage<T, K> {
    type Key = K;

    fn insert(&mut self, value: T) -> K {
        self.len += 1;

        if self.free_head.is_some() {
            let key = self.free_head;
            let slot = &mut self.slots[key.as_usize()];
            match *slot {
                Slot::Vacant { next_free } => {
                    self.free_head = next_free;
                    *slot = Slot::Occupied(value);
                    key
                }
                Slot::Occupied(_) => unreachable!("free-list points at occupied slot"),
            }
        } else {
            let index = self.slots.len();
            assert!(
                index < K::NONE.as_usize(),
                "slot storage exhausted the key space"
            );
            self.slots.push(Slot::Occupied(value));
            K::from_usize(index)
        }
    }

    fn remove(&mut self, key: K) -> Option<T> {
        if key.is_none() || key.as_usize() >= self.slots.len() {
            return None;
        }

        let slot = &mut self.slots[key.as_usize()];
        if matches!(slot, Slot::Vacant { .. }) {
            return None;
        }

        let old = core::mem::replace(
            slot,
            Slot::Vacant {
                next_free: self.free_head,
            },
        );
        self.free_head = key;
        self.len -= 1;

        match old {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => unreachable!(),
        }
    }

    #[inline]
    fn get(&self, key: K) -> Option<&T> {
        if key.is_none() {
            return None;
        }
        match self.slots.get(key.as_usize()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    #[inline]
    fn get_mut(&mut self, key: K) -> Option<&mut T> {
        if key.is_none() {
            return None;
        }
        match self.slots.get_mut(key.as_usize()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }
}

// =============================================================================
// slab::Slab implementation
// =============================================================================

#[cfg(feature = "slab")]
impl<T> Storage<T> for slab::Slab<T> {
    type Key = usize;

    #[inline]
    fn insert(&mut self, value: T) -> usize {
        self.insert(value)
    }

    #[inline]
    fn remove(&mut self, key: usize) -> Option<T> {
        self.try_remove(key)
    }

    #[inline]
    fn get(&self, key: usize) -> Option<&T> {
        self.get(key)
    }

    #[inline]
    fn get_mut(&mut self, key: usize) -> Option<&mut T> {
        self.get_mut(key)
    }

    #[inline]
    fn len(&self) -> usize {
        self.len()
    }
}
