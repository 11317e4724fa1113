//! Embedded chain links and the traits that bind them to element types.
//!
//! A [`Link`] is one membership slot inside an element. Elements embed one
//! link per container they can belong to; the containers never allocate
//! per-member nodes. An [`Adapter`] names which link field a given container
//! uses, and [`Node`] lets containers check that an element is fully
//! detached before it is destroyed.

use crate::Key;

/// One chain membership slot, embedded in an element.
///
/// Holds the storage keys of the element's neighbors in a single chain.
/// `K::NONE` on a side means the chain boundary (the container's sentinel)
/// is adjacent on that side, so a link answers "am I at the end?" without
/// consulting the container.
///
/// A link starts detached and is spliced in and out by the owning
/// [`List`](crate::List) or [`HashTable`](crate::HashTable). Links are
/// deliberately not `Clone`: copying one would forge chain state.
///
/// # Example
///
/// ```
/// use weft_collections::Link;
///
/// struct Order {
///     id: u64,
///     by_id: Link<u32>,
/// }
///
/// let order = Order { id: 7, by_id: Link::new() };
/// assert!(!order.by_id.is_linked());
/// assert_eq!(order.by_id.next(), None);
/// ```
pub struct Link<K: Key = u32> {
    next: K,
    prev: K,
    attached: bool,
}

impl<K: Key> Link<K> {
    /// Creates a detached link.
    #[inline]
    pub const fn new() -> Self {
        Self {
            next: K::NONE,
            prev: K::NONE,
            attached: false,
        }
    }

    /// Returns `true` iff this link is spliced into a chain.
    #[inline]
    pub const fn is_linked(&self) -> bool {
        self.attached
    }

    /// Returns the next element's key, or `None` at the chain boundary
    /// (or when detached).
    #[inline]
    pub fn next(&self) -> Option<K> {
        if self.attached && self.next.is_some() {
            Some(self.next)
        } else {
            None
        }
    }

    /// Returns the previous element's key, or `None` at the chain boundary
    /// (or when detached).
    #[inline]
    pub fn prev(&self) -> Option<K> {
        if self.attached && self.prev.is_some() {
            Some(self.prev)
        } else {
            None
        }
    }

    #[inline]
    pub(crate) fn next_raw(&self) -> K {
        self.next
    }

    #[inline]
    pub(crate) fn prev_raw(&self) -> K {
        self.prev
    }

    #[inline]
    pub(crate) fn set_next(&mut self, key: K) {
        self.next = key;
    }

    #[inline]
    pub(crate) fn set_prev(&mut self, key: K) {
        self.prev = key;
    }

    #[inline]
    pub(crate) fn attach(&mut self, prev: K, next: K) {
        self.prev = prev;
        self.next = next;
        self.attached = true;
    }

    #[inline]
    pub(crate) fn detach(&mut self) {
        self.prev = K::NONE;
        self.next = K::NONE;
        self.attached = false;
    }
}

impl<K: Key> Default for Link<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> core::fmt::Debug for Link<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.attached {
            write!(f, "Link(attached)")
        } else {
            write!(f, "Link(detached)")
        }
    }
}

/// Binds an element type to one of its embedded [`Link`] fields.
///
/// Containers are parametrized by an adapter instead of a byte offset, so
/// one element type can embed several links and belong to several chains at
/// once, each addressed through its own adapter. Adapters are zero-sized
/// and never instantiated; use [`link_fields!`](crate::link_fields) to
/// declare them.
pub trait Adapter {
    /// The element type containing the link field.
    type Elem;

    /// The storage key type shared by every chain over this element type.
    type Key: Key;

    /// Returns the bound link field of an element.
    fn link(elem: &Self::Elem) -> &Link<Self::Key>;

    /// Returns the bound link field of an element, mutably.
    fn link_mut(elem: &mut Self::Elem) -> &mut Link<Self::Key>;
}

/// Implemented by elements so containers can verify that destroying an
/// element leaves no other chain pointing at a vacated storage slot.
///
/// `remove` and `delete_all` assert [`detached`](Node::detached) after
/// unlinking their own membership; an element still linked into another
/// container fails the assertion instead of silently corrupting that
/// container. [`link_fields!`](crate::link_fields) generates the impl from
/// the full set of link fields.
pub trait Node<K: Key = u32> {
    /// Returns `true` when every embedded link of this element is detached.
    fn detached(&self) -> bool;
}

/// Declares the link fields of an element type.
///
/// Generates one [`Adapter`] type per listed field and a [`Node`] impl
/// covering all of them. Every field must be a `Link` with the given key
/// type.
///
/// # Example
///
/// ```
/// use weft_collections::{Link, List, SlotStorage, Storage};
///
/// struct Order {
///     id: u64,
///     by_time: Link<u32>,
///     by_price: Link<u32>,
/// }
///
/// weft_collections::link_fields! {
///     Order: u32 {
///         by_time => OrderByTime,
///         by_price => OrderByPrice,
///     }
/// }
///
/// let mut storage: SlotStorage<Order> = SlotStorage::new();
/// let mut by_time: List<OrderByTime> = List::new();
/// let mut by_price: List<OrderByPrice> = List::new();
///
/// let key = storage.insert(Order {
///     id: 1,
///     by_time: Link::new(),
///     by_price: Link::new(),
/// });
///
/// // Same element, two independent chains
/// by_time.push_back(&mut storage, key);
/// by_price.push_front(&mut storage, key);
/// assert_eq!(by_time.len(), 1);
/// assert_eq!(by_price.len(), 1);
/// ```
#[macro_export]
macro_rules! link_fields {
    ($vis:vis $elem:ty : $key:ty { $($field:ident => $adapter:ident),+ $(,)? }) => {
        $(
            $vis struct $adapter;

            impl $crate::Adapter for $adapter {
                type Elem = $elem;
                type Key = $key;

                #[inline]
                fn link(elem: &Self::Elem) -> &$crate::Link<Self::Key> {
                    &elem.$field
                }

                #[inline]
                fn link_mut(elem: &mut Self::Elem) -> &mut $crate::Link<Self::Key> {
                    &mut elem.$field
                }
            }
        )+

        impl $crate::Node<$key> for $elem {
            #[inline]
            fn detached(&self) -> bool {
                true $(&& !self.$field.is_linked())+
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item {
        #[allow(dead_code)]
        value: u32,
        first: Link<u32>,
        second: Link<u32>,
    }

    crate::link_fields! {
        Item: u32 {
            first => ByFirst,
            second => BySecond,
        }
    }

    fn item(value: u32) -> Item {
        Item {
            value,
            first: Link::new(),
            second: Link::new(),
        }
    }

    #[test]
    fn new_link_is_detached() {
        let link: Link<u32> = Link::new();
        assert!(!link.is_linked());
        assert_eq!(link.next(), None);
        assert_eq!(link.prev(), None);
    }

    #[test]
    fn attach_detach() {
        let mut link: Link<u32> = Link::new();

        link.attach(u32::NONE, 3);
        assert!(link.is_linked());
        assert_eq!(link.next(), Some(3));
        assert_eq!(link.prev(), None); // boundary on the prev side

        link.detach();
        assert!(!link.is_linked());
        assert_eq!(link.next(), None);
    }

    #[test]
    fn adapter_reaches_the_right_field() {
        let mut it = item(9);
        ByFirst::link_mut(&mut it).attach(u32::NONE, u32::NONE);

        assert!(ByFirst::link(&it).is_linked());
        assert!(!BySecond::link(&it).is_linked());
    }

    #[test]
    fn node_detached_covers_all_fields() {
        let mut it = item(9);
        assert!(it.detached());

        BySecond::link_mut(&mut it).attach(u32::NONE, u32::NONE);
        assert!(!it.detached());

        BySecond::link_mut(&mut it).detach();
        assert!(it.detached());
    }
}
