//! Doubly-linked list over embedded links.
//!
//! The list itself stores only its boundary keys and a length. Elements
//! live in user-provided [`Storage`] and carry their own chain state in an
//! embedded [`Link`](crate::Link) field named by the list's
//! [`Adapter`](crate::Adapter). Linking an element therefore never
//! allocates, and one element can belong to several lists at once through
//! different link fields.
//!
//! # Storage Invariant
//!
//! A list must always be used with the same storage instance, and a linked
//! element must only be spliced through the list that linked it. The
//! containers cannot detect violations of either rule.
//!
//! # Example
//!
//! ```
//! use weft_collections::{Link, List, SlotStorage, Storage};
//!
//! struct Job {
//!     id: u64,
//!     queue: Link<u32>,
//! }
//!
//! weft_collections::link_fields! {
//!     Job: u32 { queue => JobQueue }
//! }
//!
//! let mut storage: SlotStorage<Job> = SlotStorage::new();
//! let mut pending: List<JobQueue> = List::new();
//!
//! let a = storage.insert(Job { id: 1, queue: Link::new() });
//! let b = storage.insert(Job { id: 2, queue: Link::new() });
//!
//! pending.push_back(&mut storage, a);
//! pending.push_back(&mut storage, b);
//!
//! assert_eq!(pending.head(), Some(a));
//! assert_eq!(pending.tail(), Some(b));
//!
//! pending.unlink(&mut storage, a);
//! assert_eq!(pending.head(), Some(b));
//! // `a` is still in storage, detached and re-linkable
//! assert_eq!(storage.get(a).map(|j| j.id), Some(1));
//! ```

use crate::{Adapter, Key, Node, Storage};

/// A doubly-linked list over externally stored elements.
///
/// `A` binds the element type and the embedded link field this list
/// splices through; see [`link_fields!`](crate::link_fields).
///
/// Dropping a list does not touch its members: links hold only keys, so
/// nothing can dangle, but members of a dropped list still read as linked
/// until unlinked through a fresh list or re-inserted. Call
/// [`unlink_all`](List::unlink_all) first when the member links matter.
pub struct List<A: Adapter> {
    head: A::Key,
    tail: A::Key,
    len: usize,
}

impl<A: Adapter> Default for List<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Adapter> List<A> {
    /// Creates an empty list.
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: <A::Key as Key>::NONE,
            tail: <A::Key as Key>::NONE,
            len: 0,
        }
    }

    /// Returns the number of elements in the list.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the head element's key, or `None` if empty.
    #[inline]
    pub fn head(&self) -> Option<A::Key> {
        if self.head.is_none() {
            None
        } else {
            Some(self.head)
        }
    }

    /// Returns the tail element's key, or `None` if empty.
    #[inline]
    pub fn tail(&self) -> Option<A::Key> {
        if self.tail.is_none() {
            None
        } else {
            Some(self.tail)
        }
    }

    /// Returns the key of the element after `key`, or `None` at the tail.
    ///
    /// Agrees with the link-level [`Link::next`](crate::Link::next) read
    /// off the element's embedded link.
    #[inline]
    pub fn next<S>(&self, storage: &S, key: A::Key) -> Option<A::Key>
    where
        S: Storage<A::Elem, Key = A::Key>,
    {
        A::link(storage.get(key)?).next()
    }

    /// Returns the key of the element before `key`, or `None` at the head.
    #[inline]
    pub fn prev<S>(&self, storage: &S, key: A::Key) -> Option<A::Key>
    where
        S: Storage<A::Elem, Key = A::Key>,
    {
        A::link(storage.get(key)?).prev()
    }

    /// Links an element at the head of the list.
    ///
    /// Equivalent to `insert_after(storage, key, None)`.
    #[inline]
    pub fn push_front<S>(&mut self, storage: &mut S, key: A::Key)
    where
        S: Storage<A::Elem, Key = A::Key>,
    {
        self.insert_after(storage, key, None);
    }

    /// Links an element at the tail of the list.
    ///
    /// Equivalent to `insert_before(storage, key, None)`.
    #[inline]
    pub fn push_back<S>(&mut self, storage: &mut S, key: A::Key)
    where
        S: Storage<A::Elem, Key = A::Key>,
    {
        self.insert_before(storage, key, None);
    }

    /// Links an element immediately before `before`.
    ///
    /// `before` of `None` designates the list boundary, so this inserts at
    /// the tail. An element already linked into *this* list is relocated.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not in storage, or if `before` names an element
    /// that is missing or not linked.
    pub fn insert_before<S>(&mut self, storage: &mut S, key: A::Key, before: Option<A::Key>)
    where
        S: Storage<A::Elem, Key = A::Key>,
    {
        self.unlink(storage, key);

        let (prev, next) = match before {
            Some(b) => {
                let link = A::link(storage.get(b).expect("invalid 'before' key"));
                assert!(link.is_linked(), "'before' element is not linked");
                (link.prev_raw(), b)
            }
            None => (self.tail, <A::Key as Key>::NONE),
        };

        self.splice(storage, key, prev, next);
    }

    /// Links an element immediately after `after`.
    ///
    /// `after` of `None` designates the list boundary, so this inserts at
    /// the head. An element already linked into *this* list is relocated.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not in storage, or if `after` names an element
    /// that is missing or not linked.
    pub fn insert_after<S>(&mut self, storage: &mut S, key: A::Key, after: Option<A::Key>)
    where
        S: Storage<A::Elem, Key = A::Key>,
    {
        self.unlink(storage, key);

        let (prev, next) = match after {
            Some(a) => {
                let link = A::link(storage.get(a).expect("invalid 'after' key"));
                assert!(link.is_linked(), "'after' element is not linked");
                (a, link.next_raw())
            }
            None => (<A::Key as Key>::NONE, self.head),
        };

        self.splice(storage, key, prev, next);
    }

    // Exactly four neighbor updates: key's own pair plus one on each side
    // (the boundary updates land on self.head/self.tail).
    fn splice<S>(&mut self, storage: &mut S, key: A::Key, prev: A::Key, next: A::Key)
    where
        S: Storage<A::Elem, Key = A::Key>,
    {
        A::link_mut(storage.get_mut(key).expect("invalid key")).attach(prev, next);

        if prev.is_some() {
            A::link_mut(storage.get_mut(prev).expect("chain key missing from storage"))
                .set_next(key);
        } else {
            self.head = key;
        }

        if next.is_some() {
            A::link_mut(storage.get_mut(next).expect("chain key missing from storage"))
                .set_prev(key);
        } else {
            self.tail = key;
        }

        self.len += 1;
    }

    /// Unlinks an element from the list.
    ///
    /// The element stays in storage; only its link is cleared. Returns
    /// `false` if the key is missing from storage or not linked.
    pub fn unlink<S>(&mut self, storage: &mut S, key: A::Key) -> bool
    where
        S: Storage<A::Elem, Key = A::Key>,
    {
        let (prev, next) = {
            let Some(elem) = storage.get(key) else {
                return false;
            };
            let link = A::link(elem);
            if !link.is_linked() {
                return false;
            }
            (link.prev_raw(), link.next_raw())
        };

        if prev.is_some() {
            A::link_mut(storage.get_mut(prev).expect("chain key missing from storage"))
                .set_next(next);
        } else {
            self.head = next;
        }

        if next.is_some() {
            A::link_mut(storage.get_mut(next).expect("chain key missing from storage"))
                .set_prev(prev);
        } else {
            self.tail = prev;
        }

        A::link_mut(storage.get_mut(key).expect("invalid key")).detach();
        self.len -= 1;
        true
    }

    /// Relocates an already-linked element to the tail.
    ///
    /// Links the element if it was not linked. Useful for LRU-style
    /// recency tracking.
    pub fn move_to_back<S>(&mut self, storage: &mut S, key: A::Key)
    where
        S: Storage<A::Elem, Key = A::Key>,
    {
        if self.tail == key {
            return;
        }
        self.push_back(storage, key);
    }

    /// Unlinks every member, leaving the list empty.
    ///
    /// Elements stay in storage, detached and re-linkable.
    pub fn unlink_all<S>(&mut self, storage: &mut S)
    where
        S: Storage<A::Elem, Key = A::Key>,
    {
        let mut key = self.head;
        while key.is_some() {
            let link =
                A::link_mut(storage.get_mut(key).expect("chain key missing from storage"));
            let next = link.next_raw();
            link.detach();
            key = next;
        }

        self.head = <A::Key as Key>::NONE;
        self.tail = <A::Key as Key>::NONE;
        self.len = 0;
    }

    /// Unlinks an element and removes it from storage, dropping it.
    ///
    /// Returns `None` if the key is not in storage.
    ///
    /// # Panics
    ///
    /// Panics if the element is still linked into another chain; removing
    /// it anyway would leave that chain pointing at a vacated slot.
    pub fn remove<S>(&mut self, storage: &mut S, key: A::Key) -> Option<A::Elem>
    where
        A::Elem: Node<A::Key>,
        S: Storage<A::Elem, Key = A::Key>,
    {
        storage.get(key)?;
        self.unlink(storage, key);

        let elem = storage.get(key).expect("element vanished during unlink");
        assert!(
            elem.detached(),
            "element removed while still linked into another chain"
        );
        storage.remove(key)
    }

    /// Removes and drops every member, leaving the list empty.
    ///
    /// # Panics
    ///
    /// Panics if any member is still linked into another chain.
    pub fn delete_all<S>(&mut self, storage: &mut S)
    where
        A::Elem: Node<A::Key>,
        S: Storage<A::Elem, Key = A::Key>,
    {
        while self.head.is_some() {
            let key = self.head;
            self.remove(storage, key);
        }
    }

    /// Returns a forward iterator over `(key, &element)` pairs.
    #[inline]
    pub fn iter<'a, S>(&self, storage: &'a S) -> Iter<'a, A, S>
    where
        S: Storage<A::Elem, Key = A::Key>,
    {
        Iter {
            storage,
            next: self.head,
        }
    }
}

/// Forward iterator over a [`List`], yielding `(key, &element)`.
pub struct Iter<'a, A: Adapter, S> {
    storage: &'a S,
    next: A::Key,
}

impl<'a, A, S> Iterator for Iter<'a, A, S>
where
    A: Adapter,
    A::Elem: 'a,
    S: Storage<A::Elem, Key = A::Key>,
{
    type Item = (A::Key, &'a A::Elem);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_none() {
            return None;
        }
        let key = self.next;
        let elem = self.storage.get(key)?;
        self.next = A::link(elem).next_raw();
        Some((key, elem))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Link, SlotStorage};
    use rand::Rng;

    struct Item {
        value: u32,
        forward: Link<u32>,
        reverse: Link<u32>,
    }

    crate::link_fields! {
        Item: u32 {
            forward => ByForward,
            reverse => ByReverse,
        }
    }

    fn item(value: u32) -> Item {
        Item {
            value,
            forward: Link::new(),
            reverse: Link::new(),
        }
    }

    #[test]
    fn new_list_is_empty() {
        let list: List<ByForward> = List::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert_eq!(list.head(), None);
        assert_eq!(list.tail(), None);
    }

    #[test]
    fn push_back_keeps_insertion_order() {
        let mut storage: SlotStorage<Item> = SlotStorage::new();
        let mut list: List<ByForward> = List::new();

        for value in 0..10 {
            let key = storage.insert(item(value));
            list.push_back(&mut storage, key);
        }

        assert_eq!(list.len(), 10);
        assert_eq!(storage.get(list.head().unwrap()).unwrap().value, 0);
        assert_eq!(storage.get(list.tail().unwrap()).unwrap().value, 9);

        // Forward traversal visits 0..10 in order
        let mut expected = 0;
        let mut cursor = list.head();
        while let Some(key) = cursor {
            assert_eq!(storage.get(key).unwrap().value, expected);
            expected += 1;
            cursor = list.next(&storage, key);
        }
        assert_eq!(expected, 10);

        // Backward traversal visits the exact reverse
        let mut cursor = list.tail();
        while let Some(key) = cursor {
            expected -= 1;
            assert_eq!(storage.get(key).unwrap().value, expected);
            cursor = list.prev(&storage, key);
        }
        assert_eq!(expected, 0);

        list.unlink_all(&mut storage);
        assert!(list.is_empty());
    }

    #[test]
    fn push_front_reverses_order() {
        let mut storage: SlotStorage<Item> = SlotStorage::new();
        let mut list: List<ByForward> = List::new();

        for value in 0..5 {
            let key = storage.insert(item(value));
            list.push_front(&mut storage, key);
        }

        let values: Vec<u32> = list.iter(&storage).map(|(_, it)| it.value).collect();
        assert_eq!(values, [4, 3, 2, 1, 0]);
    }

    #[test]
    fn list_level_matches_link_level() {
        let mut storage: SlotStorage<Item> = SlotStorage::new();
        let mut forward: List<ByForward> = List::new();
        let mut reverse: List<ByReverse> = List::new();

        let mut last: Option<u32> = None;
        for value in 0..10 {
            let key = storage.insert(item(value));
            forward.push_back(&mut storage, key);
            reverse.push_front(&mut storage, key);

            assert_eq!(forward.prev(&storage, key), last);
            assert_eq!(reverse.next(&storage, key), last);
            last = Some(key);
        }

        let mut cursor = forward.head();
        while let Some(key) = cursor {
            let it = storage.get(key).unwrap();
            assert_eq!(it.forward.next(), forward.next(&storage, key));
            assert_eq!(it.forward.prev(), forward.prev(&storage, key));
            assert_eq!(it.reverse.next(), reverse.next(&storage, key));
            assert_eq!(it.reverse.prev(), reverse.prev(&storage, key));
            cursor = forward.next(&storage, key);
        }
    }

    #[test]
    fn insert_before_and_after_middle() {
        let mut storage: SlotStorage<Item> = SlotStorage::new();
        let mut list: List<ByForward> = List::new();

        let a = storage.insert(item(1));
        let c = storage.insert(item(3));
        list.push_back(&mut storage, a);
        list.push_back(&mut storage, c);

        let b = storage.insert(item(2));
        list.insert_before(&mut storage, b, Some(c));

        let d = storage.insert(item(4));
        list.insert_after(&mut storage, d, Some(c));

        let values: Vec<u32> = list.iter(&storage).map(|(_, it)| it.value).collect();
        assert_eq!(values, [1, 2, 3, 4]);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn reinsert_relocates_within_list() {
        let mut storage: SlotStorage<Item> = SlotStorage::new();
        let mut list: List<ByForward> = List::new();

        let a = storage.insert(item(1));
        let b = storage.insert(item(2));
        list.push_back(&mut storage, a);
        list.push_back(&mut storage, b);

        list.push_back(&mut storage, a);

        assert_eq!(list.len(), 2);
        let values: Vec<u32> = list.iter(&storage).map(|(_, it)| it.value).collect();
        assert_eq!(values, [2, 1]);
    }

    #[test]
    fn move_to_back_touches_recency() {
        let mut storage: SlotStorage<Item> = SlotStorage::new();
        let mut list: List<ByForward> = List::new();

        let keys: Vec<u32> = (0..4)
            .map(|v| {
                let key = storage.insert(item(v));
                list.push_back(&mut storage, key);
                key
            })
            .collect();

        list.move_to_back(&mut storage, keys[0]);
        list.move_to_back(&mut storage, keys[0]); // already at the back

        let values: Vec<u32> = list.iter(&storage).map(|(_, it)| it.value).collect();
        assert_eq!(values, [1, 2, 3, 0]);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn unlink_middle_keeps_neighbors() {
        let mut storage: SlotStorage<Item> = SlotStorage::new();
        let mut list: List<ByForward> = List::new();

        let a = storage.insert(item(1));
        let b = storage.insert(item(2));
        let c = storage.insert(item(3));
        list.push_back(&mut storage, a);
        list.push_back(&mut storage, b);
        list.push_back(&mut storage, c);

        assert!(list.unlink(&mut storage, b));
        assert!(!list.unlink(&mut storage, b)); // already detached

        assert_eq!(list.len(), 2);
        assert_eq!(list.next(&storage, a), Some(c));
        assert_eq!(list.prev(&storage, c), Some(a));
        assert!(!storage.get(b).unwrap().forward.is_linked());
    }

    #[test]
    fn unlink_all_leaves_relinkable_elements() {
        let mut storage: SlotStorage<Item> = SlotStorage::new();
        let mut list: List<ByForward> = List::new();

        let keys: Vec<u32> = (0..5)
            .map(|v| {
                let key = storage.insert(item(v));
                list.push_back(&mut storage, key);
                key
            })
            .collect();

        list.unlink_all(&mut storage);
        assert!(list.is_empty());

        for &key in &keys {
            assert!(!storage.get(key).unwrap().forward.is_linked());
            list.push_back(&mut storage, key);
        }
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn remove_drops_the_element() {
        let mut storage: SlotStorage<Item> = SlotStorage::new();
        let mut list: List<ByForward> = List::new();

        let a = storage.insert(item(1));
        let b = storage.insert(item(2));
        list.push_back(&mut storage, a);
        list.push_back(&mut storage, b);

        let removed = list.remove(&mut storage, a).unwrap();
        assert_eq!(removed.value, 1);
        assert_eq!(list.len(), 1);
        assert!(storage.get(a).is_none());
        assert!(list.remove(&mut storage, a).is_none());
    }

    #[test]
    #[should_panic(expected = "still linked into another chain")]
    fn remove_while_linked_elsewhere_panics() {
        let mut storage: SlotStorage<Item> = SlotStorage::new();
        let mut forward: List<ByForward> = List::new();
        let mut reverse: List<ByReverse> = List::new();

        let key = storage.insert(item(1));
        forward.push_back(&mut storage, key);
        reverse.push_back(&mut storage, key);

        forward.remove(&mut storage, key);
    }

    #[test]
    fn delete_all_drops_every_member() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        static DROPS: AtomicUsize = AtomicUsize::new(0);

        struct Counted {
            link: Link<u32>,
        }
        impl Drop for Counted {
            fn drop(&mut self) {
                DROPS.fetch_add(1, Ordering::SeqCst);
            }
        }

        crate::link_fields! {
            Counted: u32 { link => ByLink }
        }

        DROPS.store(0, Ordering::SeqCst);

        let mut storage: SlotStorage<Counted> = SlotStorage::new();
        let mut list: List<ByLink> = List::new();
        for _ in 0..7 {
            let key = storage.insert(Counted { link: Link::new() });
            list.push_back(&mut storage, key);
        }

        list.delete_all(&mut storage);
        assert!(list.is_empty());
        assert!(storage.is_empty());
        assert_eq!(DROPS.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn randomized_sorted_insertion() {
        let mut rng = rand::thread_rng();

        for _ in 0..200 {
            let mut storage: SlotStorage<Item> = SlotStorage::new();
            let mut ascending: List<ByForward> = List::new();
            let mut descending: List<ByReverse> = List::new();

            for _ in 0..20 {
                let key = storage.insert(item(rng.gen_range(0..1000)));

                // Scan from the head for the first element not less than
                // the new one
                let mut before = ascending.head();
                while let Some(b) = before {
                    if storage.get(b).unwrap().value >= storage.get(key).unwrap().value {
                        break;
                    }
                    before = ascending.next(&storage, b);
                }
                ascending.insert_before(&mut storage, key, before);

                // Mirror scan from the tail
                let mut after = descending.tail();
                while let Some(a) = after {
                    if storage.get(a).unwrap().value >= storage.get(key).unwrap().value {
                        break;
                    }
                    after = descending.prev(&storage, a);
                }
                descending.insert_after(&mut storage, key, after);
            }

            let mut cursor = ascending.head();
            while let Some(key) = cursor {
                if let Some(next) = ascending.next(&storage, key) {
                    assert!(
                        storage.get(key).unwrap().value <= storage.get(next).unwrap().value
                    );
                }
                cursor = ascending.next(&storage, key);
            }

            let mut cursor = descending.head();
            while let Some(key) = cursor {
                if let Some(next) = descending.next(&storage, key) {
                    assert!(
                        storage.get(key).unwrap().value >= storage.get(next).unwrap().value
                    );
                }
                cursor = descending.next(&storage, key);
            }

            descending.unlink_all(&mut storage);
            ascending.delete_all(&mut storage);
            assert!(ascending.is_empty());
            assert!(storage.is_empty());
        }
    }

    #[test]
    fn iter_yields_keys_and_elements() {
        let mut storage: SlotStorage<Item> = SlotStorage::new();
        let mut list: List<ByForward> = List::new();

        let mut keys = Vec::new();
        for value in 0..4 {
            let key = storage.insert(item(value));
            list.push_back(&mut storage, key);
            keys.push(key);
        }

        let seen: Vec<u32> = list.iter(&storage).map(|(key, _)| key).collect();
        assert_eq!(seen, keys);
    }
}
