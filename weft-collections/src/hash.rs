//! Fixed-row chained hash table over embedded links.
//!
//! The table is an array of row chains fixed at construction time. Each
//! element chains into exactly one row through the embedded link named by
//! the table's [`Adapter`](crate::Adapter), so adding and unlinking never
//! allocate and an element can sit in a hash table and any number of lists
//! at once through separate link fields.
//!
//! Rows are ordered newest-first: [`add`](HashTable::add) links at the row
//! head, so [`find`](HashTable::find) returns the most recently added match
//! and [`find_next`](HashTable::find_next) walks duplicates from newest to
//! oldest.
//!
//! # Hash Stability
//!
//! Row placement comes from [`Hashed::hash_value`]. The table recomputes it
//! to locate an element's row when unlinking, so mutating an element's
//! hashed fields while it is linked is a logic error the table cannot
//! detect.
//!
//! # Example
//!
//! ```
//! use weft_collections::{HashKey, HashTable, Hashed, Link, SlotStorage, Storage};
//!
//! struct Session {
//!     id: u64,
//!     by_id: Link<u32>,
//! }
//!
//! weft_collections::link_fields! {
//!     Session: u32 { by_id => SessionById }
//! }
//!
//! impl Hashed for Session {
//!     fn hash_value(&self) -> u64 {
//!         self.id
//!     }
//! }
//!
//! struct ById(u64);
//!
//! impl HashKey<Session> for ById {
//!     fn hash_value(&self) -> u64 {
//!         self.0
//!     }
//!     fn matches(&self, session: &Session) -> bool {
//!         session.id == self.0
//!     }
//! }
//!
//! let mut storage: SlotStorage<Session> = SlotStorage::new();
//! let mut table: HashTable<SessionById> = HashTable::with_rows(32);
//!
//! let key = storage.insert(Session { id: 7, by_id: Link::new() });
//! table.add(&mut storage, key);
//!
//! assert_eq!(table.find(&storage, &ById(7)), Some(key));
//! assert_eq!(table.find(&storage, &ById(8)), None);
//! ```

use crate::{Adapter, Key, Node, Storage};

/// Provides the hash that places an element into a table row.
///
/// The value must stay stable while the element is linked into a
/// [`HashTable`]; see the module docs.
pub trait Hashed {
    /// Returns the element's hash value.
    fn hash_value(&self) -> u64;
}

/// A lookup query against a [`HashTable`].
///
/// Bundles the hash that selects the row with the equality check that
/// walks it. Implement it on lightweight probe types so lookups never
/// construct a full element.
pub trait HashKey<T> {
    /// Returns the hash of the key being searched for.
    ///
    /// Must agree with [`Hashed::hash_value`] of every element this query
    /// [`matches`](HashKey::matches), or the walk looks in the wrong row.
    fn hash_value(&self) -> u64;

    /// Returns `true` if `elem` is a match for this query.
    fn matches(&self, elem: &T) -> bool;
}

#[derive(Clone, Copy)]
struct Row<K: Key> {
    head: K,
    tail: K,
}

impl<K: Key> Row<K> {
    const EMPTY: Self = Self {
        head: K::NONE,
        tail: K::NONE,
    };
}

/// A chained hash table with a fixed number of rows.
///
/// `A` binds the element type and the embedded link field the rows chain
/// through; see [`link_fields!`](crate::link_fields).
///
/// Dropping a table does not touch its members, same as
/// [`List`](crate::List); call [`unlink_all`](HashTable::unlink_all) first
/// when the member links matter.
pub struct HashTable<A: Adapter> {
    rows: Box<[Row<A::Key>]>,
    len: usize,
}

impl<A: Adapter> HashTable<A> {
    /// Creates a table with `rows` row chains.
    ///
    /// # Panics
    ///
    /// Panics if `rows` is zero; a zero-row table could never hold an
    /// element.
    pub fn with_rows(rows: usize) -> Self {
        assert!(rows > 0, "hash table must have at least one row");
        Self {
            rows: vec![Row::EMPTY; rows].into_boxed_slice(),
            len: 0,
        }
    }

    /// Returns the number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of linked elements.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no elements are linked.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` by walking every row header, not the length counter.
    ///
    /// Exists as an independent emptiness witness for integrity checks;
    /// O(rows).
    pub fn all_rows_empty(&self) -> bool {
        self.rows.iter().all(|row| row.head.is_none())
    }

    #[inline]
    fn row_of(&self, hash: u64) -> usize {
        (hash % self.rows.len() as u64) as usize
    }

    /// Links an element into the row selected by its own hash.
    ///
    /// The element goes at the row head, so it shadows older elements with
    /// the same key in [`find`](HashTable::find). An element already linked
    /// into this table is relocated.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not in storage.
    pub fn add<S>(&mut self, storage: &mut S, key: A::Key)
    where
        A::Elem: Hashed,
        S: Storage<A::Elem, Key = A::Key>,
    {
        let hash = storage.get(key).expect("invalid key").hash_value();
        self.add_hashed(storage, key, hash);
    }

    /// Links an element using a precomputed hash.
    ///
    /// Saves rehashing when the caller already holds the hash, e.g. after a
    /// failed [`find`](HashTable::find) with the same key. `hash` must
    /// equal the element's [`hash_value`](Hashed::hash_value).
    ///
    /// # Panics
    ///
    /// Panics if `key` is not in storage.
    pub fn add_hashed<S>(&mut self, storage: &mut S, key: A::Key, hash: u64)
    where
        A::Elem: Hashed,
        S: Storage<A::Elem, Key = A::Key>,
    {
        self.unlink(storage, key);

        let row = self.row_of(hash);
        let old_head = self.rows[row].head;

        A::link_mut(storage.get_mut(key).expect("invalid key"))
            .attach(<A::Key as Key>::NONE, old_head);

        if old_head.is_some() {
            A::link_mut(storage.get_mut(old_head).expect("chain key missing from storage"))
                .set_prev(key);
        } else {
            self.rows[row].tail = key;
        }
        self.rows[row].head = key;
        self.len += 1;
    }

    /// Returns the newest element matching `query`, if any.
    pub fn find<S, Q>(&self, storage: &S, query: &Q) -> Option<A::Key>
    where
        Q: HashKey<A::Elem>,
        S: Storage<A::Elem, Key = A::Key>,
    {
        let row = self.row_of(query.hash_value());
        let mut key = self.rows[row].head;
        while key.is_some() {
            let elem = storage.get(key).expect("chain key missing from storage");
            if query.matches(elem) {
                return Some(key);
            }
            key = A::link(elem).next_raw();
        }
        None
    }

    /// Returns the next element after `after` matching `query`, if any.
    ///
    /// Continues a walk started by [`find`](HashTable::find), so duplicates
    /// come back newest to oldest. `after` must be linked in this table.
    ///
    /// # Panics
    ///
    /// Panics if `after` is not in storage.
    pub fn find_next<S, Q>(&self, storage: &S, query: &Q, after: A::Key) -> Option<A::Key>
    where
        Q: HashKey<A::Elem>,
        S: Storage<A::Elem, Key = A::Key>,
    {
        let mut key = A::link(storage.get(after).expect("invalid key")).next_raw();
        while key.is_some() {
            let elem = storage.get(key).expect("chain key missing from storage");
            if query.matches(elem) {
                return Some(key);
            }
            key = A::link(elem).next_raw();
        }
        None
    }

    /// Unlinks an element from its row.
    ///
    /// The element stays in storage; only its link is cleared. Returns
    /// `false` if the key is missing from storage or not linked.
    pub fn unlink<S>(&mut self, storage: &mut S, key: A::Key) -> bool
    where
        A::Elem: Hashed,
        S: Storage<A::Elem, Key = A::Key>,
    {
        let (prev, next, row) = {
            let Some(elem) = storage.get(key) else {
                return false;
            };
            let link = A::link(elem);
            if !link.is_linked() {
                return false;
            }
            (
                link.prev_raw(),
                link.next_raw(),
                self.row_of(elem.hash_value()),
            )
        };

        if prev.is_some() {
            A::link_mut(storage.get_mut(prev).expect("chain key missing from storage"))
                .set_next(next);
        } else {
            self.rows[row].head = next;
        }

        if next.is_some() {
            A::link_mut(storage.get_mut(next).expect("chain key missing from storage"))
                .set_prev(prev);
        } else {
            self.rows[row].tail = prev;
        }

        A::link_mut(storage.get_mut(key).expect("invalid key")).detach();
        self.len -= 1;
        true
    }

    /// Unlinks every member, leaving the table empty.
    ///
    /// Elements stay in storage, detached and re-linkable.
    pub fn unlink_all<S>(&mut self, storage: &mut S)
    where
        S: Storage<A::Elem, Key = A::Key>,
    {
        for row in self.rows.iter_mut() {
            let mut key = row.head;
            while key.is_some() {
                let link =
                    A::link_mut(storage.get_mut(key).expect("chain key missing from storage"));
                let next = link.next_raw();
                link.detach();
                key = next;
            }
            *row = Row::EMPTY;
        }
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
        A::Elem: Hashed + Node<A::Key>,
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

    /// Removes and drops every member, leaving the table empty.
    ///
    /// # Panics
    ///
    /// Panics if any member is still linked into another chain.
    pub fn delete_all<S>(&mut self, storage: &mut S)
    where
        A::Elem: Hashed + Node<A::Key>,
        S: Storage<A::Elem, Key = A::Key>,
    {
        for row_index in 0..self.rows.len() {
            while self.rows[row_index].head.is_some() {
                let key = self.rows[row_index].head;
                self.remove(storage, key);
            }
        }
    }
}
