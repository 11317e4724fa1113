//! Embedded-link lists and chained hash tables over external storage.
//!
//! The classic intrusive-container pattern, rebuilt on storage keys instead
//! of raw pointers: elements live in a [`Storage`] (a slab-like arena) and
//! carry their chain state in embedded [`Link`] fields, one per container
//! they can belong to. Containers hold only boundary keys and splice through
//! the links, so membership changes never allocate and an element can sit in
//! several lists and a hash table at the same time.
//!
//! # Design Philosophy
//!
//! - **No per-member allocation**: links are plain fields; linking and
//!   unlinking touch at most four neighbors
//! - **Keys, not pointers**: chains store `K::NONE`-sentinel keys into a
//!   [`Storage`], so there is nothing to dangle and no `unsafe` anywhere
//! - **Multiple memberships**: one [`Adapter`] per link field gives each
//!   container its own lane through the same element
//! - **Deterministic cleanup**: nothing unlinks behind your back; `unlink`,
//!   [`unlink_all`](List::unlink_all), and
//!   [`delete_all`](List::delete_all) are the explicit teardown paths, and
//!   destruction asserts via [`Node`] that no other chain still points at
//!   the element
//!
//! # Example
//!
//! ```
//! use weft_collections::{Link, List, SlotStorage, Storage};
//!
//! struct Request {
//!     id: u64,
//!     pending: Link<u32>,
//!     by_client: Link<u32>,
//! }
//!
//! weft_collections::link_fields! {
//!     Request: u32 {
//!         pending => RequestPending,
//!         by_client => RequestByClient,
//!     }
//! }
//!
//! let mut storage: SlotStorage<Request> = SlotStorage::new();
//! let mut pending: List<RequestPending> = List::new();
//! let mut client: List<RequestByClient> = List::new();
//!
//! let key = storage.insert(Request {
//!     id: 1,
//!     pending: Link::new(),
//!     by_client: Link::new(),
//! });
//!
//! // One element, two independent memberships
//! pending.push_back(&mut storage, key);
//! client.push_back(&mut storage, key);
//!
//! pending.unlink(&mut storage, key);
//! assert!(pending.is_empty());
//! assert_eq!(client.len(), 1);
//!
//! // Fully detached elements can be destroyed
//! client.remove(&mut storage, key);
//! assert!(storage.is_empty());
//! ```

#![warn(missing_docs)]

mod hash;
mod key;
mod link;
mod list;
mod storage;

pub use hash::{HashKey, HashTable, Hashed};
pub use key::Key;
pub use link::{Adapter, Link, Node};
pub use list::{Iter, List};
pub use storage::{SlotStorage, Storage};
