//! chained-hashmap: a hash table using separate chaining, with map-like
//! operations and automatic load-factor growth.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small associative container whose collision handling is fully
//!   explicit, built in safe, verifiable layers.
//! - Layers:
//!   - ChainedHashMap<K, V, S>: the table itself. An array of bucket slots,
//!     each owning the head of a singly linked chain of boxed entries; the
//!     full map operation set (lookup, insert, conditional remove/replace,
//!     snapshot views) lives here.
//!   - ChainedHashSet<T, S>: membership-only wrapper storing unit values in
//!     a ChainedHashMap.
//!   - scans: free functions consuming the containers through their public
//!     surface only (averaging over shared keys, odd-key filtering, pair
//!     counting at a fixed difference).
//!
//! Ownership
//! - Every chain node is owned by exactly one predecessor, or by its bucket
//!   slot if it is the chain head; `next` is `Option<Box<Node>>`, never
//!   shared. Removal relinks the predecessor around the node; teardown
//!   unlinks iteratively so chain length never becomes recursion depth.
//!
//! Growth
//! - Buckets start at 10. When an insertion lifts entries/buckets above
//!   0.7, the array doubles and every node is relinked against the new
//!   count before the insertion returns. Each node caches its `u64` hash at
//!   insertion, so relinking never re-invokes `K: Hash` and cannot nest
//!   another growth. Capacity never shrinks; `clear` alone resets it to the
//!   initial 10.
//!
//! Absence semantics
//! - "Key absent" is `Option::None` at every lookup-shaped operation, and
//!   values are plain `V` with no nullable sentinel, so a stored value can
//!   never be mistaken for a missing mapping. Absence is an expected
//!   outcome, not an error; nothing in the crate panics on it.
//!
//! Hashing
//! - Pluggable `S: BuildHasher`, defaulting to `RandomState`. Lookups
//!   accept borrowed keys via `K: Borrow<Q>`. Hash quality is the caller's
//!   contract; a degenerate hasher degrades chains to linear scans but
//!   breaks no invariant.
//!
//! Notes and non-goals
//! - Single-threaded: no internal locking. Concurrent mutation requires an
//!   external exclusive lock around the whole table, since chain relinking
//!   is not atomic with respect to readers.
//! - `keys()`/`entries()` are materialized snapshots, not live views;
//!   mutating the table afterwards does not affect them.
//! - No incremental rehashing, no persistence, no capacity hints.

pub mod chained_hash_map;
mod chained_hash_map_proptest;
pub mod chained_hash_set;
pub mod scans;

// Public surface
pub use chained_hash_map::ChainedHashMap;
pub use chained_hash_set::ChainedHashSet;
pub use scans::{average_of_present, count_pairs_with_diff, values_with_odd_keys};
