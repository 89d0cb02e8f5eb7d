//! chained-hashmap: a single-threaded hash map built on separate chaining,
//! with load-factor driven growth and bidirectional cursors.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a map whose storage layout is explicit enough that traversal can
//!   be described, and tested, as plain `(bucket, offset)` arithmetic.
//! - Layers:
//!   - Bucket<K, V>: one slot's chain of entries. Each entry keeps the
//!     digest computed at insertion.
//!   - ChainedHashMap<K, V, S>: owns the bucket array, addresses buckets by
//!     `digest % bucket_count`, and doubles the array when an insert brings
//!     the load factor up to its threshold.
//!   - Cursor / CursorMut / Iter / IterMut: walk the bucket array in bucket
//!     order, skipping empty buckets in both directions.
//!
//! Constraints
//! - Single-threaded; no interior mutability.
//! - Unique keys: inserting an existing key overwrites its value.
//! - `bucket_count >= 1` always; the array grows, never shrinks.
//! - O(1) expected lookups, O(bucket length) worst case.
//!
//! Hasher and rehashing invariants
//! - Each entry stores its `u64` digest; rehash relocates entries using the
//!   stored digest, so `K: Hash` is never invoked after insertion.
//! - An entry always lives in bucket `digest % bucket_count` for the current
//!   bucket count. Rehash allocates the new array first, then consumes the
//!   old one, so it never reads storage that is being torn down.
//! - `get_or_default`/`get_or_insert_with` finish any growth before forming
//!   the returned reference, so the reference addresses the final storage.
//!
//! Cursor invalidation
//! - Cursors and iterators borrow the map, so inserts, removals, rehashes and
//!   `clear` cannot happen while one is alive. A detached [`Position`] can
//!   outlive a mutation; dereferencing a stale position through a fresh
//!   cursor is memory-safe but may observe a different entry or none.
//!
//! Notes and non-goals
//! - No persistence, no thread-safety, no duplicate keys.
//! - Retreating from the first entry is a no-op rather than an error.
//! - Growth failure is the only fatal condition: `try_insert` reports it,
//!   the other inserting methods panic.

mod bucket;
pub mod config;
pub mod cursor;
pub mod error;
mod table;
#[cfg(test)]
mod table_proptest;

// Public surface
pub use config::{Builder, Config};
pub use cursor::{Cursor, CursorMut, Iter, IterMut, Position, Traverse};
pub use error::{ConfigError, GrowError};
pub use table::ChainedHashMap;
