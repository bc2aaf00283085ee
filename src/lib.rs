//! safe-collections: lock-guarded map, set and slice containers that can
//! be shared across threads behind a plain `&` reference (or an `Arc`).
//!
//! Internal Design:
//!
//! Summary
//! - Goal: wrap the usual unsynchronized collections so every public
//!   operation is atomic with respect to every other operation on the
//!   same instance.
//! - Containers (independent of each other):
//!   - SafeMap<K, V, S>: `hashbrown::HashMap` behind a `parking_lot::RwLock`.
//!   - SafeSet<T, S>: `hashbrown::HashSet` behind a `parking_lot::RwLock`,
//!     plus union/intersection/difference/symmetric difference and subset
//!     tests.
//!   - SafeSlice<T>: `Vec<T>` behind a `parking_lot::Mutex`, with indexed
//!     access and closure-driven transforms (map, filter, reduce, sort).
//!   - SafeSliceComparable<T>: SafeSlice for `T: PartialEq`, adding
//!     value-based membership, removal and equality.
//!
//! Constraints
//! - One lock per instance. Map and set reads share it; the slice takes it
//!   exclusively for every call so indices are checked against the length
//!   they are applied to.
//! - No guard or reference into the guarded storage ever escapes a call.
//!   Lookups return clones; snapshots (`export`, `values`, `to_vec`,
//!   `keys`, ...) are owned copies the caller may mutate freely.
//! - Out-of-range slice access is absorbed rather than reported: default
//!   value, no-op, or append (see `safe_slice`). `swap` panics instead.
//!
//! Two-instance operations
//! - Set algebra and slice equality need both operands locked at once.
//!   Each instance draws a unique `InstanceId` at construction and the two
//!   locks are always acquired in ascending id order, so `a.union(&b)` and
//!   `b.union(&a)` racing on two threads cannot deadlock. An operation
//!   whose operands are the same instance locks it once.
//!
//! Reentrancy policy
//! - SafeSlice runs caller closures while holding its mutex. A closure
//!   that calls back into the same slice would deadlock; debug builds
//!   detect this with a per-instance holder mark (`reentrancy`) and panic
//!   instead. Release builds carry no tracking cost.
//! - Locks never poison: a panicking closure releases the lock and leaves
//!   the container usable.
//!
//! Notes and non-goals
//! - No sharding, lock-free paths, or fine-grained locking.
//! - No serialization format; `SafeMap::key_value_pairs` produces an
//!   untyped `Box<dyn Any + Send>` sequence that
//!   `SafeMap::from_key_value_pairs` decodes back with type checks.

mod comparable;
mod error;
mod lock_order;
mod reentrancy;
mod safe_map;
mod safe_set;
mod safe_slice;

// Public surface
pub use comparable::SafeSliceComparable;
pub use error::BuildError;
pub use safe_map::SafeMap;
pub use safe_set::SafeSet;
pub use safe_slice::SafeSlice;
