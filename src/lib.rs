//! spliced: hand-rolled containers built around a splice-friendly shared
//! list.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: classic containers implemented from first principles in safe
//!   Rust, with the hash map as the centerpiece: a chained map whose chains
//!   all live in one shared doubly-linked list, so resize relocates entries
//!   by relinking instead of reallocating.
//! - Layers:
//!   - dlist: an arena-backed doubly-linked list. Nodes live in a slotmap;
//!     links are generation-checked keys, so a stale position fails the
//!     generation check instead of aliasing a reused slot. The crate-internal
//!     `Chain` core takes its arena as a parameter, letting two chains share
//!     one arena and move nodes between each other by splice.
//!   - hash_map: `ChainedHashMap<K, V, S>` composes one shared chain with a
//!     bucket array of `(head, count)` pairs. Each bucket's entries form one
//!     contiguous run of the chain; lookups walk at most `count` nodes.
//!     Growth and shrink rebuild the bucket array and splice every node into
//!     place; no entry is dropped, reallocated, or copied, and positions
//!     survive the resize.
//!   - ordered_set, heap, trie: a parent-linked binary search tree, a
//!     vector-backed binary min-heap, and a character trie round out the
//!     collection.
//!
//! Constraints
//! - Single-threaded: the hash map is `!Send`/`!Sync` by design (no
//!   atomics); one logical owner performs all mutations.
//! - The map calls user code only via `K: Hash + Eq` while probing; a
//!   debug-only reentrancy check panics on nested entry during that window
//!   and compiles away in release builds.
//! - Each map entry stores its hash at insert; rehashing uses the stored
//!   hash, so `K: Hash` never runs during a resize.
//! - Insert is insert-if-absent: an existing key keeps its value. Positions
//!   obtained from `find`/`insert` stay valid until their entry is erased.
//!
//! Notes and non-goals
//! - No persistence, no custom allocators, no thread-safety layer.
//! - Bucket runs grow only by prepending at the recorded head; that is what
//!   keeps each run contiguous, so no append-to-bucket path exists.

mod guard;

pub mod dlist;
pub mod hash_map;
mod hash_map_proptest;
pub mod heap;
pub mod ordered_set;
pub mod trie;

// Public surface
pub use dlist::{DList, Pos};
pub use hash_map::ChainedHashMap;
pub use heap::Heap;
pub use ordered_set::OrderedSet;
pub use trie::Trie;
