//! ChainedHashMap: a chained hash map over one shared node list.
//!
//! Instead of a vector of per-bucket lists, every entry lives in a single
//! arena-backed chain ([`crate::dlist`]) and each bucket records only a
//! `(head, count)` pair into it. A bucket's entries always form one
//! contiguous run of the chain: inserts and rehash placement both prepend at
//! the bucket's recorded head, so the old head stays the new node's successor
//! and keeps bounding the same run. Resize relocates nodes by splicing them
//! into a fresh chain over the same arena — no node is freed, reallocated, or
//! copied, and positions handed out earlier keep naming the same entries.

use crate::dlist::{Chain, Node, Pos, Slots};
use crate::guard::ReentryCheck;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use slotmap::SlotMap;
use std::collections::hash_map::RandomState;

/// Capacities never shrink below this many buckets.
pub const MIN_CAPACITY: usize = 37;

/// Load factor used by the convenience constructors.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

struct Entry<K, V> {
    hash: u64,
    key: K,
    value: V,
}

/// Weak view into the shared chain: the head of this bucket's contiguous run
/// and the number of nodes in it. Owns no nodes.
#[derive(Copy, Clone, Debug)]
struct Bucket {
    head: Pos,
    count: usize,
}

impl Bucket {
    const EMPTY: Bucket = Bucket {
        head: Pos::end(),
        count: 0,
    };
}

/// Grown capacity: `c + c/2 + c/4`, rounded up to the nearest odd value. Odd
/// capacities keep `hash % capacity` from clustering on stride-heavy key
/// distributions. Returns the input unchanged when the arithmetic would
/// overflow; the caller then skips the resize.
fn next_capacity(capacity: usize) -> usize {
    match capacity
        .checked_add(capacity >> 1)
        .and_then(|c| c.checked_add(capacity >> 2))
    {
        Some(grown) => grown | 1,
        None => capacity,
    }
}

/// A hash map with set-like insert (insert-if-absent) and position-stable
/// entries.
///
/// Lookups hash the key, read the bucket's `(head, count)` pair, and walk at
/// most `count` nodes of the shared chain. Growth triggers when the entry
/// count exceeds `floor(load_factor * capacity)`; shrink triggers below a
/// fifth of that. Both relocate entries by splice, so a [`Pos`] obtained from
/// [`find`](Self::find) or [`insert`](Self::insert) survives resize and is
/// invalidated only by the erasure of its own entry.
pub struct ChainedHashMap<K, V, S = RandomState> {
    hasher: S,
    slots: Slots<Entry<K, V>>,
    list: Chain,
    buckets: Vec<Bucket>,
    load_factor: f32,
    grow_at: usize,
    shrink_at: usize,
    guard: ReentryCheck,
}

impl<K, V> ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    /// An empty map with capacity [`MIN_CAPACITY`] and load factor
    /// [`DEFAULT_LOAD_FACTOR`].
    pub fn new() -> Self {
        Self::with_capacity_and_load_factor(MIN_CAPACITY, DEFAULT_LOAD_FACTOR)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_load_factor(capacity, DEFAULT_LOAD_FACTOR)
    }

    /// Panics if `capacity` is zero or `load_factor` lies outside the open
    /// interval (0, 1).
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f32) -> Self {
        Self::build(capacity, load_factor, RandomState::new())
    }
}

impl<K, V> Default for ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::build(MIN_CAPACITY, DEFAULT_LOAD_FACTOR, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self::build(capacity, DEFAULT_LOAD_FACTOR, hasher)
    }

    fn build(capacity: usize, load_factor: f32, hasher: S) -> Self {
        assert!(capacity > 0, "capacity must be nonzero");
        assert!(
            0.0 < load_factor && load_factor < 1.0,
            "load factor must lie in the open interval (0, 1)"
        );
        let mut table = ChainedHashMap {
            hasher,
            slots: SlotMap::with_key(),
            list: Chain::new(),
            buckets: vec![Bucket::EMPTY; capacity],
            load_factor,
            grow_at: 0,
            shrink_at: 0,
            guard: ReentryCheck::new(),
        };
        table.update_thresholds();
        table
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.len() == 0
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    fn hash_of<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn bucket_index(hash: u64, capacity: usize) -> usize {
        (hash % capacity as u64) as usize
    }

    /// Walk at most `count` nodes of the bucket's run. Nodes past the run
    /// belong to other buckets and are never inspected.
    fn find_in_bucket<Q>(&self, idx: usize, q: &Q) -> Option<Pos>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let bucket = &self.buckets[idx];
        let mut pos = bucket.head;
        for _ in 0..bucket.count {
            let node = &self.slots[pos.key()];
            if node.value.key.borrow() == q {
                return Some(pos);
            }
            pos = Pos::from_raw(node.next);
        }
        None
    }

    /// Position of the entry for `q`, if present. Never mutates.
    pub fn find<Q>(&self, q: &Q) -> Option<Pos>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _entered = self.guard.enter();
        let hash = self.hash_of(q);
        self.find_in_bucket(Self::bucket_index(hash, self.buckets.len()), q)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let pos = self.find(q)?;
        self.slots.get(pos.key()).map(|n| &n.value.value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let pos = self.find(q)?;
        self.slots.get_mut(pos.key()).map(|n| &mut n.value.value)
    }

    /// Key at `pos`; `None` for the end sentinel or a stale position.
    pub fn key_at(&self, pos: Pos) -> Option<&K> {
        self.slots.get(pos.raw()?).map(|n| &n.value.key)
    }

    pub fn value_at(&self, pos: Pos) -> Option<&V> {
        self.slots.get(pos.raw()?).map(|n| &n.value.value)
    }

    pub fn value_at_mut(&mut self, pos: Pos) -> Option<&mut V> {
        self.slots.get_mut(pos.raw()?).map(|n| &mut n.value.value)
    }

    pub fn entry_at(&self, pos: Pos) -> Option<(&K, &V)> {
        self.slots
            .get(pos.raw()?)
            .map(|n| (&n.value.key, &n.value.value))
    }

    /// Insert-if-absent. An existing key is left untouched (its value is not
    /// overwritten) and returned with `false`; otherwise the new entry's
    /// position is returned with `true`. Triggers at most one resize.
    pub fn insert(&mut self, key: K, value: V) -> (Pos, bool) {
        // User code (Hash, Eq) runs only while probing; guard that window.
        let entered = self.guard.enter();
        let hash = self.hash_of(&key);
        let idx = Self::bucket_index(hash, self.buckets.len());
        if let Some(existing) = self.find_in_bucket(idx, &key) {
            return (existing, false);
        }
        drop(entered);
        // Prepend at the bucket's recorded head: the old head becomes the new
        // node's successor, so the run stays contiguous and count-bounded.
        let head = self.buckets[idx].head;
        let pos = self
            .list
            .insert_before(&mut self.slots, head, Entry { hash, key, value });
        let bucket = &mut self.buckets[idx];
        bucket.head = pos;
        bucket.count += 1;
        if self.list.len() > self.grow_at {
            self.reserve_inner(next_capacity(self.buckets.len()));
        }
        (pos, true)
    }

    /// Remove the entry for `q`. Returns whether an entry was removed.
    /// Triggers at most one resize.
    pub fn erase<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let entered = self.guard.enter();
        let hash = self.hash_of(q);
        let idx = Self::bucket_index(hash, self.buckets.len());
        let Some(pos) = self.find_in_bucket(idx, q) else {
            return false;
        };
        drop(entered);
        // The run's next head must be read while the node is still linked.
        let successor = self.list.next(&self.slots, pos);
        let bucket = &mut self.buckets[idx];
        bucket.count -= 1;
        if bucket.count == 0 {
            bucket.head = Pos::end();
        } else if bucket.head == pos {
            bucket.head = successor;
        }
        self.list.erase(&mut self.slots, pos);
        if self.list.len() < self.shrink_at {
            self.rehash(next_capacity(self.list.len() + 1));
        }
        true
    }

    /// Grow to at least `n` buckets; smaller or equal requests are no-ops.
    pub fn reserve(&mut self, n: usize) {
        drop(self.guard.enter());
        self.reserve_inner(n);
    }

    fn reserve_inner(&mut self, n: usize) {
        if n > self.buckets.len() {
            self.rehash(n);
        }
    }

    /// Dispose every entry and reset every bucket. Capacity is kept.
    pub fn clear(&mut self) {
        let _entered = self.guard.enter();
        if self.list.len() == 0 {
            return;
        }
        self.slots.clear();
        self.list.reset();
        for bucket in &mut self.buckets {
            *bucket = Bucket::EMPTY;
        }
    }

    /// Iterate every live entry exactly once, in chain order: contiguous per
    /// bucket, otherwise unspecified.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            cur: self.list.head_pos(),
            remaining: self.list.len(),
        }
    }

    fn update_thresholds(&mut self) {
        let limit = self.load_factor * self.buckets.len() as f32;
        self.grow_at = limit as usize;
        self.shrink_at = (limit / 5.0) as usize;
    }

    /// Relocate every entry into a fresh bucket array and a fresh chain over
    /// the same arena. Entries are moved by splice using their stored hash;
    /// `K: Hash` never runs here, and no node is disposed or reallocated.
    fn rehash(&mut self, new_capacity: usize) {
        let new_capacity = new_capacity.max(MIN_CAPACITY);
        if new_capacity == self.buckets.len() || self.list.len() == 0 {
            return;
        }
        let mut fresh_buckets = vec![Bucket::EMPTY; new_capacity];
        let mut fresh_list = Chain::new();
        let mut pos = self.list.head_pos();
        while !pos.is_end() {
            // The splice rewrites this node's links; capture the successor
            // while forward traversal is still meaningful.
            let next = self.list.next(&self.slots, pos);
            let idx = Self::bucket_index(self.slots[pos.key()].value.hash, new_capacity);
            let bucket = &mut fresh_buckets[idx];
            bucket.head = fresh_list.splice(&mut self.slots, bucket.head, &mut self.list, pos);
            bucket.count += 1;
            pos = next;
        }
        // The displaced chain is empty by now; install the fresh pair.
        self.buckets = fresh_buckets;
        self.list = fresh_list;
        self.update_thresholds();
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let mut total = 0usize;
        let mut seen = std::collections::HashSet::new();
        for (idx, bucket) in self.buckets.iter().enumerate() {
            assert_eq!(
                bucket.count == 0,
                bucket.head.is_end(),
                "empty bucket iff end head"
            );
            let mut pos = bucket.head;
            for _ in 0..bucket.count {
                let key = pos.key();
                assert!(seen.insert(key), "bucket runs overlap");
                let node = &self.slots[key];
                assert_eq!(
                    Self::bucket_index(node.value.hash, self.buckets.len()),
                    idx,
                    "entry filed under the wrong bucket"
                );
                pos = Pos::from_raw(node.next);
            }
            total += bucket.count;
        }
        assert_eq!(total, self.list.len(), "bucket counts must sum to len");
        assert_eq!(seen.len(), self.slots.len(), "runs must cover every node");
    }
}

/// Iterator over a [`ChainedHashMap`] in chain order.
pub struct Iter<'a, K, V> {
    slots: &'a Slots<Entry<K, V>>,
    cur: Pos,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node: &Node<Entry<K, V>> = &self.slots[self.cur.key()];
        self.cur = Pos::from_raw(node.next);
        self.remaining -= 1;
        Some((&node.value.key, &node.value.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use core::hash::Hasher;
    use std::collections::BTreeSet;

    /// Forces every key into bucket 0; exercises count-bounded probing.
    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        }
    }

    #[test]
    fn find_on_empty_map() {
        let m: ChainedHashMap<i32, i32> = ChainedHashMap::new();
        assert_eq!(m.find(&1), None);
        assert_eq!(m.len(), 0);
        assert_eq!(m.capacity(), MIN_CAPACITY);
        m.check_invariants();
    }

    /// Invariant: duplicate insert reports `false`, keeps the first value,
    /// and returns the existing entry's position.
    #[test]
    fn insert_if_absent_keeps_first_value() {
        let mut m = ChainedHashMap::new();
        let (p1, inserted) = m.insert("dup".to_string(), 1);
        assert!(inserted);
        let (p2, inserted) = m.insert("dup".to_string(), 2);
        assert!(!inserted);
        assert_eq!(p1, p2);
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("dup"), Some(&1));
        m.check_invariants();
    }

    #[test]
    fn find_contains_parity() {
        let mut m = ChainedHashMap::new();
        for (i, k) in ["a", "b", "c"].iter().enumerate() {
            m.insert((*k).to_string(), i as i32);
        }
        for k in ["a", "b", "c"] {
            assert!(m.find(k).is_some());
            assert!(m.contains_key(k));
        }
        for k in ["x", "y", "z"] {
            assert!(m.find(k).is_none());
            assert!(!m.contains_key(k));
        }
    }

    /// Invariant: borrowed lookup works (store `String`, query with `&str`).
    #[test]
    fn borrowed_lookup_with_str() {
        let mut m = ChainedHashMap::new();
        m.insert("hello".to_string(), 1);
        assert!(m.contains_key("hello"));
        assert!(!m.contains_key("world"));
        assert!(m.erase("hello"));
        assert!(!m.erase("hello"));
    }

    #[test]
    fn position_accessors_and_staleness() {
        let mut m = ChainedHashMap::new();
        let (p, _) = m.insert("k1".to_string(), 10);
        assert_eq!(m.key_at(p), Some(&"k1".to_string()));
        assert_eq!(m.value_at(p), Some(&10));
        assert_eq!(m.entry_at(p), Some((&"k1".to_string(), &10)));
        *m.value_at_mut(p).unwrap() += 5;
        assert_eq!(m.value_at(p), Some(&15));

        assert!(m.erase("k1"));
        // The position is stale now and must not resolve, even after the
        // slot is reused by a later insert.
        assert_eq!(m.value_at(p), None);
        let (p2, _) = m.insert("k2".to_string(), 20);
        assert_ne!(p, p2);
        assert_eq!(m.value_at(p), None);
        assert_eq!(m.value_at(Pos::end()), None);
    }

    #[test]
    fn get_mut_updates_entry() {
        let mut m = ChainedHashMap::new();
        m.insert("k".to_string(), 1);
        *m.get_mut("k").unwrap() = 7;
        assert_eq!(m.get("k"), Some(&7));
    }

    /// All keys land in one bucket; equality must resolve lookups, and
    /// erasing the run's head, middle, and tail must keep the bookkeeping
    /// consistent.
    #[test]
    fn collision_bucket_bookkeeping() {
        let mut m: ChainedHashMap<i32, i32, ConstBuildHasher> =
            ChainedHashMap::with_hasher(ConstBuildHasher);
        for k in 0..5 {
            m.insert(k, k * 10);
        }
        m.check_invariants();
        for k in 0..5 {
            assert_eq!(m.get(&k), Some(&(k * 10)));
        }

        // Head of the run is the most recently inserted key (4).
        assert!(m.erase(&4));
        m.check_invariants();
        // Middle.
        assert!(m.erase(&2));
        m.check_invariants();
        // Tail (oldest).
        assert!(m.erase(&0));
        m.check_invariants();
        for k in [1, 3] {
            assert_eq!(m.get(&k), Some(&(k * 10)));
        }
        assert_eq!(m.len(), 2);
        assert!(m.erase(&1));
        assert!(m.erase(&3));
        m.check_invariants();
        assert!(m.is_empty());
        assert_eq!(m.find(&1), None);
    }

    /// Scenario from the design: capacity 37, load factor 0.75, so growth
    /// triggers when the 28th entry exceeds `grow_at = 27`. The new capacity
    /// follows c + c/2 + c/4 rounded to odd: 65.
    #[test]
    fn grow_scenario_capacity_37() {
        let mut m = ChainedHashMap::with_capacity_and_load_factor(37, 0.75);
        for k in 0..27i64 {
            m.insert(k, k);
            assert_eq!(m.capacity(), 37);
        }
        m.insert(27, 27);
        assert_eq!(m.capacity(), 65);
        assert_eq!(m.len(), 28);
        for k in 0..28i64 {
            assert_eq!(m.get(&k), Some(&k));
        }
        m.check_invariants();
    }

    /// Shrink triggers once the entry count drops below a fifth of the grow
    /// threshold, and never goes below MIN_CAPACITY.
    #[test]
    fn shrink_clamps_at_minimum_capacity() {
        let mut m = ChainedHashMap::with_capacity_and_load_factor(111, 0.75);
        for k in 0..40i64 {
            m.insert(k, k);
        }
        assert_eq!(m.capacity(), 111);
        // grow_at = 83, shrink_at = 16: dropping below 16 entries resizes.
        for k in 0..24i64 {
            assert!(m.erase(&k));
            assert_eq!(m.capacity(), 111);
        }
        assert!(m.erase(&24));
        assert_eq!(m.len(), 15);
        assert_eq!(m.capacity(), MIN_CAPACITY);
        for k in 25..40i64 {
            assert_eq!(m.get(&k), Some(&k));
        }
        // Erasing down to a single entry must not shrink further.
        for k in 25..39i64 {
            assert!(m.erase(&k));
        }
        assert_eq!(m.len(), 1);
        assert_eq!(m.capacity(), MIN_CAPACITY);
        assert_eq!(m.get(&39), Some(&39));
        m.check_invariants();
    }

    /// Resize relocates nodes by splice: positions captured before the
    /// resize still name the same entries afterwards.
    #[test]
    fn positions_survive_rehash() {
        let mut m = ChainedHashMap::with_capacity_and_load_factor(37, 0.75);
        let mut positions = Vec::new();
        for k in 0..27i64 {
            positions.push(m.insert(k, k * 2).0);
        }
        m.insert(27, 54);
        assert_eq!(m.capacity(), 65);
        for (k, p) in positions.iter().enumerate() {
            assert_eq!(m.entry_at(*p), Some((&(k as i64), &(k as i64 * 2))));
        }
        m.check_invariants();
    }

    #[test]
    fn reserve_grows_but_never_shrinks() {
        let mut m: ChainedHashMap<i32, i32> = ChainedHashMap::new();
        m.insert(1, 1);
        m.reserve(10);
        assert_eq!(m.capacity(), MIN_CAPACITY);
        m.reserve(101);
        assert_eq!(m.capacity(), 101);
        assert_eq!(m.get(&1), Some(&1));
        m.check_invariants();
    }

    #[test]
    fn clear_resets_entries_but_keeps_capacity() {
        let mut m = ChainedHashMap::with_capacity_and_load_factor(37, 0.75);
        for k in 0..30i64 {
            m.insert(k, k);
        }
        let cap = m.capacity();
        m.clear();
        assert!(m.is_empty());
        assert_eq!(m.capacity(), cap);
        assert_eq!(m.find(&3), None);
        m.check_invariants();
        m.insert(3, 3);
        assert_eq!(m.get(&3), Some(&3));
    }

    #[test]
    fn iteration_yields_each_entry_once() {
        let mut m = ChainedHashMap::new();
        for k in 0..20i64 {
            m.insert(k, -k);
        }
        assert_eq!(m.iter().len(), 20);
        let seen: BTreeSet<i64> = m.iter().map(|(k, _)| *k).collect();
        assert_eq!(seen.len(), 20);
        for (k, v) in m.iter() {
            assert_eq!(*v, -k);
        }
    }

    #[test]
    fn next_capacity_progression() {
        assert_eq!(next_capacity(37), 65);
        assert_eq!(next_capacity(65), 113);
        // Even intermediate values round up to odd.
        assert_eq!(next_capacity(16), 29);
        // Near the numeric limit the growth is abandoned.
        assert_eq!(next_capacity(usize::MAX), usize::MAX);
        assert_eq!(next_capacity(usize::MAX - usize::MAX / 4), usize::MAX - usize::MAX / 4);
    }

    #[test]
    #[should_panic]
    fn zero_load_factor_rejected() {
        let _ = ChainedHashMap::<i32, i32>::with_capacity_and_load_factor(37, 0.0);
    }

    #[test]
    #[should_panic]
    fn unit_load_factor_rejected() {
        let _ = ChainedHashMap::<i32, i32>::with_capacity_and_load_factor(37, 1.0);
    }

    #[test]
    #[should_panic]
    fn zero_capacity_rejected() {
        let _ = ChainedHashMap::<i32, i32>::with_capacity(0);
    }
}
