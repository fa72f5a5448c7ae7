//! Doubly-linked list over an arena of generation-checked slots.
//!
//! Nodes live in a [`slotmap::SlotMap`]; links between them are slotmap keys,
//! never raw pointers. A [`Pos`] is a copyable reference to a node (or the
//! shared end sentinel) that stays pinned to its node across unrelated
//! mutations and fails the generation check once the node is disposed,
//! instead of silently aliasing a reused slot.
//!
//! Two layers:
//! - [`Chain`]: the list core (head/tail/len) with the arena passed in
//!   explicitly, so several chains can share one arena and [`Chain::splice`]
//!   can move a node between chains by rewriting two link fields. This is
//!   what the hash map builds on.
//! - [`DList`]: a self-contained list owning its own arena, exposing the
//!   usual front/back API plus position-based insert, erase, and splice.

use slotmap::{DefaultKey, SlotMap};

/// A position in a list: a specific node, or the end sentinel.
///
/// Positions compare by node identity. A position stays valid until the node
/// it names is erased; accessors return `None` for stale positions.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Pos(Option<DefaultKey>);

impl Pos {
    /// The shared "no node" sentinel bounding every list.
    pub const fn end() -> Self {
        Pos(None)
    }

    /// Whether this is the end sentinel.
    pub const fn is_end(&self) -> bool {
        self.0.is_none()
    }

    pub(crate) const fn from_key(key: DefaultKey) -> Self {
        Pos(Some(key))
    }

    pub(crate) const fn from_raw(raw: Option<DefaultKey>) -> Self {
        Pos(raw)
    }

    pub(crate) const fn raw(self) -> Option<DefaultKey> {
        self.0
    }

    /// The node key; panics on the end sentinel. Internal callers only reach
    /// this after an `is_end` check or under a bucket-count bound.
    pub(crate) fn key(self) -> DefaultKey {
        match self.0 {
            Some(k) => k,
            None => panic!("end position names no node"),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Node<T> {
    pub(crate) prev: Option<DefaultKey>,
    pub(crate) next: Option<DefaultKey>,
    pub(crate) value: T,
}

/// Arena holding the nodes of one or more chains.
pub(crate) type Slots<T> = SlotMap<DefaultKey, Node<T>>;

/// List core: head/tail/len over an externally owned arena.
#[derive(Debug)]
pub(crate) struct Chain {
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
    len: usize,
}

impl Chain {
    pub(crate) const fn new() -> Self {
        Chain {
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn head_pos(&self) -> Pos {
        Pos::from_raw(self.head)
    }

    pub(crate) fn tail_pos(&self) -> Pos {
        Pos::from_raw(self.tail)
    }

    /// Position of the physical successor of `pos`. Precondition: `pos` names
    /// a live node of this chain.
    pub(crate) fn next<T>(&self, slots: &Slots<T>, pos: Pos) -> Pos {
        assert!(!pos.is_end(), "cannot advance the end position");
        Pos::from_raw(slots[pos.key()].next)
    }

    /// Position of the predecessor; the predecessor of `end` is the tail.
    pub(crate) fn prev<T>(&self, slots: &Slots<T>, pos: Pos) -> Pos {
        match pos.raw() {
            None => Pos::from_raw(self.tail),
            Some(k) => Pos::from_raw(slots[k].prev),
        }
    }

    /// Allocate a node holding `value` and link it immediately before
    /// `before` (`end` appends at the tail). Returns the new node's position.
    pub(crate) fn insert_before<T>(&mut self, slots: &mut Slots<T>, before: Pos, value: T) -> Pos {
        let key = slots.insert(Node {
            prev: None,
            next: None,
            value,
        });
        self.link_before(slots, key, before);
        self.len += 1;
        Pos::from_key(key)
    }

    /// Unlink and dispose the node at `pos`, returning the position of its
    /// former successor. Precondition: `pos` names a live node of this chain.
    pub(crate) fn erase<T>(&mut self, slots: &mut Slots<T>, pos: Pos) -> (T, Pos) {
        assert!(!pos.is_end(), "cannot erase the end position");
        let key = pos.key();
        assert!(slots.contains_key(key), "stale position");
        self.unlink(slots, key);
        self.len -= 1;
        let node = slots.remove(key).unwrap();
        (node.value, Pos::from_raw(node.next))
    }

    /// Move the node at `node` out of `source` and relink it immediately
    /// before `before` in this chain. Both chains must share `slots`. Never
    /// allocates or copies the payload; the node keeps its key, so positions
    /// naming it stay valid.
    pub(crate) fn splice<T>(
        &mut self,
        slots: &mut Slots<T>,
        before: Pos,
        source: &mut Chain,
        node: Pos,
    ) -> Pos {
        assert!(!node.is_end(), "cannot splice the end position");
        let key = node.key();
        source.unlink(slots, key);
        source.len -= 1;
        self.link_before(slots, key, before);
        self.len += 1;
        node
    }

    /// Reposition a node within this chain. Precondition: `before != node`.
    pub(crate) fn splice_within<T>(&mut self, slots: &mut Slots<T>, before: Pos, node: Pos) -> Pos {
        assert!(!node.is_end(), "cannot splice the end position");
        assert!(before != node, "cannot splice a node before itself");
        let key = node.key();
        self.unlink(slots, key);
        self.link_before(slots, key, before);
        node
    }

    pub(crate) fn reset(&mut self) {
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    fn link_before<T>(&mut self, slots: &mut Slots<T>, key: DefaultKey, before: Pos) {
        match before.raw() {
            None => {
                let old_tail = self.tail;
                {
                    let node = &mut slots[key];
                    node.prev = old_tail;
                    node.next = None;
                }
                match old_tail {
                    Some(t) => slots[t].next = Some(key),
                    None => self.head = Some(key),
                }
                self.tail = Some(key);
            }
            Some(next) => {
                let prev = slots[next].prev;
                {
                    let node = &mut slots[key];
                    node.prev = prev;
                    node.next = Some(next);
                }
                slots[next].prev = Some(key);
                match prev {
                    Some(p) => slots[p].next = Some(key),
                    None => self.head = Some(key),
                }
            }
        }
    }

    fn unlink<T>(&mut self, slots: &mut Slots<T>, key: DefaultKey) {
        let (prev, next) = {
            let node = &slots[key];
            (node.prev, node.next)
        };
        match prev {
            Some(p) => slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => slots[n].prev = prev,
            None => self.tail = prev,
        }
    }
}

/// A doubly-linked list owning its node arena.
///
/// Besides the usual front/back operations, every node is addressable by a
/// [`Pos`] for O(1) insert-before, erase, and repositioning splice.
#[derive(Debug)]
pub struct DList<T> {
    slots: Slots<T>,
    chain: Chain,
}

impl<T> DList<T> {
    pub fn new() -> Self {
        DList {
            slots: SlotMap::with_key(),
            chain: Chain::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.len() == 0
    }

    /// Position of the first node, or `end` when empty.
    pub fn head_pos(&self) -> Pos {
        self.chain.head_pos()
    }

    /// Position of the last node, or `end` when empty.
    pub fn tail_pos(&self) -> Pos {
        self.chain.tail_pos()
    }

    /// Successor of `pos`. Panics when `pos` is the end sentinel.
    pub fn next(&self, pos: Pos) -> Pos {
        self.chain.next(&self.slots, pos)
    }

    /// Predecessor of `pos`; `prev(end)` is the tail, `prev(head)` is `end`.
    pub fn prev(&self, pos: Pos) -> Pos {
        self.chain.prev(&self.slots, pos)
    }

    pub fn front(&self) -> Option<&T> {
        self.chain.head.map(|k| &self.slots[k].value)
    }

    pub fn back(&self) -> Option<&T> {
        self.chain.tail.map(|k| &self.slots[k].value)
    }

    /// Value at `pos`; `None` for the end sentinel or a stale position.
    pub fn get(&self, pos: Pos) -> Option<&T> {
        self.slots.get(pos.raw()?).map(|n| &n.value)
    }

    pub fn get_mut(&mut self, pos: Pos) -> Option<&mut T> {
        self.slots.get_mut(pos.raw()?).map(|n| &mut n.value)
    }

    pub fn push_front(&mut self, value: T) -> Pos {
        let head = self.chain.head_pos();
        self.chain.insert_before(&mut self.slots, head, value)
    }

    pub fn push_back(&mut self, value: T) -> Pos {
        self.chain.insert_before(&mut self.slots, Pos::end(), value)
    }

    pub fn pop_front(&mut self) -> Option<T> {
        let head = self.chain.head_pos();
        if head.is_end() {
            return None;
        }
        Some(self.chain.erase(&mut self.slots, head).0)
    }

    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.chain.tail_pos();
        if tail.is_end() {
            return None;
        }
        Some(self.chain.erase(&mut self.slots, tail).0)
    }

    /// Insert `value` immediately before `before` (`end` appends).
    pub fn insert_before(&mut self, before: Pos, value: T) -> Pos {
        self.chain.insert_before(&mut self.slots, before, value)
    }

    /// Remove the node at `pos`, returning its value and the position of its
    /// former successor. Panics on the end sentinel or a stale position.
    pub fn erase(&mut self, pos: Pos) -> (T, Pos) {
        self.chain.erase(&mut self.slots, pos)
    }

    /// Move the node at `node` so it sits immediately before `before`
    /// (`end` moves it to the tail). Relinks only; the node keeps its
    /// position. Panics if `before == node`.
    pub fn splice(&mut self, before: Pos, node: Pos) -> Pos {
        self.chain.splice_within(&mut self.slots, before, node)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.chain.reset();
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            slots: &self.slots,
            front: self.chain.head,
            back: self.chain.tail,
            remaining: self.chain.len(),
        }
    }
}

impl<T> Default for DList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a DList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Double-ended iterator over a [`DList`] in list order.
pub struct Iter<'a, T> {
    slots: &'a Slots<T>,
    front: Option<DefaultKey>,
    back: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.front?;
        let node = &self.slots[key];
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.back?;
        let node = &self.slots[key];
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.value)
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}
