//! OrderedSet: an unbalanced binary search tree with parent links.
//!
//! Nodes live in a slotmap arena; left/right/parent links are keys. The
//! leftmost and rightmost nodes are cached so `first`/`last` and iteration
//! setup are O(1). In-order traversal walks successor/predecessor links and
//! needs no auxiliary stack.

use core::borrow::Borrow;
use core::cmp::Ordering;
use slotmap::{DefaultKey, SlotMap};

#[derive(Debug)]
struct TreeNode<T> {
    left: Option<DefaultKey>,
    right: Option<DefaultKey>,
    parent: Option<DefaultKey>,
    value: T,
}

/// A set of `T: Ord` values held in sorted order.
#[derive(Debug)]
pub struct OrderedSet<T> {
    slots: SlotMap<DefaultKey, TreeNode<T>>,
    root: Option<DefaultKey>,
    leftmost: Option<DefaultKey>,
    rightmost: Option<DefaultKey>,
}

impl<T: Ord> OrderedSet<T> {
    pub fn new() -> Self {
        OrderedSet {
            slots: SlotMap::with_key(),
            root: None,
            leftmost: None,
            rightmost: None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Smallest value in the set.
    pub fn first(&self) -> Option<&T> {
        self.leftmost.map(|k| &self.slots[k].value)
    }

    /// Largest value in the set.
    pub fn last(&self) -> Option<&T> {
        self.rightmost.map(|k| &self.slots[k].value)
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find_key(value).is_some()
    }

    /// Insert `value` if absent. Returns whether the set changed.
    pub fn insert(&mut self, value: T) -> bool {
        let mut parent = None;
        let mut cur = self.root;
        let mut went_left = false;
        let mut always_left = true;
        let mut always_right = true;
        while let Some(k) = cur {
            match value.cmp(&self.slots[k].value) {
                Ordering::Equal => return false,
                Ordering::Less => {
                    parent = Some(k);
                    cur = self.slots[k].left;
                    went_left = true;
                    always_right = false;
                }
                Ordering::Greater => {
                    parent = Some(k);
                    cur = self.slots[k].right;
                    went_left = false;
                    always_left = false;
                }
            }
        }
        let key = self.slots.insert(TreeNode {
            left: None,
            right: None,
            parent,
            value,
        });
        match parent {
            None => {
                self.root = Some(key);
                self.leftmost = Some(key);
                self.rightmost = Some(key);
            }
            Some(p) => {
                if went_left {
                    self.slots[p].left = Some(key);
                    if always_left {
                        self.leftmost = Some(key);
                    }
                } else {
                    self.slots[p].right = Some(key);
                    if always_right {
                        self.rightmost = Some(key);
                    }
                }
            }
        }
        true
    }

    /// Remove `value` if present. Returns whether the set changed.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.find_key(value) {
            Some(key) => {
                self.erase_key(key);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.root = None;
        self.leftmost = None;
        self.rightmost = None;
    }

    /// Iterate in ascending order; double-ended.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            set: self,
            front: self.leftmost,
            back: self.rightmost,
            remaining: self.slots.len(),
        }
    }

    fn find_key<Q>(&self, value: &Q) -> Option<DefaultKey>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut cur = self.root;
        while let Some(k) = cur {
            match value.cmp(self.slots[k].value.borrow()) {
                Ordering::Equal => return Some(k),
                Ordering::Less => cur = self.slots[k].left,
                Ordering::Greater => cur = self.slots[k].right,
            }
        }
        None
    }

    fn minimum(&self, mut key: DefaultKey) -> DefaultKey {
        while let Some(left) = self.slots[key].left {
            key = left;
        }
        key
    }

    fn maximum(&self, mut key: DefaultKey) -> DefaultKey {
        while let Some(right) = self.slots[key].right {
            key = right;
        }
        key
    }

    fn successor(&self, key: DefaultKey) -> Option<DefaultKey> {
        if let Some(right) = self.slots[key].right {
            return Some(self.minimum(right));
        }
        // Climb until the node is a left child; its parent is the successor.
        let mut cur = key;
        let mut parent = self.slots[key].parent;
        while let Some(p) = parent {
            if self.slots[p].right == Some(cur) {
                cur = p;
                parent = self.slots[p].parent;
            } else {
                return Some(p);
            }
        }
        None
    }

    fn predecessor(&self, key: DefaultKey) -> Option<DefaultKey> {
        if let Some(left) = self.slots[key].left {
            return Some(self.maximum(left));
        }
        let mut cur = key;
        let mut parent = self.slots[key].parent;
        while let Some(p) = parent {
            if self.slots[p].left == Some(cur) {
                cur = p;
                parent = self.slots[p].parent;
            } else {
                return Some(p);
            }
        }
        None
    }

    fn erase_key(&mut self, key: DefaultKey) {
        if self.leftmost == Some(key) {
            self.leftmost = self.successor(key);
        }
        if self.rightmost == Some(key) {
            self.rightmost = self.predecessor(key);
        }

        let left = self.slots[key].left;
        let right = self.slots[key].right;
        let parent = self.slots[key].parent;

        let replacement = match (left, right) {
            (None, None) => None,
            (None, Some(r)) => Some(r),
            (Some(l), None) => Some(l),
            (Some(l), Some(r)) => {
                // Hang the left subtree beneath the minimum of the right
                // subtree, then let the right subtree take the node's place.
                let min = self.minimum(r);
                self.slots[min].left = Some(l);
                self.slots[l].parent = Some(min);
                Some(r)
            }
        };

        match parent {
            Some(p) => {
                if self.slots[p].left == Some(key) {
                    self.slots[p].left = replacement;
                } else {
                    self.slots[p].right = replacement;
                }
            }
            None => self.root = replacement,
        }
        if let Some(r) = replacement {
            self.slots[r].parent = parent;
        }
        self.slots.remove(key);
    }
}

impl<T: Ord> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Ord> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Ord> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = OrderedSet::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

/// In-order iterator over an [`OrderedSet`].
pub struct Iter<'a, T> {
    set: &'a OrderedSet<T>,
    front: Option<DefaultKey>,
    back: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, T: Ord> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.front?;
        self.front = self.set.successor(key);
        self.remaining -= 1;
        Some(&self.set.slots[key].value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T: Ord> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.back?;
        self.back = self.set.predecessor(key);
        self.remaining -= 1;
        Some(&self.set.slots[key].value)
    }
}

impl<'a, T: Ord> ExactSizeIterator for Iter<'a, T> {}
