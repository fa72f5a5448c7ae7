//! Trie: a character-keyed prefix tree.
//!
//! Children are kept in a per-node vector and found by linear scan; word
//! fan-out is small enough in practice that this beats a map per node.

#[derive(Debug, Default)]
struct TrieNode {
    children: Vec<(char, TrieNode)>,
    terminal: bool,
}

impl TrieNode {
    fn child(&self, ch: char) -> Option<&TrieNode> {
        self.children
            .iter()
            .find(|(c, _)| *c == ch)
            .map(|(_, node)| node)
    }

    fn child_or_insert(&mut self, ch: char) -> &mut TrieNode {
        if let Some(idx) = self.children.iter().position(|(c, _)| *c == ch) {
            return &mut self.children[idx].1;
        }
        self.children.push((ch, TrieNode::default()));
        &mut self.children.last_mut().unwrap().1
    }
}

/// A set of words supporting whole-word and prefix membership queries.
#[derive(Debug, Default)]
pub struct Trie {
    root: TrieNode,
}

impl Trie {
    pub fn new() -> Self {
        Trie::default()
    }

    pub fn insert(&mut self, word: &str) {
        let mut node = &mut self.root;
        for ch in word.chars() {
            node = node.child_or_insert(ch);
        }
        node.terminal = true;
    }

    /// Whether `word` was inserted as a whole word.
    pub fn contains(&self, word: &str) -> bool {
        self.walk(word).is_some_and(|node| node.terminal)
    }

    /// Whether some inserted word starts with `prefix`. The empty prefix is
    /// always contained.
    pub fn contains_prefix(&self, prefix: &str) -> bool {
        self.walk(prefix).is_some()
    }

    fn walk(&self, s: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        for ch in s.chars() {
            node = node.child(ch)?;
        }
        Some(node)
    }
}
