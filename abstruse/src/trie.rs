//! Token trie backing the `subindex` of every index node.
//!
//! Keys sharing a prefix share a path, so a wildcard lookup only fans out where a variable
//! appears, instead of testing every stored key.
use std::collections::HashMap;

use smallvec::SmallVec;

use crate::key::{RetrieveMode, Token};

struct TrieNode<V> {
    // Boxed: index nodes own a trie of index nodes.
    value: Option<Box<V>>,
    edges: HashMap<Token, TrieNode<V>>,
}

impl<V> Default for TrieNode<V> {
    fn default() -> Self {
        Self {
            value: None,
            edges: HashMap::new(),
        }
    }
}

/// Mapping from [`Key`](crate::key::Key)s to values, one value per distinct key.
pub struct KeyTrie<V> {
    root: TrieNode<V>,
    len: usize,
}

impl<V> KeyTrie<V> {
    /// Create an empty trie.
    pub fn new() -> Self {
        Self {
            root: TrieNode::default(),
            len: 0,
        }
    }

    /// Number of stored keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no key is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn node(&self, key: &[Token]) -> Option<&TrieNode<V>> {
        key.iter()
            .try_fold(&self.root, |node, token| node.edges.get(token))
    }

    /// Value stored under exactly `key`.
    pub fn get(&self, key: &[Token]) -> Option<&V> {
        self.node(key).and_then(|node| node.value.as_deref())
    }

    /// Mutable value stored under exactly `key`.
    pub fn get_mut(&mut self, key: &[Token]) -> Option<&mut V> {
        let mut node = &mut self.root;
        for token in key {
            node = node.edges.get_mut(token)?;
        }
        node.value.as_deref_mut()
    }

    /// Value stored under `key`, created with `create` if absent.
    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: &[Token], create: F) -> &mut V {
        let mut node = &mut self.root;
        for token in key {
            node = node.edges.entry(token.clone()).or_default();
        }
        if node.value.is_none() {
            self.len += 1;
        }
        &mut **node.value.get_or_insert_with(|| Box::new(create()))
    }

    /// All values whose key is compatible with `key` under `mode`.
    ///
    /// Exact mode follows a single path and yields at most one value as long as the trie is
    /// consistent. Wildcard mode branches on variables found on either side.
    pub fn matching(&self, key: &[Token], mode: RetrieveMode) -> SmallVec<&V, 4> {
        let mut found = SmallVec::new();
        let mut stack: SmallVec<(&TrieNode<V>, usize), 16> = SmallVec::new();
        stack.push((&self.root, 0));

        while let Some((node, depth)) = stack.pop() {
            let Some(query) = key.get(depth) else {
                if let Some(value) = node.value.as_deref() {
                    found.push(value);
                }
                continue;
            };

            match mode {
                RetrieveMode::Exact => {
                    if let Some(next) = node.edges.get(query) {
                        stack.push((next, depth + 1));
                    }
                }
                RetrieveMode::Wildcard if query.is_var() => {
                    stack.extend(node.edges.values().map(|next| (next, depth + 1)));
                }
                RetrieveMode::Wildcard => {
                    if let Some(next) = node.edges.get(query) {
                        stack.push((next, depth + 1));
                    }
                    if let Some(next) = node.edges.get(&Token::Var) {
                        stack.push((next, depth + 1));
                    }
                }
            }
        }

        found
    }

    /// Every stored value, in unspecified order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        let mut stack = vec![&self.root];
        std::iter::from_fn(move || {
            while let Some(node) = stack.pop() {
                stack.extend(node.edges.values());
                if let Some(value) = node.value.as_deref() {
                    return Some(value);
                }
            }
            None
        })
    }
}

impl<V> Default for KeyTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for KeyTrie<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.values()).finish()
    }
}
