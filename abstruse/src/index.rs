//! The abstruse index: a discrimination trie refined one term layer at a time.
//!
//! Role
//! - Every [`IndexNode`] at level `L` routes values by their key at depth `L + 1`
//!   (see [`make_key`]). Values whose key at that depth is terminal stay in the node's `objects`;
//!   the others descend into the child registered under their key.
//! - Exact retrieval follows a single path. Wildcard retrieval follows every branch whose key is
//!   compatible with the query, realigning the query with each branch via projection.
//!
//! Structure
//! - Nodes are created lazily on first use and never removed.
//! - Children are exclusively owned by their parent's [`KeyTrie`].
//! - Insertion needs `&mut self`; any number of retrievals may run concurrently. See
//!   [`SharedIndex`](crate::shared::SharedIndex) for a locked wrapper.
//!
//! Example
//! ```
//! use abstruse::prelude::*;
//!
//! let mut index = AbstruseIndex::new();
//! let fab = Term::app("f", [Term::atom("a"), Term::atom("b")]);
//! let fvv = Term::app("f", [Term::var(), Term::var()]);
//! index.insert(fab.clone()).unwrap();
//! index.insert(fvv.clone()).unwrap();
//!
//! let exact: Vec<_> = index.retrieve(&fab, RetrieveMode::Exact).collect();
//! assert_eq!(exact, vec![&fab]);
//! assert_eq!(index.retrieve(&fab, RetrieveMode::Wildcard).count(), 2);
//! ```
use std::{
    collections::{HashSet, hash_set},
    hash::Hash,
};

use log::{debug, error, trace};
use smallvec::SmallVec;

use crate::{
    config::IndexConfig,
    error::{IndexError, IndexResult},
    key::{KEY_INLINE, Key, RetrieveMode, Token, make_key, project},
    term::Term,
    trie::KeyTrie,
};

/// Values that can be stored in an [`AbstruseIndex`].
///
/// The index routes a value by the term it exposes; equality decides duplicates.
pub trait Indexed: Eq + Hash {
    /// Term used to route this value.
    fn term(&self) -> &Term;
}

impl Indexed for Term {
    #[inline]
    fn term(&self) -> &Term {
        self
    }
}

/// Arbitrary payload stored under a term, e.g. a handler keyed by the formula it listens for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Keyed<V> {
    /// Routing term.
    pub term: Term,
    /// Payload handed back on retrieval.
    pub value: V,
}

impl<V> Keyed<V> {
    /// Pair `value` with the term it is filed under.
    pub fn new(term: Term, value: V) -> Self {
        Self { term, value }
    }
}

impl<V: Eq + Hash> Indexed for Keyed<V> {
    #[inline]
    fn term(&self) -> &Term {
        &self.term
    }
}

/// One layer of the index.
#[derive(Debug)]
pub struct IndexNode<T> {
    level: usize,
    key: Key,
    objects: HashSet<T>,
    subindex: KeyTrie<IndexNode<T>>,
}

impl<T> IndexNode<T> {
    fn new(level: usize, key: Key) -> Self {
        Self {
            level,
            key,
            objects: HashSet::new(),
            subindex: KeyTrie::new(),
        }
    }

    /// Depth this node distinguishes; the root is level 0.
    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Key this node is registered under in its parent. Terminal for the root.
    #[inline]
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Values with no structure left to tell apart at this level.
    #[inline]
    pub fn objects(&self) -> &HashSet<T> {
        &self.objects
    }

    /// Child layers, in unspecified order.
    pub fn children(&self) -> impl Iterator<Item = &IndexNode<T>> + '_ {
        self.subindex.values()
    }
}

/// Layered discrimination trie over [`Indexed`] values.
#[derive(Debug)]
pub struct AbstruseIndex<T = Term> {
    root: IndexNode<T>,
    config: IndexConfig,
    len: usize,
}

impl<T: Indexed> Default for AbstruseIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Indexed> AbstruseIndex<T> {
    /// Create an empty index with the default configuration.
    pub fn new() -> Self {
        Self::with_config(IndexConfig::default())
    }

    /// Create an empty index.
    pub fn with_config(config: IndexConfig) -> Self {
        Self {
            root: IndexNode::new(0, Key::terminal()),
            config,
            len: 0,
        }
    }

    #[inline]
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    #[inline]
    pub fn root(&self) -> &IndexNode<T> {
        &self.root
    }

    /// Number of distinct stored values.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Store `value`. Returns `false` if an equal value was already present.
    ///
    /// # Errors
    /// [`IndexError::StructuralInvariantViolation`] if an exact lookup finds more than one branch
    /// for the value's key. [`KeyTrie::matching`] follows a single path in exact mode, so this
    /// only fires if the trie breaks that contract; the index is then in an inconsistent state.
    pub fn insert(&mut self, value: T) -> IndexResult<bool> {
        let mut node = &mut self.root;

        loop {
            let key = make_key(value.term(), node.level + 1);

            if key.is_terminal() || self.config.is_capped(node.level) {
                let inserted = node.objects.insert(value);
                if inserted {
                    self.len += 1;
                }
                trace!(
                    "Stored value at level {} (new: {inserted}, terminal: {})",
                    node.level,
                    key.is_terminal()
                );
                return Ok(inserted);
            }

            let candidates = node.subindex.matching(&key, RetrieveMode::Exact).len();
            ensure_single_branch(node.level, &key, candidates)?;

            let level = node.level + 1;
            if candidates == 0 {
                debug!("Creating level {level} branch for key {key}");
            } else {
                trace!("Routing through level {level} branch {key}");
            }
            node = node
                .subindex
                .get_or_insert_with(&key, || IndexNode::new(level, key.clone()));
        }
    }

    /// All stored values compatible with `query` under `mode`.
    ///
    /// The returned iterator is lazy and can be cloned before use to walk the same results twice;
    /// calling `retrieve` again on an unchanged index yields the same set. Every match is yielded
    /// exactly once, in unspecified order. Results borrow the index only, so they outlive `query`.
    pub fn retrieve<'a, 'q>(
        &'a self,
        query: &'q Term,
        mode: RetrieveMode,
    ) -> Retrieve<'a, 'q, T> {
        Retrieve {
            query,
            mode,
            config: &self.config,
            stack: vec![Frame {
                node: &self.root,
                frontier: query.children().iter().map(Some).collect(),
            }],
            objects: None,
        }
    }

    /// Retrieval with [`IndexConfig::default_mode`].
    pub fn retrieve_default<'a, 'q>(&'a self, query: &'q Term) -> Retrieve<'a, 'q, T> {
        self.retrieve(query, self.config.default_mode)
    }

    /// Values whose shape is exactly the query's.
    pub fn retrieve_exact<'a, 'q>(&'a self, query: &'q Term) -> Retrieve<'a, 'q, T> {
        self.retrieve(query, RetrieveMode::Exact)
    }

    /// Candidates for unification with `query`. Callers still have to unify them.
    pub fn retrieve_unifiable<'a, 'q>(&'a self, query: &'q Term) -> Retrieve<'a, 'q, T> {
        self.retrieve(query, RetrieveMode::Wildcard)
    }

    /// Whether an equal value is stored.
    pub fn contains(&self, value: &T) -> bool {
        self.retrieve_exact(value.term()).any(|stored| stored == value)
    }

    /// Every stored value, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let mut nodes = vec![&self.root];
        std::iter::from_fn(move || {
            let node = nodes.pop()?;
            nodes.extend(node.children());
            Some(node)
        })
        .flat_map(|node| node.objects.iter())
    }
}

/// Routing guard for [`AbstruseIndex::insert`]: an exact lookup may find at most one branch.
fn ensure_single_branch(level: usize, key: &Key, candidates: usize) -> IndexResult<()> {
    if candidates <= 1 {
        return Ok(());
    }
    error!("Exact lookup of key {key} at level {level} yielded {candidates} branches");
    Err(IndexError::StructuralInvariantViolation {
        level,
        key: key.clone(),
        candidates,
    })
}

/// Query position aligned with a stored position; `None` where only the stored side has
/// structure (the query held a variable above it).
type Slot<'q> = Option<&'q Term>;

fn slot_token(slot: &Slot<'_>) -> Token {
    slot.map_or(Token::Var, Token::of)
}

struct Frame<'a, 'q, T> {
    node: &'a IndexNode<T>,
    /// Query slots aligned with the layer `node`'s children are keyed by.
    frontier: SmallVec<Slot<'q>, KEY_INLINE>,
}

impl<T> Clone for Frame<'_, '_, T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node,
            frontier: self.frontier.clone(),
        }
    }
}

/// Lazy result of [`AbstruseIndex::retrieve`].
///
/// `'a` borrows the index, `'q` the query. Yielded values only borrow the index.
pub struct Retrieve<'a, 'q, T> {
    query: &'q Term,
    mode: RetrieveMode,
    config: &'a IndexConfig,
    stack: Vec<Frame<'a, 'q, T>>,
    /// Objects of the last visited node, and the root filter when that node is the root.
    objects: Option<(hash_set::Iter<'a, T>, Option<Token>)>,
}

impl<T> Clone for Retrieve<'_, '_, T> {
    fn clone(&self) -> Self {
        Self {
            query: self.query,
            mode: self.mode,
            config: self.config,
            stack: self.stack.clone(),
            objects: self.objects.clone(),
        }
    }
}

impl<'a, 'q, T: Indexed> Retrieve<'a, 'q, T> {
    fn enter(&mut self, frame: Frame<'a, 'q, T>) {
        let Frame { node, frontier } = frame;
        let key: Key = frontier.iter().map(slot_token).collect();
        let capped = self.config.is_capped(node.level);

        if !node.objects.is_empty()
            && (self.mode.is_wildcard() || key.is_terminal() || capped)
        {
            // The root has no routing key of its own, its objects still differ at depth 0.
            let filter = (node.level == 0).then(|| Token::of(self.query));
            self.objects = Some((node.objects.iter(), filter));
        }

        if self.mode.is_wildcard() && node.level == 0 && self.query.is_var() {
            // A bare variable covers every stored shape, whatever its arity.
            for child in node.children() {
                let projector: Key = std::iter::repeat_n(Token::Var, child.key.len()).collect();
                self.stack.push(Frame {
                    node: child,
                    frontier: project(&projector, &child.key, &[], &None),
                });
            }
            return;
        }

        let current: SmallVec<Slot<'q>, KEY_INLINE> = frontier
            .iter()
            .copied()
            .flatten()
            .flat_map(|term| term.children().iter().map(Some))
            .collect();

        for child in node.subindex.matching(&key, self.mode) {
            self.stack.push(Frame {
                node: child,
                frontier: project(&key, &child.key, &current, &None),
            });
        }
    }
}

impl<'a, T: Indexed> Iterator for Retrieve<'a, '_, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            if let Some((objects, filter)) = &mut self.objects {
                let mode = self.mode;
                let hit = objects.find(|value| {
                    filter
                        .as_ref()
                        .is_none_or(|query| Token::of(value.term()).accepts(query, mode))
                });
                if hit.is_some() {
                    return hit;
                }
                self.objects = None;
            }

            let frame = self.stack.pop()?;
            self.enter(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a() -> Term {
        Term::atom("a")
    }

    #[test]
    fn root_objects_are_filtered_by_their_own_token() {
        let mut index = AbstruseIndex::new();
        index.insert(a()).unwrap();
        index.insert(Term::atom("b")).unwrap();
        index.insert(Term::var()).unwrap();
        assert_eq!(index.root().objects().len(), 3);

        let exact: Vec<_> = index.retrieve_exact(&a()).collect();
        assert_eq!(exact, vec![&a()]);

        let mut wild: Vec<_> = index.retrieve_unifiable(&a()).map(|t| t.to_string()).collect();
        wild.sort();
        assert_eq!(wild, vec!["?", "a"]);

        assert_eq!(index.retrieve_exact(&Term::var()).count(), 1);
        assert_eq!(index.retrieve_unifiable(&Term::var()).count(), 3);
    }

    #[test]
    fn nodes_record_their_routing_key() {
        let mut index = AbstruseIndex::new();
        let t = Term::app("f", [Term::app("g", [a()])]);
        index.insert(t.clone()).unwrap();

        let child = index.root().children().next().unwrap();
        assert_eq!(child.level(), 1);
        assert_eq!(*child.key(), make_key(&t, 1));
        let grandchild = child.children().next().unwrap();
        assert_eq!(grandchild.level(), 2);
        assert!(grandchild.objects().contains(&t));
    }

    #[test]
    fn routing_guard_rejects_several_branches() {
        let key = make_key(&Term::app("f", [a()]), 1);
        assert!(ensure_single_branch(3, &key, 0).is_ok());
        assert!(ensure_single_branch(3, &key, 1).is_ok());

        let err = ensure_single_branch(3, &key, 2).unwrap_err();
        assert!(matches!(
            err,
            IndexError::StructuralInvariantViolation {
                level: 3,
                candidates: 2,
                ..
            }
        ));
        assert!(err.to_string().contains("[f a]"));
    }

    #[test]
    fn insert_routes_shared_prefixes_through_one_branch() {
        let mut index = AbstruseIndex::new();
        for arg in ["a", "b", "c"] {
            let t = Term::app("f", [Term::app("g", [Term::atom(arg)])]);
            assert!(index.insert(t).unwrap());
        }
        let level_one: Vec<_> = index.root().children().collect();
        assert_eq!(level_one.len(), 1);
        assert_eq!(level_one[0].children().count(), 1);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn results_outlive_a_temporary_query() {
        let mut index = AbstruseIndex::new();
        index.insert(a()).unwrap();
        index.insert(Term::app("f", [a()])).unwrap();

        let exact: Vec<&Term> = index.retrieve_exact(&a()).collect();
        let wild: Vec<&Term> = index.retrieve_unifiable(&Term::app("f", [Term::var()])).collect();
        assert_eq!(exact, vec![&a()]);
        assert_eq!(wild.len(), 1);
    }
}
