//! Thread-safe handle around an [`AbstruseIndex`].
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::{
    config::IndexConfig,
    error::IndexResult,
    index::{AbstruseIndex, Indexed},
    key::RetrieveMode,
    term::Term,
};

/// Shared, reader-writer locked index.
///
/// Clones share the same index. Insertions take the write lock, so a single writer runs at a
/// time and never alongside a reader.
///
/// # A note on concurrency
/// Do not call [`Self::insert`] while holding a guard returned by [`Self::read`] on the same
/// thread; the write lock would wait for that guard forever.
///
/// ```rust
/// # use abstruse::prelude::*;
/// let shared = SharedIndex::new(IndexConfig::default());
/// shared.insert(Term::app("p", [Term::var()])).unwrap();
///
/// let worker = shared.clone();
/// let found = std::thread::spawn(move || {
///     worker.retrieve_cloned(&Term::app("p", [Term::atom("a")]), RetrieveMode::Wildcard)
/// })
/// .join()
/// .unwrap();
/// assert_eq!(found.len(), 1);
/// ```
pub struct SharedIndex<T = Term> {
    inner: Arc<RwLock<AbstruseIndex<T>>>,
}

impl<T> Clone for SharedIndex<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Indexed> Default for SharedIndex<T> {
    fn default() -> Self {
        Self::new(IndexConfig::default())
    }
}

impl<T: Indexed> From<AbstruseIndex<T>> for SharedIndex<T> {
    fn from(index: AbstruseIndex<T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
        }
    }
}

impl<T: Indexed> SharedIndex<T> {
    pub fn new(config: IndexConfig) -> Self {
        AbstruseIndex::with_config(config).into()
    }

    /// Insert under the write lock.
    pub fn insert(&self, value: T) -> IndexResult<bool> {
        self.inner.write().insert(value)
    }

    /// Insert every value under a single write lock. Returns how many were new.
    pub fn extend<I: IntoIterator<Item = T>>(&self, values: I) -> IndexResult<usize> {
        let mut index = self.inner.write();
        let mut inserted = 0;
        for value in values {
            if index.insert(value)? {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    /// Read access; retrieval iterators borrow from the guard.
    pub fn read(&self) -> RwLockReadGuard<'_, AbstruseIndex<T>> {
        self.inner.read()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Collect owned copies of the matches so the lock is released on return.
    pub fn retrieve_cloned(&self, query: &Term, mode: RetrieveMode) -> Vec<T>
    where
        T: Clone,
    {
        self.inner.read().retrieve(query, mode).cloned().collect()
    }
}
