//! Abstruse: a layered discrimination trie for logical terms.
//!
//! Given a query pattern, the index returns every stored term whose structure is compatible with
//! it, without scanning the whole corpus. Structure is keyed one depth layer at a time:
//! - [`key::make_key`] flattens the nodes found at a given depth of a term into a [`key::Key`];
//! - [`index::AbstruseIndex`] routes each term through one child per layer until its key runs
//!   out, then stores it;
//! - retrieval walks the same layers, either exactly or letting variables match anything.
//!
//! Wildcard retrieval is a candidate filter: it never binds variables, so callers still unify
//! the candidates it returns.
//!
//! Example
//! ```
//! use abstruse::prelude::*;
//!
//! let mut index = AbstruseIndex::new();
//! let human = |x: Term| Term::app("human", [x]);
//! index.insert(human(Term::atom("socrates"))).unwrap();
//! index.insert(human(Term::atom("plato"))).unwrap();
//! index.insert(Term::app("mortal", [Term::var()])).unwrap();
//!
//! let query = human(Term::var());
//! assert_eq!(index.retrieve(&query, RetrieveMode::Wildcard).count(), 2);
//! assert_eq!(index.retrieve(&query, RetrieveMode::Exact).count(), 0);
//! ```

/// TOML-loadable index settings.
pub mod config;
/// Error type shared by the crate.
pub mod error;
/// The layered index and its retrieval iterator.
pub mod index;
/// Key codec: layer keys and their projection.
pub mod key;
/// Locked handle for sharing an index across threads.
pub mod shared;
/// Expression model consumed by the index.
pub mod term;
/// Token trie used to route between layers.
pub mod trie;

pub mod prelude {
    //! Convenient re-exports for end users.
    pub use crate::config::IndexConfig;
    pub use crate::error::{IndexError, IndexResult};
    pub use crate::index::{AbstruseIndex, IndexNode, Indexed, Keyed, Retrieve};
    pub use crate::key::{Key, RetrieveMode, Token, make_key, project_key};
    pub use crate::shared::SharedIndex;
    pub use crate::term::{Symbol, Term};
}
