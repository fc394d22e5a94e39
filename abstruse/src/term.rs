//! Minimal expression model consumed by the index.
//!
//! Role
//! - Represent logical expressions as a closed set of shapes: constant symbols, variables and
//!   ordered compounds.
//! - Variables are a single, anonymous marker. The index routes on *shape*, so which variable
//!   occupies a position is irrelevant; callers keep their own bindings.
//!
//! A compound's head, when it has one, is simply its first child: `f(a, b)` is the compound
//! `[f, a, b]` of arity 3. [`Term::app`] builds that shape.
//!
//! Example
//! ```
//! use abstruse::term::Term;
//!
//! let t = Term::app("f", [Term::atom("a"), Term::var()]);
//! assert_eq!(t.arity(), Some(3));
//! assert_eq!(t.to_string(), "(f a ?)");
//! ```
use std::{fmt, sync::Arc};

use strum::{EnumIs, EnumTryAs};

/// Name of a constant symbol.
///
/// Cloning is O(1); two symbols are equal when their names are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Create a symbol from any string-like name.
    pub fn new<S: AsRef<str>>(name: S) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The symbol's name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A node of a logical expression tree.
///
/// Terms are immutable once built. Compound children are reference counted, so cloning a term
/// never copies its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs)]
pub enum Term {
    /// A constant symbol, no children.
    Atom(Symbol),

    /// The variable marker. All variables look the same to the index.
    Var,

    /// An ordered sequence of children. Order and arity are significant.
    Compound(Arc<[Term]>),
}

impl Term {
    /// Build a constant.
    #[inline]
    pub fn atom<S: Into<Symbol>>(name: S) -> Self {
        Term::Atom(name.into())
    }

    /// Build the variable marker.
    #[inline]
    pub fn var() -> Self {
        Term::Var
    }

    /// Build a compound from its children, in order.
    pub fn compound<I: IntoIterator<Item = Term>>(children: I) -> Self {
        Term::Compound(children.into_iter().collect())
    }

    /// Build `head(args...)`, i.e. the compound `[head, args...]`.
    pub fn app<S: Into<Symbol>, I: IntoIterator<Item = Term>>(head: S, args: I) -> Self {
        Term::compound(std::iter::once(Term::atom(head)).chain(args))
    }

    /// Children of a compound; empty for atoms and variables.
    #[inline]
    pub fn children(&self) -> &[Term] {
        match self {
            Term::Compound(children) => children,
            Term::Atom(_) | Term::Var => &[],
        }
    }

    /// Number of children for compounds, `None` for atoms and variables.
    #[inline]
    pub fn arity(&self) -> Option<usize> {
        match self {
            Term::Compound(children) => Some(children.len()),
            Term::Atom(_) | Term::Var => None,
        }
    }

    /// Height of the tree: leaves and empty compounds have height 0.
    pub fn height(&self) -> usize {
        // Explicit stack, expression trees can be deep.
        let mut stack = vec![(self, 0usize)];
        let mut height = 0;
        while let Some((term, depth)) = stack.pop() {
            height = height.max(depth);
            stack.extend(term.children().iter().map(|c| (c, depth + 1)));
        }
        height
    }
}

impl From<Symbol> for Term {
    fn from(symbol: Symbol) -> Self {
        Term::Atom(symbol)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(symbol) => write!(f, "{symbol}"),
            Term::Var => f.write_str("?"),
            Term::Compound(children) => {
                f.write_str("(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
        }
    }
}
