//! Key codec: flat structural fingerprints of terms.
//!
//! A key summarizes one *layer* of a term. [`make_key`] at depth `d` lists, left to right, one
//! [`Token`] for every node sitting exactly `d` levels below the root: the arity of a compound,
//! the symbol of an atom, or the variable marker. Leaves stop contributing past their own layer,
//! so keys of differently shaped siblings stay aligned on the positions that still exist.
//!
//! The empty key is the *terminal* value: nothing at that depth can tell two terms apart anymore.
//!
//! Layer arithmetic
//! - Every `Arity(n)` token at depth `d` accounts for exactly `n` tokens at depth `d + 1`.
//! - `Atom` and `Var` tokens account for none.
//!
//! [`project_key`] relies on this to realign a key computed for one shape with the branch of a
//! different, compatible shape.
//!
//! Example
//! ```
//! use abstruse::key::{Token, make_key};
//! use abstruse::term::Term;
//!
//! let t = Term::app("f", [Term::app("g", [Term::var()]), Term::atom("b")]);
//! assert_eq!(make_key(&t, 0).as_slice(), &[Token::Arity(3)]);
//! assert_eq!(make_key(&t, 1).to_string(), "[f #2 b]");
//! assert_eq!(make_key(&t, 2).to_string(), "[g ?]");
//! assert!(make_key(&t, 3).is_terminal());
//! ```
use std::{fmt, ops::Deref};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strum::{Display, EnumIs, EnumString};

use crate::term::{Symbol, Term};

/// Inline capacity of keys before spilling to the heap.
pub(crate) const KEY_INLINE: usize = 8;

/// One position of a [`Key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs)]
pub enum Token {
    /// A compound with this many children.
    Arity(usize),

    /// A variable position.
    Var,

    /// A constant symbol.
    Atom(Symbol),
}

impl Token {
    /// The depth-0 description of `term`.
    #[inline]
    pub fn of(term: &Term) -> Self {
        match term {
            Term::Atom(symbol) => Token::Atom(symbol.clone()),
            Term::Var => Token::Var,
            Term::Compound(children) => Token::Arity(children.len()),
        }
    }

    /// Whether a stored token `self` is compatible with a query token under `mode`.
    ///
    /// Exact mode only accepts equal tokens. Wildcard mode also lets a variable on either side
    /// stand for anything.
    #[inline]
    pub fn accepts(&self, query: &Token, mode: RetrieveMode) -> bool {
        match mode {
            RetrieveMode::Exact => self == query,
            RetrieveMode::Wildcard => self.is_var() || query.is_var() || self == query,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Arity(n) => write!(f, "#{n}"),
            Token::Var => f.write_str("?"),
            Token::Atom(symbol) => write!(f, "{symbol}"),
        }
    }
}

/// How query tokens are compared against stored ones.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumIs,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RetrieveMode {
    /// Token equality only. A query variable only matches a stored variable.
    Exact,

    /// Variables on either side match any token.
    #[default]
    Wildcard,
}

impl From<bool> for RetrieveMode {
    /// `true` selects wildcard retrieval.
    fn from(use_wildcard: bool) -> Self {
        if use_wildcard {
            RetrieveMode::Wildcard
        } else {
            RetrieveMode::Exact
        }
    }
}

/// Ordered token sequence describing one layer of a term. Empty means terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(SmallVec<Token, KEY_INLINE>);

impl Key {
    /// The terminal key.
    #[inline]
    pub fn terminal() -> Self {
        Key(SmallVec::new())
    }

    /// Whether nothing is left to distinguish at this depth.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.0.is_empty()
    }

    /// Tokens of this key.
    #[inline]
    pub fn as_slice(&self) -> &[Token] {
        &self.0
    }

    /// Whether a query key is compatible with this (stored) key.
    ///
    /// Keys of different length never match.
    pub fn matches(&self, query: &[Token], mode: RetrieveMode) -> bool {
        self.0.len() == query.len()
            && self
                .0
                .iter()
                .zip(query)
                .all(|(stored, query)| stored.accepts(query, mode))
    }
}

impl Default for Key {
    fn default() -> Self {
        Key::terminal()
    }
}

impl Deref for Key {
    type Target = [Token];

    fn deref(&self) -> &[Token] {
        &self.0
    }
}

impl FromIterator<Token> for Key {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Key(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Token; N]> for Key {
    fn from(tokens: [Token; N]) -> Self {
        tokens.into_iter().collect()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{token}")?;
        }
        f.write_str("]")
    }
}

/// Compute the key of `term` at structural depth `depth`.
///
/// - `depth == 0`: the single token describing `term` itself.
/// - `depth > 0`: the keys of all children at `depth - 1`, concatenated. Atoms and variables have
///   no children and therefore yield the terminal key.
pub fn make_key(term: &Term, depth: usize) -> Key {
    let mut layer: SmallVec<&Term, KEY_INLINE> = SmallVec::new();
    layer.push(term);

    for _ in 0..depth {
        if layer.is_empty() {
            break;
        }
        layer = layer.into_iter().flat_map(|t| t.children()).collect();
    }

    layer.into_iter().map(Token::of).collect()
}

/// Re-express `current` along the branch described by `optics`.
///
/// `projector` and `optics` describe the same layer: `projector` is the key that led here (the
/// query's view) and `optics` the key of the branch being entered (the stored view). `current` is
/// the next layer as seen by the projector. The result is the next layer as the branch sees it:
///
/// - projector `Var` against optics `Arity(n)`: `n` variable tokens, the variable covers the whole
///   stored subtree;
/// - optics `Arity(n)` otherwise: the next `n` tokens of `current`, verbatim;
/// - projector `Arity(n)` against anything else: the next `n` tokens of `current` are dropped,
///   the stored variable absorbs them.
///
/// Whatever `current` still holds after the walk is appended.
///
/// ```
/// use abstruse::key::{Key, Token, project_key};
///
/// let a = Token::Atom("a".into());
/// // query layer `[f ? a]` entering the branch `[f #2 a]`
/// let projector = Key::from([Token::Atom("f".into()), Token::Var, a.clone()]);
/// let optics = Key::from([Token::Atom("f".into()), Token::Arity(2), a.clone()]);
/// let projected = project_key(&projector, &optics, &Key::terminal());
/// assert_eq!(projected, Key::from([Token::Var, Token::Var]));
/// ```
pub fn project_key(projector: &[Token], optics: &[Token], current: &[Token]) -> Key {
    Key(project(projector, optics, current, &Token::Var))
}

/// Projection over arbitrary slots; `wildcard` fills positions only the optics side describes.
pub(crate) fn project<S: Clone>(
    projector: &[Token],
    optics: &[Token],
    current: &[S],
    wildcard: &S,
) -> SmallVec<S, KEY_INLINE> {
    let mut projected = SmallVec::new();
    let mut rest = current;

    for (i, optic) in optics.iter().enumerate() {
        match (projector.get(i), optic) {
            (Some(Token::Var), Token::Arity(n)) => {
                projected.extend(std::iter::repeat_n(wildcard.clone(), *n));
            }
            (_, Token::Arity(n)) => {
                let (head, tail) = rest.split_at((*n).min(rest.len()));
                projected.extend(head.iter().cloned());
                rest = tail;
            }
            (Some(Token::Arity(n)), _) => {
                rest = &rest[(*n).min(rest.len())..];
            }
            _ => {}
        }
    }

    projected.extend(rest.iter().cloned());
    projected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(name: &str) -> Token {
        Token::Atom(name.into())
    }

    #[test]
    fn depth_zero_describes_the_term_itself() {
        assert_eq!(make_key(&Term::atom("a"), 0), Key::from([atom("a")]));
        assert_eq!(make_key(&Term::var(), 0), Key::from([Token::Var]));
        assert_eq!(
            make_key(&Term::compound([Term::var(), Term::var()]), 0),
            Key::from([Token::Arity(2)])
        );
    }

    #[test]
    fn leaves_are_terminal_past_depth_zero() {
        assert!(make_key(&Term::atom("a"), 1).is_terminal());
        assert!(make_key(&Term::var(), 3).is_terminal());
    }

    #[test]
    fn empty_compound() {
        let empty = Term::compound([]);
        assert_eq!(make_key(&empty, 0), Key::from([Token::Arity(0)]));
        assert!(make_key(&empty, 1).is_terminal());
        assert!(make_key(&empty, 2).is_terminal());
    }

    #[test]
    fn shallow_children_are_elided() {
        // (f a (g (h b)))
        let t = Term::app(
            "f",
            [Term::atom("a"), Term::app("g", [Term::app("h", [Term::atom("b")])])],
        );
        assert_eq!(make_key(&t, 1), Key::from([atom("f"), atom("a"), Token::Arity(2)]));
        assert_eq!(make_key(&t, 2), Key::from([atom("g"), Token::Arity(2)]));
        assert_eq!(make_key(&t, 3), Key::from([atom("h"), atom("b")]));
        assert!(make_key(&t, 4).is_terminal());
    }

    #[test]
    fn projection_copies_real_structure() {
        let projector = Key::from([Token::Arity(2), atom("c")]);
        let current = Key::from([atom("a"), atom("b"), atom("z")]);
        assert_eq!(
            project_key(&projector, &projector, &current),
            Key::from([atom("a"), atom("b"), atom("z")])
        );
    }

    #[test]
    fn projection_expands_variables() {
        let projector = Key::from([Token::Var, Token::Arity(1)]);
        let optics = Key::from([Token::Arity(3), Token::Arity(1)]);
        let current = Key::from([atom("x")]);
        assert_eq!(
            project_key(&projector, &optics, &current),
            Key::from([Token::Var, Token::Var, Token::Var, atom("x")])
        );
    }

    #[test]
    fn projection_skips_structure_absorbed_by_stored_variables() {
        let projector = Key::from([Token::Arity(2), Token::Arity(1)]);
        let optics = Key::from([Token::Var, Token::Arity(1)]);
        let current = Key::from([atom("a"), atom("b"), atom("c")]);
        assert_eq!(
            project_key(&projector, &optics, &current),
            Key::from([atom("c")])
        );
    }

    #[test]
    fn wildcard_accepts_variables_on_both_sides() {
        let stored = Key::from([atom("f"), Token::Var]);
        let query = Key::from([atom("f"), atom("a")]);
        assert!(stored.matches(&query, RetrieveMode::Wildcard));
        assert!(!stored.matches(&query, RetrieveMode::Exact));
        assert!(query.matches(&stored, RetrieveMode::Wildcard));
        assert!(!stored.matches(&query[..1], RetrieveMode::Wildcard));
    }

    #[test]
    fn retrieve_mode_names() {
        assert_eq!(RetrieveMode::Exact.to_string(), "exact");
        assert_eq!("wildcard".parse::<RetrieveMode>(), Ok(RetrieveMode::Wildcard));
        assert_eq!(RetrieveMode::from(false), RetrieveMode::Exact);
    }
}
