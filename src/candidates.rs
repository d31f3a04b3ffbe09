//! CandidateSet - the placeholder marker inside a template.
//!
//! A candidate set is an ordered, non-empty, immutable list of values that may
//! be substituted at one template location. The non-empty invariant is
//! enforced at construction, so every set reachable from a template has at
//! least one member.
//!
//! Serializes as: `{ "$candidates": [ ... ] }`

use crate::error::RealizeError;
use crate::node::Node;

/// Key marking a candidate set in serialized templates.
pub const CANDIDATES_KEY: &str = "$candidates";

/// Ordered, non-empty set of admissible values for one placeholder.
///
/// Members are plain [`Node`]s. A member that is itself a candidate set is not
/// rejected: it is handed through verbatim as the chosen value, and the inner
/// set is never enumerated. Nested placeholders are the caller's
/// responsibility.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSet {
    values: Vec<Node>,
}

impl CandidateSet {
    /// Create a candidate set from its members.
    ///
    /// # Errors
    /// Returns [`RealizeError::EmptyCandidateSet`] if `values` is empty.
    pub fn new<I, V>(values: I) -> Result<Self, RealizeError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Node>,
    {
        let values: Vec<Node> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(RealizeError::EmptyCandidateSet);
        }
        Ok(Self { values })
    }

    /// Create a candidate set that is non-empty by construction.
    pub fn of<V, I, R>(first: V, rest: I) -> Self
    where
        V: Into<Node>,
        I: IntoIterator<Item = R>,
        R: Into<Node>,
    {
        let mut values = vec![first.into()];
        values.extend(rest.into_iter().map(Into::into));
        Self { values }
    }

    /// Number of candidate values (always at least 1).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set has no members. False for every constructed set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Candidate value at `index`, in declaration order.
    pub fn get(&self, index: usize) -> Option<&Node> {
        self.values.get(index)
    }

    /// All candidate values in declaration order.
    pub fn values(&self) -> &[Node] {
        &self.values
    }

    /// Iterate over candidate values in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.values.iter()
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl TryFrom<Vec<Node>> for CandidateSet {
    type Error = RealizeError;

    fn try_from(values: Vec<Node>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

/// Build a [`CandidateSet`] from one or more values.
///
/// The macro only accepts a non-empty list, so it cannot fail.
///
/// ```
/// use candidate_templates::{candidates, Node};
///
/// let set = candidates![10, 20, 30];
/// assert_eq!(set.len(), 3);
/// assert_eq!(set.get(1), Some(&Node::from(20)));
/// ```
#[macro_export]
macro_rules! candidates {
    ($first:expr $(, $rest:expr)* $(,)?) => {{
        let rest: ::std::vec::Vec<$crate::Node> = ::std::vec![$($crate::Node::from($rest)),*];
        $crate::CandidateSet::of($first, rest)
    }};
}
