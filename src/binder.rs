//! Structural walker - discovers the placeholders of a template.
//!
//! The walk is depth-first from the root with an empty path. Every candidate
//! set found becomes a [`Binding`]; its members are not walked. The order of
//! the returned bindings is the traversal order, which is also the order the
//! realization engine uses for its odometer digits and for the entries of
//! each specification.
//!
//! There is no cycle detection. Owned `Node` trees cannot form cycles, but a
//! custom container that keeps fabricating children recurses without bound.

use crate::candidates::CandidateSet;
use crate::node::{Node, Shape};
use crate::path::AccessPath;

/// A discovered placeholder: where it is and what may go there.
///
/// The candidate set is borrowed from the template, never copied.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding<'t> {
    pub path: AccessPath,
    pub candidates: &'t CandidateSet,
}

/// One value chosen from a binding's candidate set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BindingRealization<'b, 't> {
    pub path: &'b AccessPath,
    /// Position of `value` in the candidate set
    pub index: usize,
    pub value: &'t Node,
}

impl<'t> Binding<'t> {
    /// Number of candidate values at this placeholder.
    pub fn size(&self) -> usize {
        self.candidates.len()
    }

    /// The realization of this binding for candidate `index`.
    pub fn realize_at(&self, index: usize) -> Option<BindingRealization<'_, 't>> {
        self.candidates.get(index).map(|value| BindingRealization {
            path: &self.path,
            index,
            value,
        })
    }

    /// Every realization of this binding, in candidate order.
    pub fn realizations(&self) -> impl Iterator<Item = BindingRealization<'_, 't>> + '_ {
        let candidates: &'t CandidateSet = self.candidates;
        candidates
            .iter()
            .enumerate()
            .map(move |(index, value)| BindingRealization {
                path: &self.path,
                index,
                value,
            })
    }
}

/// Walk `template` and return its bindings in traversal order.
pub fn bind(template: &Node) -> Vec<Binding<'_>> {
    let mut bindings = Vec::new();
    let mut path = AccessPath::root();
    walk(template, &mut path, &mut bindings);
    bindings
}

fn walk<'t>(node: &'t Node, path: &mut AccessPath, bindings: &mut Vec<Binding<'t>>) {
    match node.shape() {
        Shape::Placeholder => {
            if let Node::Candidates(candidates) = node {
                bindings.push(Binding {
                    path: path.clone(),
                    candidates,
                });
            }
        }
        Shape::Fields | Shape::Elements | Shape::Entries => {
            for (step, child) in node.children() {
                path.push(step);
                walk(child, path, bindings);
                path.pop();
            }
        }
        Shape::Leaf => {}
    }
}
