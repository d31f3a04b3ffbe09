//! Template node model.
//!
//! Templates are trees of [`Node`]s. Dispatch is closed over a small set of
//! container kinds, each answering one capability query ([`Node::shape`]):
//!
//! ```text
//! Shape::Placeholder  CandidateSet
//! Shape::Fields       Record (named fields, declared order)
//! Shape::Elements     List, Tuple (index order)
//! Shape::Entries      Map (insertion order)
//! Shape::Leaf         Null, Bool, Int, Float, Str, Opaque
//! ```
//!
//! Container kinds outside that set plug in through [`ContainerKind`] and
//! live in the tree as [`Node::Custom`]. They are walked, copied, and written
//! through exactly the same capability methods as the built-in kinds.
//!
//! Copies are explicit per kind: `Clone` for `Node` clones every owned
//! container, delegates custom containers to
//! [`ContainerKind::clone_container`], and clones the `Arc` of an
//! [`Opaque`] handle without touching the payload.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::candidates::CandidateSet;
use crate::path::{AccessPath, AccessStep};

/// Key-value container with insertion-ordered iteration.
pub type Mapping = IndexMap<MapKey, Node>;

/// Key of a [`Mapping`] entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MapKey {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl MapKey {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MapKey::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Str(s) => f.write_str(s),
            MapKey::Int(i) => write!(f, "{}", i),
            MapKey::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for MapKey {
    fn from(s: &str) -> Self {
        MapKey::Str(s.to_string())
    }
}

impl From<String> for MapKey {
    fn from(s: String) -> Self {
        MapKey::Str(s)
    }
}

impl From<i64> for MapKey {
    fn from(i: i64) -> Self {
        MapKey::Int(i)
    }
}

impl From<i32> for MapKey {
    fn from(i: i32) -> Self {
        MapKey::Int(i64::from(i))
    }
}

impl From<bool> for MapKey {
    fn from(b: bool) -> Self {
        MapKey::Bool(b)
    }
}

/// Capability a node exposes to the structural walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A candidate set marker
    Placeholder,
    /// Named fields
    Fields,
    /// Indexed elements
    Elements,
    /// Keyed entries
    Entries,
    /// No children
    Leaf,
}

/// Extension point for container kinds beyond record, list, tuple and map.
///
/// Implementors report their children together with the step addressing
/// each one, give mutable access to a child by step, and provide an explicit
/// deep copy. `shape` must be one of `Fields`, `Elements` or `Entries`.
///
/// ```
/// use std::any::Any;
/// use candidate_templates::{AccessStep, ContainerKind, Node, Shape};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Pair(Node, Node);
///
/// impl ContainerKind for Pair {
///     fn kind_name(&self) -> &'static str { "pair" }
///     fn shape(&self) -> Shape { Shape::Elements }
///     fn children(&self) -> Vec<(AccessStep, &Node)> {
///         vec![(AccessStep::TupleIndex(0), &self.0), (AccessStep::TupleIndex(1), &self.1)]
///     }
///     fn child_mut(&mut self, step: &AccessStep) -> Option<&mut Node> {
///         match step {
///             AccessStep::TupleIndex(0) => Some(&mut self.0),
///             AccessStep::TupleIndex(1) => Some(&mut self.1),
///             _ => None,
///         }
///     }
///     fn clone_container(&self) -> Box<dyn ContainerKind> { Box::new(self.clone()) }
///     fn eq_container(&self, other: &dyn ContainerKind) -> bool {
///         other.as_any().downcast_ref::<Self>() == Some(self)
///     }
///     fn as_any(&self) -> &dyn Any { self }
/// }
///
/// let node = Node::custom(Pair(Node::from(1), Node::from("a")));
/// assert_eq!(node.shape(), Shape::Elements);
/// ```
pub trait ContainerKind: fmt::Debug + Send + Sync + 'static {
    /// Short name used in logs and error messages.
    fn kind_name(&self) -> &'static str;

    fn shape(&self) -> Shape;

    /// Children in traversal order, each with the step that addresses it.
    fn children(&self) -> Vec<(AccessStep, &Node)>;

    /// Mutable access to a child. Must return `Some` for every step that
    /// `children` reports; realization fails with `PathNotFound` otherwise.
    fn child_mut(&mut self, step: &AccessStep) -> Option<&mut Node>;

    /// Independent deep copy of this container.
    fn clone_container(&self) -> Box<dyn ContainerKind>;

    fn eq_container(&self, other: &dyn ContainerKind) -> bool;

    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn ContainerKind> {
    fn clone(&self) -> Self {
        self.clone_container()
    }
}

impl PartialEq for dyn ContainerKind {
    fn eq(&self, other: &Self) -> bool {
        self.eq_container(other)
    }
}

/// Immutable, shared handle to a caller value the crate never looks inside.
///
/// Copying a template copies the handle, not the payload: every realization
/// refers to the same value. Handles compare equal only when they point at
/// the same allocation.
#[derive(Clone)]
pub struct Opaque {
    handle: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Opaque {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap an existing shared value without re-allocating it.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            handle: value,
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.handle.downcast_ref::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether both handles point at the same value.
    pub fn ptr_eq(&self, other: &Opaque) -> bool {
        Arc::ptr_eq(&self.handle, &other.handle)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({})", self.type_name)
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// Structured record with named fields in declared order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    name: String,
    fields: IndexMap<String, Node>,
}

impl Record {
    /// Create an empty record of the given type name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Add a field (builder style). Re-adding a name replaces the value in
    /// place and keeps the original declaration position.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Node>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, name: &str) -> Option<&Node> {
        self.fields.get(name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.fields.get_mut(name)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A template node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Shared handle to a caller value; always a leaf
    Opaque(Opaque),
    Record(Record),
    List(Vec<Node>),
    Tuple(Vec<Node>),
    Map(Mapping),
    /// Placeholder marker
    Candidates(CandidateSet),
    /// Caller-defined container kind
    Custom(Box<dyn ContainerKind>),
}

impl Node {
    // ------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------

    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Node>,
    {
        Node::List(items.into_iter().map(Into::into).collect())
    }

    pub fn tuple<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Node>,
    {
        Node::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Build a mapping; entries keep the order given.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<MapKey>,
        V: Into<Node>,
    {
        Node::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Node::Opaque(Opaque::new(value))
    }

    pub fn custom<C: ContainerKind>(container: C) -> Self {
        Node::Custom(Box::new(container))
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Float(f) => Some(*f),
            Node::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Elements of a list or tuple.
    pub fn as_elements(&self) -> Option<&[Node]> {
        match self {
            Node::List(items) | Node::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Node::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_candidates(&self) -> Option<&CandidateSet> {
        match self {
            Node::Candidates(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&Opaque> {
        match self {
            Node::Opaque(handle) => Some(handle),
            _ => None,
        }
    }

    /// Name of this node's kind, for logs and error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "bool",
            Node::Int(_) => "int",
            Node::Float(_) => "float",
            Node::Str(_) => "str",
            Node::Opaque(_) => "opaque",
            Node::Record(_) => "record",
            Node::List(_) => "list",
            Node::Tuple(_) => "tuple",
            Node::Map(_) => "map",
            Node::Candidates(_) => "candidates",
            Node::Custom(c) => c.kind_name(),
        }
    }

    // ------------------------------------------------------------------
    // Capability queries
    // ------------------------------------------------------------------

    pub fn shape(&self) -> Shape {
        match self {
            Node::Candidates(_) => Shape::Placeholder,
            Node::Record(_) => Shape::Fields,
            Node::List(_) | Node::Tuple(_) => Shape::Elements,
            Node::Map(_) => Shape::Entries,
            Node::Custom(c) => c.shape(),
            Node::Null
            | Node::Bool(_)
            | Node::Int(_)
            | Node::Float(_)
            | Node::Str(_)
            | Node::Opaque(_) => Shape::Leaf,
        }
    }

    /// Children in traversal order, each with the step that addresses it.
    ///
    /// Leaves and placeholders have no children: candidate members are
    /// values, not template structure.
    pub fn children(&self) -> Vec<(AccessStep, &Node)> {
        match self {
            Node::Record(record) => record
                .fields
                .iter()
                .map(|(name, value)| (AccessStep::Field(name.clone()), value))
                .collect(),
            Node::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, value)| (AccessStep::ListIndex(i), value))
                .collect(),
            Node::Tuple(items) => items
                .iter()
                .enumerate()
                .map(|(i, value)| (AccessStep::TupleIndex(i), value))
                .collect(),
            Node::Map(map) => map
                .iter()
                .map(|(key, value)| (AccessStep::Key(key.clone()), value))
                .collect(),
            Node::Custom(c) => c.children(),
            _ => Vec::new(),
        }
    }

    /// Child addressed by `step`, if this node is a container of the
    /// matching kind.
    pub fn child(&self, step: &AccessStep) -> Option<&Node> {
        match (self, step) {
            (Node::Record(record), AccessStep::Field(name)) => record.field(name),
            (Node::List(items), AccessStep::ListIndex(i)) => items.get(*i),
            (Node::Tuple(items), AccessStep::TupleIndex(i)) => items.get(*i),
            (Node::Map(map), AccessStep::Key(key)) => map.get(key),
            (Node::Custom(c), step) => c
                .children()
                .into_iter()
                .find(|(s, _)| s == step)
                .map(|(_, child)| child),
            _ => None,
        }
    }

    pub fn child_mut(&mut self, step: &AccessStep) -> Option<&mut Node> {
        match (self, step) {
            (Node::Record(record), AccessStep::Field(name)) => record.field_mut(name),
            (Node::List(items), AccessStep::ListIndex(i)) => items.get_mut(*i),
            (Node::Tuple(items), AccessStep::TupleIndex(i)) => items.get_mut(*i),
            (Node::Map(map), AccessStep::Key(key)) => map.get_mut(key),
            (Node::Custom(c), step) => c.child_mut(step),
            _ => None,
        }
    }

    /// Node at `path`, the root itself for the empty path.
    pub fn get(&self, path: &AccessPath) -> Option<&Node> {
        path.steps()
            .iter()
            .try_fold(self, |node, step| node.child(step))
    }

    pub fn get_mut(&mut self, path: &AccessPath) -> Option<&mut Node> {
        let mut node = self;
        for step in path.steps() {
            node = node.child_mut(step)?;
        }
        Some(node)
    }
}

// ----------------------------------------------------------------------
// Conversions
// ----------------------------------------------------------------------

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl From<i32> for Node {
    fn from(i: i32) -> Self {
        Node::Int(i64::from(i))
    }
}

impl From<i64> for Node {
    fn from(i: i64) -> Self {
        Node::Int(i)
    }
}

impl From<u32> for Node {
    fn from(i: u32) -> Self {
        Node::Int(i64::from(i))
    }
}

impl From<f64> for Node {
    fn from(f: f64) -> Self {
        Node::Float(f)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Str(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Str(s)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::List(items)
    }
}

impl From<Mapping> for Node {
    fn from(map: Mapping) -> Self {
        Node::Map(map)
    }
}

impl From<Record> for Node {
    fn from(record: Record) -> Self {
        Node::Record(record)
    }
}

impl From<CandidateSet> for Node {
    fn from(set: CandidateSet) -> Self {
        Node::Candidates(set)
    }
}

impl From<Opaque> for Node {
    fn from(handle: Opaque) -> Self {
        Node::Opaque(handle)
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map_or(Node::Null, Into::into)
    }
}
