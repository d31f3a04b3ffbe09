//! Access paths - stable names for positions inside a template.
//!
//! A path is the chain of container-relative steps from the template root to
//! one location. Paths are built incrementally during the structural walk
//! (push on descent, pop on return) and double as the human-readable keys of
//! a realization's specification.
//!
//! ```text
//! Record "Level1"
//! └── field3          Field("field3")
//!     └── field1      Field("field1")     → "field3.field1"
//! ```
//!
//! Rendering performs no escaping. A field name or mapping key whose string
//! form contains the separator produces a rendering that is ambiguous with a
//! deeper path; callers who need unambiguous keys should keep keys free of the
//! separator or pick another one via [`crate::RealizeOptions`].

use std::fmt;

use crate::node::MapKey;

/// Separator used by the canonical path rendering.
pub const PATH_SEPARATOR: &str = ".";

/// Which kind of container a step descends into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// Named field of a record
    RecordField,
    /// Position in a list
    ListIndex,
    /// Position in a tuple
    TupleIndex,
    /// Key of a mapping
    MappingKey,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::RecordField => "record-field",
            StepKind::ListIndex => "list-index",
            StepKind::TupleIndex => "tuple-index",
            StepKind::MappingKey => "mapping-key",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One container-relative step: the kind of container plus the position of
/// the child inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccessStep {
    Field(String),
    ListIndex(usize),
    TupleIndex(usize),
    Key(MapKey),
}

impl AccessStep {
    /// Create a record-field step.
    pub fn field(name: impl Into<String>) -> Self {
        AccessStep::Field(name.into())
    }

    /// Create a mapping-key step.
    pub fn key(key: impl Into<MapKey>) -> Self {
        AccessStep::Key(key.into())
    }

    pub fn kind(&self) -> StepKind {
        match self {
            AccessStep::Field(_) => StepKind::RecordField,
            AccessStep::ListIndex(_) => StepKind::ListIndex,
            AccessStep::TupleIndex(_) => StepKind::TupleIndex,
            AccessStep::Key(_) => StepKind::MappingKey,
        }
    }
}

/// Renders the position only: field name verbatim, index as decimal, key via
/// its own `Display`.
impl fmt::Display for AccessStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessStep::Field(name) => f.write_str(name),
            AccessStep::ListIndex(i) | AccessStep::TupleIndex(i) => write!(f, "{}", i),
            AccessStep::Key(key) => write!(f, "{}", key),
        }
    }
}

/// Ordered chain of access steps from the template root.
///
/// Two paths are equal iff their steps are equal element-wise, so paths can
/// key a `HashMap` directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AccessPath {
    steps: Vec<AccessStep>,
}

impl AccessPath {
    /// The empty path, addressing the template root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Descend one step.
    pub fn push(&mut self, step: AccessStep) {
        self.steps.push(step);
    }

    /// Return from the last step taken.
    pub fn pop(&mut self) -> Option<AccessStep> {
        self.steps.pop()
    }

    /// Copy of this path extended by one step.
    pub fn child(&self, step: AccessStep) -> Self {
        let mut path = self.clone();
        path.push(step);
        path
    }

    pub fn steps(&self) -> &[AccessStep] {
        &self.steps
    }

    pub fn last(&self) -> Option<&AccessStep> {
        self.steps.last()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Render the positions joined by `separator`.
    ///
    /// The root path renders as the empty string. Distinct paths can render
    /// the same when a position contains the separator; specification keys
    /// built from such paths collide.
    pub fn render(&self, separator: &str) -> String {
        self.steps
            .iter()
            .map(|step| step.to_string())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl fmt::Display for AccessPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(PATH_SEPARATOR))
    }
}

impl FromIterator<AccessStep> for AccessPath {
    fn from_iter<I: IntoIterator<Item = AccessStep>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<AccessStep>> for AccessPath {
    fn from(steps: Vec<AccessStep>) -> Self {
        Self { steps }
    }
}
