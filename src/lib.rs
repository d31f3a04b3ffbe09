//! Candidate Templates - enumerate every realization of a template.
//!
//! A template is an ordinary value tree ([`Node`]) in which some positions
//! hold a [`CandidateSet`] instead of a concrete value. Realizing the
//! template replaces each placeholder with one of its candidates, in every
//! combination:
//!
//! - `CandidateSet` - non-empty ordered alternatives for one position
//! - `AccessPath` - route from the root to a position, one step per level
//! - `bind` - structural walk discovering placeholders in document order
//! - `realize_template` - lazy odometer-ordered sequence of realizations
//! - `count_realizations` - closed-form product of candidate set sizes
//!
//! # Architecture
//!
//! ```text
//! Node (template)
//! ├── Record   { field -> Node }
//! ├── List/Tuple [ Node ]
//! ├── Map      { key -> Node }
//! ├── Custom   (ContainerKind)
//! └── Candidates ── placeholder, members are values
//! ```
//!
//! Enumeration never holds more than one realization at a time, and the
//! template is only borrowed.
//!
//! # Example
//!
//! ```
//! use candidate_templates::{candidates, count_realizations, realize_template, Node};
//!
//! let yaml = r#"
//! model: resnet
//! batch_size:
//!   $candidates: [32, 64]
//! optimizer:
//!   name:
//!     $candidates: [sgd, adam, rmsprop]
//! "#;
//!
//! let template = Node::from_yaml_str(yaml).unwrap();
//! assert_eq!(count_realizations(&template).unwrap(), 6);
//!
//! let first = realize_template(&template).next().unwrap();
//! assert_eq!(first.specification["batch_size"], Node::from(32));
//! assert_eq!(first.specification["optimizer.name"], Node::from("sgd"));
//!
//! // Same thing built in code
//! let built = Node::map([
//!     ("model", Node::from("resnet")),
//!     ("batch_size", candidates![32, 64].into()),
//!     ("optimizer", Node::map([("name", candidates!["sgd", "adam", "rmsprop"])])),
//! ]);
//! assert_eq!(built, template);
//! ```

mod binder;
mod candidates;
mod codec;
mod engine;
mod error;
mod node;
mod odometer;
mod options;
mod path;

// Re-exports
pub use binder::{bind, Binding, BindingRealization};
pub use candidates::{CandidateSet, CANDIDATES_KEY};
pub use engine::{
    count_realizations, realize_template, realize_template_with, Realizations, Specification,
    TemplateRealization,
};
pub use error::RealizeError;
pub use node::{ContainerKind, MapKey, Mapping, Node, Opaque, Record, Shape};
pub use odometer::Odometer;
pub use options::RealizeOptions;
pub use path::{AccessPath, AccessStep, StepKind, PATH_SEPARATOR};
