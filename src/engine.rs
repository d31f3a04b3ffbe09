//! Realization engine and counter.
//!
//! ```text
//! template ──► bind() ──► [b₁ … bₖ] ──► Odometer(n₁ … nₖ)
//!                                           │ next_combination()
//!                                           ▼
//!              clone(template) + write bᵢ[digitᵢ] at pathᵢ
//!                                           │
//!                                           ▼
//!                          TemplateRealization { specification, realization }
//! ```
//!
//! Enumeration is pull-based: nothing is computed until the consumer asks for
//! the next realization, and dropping the iterator is all the cancellation
//! there is. Each realization is a fresh copy owned by the consumer.
//!
//! Every binding path is resolved once for writing before the first
//! realization is built. A template whose custom containers refuse a write
//! at a reported child is rejected with [`RealizeError::PathNotFound`]; no
//! realization that still carries a placeholder is ever produced.

use std::iter::FusedIterator;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::binder::{bind, Binding, BindingRealization};
use crate::error::RealizeError;
use crate::node::Node;
use crate::odometer::Odometer;
use crate::options::RealizeOptions;

/// Chosen values keyed by rendered access path, in binding discovery order.
pub type Specification = IndexMap<String, Node>;

/// One enumeration step: what was chosen, and the template with the choices
/// written in.
///
/// Specification keys are rendered paths, which are not escaped. Two
/// bindings whose paths render the same (a key `"c.d"` next to a nested
/// `c` → `d`) share one entry, the later binding winning, so the
/// specification then holds fewer entries than there are bindings and
/// repeats across realizations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateRealization {
    pub specification: Specification,
    pub realization: Node,
}

impl TemplateRealization {
    /// Decode the realization into a caller type.
    ///
    /// Goes through `serde_json`, so the target type sees records and
    /// mappings as JSON objects and tuples as arrays.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, RealizeError> {
        let value = serde_json::to_value(&self.realization)?;
        Ok(serde_json::from_value(value)?)
    }

    /// The specification as a JSON object, e.g. for a caller-kept record of
    /// combinations already processed.
    pub fn specification_json(&self) -> Result<serde_json::Value, RealizeError> {
        Ok(serde_json::to_value(&self.specification)?)
    }
}

impl BindingRealization<'_, '_> {
    /// Write the chosen value into `target` at this binding's path.
    pub fn apply(&self, target: &mut Node) -> Result<(), RealizeError> {
        let slot = target
            .get_mut(self.path)
            .ok_or_else(|| RealizeError::PathNotFound {
                path: self.path.to_string(),
            })?;
        *slot = self.value.clone();
        Ok(())
    }
}

/// Lazy sequence of every realization of a template.
///
/// Yields exactly [`count_realizations`] items in odometer order (last
/// binding fastest), then `None` forever.
#[derive(Debug)]
pub struct Realizations<'t> {
    template: &'t Node,
    bindings: Vec<Binding<'t>>,
    /// Rendered path per binding, computed once
    keys: Vec<String>,
    odometer: Odometer,
    total: Option<u128>,
    produced: u128,
}

impl<'t> Realizations<'t> {
    fn new(template: &'t Node, options: &RealizeOptions) -> Result<Self, RealizeError> {
        let bindings = bind(template);
        check_writable(template, &bindings)?;

        let keys = bindings
            .iter()
            .map(|b| b.path.render(&options.path_separator))
            .collect();
        let odometer = Odometer::new(bindings.iter().map(Binding::size).collect());
        let total = odometer.remaining();

        tracing::debug!(
            bindings = bindings.len(),
            total = ?total,
            "Template walked for realization"
        );

        Ok(Self {
            template,
            bindings,
            keys,
            odometer,
            total,
            produced: 0,
        })
    }

    /// A sequence that yields nothing.
    fn exhausted(template: &'t Node) -> Self {
        let mut odometer = Odometer::new(Vec::new());
        odometer.stop();
        Self {
            template,
            bindings: Vec::new(),
            keys: Vec::new(),
            odometer,
            total: Some(0),
            produced: 0,
        }
    }

    /// Build the realization for one odometer combination.
    fn build(&self, digits: &[usize]) -> Result<TemplateRealization, RealizeError> {
        let mut realization = self.template.clone();
        let mut specification = Specification::with_capacity(self.bindings.len());

        for ((binding, key), &index) in self.bindings.iter().zip(&self.keys).zip(digits) {
            let chosen = BindingRealization {
                path: &binding.path,
                index,
                value: &binding.candidates.values()[index],
            };
            chosen.apply(&mut realization)?;
            specification.insert(key.clone(), chosen.value.clone());
        }

        Ok(TemplateRealization {
            specification,
            realization,
        })
    }

    /// Bindings discovered in the template, in enumeration order.
    pub fn bindings(&self) -> &[Binding<'t>] {
        &self.bindings
    }

    /// Total number of realizations, `None` if it overflows `u128`.
    pub fn total(&self) -> Option<u128> {
        self.total
    }

    /// Number of realizations produced so far.
    pub fn produced(&self) -> u128 {
        self.produced
    }

    /// Whether another realization will be produced.
    pub fn has_more(&self) -> bool {
        self.odometer.has_more()
    }
}

impl Iterator for Realizations<'_> {
    type Item = TemplateRealization;

    fn next(&mut self) -> Option<Self::Item> {
        let digits = self.odometer.next_combination()?.to_vec();

        match self.build(&digits) {
            Ok(realization) => {
                self.produced += 1;
                tracing::trace!(ordinal = self.produced, "Realization produced");
                Some(realization)
            }
            Err(e) => {
                // A container that accepted the write check but refuses now
                tracing::error!(code = e.code(), error = %e, "Failed to apply binding");
                self.odometer.stop();
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.odometer.remaining().map(usize::try_from) {
            Some(Ok(remaining)) => (remaining, Some(remaining)),
            _ => (usize::MAX, None),
        }
    }
}

impl FusedIterator for Realizations<'_> {}

/// Enumerate every realization of `template` with the default options.
///
/// A template with a binding path that cannot be written (see
/// [`realize_template_with`]) yields nothing; the failure is logged.
///
/// # Example
///
/// ```
/// use candidate_templates::{candidates, realize_template, Node};
///
/// let template = Node::map([
///     ("a", Node::from(1)),
///     ("b", candidates![10, 20].into()),
///     ("c", Node::map([("d", candidates!["x", "y", "z"])])),
/// ]);
///
/// let specs: Vec<String> = realize_template(&template)
///     .map(|r| format!("{}/{}", r.specification["b"].as_i64().unwrap(),
///                               r.specification["c.d"].as_str().unwrap()))
///     .collect();
/// assert_eq!(specs, ["10/x", "10/y", "10/z", "20/x", "20/y", "20/z"]);
/// ```
pub fn realize_template(template: &Node) -> Realizations<'_> {
    Realizations::new(template, &RealizeOptions::default()).unwrap_or_else(|e| {
        tracing::error!(code = e.code(), error = %e, "Template cannot be realized");
        Realizations::exhausted(template)
    })
}

/// Enumerate every realization of `template`, rendering specification keys
/// with `options`.
///
/// # Errors
/// - [`RealizeError::Config`] for invalid options.
/// - [`RealizeError::PathNotFound`] if a custom container reports a child
///   it will not hand out for writing.
pub fn realize_template_with<'t>(
    template: &'t Node,
    options: &RealizeOptions,
) -> Result<Realizations<'t>, RealizeError> {
    options.validate()?;
    Realizations::new(template, options)
}

/// Count the realizations of `template` without building any.
///
/// The count is the product of the candidate set sizes, 1 for a template
/// without placeholders. Fails with [`RealizeError::PathNotFound`] where
/// [`realize_template_with`] would.
pub fn count_realizations(template: &Node) -> Result<u128, RealizeError> {
    let bindings = bind(template);
    let mut count: u128 = 1;
    for (i, binding) in bindings.iter().enumerate() {
        count = count
            .checked_mul(binding.size() as u128)
            .ok_or(RealizeError::CountOverflow { bindings: i + 1 })?;
    }
    check_writable(template, &bindings)?;
    Ok(count)
}

/// Resolve every binding path for writing on a scratch copy.
fn check_writable(template: &Node, bindings: &[Binding<'_>]) -> Result<(), RealizeError> {
    if bindings.is_empty() {
        return Ok(());
    }
    let mut scratch = template.clone();
    for binding in bindings {
        if scratch.get_mut(&binding.path).is_none() {
            return Err(RealizeError::PathNotFound {
                path: binding.path.to_string(),
            });
        }
    }
    Ok(())
}
