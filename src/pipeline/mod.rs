//! Post-render filter and transform stages.
//!
//! After every source has been rendered, the combined object set passes
//! through two ordered stages:
//!
//! 1. **Filtering** - an object is kept only if every [`Filter`] accepts it
//! 2. **Transforming** - each kept object passes through every [`Transformer`]
//!    in order, each one receiving the previous one's output
//!
//! Relative order of the surviving objects is preserved.
//!
//! Closures implement both traits, so ad-hoc stages need no new types:
//!
//! ```rust
//! use manifest_render::core::Object;
//! use manifest_render::pipeline::{Filter, Transformer, apply};
//! use serde_json::json;
//!
//! let objects = vec![
//!     Object::from_value(json!({"kind": "ConfigMap"})).unwrap(),
//!     Object::from_value(json!({"kind": "Secret"})).unwrap(),
//! ];
//!
//! let filters: Vec<Box<dyn Filter>> =
//!     vec![Box::new(|o: &Object| o.kind() != Some("Secret"))];
//! let transformers: Vec<Box<dyn Transformer>> = vec![Box::new(|mut o: Object| {
//!     o.set_label("env", "prod");
//!     o
//! })];
//!
//! let out = apply(objects, &filters, &transformers);
//! assert_eq!(out.len(), 1);
//! assert_eq!(out[0].label("env"), Some("prod"));
//! ```

pub mod filters;
pub mod transformers;

use tracing::debug;

use crate::core::Object;

pub use filters::{AnyOf, KindFilter, LabelFilter, NamespaceFilter, Not};
pub use transformers::{SetAnnotations, SetLabels, SetNamespace};

/// Predicate deciding whether an object is kept.
pub trait Filter: Send + Sync {
    /// `true` to keep `object`.
    fn accepts(&self, object: &Object) -> bool;
}

/// Rewrites an object's content.
pub trait Transformer: Send + Sync {
    /// Return the transformed object.
    fn apply(&self, object: Object) -> Object;
}

impl<F> Filter for F
where
    F: Fn(&Object) -> bool + Send + Sync,
{
    fn accepts(&self, object: &Object) -> bool {
        self(object)
    }
}

impl<F> Transformer for F
where
    F: Fn(Object) -> Object + Send + Sync,
{
    fn apply(&self, object: Object) -> Object {
        self(object)
    }
}

/// Run the filter stage, then the transform stage.
pub fn apply(
    objects: Vec<Object>,
    filters: &[Box<dyn Filter>],
    transformers: &[Box<dyn Transformer>],
) -> Vec<Object> {
    if filters.is_empty() && transformers.is_empty() {
        return objects;
    }

    let before = objects.len();
    let kept: Vec<Object> = objects
        .into_iter()
        .filter(|object| filters.iter().all(|filter| filter.accepts(object)))
        .collect();

    debug!("Filters kept {} of {} object(s)", kept.len(), before);

    kept.into_iter()
        .map(|object| transformers.iter().fold(object, |object, t| t.apply(object)))
        .collect()
}
