//! Built-in object transformers.

use std::collections::BTreeMap;

use super::Transformer;
use crate::core::Object;

/// Upserts a fixed set of labels.
#[derive(Debug, Clone)]
pub struct SetLabels {
    labels: BTreeMap<String, String>,
}

impl SetLabels {
    pub fn new<I, K, V>(labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl Transformer for SetLabels {
    fn apply(&self, mut object: Object) -> Object {
        for (key, value) in &self.labels {
            object.set_label(key.clone(), value.clone());
        }
        object
    }
}

/// Upserts a fixed set of annotations.
#[derive(Debug, Clone)]
pub struct SetAnnotations {
    annotations: BTreeMap<String, String>,
}

impl SetAnnotations {
    pub fn new<I, K, V>(annotations: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            annotations: annotations.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl Transformer for SetAnnotations {
    fn apply(&self, mut object: Object) -> Object {
        for (key, value) in &self.annotations {
            object.set_annotation(key.clone(), value.clone());
        }
        object
    }
}

/// Sets `metadata.namespace`, optionally leaving already-namespaced objects alone.
#[derive(Debug, Clone)]
pub struct SetNamespace {
    namespace: String,
    overwrite: bool,
}

impl SetNamespace {
    /// Always set the namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            overwrite: true,
        }
    }

    /// Only set the namespace on objects that have none.
    pub fn if_missing(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            overwrite: false,
        }
    }
}

impl Transformer for SetNamespace {
    fn apply(&self, mut object: Object) -> Object {
        if self.overwrite || object.namespace().is_none() {
            object.set_namespace(self.namespace.clone());
        }
        object
    }
}
