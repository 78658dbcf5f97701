//! Built-in object filters.

use std::collections::BTreeSet;

use super::Filter;
use crate::core::Object;

/// Keeps objects whose `kind` is one of the given kinds.
#[derive(Debug, Clone)]
pub struct KindFilter {
    kinds: BTreeSet<String>,
}

impl KindFilter {
    /// Keep objects whose `kind` is one of `kinds`.
    pub fn new<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kinds: kinds.into_iter().map(Into::into).collect(),
        }
    }
}

impl Filter for KindFilter {
    fn accepts(&self, object: &Object) -> bool {
        object.kind().is_some_and(|kind| self.kinds.contains(kind))
    }
}

/// Keeps objects in one of the given namespaces.
///
/// An empty string matches objects without a namespace.
#[derive(Debug, Clone)]
pub struct NamespaceFilter {
    namespaces: BTreeSet<String>,
}

impl NamespaceFilter {
    /// Keep objects in one of `namespaces`.
    pub fn new<I, S>(namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            namespaces: namespaces.into_iter().map(Into::into).collect(),
        }
    }
}

impl Filter for NamespaceFilter {
    fn accepts(&self, object: &Object) -> bool {
        self.namespaces.contains(object.namespace().unwrap_or_default())
    }
}

/// Keeps objects carrying a label, optionally with a specific value.
#[derive(Debug, Clone)]
pub struct LabelFilter {
    key: String,
    value: Option<String>,
}

impl LabelFilter {
    /// Label `key` must be present, any value.
    pub fn exists(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    /// Label `key` must equal `value`.
    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }
}

impl Filter for LabelFilter {
    fn accepts(&self, object: &Object) -> bool {
        match (object.label(&self.key), &self.value) {
            (Some(actual), Some(expected)) => actual == expected,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

/// Keeps objects accepted by at least one inner filter.
pub struct AnyOf {
    filters: Vec<Box<dyn Filter>>,
}

impl AnyOf {
    /// Keep objects accepted by at least one of `filters`.
    pub fn new(filters: Vec<Box<dyn Filter>>) -> Self {
        Self {
            filters,
        }
    }
}

impl Filter for AnyOf {
    fn accepts(&self, object: &Object) -> bool {
        self.filters.iter().any(|filter| filter.accepts(object))
    }
}

/// Inverts a filter.
pub struct Not<F>(pub F);

impl<F: Filter> Filter for Not<F> {
    fn accepts(&self, object: &Object) -> bool {
        !self.0.accepts(object)
    }
}
