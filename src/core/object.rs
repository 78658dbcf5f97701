//! Rendered manifest objects.
//!
//! An [`Object`] is one decoded YAML document: a JSON-style mapping with the
//! usual Kubernetes identity fields (`apiVersion`, `kind`, `metadata.name`,
//! `metadata.namespace`) plus arbitrary remaining content. Cloning an object
//! produces a fully independent deep copy.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A structured document produced by rendering a template.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Object {
    content: Map<String, Value>,
}

impl Object {
    /// Wrap an existing mapping.
    pub fn new(content: Map<String, Value>) -> Self {
        Self {
            content,
        }
    }

    /// Build an object from a JSON value, returning `None` unless it is a mapping.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(content) => Some(Self::new(content)),
            _ => None,
        }
    }

    /// The full content of the object.
    pub fn content(&self) -> &Map<String, Value> {
        &self.content
    }

    /// Mutable access to the full content of the object.
    pub fn content_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.content
    }

    /// Consume the object, returning its content.
    pub fn into_content(self) -> Map<String, Value> {
        self.content
    }

    /// `apiVersion`, if set to a string.
    pub fn api_version(&self) -> Option<&str> {
        self.content.get("apiVersion").and_then(Value::as_str)
    }

    /// `kind`, if set to a string.
    pub fn kind(&self) -> Option<&str> {
        self.content.get("kind").and_then(Value::as_str)
    }

    /// `metadata.name`, if set to a string.
    pub fn name(&self) -> Option<&str> {
        self.metadata_str("name")
    }

    /// `metadata.namespace`, if set to a string.
    pub fn namespace(&self) -> Option<&str> {
        self.metadata_str("namespace")
    }

    /// Value of the `metadata.labels[key]` label.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.metadata_map("labels")?.get(key).and_then(Value::as_str)
    }

    /// Value of the `metadata.annotations[key]` annotation.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata_map("annotations")?.get(key).and_then(Value::as_str)
    }

    /// The `metadata.annotations` mapping, if present.
    pub fn annotations(&self) -> Option<&Map<String, Value>> {
        self.metadata_map("annotations")
    }

    /// The `metadata.labels` mapping, if present.
    pub fn labels(&self) -> Option<&Map<String, Value>> {
        self.metadata_map("labels")
    }

    /// Upsert a label, creating `metadata.labels` as needed.
    pub fn set_label(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata_map_mut("labels").insert(key.into(), Value::String(value.into()));
    }

    /// Upsert an annotation, creating `metadata.annotations` as needed.
    pub fn set_annotation(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata_map_mut("annotations").insert(key.into(), Value::String(value.into()));
    }

    /// Set `metadata.namespace`.
    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        self.metadata_mut().insert("namespace".to_string(), Value::String(namespace.into()));
    }

    fn metadata_str(&self, key: &str) -> Option<&str> {
        self.content.get("metadata")?.get(key)?.as_str()
    }

    fn metadata_map(&self, key: &str) -> Option<&Map<String, Value>> {
        self.content.get("metadata")?.get(key)?.as_object()
    }

    // Replaces a non-mapping `metadata` with an empty mapping.
    fn metadata_mut(&mut self) -> &mut Map<String, Value> {
        let metadata =
            self.content.entry("metadata").or_insert_with(|| Value::Object(Map::new()));
        if !metadata.is_object() {
            *metadata = Value::Object(Map::new());
        }
        match metadata {
            Value::Object(map) => map,
            _ => unreachable!("metadata was just replaced with a mapping"),
        }
    }

    fn metadata_map_mut(&mut self, key: &str) -> &mut Map<String, Value> {
        let entry = self
            .metadata_mut()
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        match entry {
            Value::Object(map) => map,
            _ => unreachable!("entry was just replaced with a mapping"),
        }
    }
}

impl From<Map<String, Value>> for Object {
    fn from(content: Map<String, Value>) -> Self {
        Self::new(content)
    }
}
