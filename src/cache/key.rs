//! Cache key derivation for rendered template sets.
//!
//! A cache key identifies a `(selector, merged values)` pair. Two strategies
//! are provided:
//!
//! - [`default_key`] hashes the selector together with the full value tree.
//!   Values participate structurally: mapping key order never changes the key,
//!   while any difference in a leaf does.
//! - [`path_key`] uses the selector alone, collapsing every value variant onto
//!   one cache slot. Only correct when output does not depend on values, or
//!   when coarse invalidation is acceptable; it also keeps sensitive values
//!   out of key material.
//!
//! Custom strategies are plain functions wrapped in a [`KeyFn`].

use std::sync::Arc;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::values::Values;

/// Input to cache key derivation.
#[derive(Debug, Clone, Copy)]
pub struct TemplateSpec<'a> {
    /// Selector pattern of the source
    pub path: &'a str,
    /// Merged values the source is rendered with
    pub values: &'a Values,
}

impl PartialEq for TemplateSpec<'_> {
    fn eq(&self, other: &Self) -> bool {
        // serde_json::Map equality is key-order independent
        self.path == other.path && self.values == other.values
    }
}

impl Eq for TemplateSpec<'_> {}

/// Function deriving a cache key from a [`TemplateSpec`].
pub type KeyFn = Arc<dyn for<'a> Fn(&TemplateSpec<'a>) -> String + Send + Sync>;

/// Structural, order-independent SHA-256 key over selector and values.
///
/// # Returns
///
/// A string in the format `"sha256:<hex>"`.
///
/// # Examples
///
/// ```rust
/// use manifest_render::cache::{TemplateSpec, default_key};
/// use serde_json::json;
///
/// let a = json!({"x": 1, "y": 2}).as_object().cloned().unwrap();
/// let b = json!({"y": 2, "x": 1}).as_object().cloned().unwrap();
///
/// let ka = default_key(&TemplateSpec { path: "*.yaml", values: &a });
/// let kb = default_key(&TemplateSpec { path: "*.yaml", values: &b });
/// assert_eq!(ka, kb);
/// assert!(ka.starts_with("sha256:"));
/// ```
pub fn default_key(spec: &TemplateSpec<'_>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"path:");
    hash_str(&mut hasher, spec.path);
    hasher.update(b"values:");
    hash_map(&mut hasher, spec.values);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

/// Selector-only key: every value variant shares one cache slot.
pub fn path_key(spec: &TemplateSpec<'_>) -> String {
    format!("path:{}", spec.path)
}

/// [`default_key`] as a [`KeyFn`].
pub fn default_key_fn() -> KeyFn {
    Arc::new(default_key)
}

/// [`path_key`] as a [`KeyFn`].
pub fn path_key_fn() -> KeyFn {
    Arc::new(path_key)
}

// Every node is type-tagged and every string length-prefixed so distinct
// trees can never produce the same byte stream.
fn hash_value(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Null => hasher.update(b"n"),
        Value::Bool(b) => hasher.update(if *b { b"t" } else { b"f" }),
        Value::Number(n) => {
            hasher.update(b"#");
            hash_str(hasher, &n.to_string());
        }
        Value::String(s) => {
            hasher.update(b"s");
            hash_str(hasher, s);
        }
        Value::Array(items) => {
            hasher.update(b"[");
            hasher.update((items.len() as u64).to_be_bytes());
            for item in items {
                hash_value(hasher, item);
            }
        }
        Value::Object(map) => hash_map(hasher, map),
    }
}

fn hash_map(hasher: &mut Sha256, map: &Values) {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    hasher.update(b"{");
    hasher.update((keys.len() as u64).to_be_bytes());
    for key in keys {
        hash_str(hasher, key);
        hash_value(hasher, &map[key.as_str()]);
    }
}

fn hash_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_be_bytes());
    hasher.update(s.as_bytes());
}
