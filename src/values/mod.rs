//! Value trees and deep merging.
//!
//! Templates are rendered against a [`Values`] mapping built by deep-merging
//! the values declared by a [`Source`](crate::source::Source) with the
//! values supplied on each render call.
//!
//! # Merge Rules
//!
//! - When both sides hold a mapping at a key, the mappings are merged recursively
//! - Otherwise the override replaces the base value wholesale (sequences are
//!   never merged element-wise, and a scalar may replace a mapping or vice versa)
//! - Keys absent from the override keep the base value
//!
//! Neither input is modified; the merge always builds a fresh tree, so a
//! source's declared values can be shared across concurrent renders.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::core::RenderContext;

/// A value tree: string keys mapping to scalars, sequences or nested mappings.
pub type Values = Map<String, Value>;

/// Function producing a source's declared values for one render call.
///
/// The function receives the caller's [`RenderContext`] and should return
/// promptly (ideally with an error) once the context is cancelled.
pub type ValuesFn = Arc<dyn Fn(&RenderContext) -> anyhow::Result<Values> + Send + Sync>;

/// Build a [`ValuesFn`] that always returns `values`.
///
/// # Examples
///
/// ```rust
/// use manifest_render::core::RenderContext;
/// use manifest_render::values::values;
/// use serde_json::json;
///
/// let f = values(json!({"replicas": 3}).as_object().cloned().unwrap());
/// let resolved = f(&RenderContext::new()).unwrap();
/// assert_eq!(resolved["replicas"], 3);
/// ```
pub fn values(values: Values) -> ValuesFn {
    Arc::new(move |_ctx: &RenderContext| Ok(values.clone()))
}

/// Deep-merge `overrides` on top of `base`, returning a new tree.
pub fn merge(base: &Values, overrides: &Values) -> Values {
    let mut merged = base.clone();
    for (key, value) in overrides {
        let combined = match (merged.get(key), value) {
            (Some(Value::Object(base_map)), Value::Object(override_map)) => {
                Value::Object(merge(base_map, override_map))
            }
            _ => value.clone(),
        };
        merged.insert(key.clone(), combined);
    }
    merged
}

/// Parse a YAML document into a value tree.
///
/// An empty document yields an empty tree; anything other than a mapping at
/// the top level is an error.
pub fn from_yaml_str(content: &str) -> anyhow::Result<Values> {
    if content.trim().is_empty() {
        return Ok(Values::new());
    }
    let value: Value = serde_yaml::from_str(content)?;
    match value {
        Value::Null => Ok(Values::new()),
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("values must be a mapping, found {}", type_name(&other)),
    }
}

/// Collect the dotted paths of every leaf and intermediate mapping in `values`.
///
/// Used to offer suggestions when a template references an undefined variable.
pub(crate) fn dotted_paths(values: &Values) -> Vec<String> {
    fn walk(prefix: &str, map: &Values, out: &mut Vec<String>) {
        for (key, value) in map {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            if let Value::Object(nested) = value {
                walk(&path, nested, out);
            }
            out.push(path);
        }
    }

    let mut out = Vec::new();
    walk("", values, &mut out);
    out
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
