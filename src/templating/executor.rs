//! Template execution and YAML decoding.
//!
//! Every directly executable template of a [`CompiledTemplates`] set is
//! rendered against the merged values, and its output decoded as a stream of
//! YAML documents. Empty documents (a bare `---`, comment-only sections, or a
//! template whose conditionals produced nothing) are skipped; every other
//! document must be a mapping.

use serde::Deserialize;
use serde_json::Value;
use tera::Context as TeraContext;
use tracing::{debug, trace};

use super::diagnostics::execution_error;
use super::loader::CompiledTemplates;
use crate::core::{Object, RenderError};
use crate::values::Values;

/// Objects produced by one template.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTemplate {
    /// Template name (collection-relative path)
    pub name: String,
    /// Decoded objects, in document order
    pub objects: Vec<Object>,
}

/// Render every executable template and decode its output.
///
/// Templates are processed in the order reported by
/// [`CompiledTemplates::executable`]; the first failure aborts.
///
/// # Errors
///
/// - [`RenderError::Execution`] if a template fails to expand, including
///   references to undefined values
/// - [`RenderError::Decode`] if the output is not a stream of YAML mappings
pub fn render(
    templates: &CompiledTemplates,
    pattern: &str,
    values: &Values,
) -> Result<Vec<RenderedTemplate>, RenderError> {
    let mut context = TeraContext::new();
    for (key, value) in values {
        context.insert(key.as_str(), value);
    }

    let mut rendered = Vec::with_capacity(templates.executable().len());
    for name in templates.executable() {
        let text = templates
            .tera()
            .render(name, &context)
            .map_err(|e| execution_error(&e, pattern, name, values))?;

        trace!("Rendered template '{}' ({} bytes)", name, text.len());

        let objects = decode(&text).map_err(|message| RenderError::Decode {
            pattern: pattern.to_string(),
            template: name.clone(),
            message,
        })?;

        debug!("Template '{}' produced {} object(s)", name, objects.len());
        rendered.push(RenderedTemplate {
            name: name.clone(),
            objects,
        });
    }

    Ok(rendered)
}

/// Decode a multi-document YAML stream into objects.
///
/// Returns the decoder's message on failure.
pub fn decode(text: &str) -> Result<Vec<Object>, String> {
    let mut objects = Vec::new();
    if text.trim().is_empty() {
        return Ok(objects);
    }
    for (index, document) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let value = Value::deserialize(document).map_err(|e| e.to_string())?;
        match value {
            Value::Null => continue,
            Value::Object(content) => objects.push(Object::new(content)),
            other => {
                let found = match other {
                    Value::Bool(_) => "a boolean",
                    Value::Number(_) => "a number",
                    Value::String(_) => "a string",
                    _ => "a sequence",
                };
                return Err(format!("document {} is {found}, expected a mapping", index + 1));
            }
        }
    }
    Ok(objects)
}
