//! Lazy, thread-safe template compilation per source.
//!
//! Each configured [`Source`] is wrapped in a [`SourceHolder`] that compiles
//! its templates on first use and keeps the result for the holder's lifetime.
//!
//! # Locking
//!
//! The compiled set lives behind an [`RwLock`]:
//! 1. Fast path: take the read lock; if compiled, return immediately
//! 2. Slow path: take the write lock, check again (another caller may have
//!    compiled while we waited), and only then compile
//!
//! Only a successful compile is stored. A failure is returned to the caller
//! and the next call tries again; a stored success is never replaced, so a
//! backing collection that changes after the first compile is not observed.

use std::sync::{Arc, PoisonError, RwLock};

use tera::Tera;
use tracing::{debug, warn};

use super::diagnostics::format_tera_error;
use super::strict;
use crate::core::RenderError;
use crate::pattern::{Selector, is_partial};
use crate::source::Source;

/// A compiled set of templates for one source.
pub struct CompiledTemplates {
    tera: Tera,
    executable: Vec<String>,
    partials: Vec<String>,
}

impl CompiledTemplates {
    /// Compile every file of `source` matched by its selector.
    ///
    /// All files (partials included) are registered in one batch so includes,
    /// imports and inheritance across files resolve. Autoescaping is disabled:
    /// output is YAML, not HTML. Conditions are then made strict about
    /// undefined values (see [`strict`]).
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Parse`] if the selector is invalid, the collection
    /// cannot be listed or read, nothing executable matched, or any template
    /// has a syntax error.
    pub fn compile(source: &Source) -> Result<Self, RenderError> {
        let pattern = source.pattern.as_str();
        let parse_error = |message: String| RenderError::Parse {
            pattern: pattern.to_string(),
            message,
        };

        let files = source
            .files
            .as_ref()
            .ok_or_else(|| parse_error("source has no file collection".to_string()))?;
        let selector = Selector::new(pattern).map_err(|e| parse_error(format!("{e:#}")))?;
        let listed = files.list().map_err(|e| parse_error(format!("{e:#}")))?;
        let matched = selector.select(listed);

        if matched.is_empty() {
            return Err(parse_error("pattern matches no files".to_string()));
        }

        let mut templates = Vec::with_capacity(matched.len());
        for path in &matched {
            let content = files.read(path).map_err(|e| parse_error(format!("{e:#}")))?;
            templates.push((path.clone(), content));
        }

        let (partials, executable): (Vec<String>, Vec<String>) =
            matched.into_iter().partition(|path| is_partial(path));

        if executable.is_empty() {
            return Err(parse_error(format!(
                "pattern matches only include-only templates ({})",
                partials.join(", ")
            )));
        }

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(templates).map_err(|e| parse_error(format_tera_error(&e)))?;
        strict::harden(&mut tera);

        debug!(
            "Compiled {} template(s) for pattern '{}' ({} include-only)",
            executable.len(),
            pattern,
            partials.len()
        );

        Ok(Self {
            tera,
            executable,
            partials,
        })
    }

    /// Names of the templates rendered directly, in deterministic order.
    pub fn executable(&self) -> &[String] {
        &self.executable
    }

    /// Names of include-only templates.
    pub fn partials(&self) -> &[String] {
        &self.partials
    }

    pub(crate) fn tera(&self) -> &Tera {
        &self.tera
    }
}

impl std::fmt::Debug for CompiledTemplates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledTemplates")
            .field("executable", &self.executable)
            .field("partials", &self.partials)
            .finish()
    }
}

/// A [`Source`] plus its lazily compiled templates.
#[derive(Debug)]
pub struct SourceHolder {
    source: Source,
    templates: RwLock<Option<Arc<CompiledTemplates>>>,
}

impl SourceHolder {
    /// Wrap a validated source.
    pub fn new(source: Source) -> Self {
        Self {
            source,
            templates: RwLock::new(None),
        }
    }

    /// The wrapped source.
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// The selector pattern of the wrapped source.
    pub fn pattern(&self) -> &str {
        &self.source.pattern
    }

    /// Whether templates have been compiled successfully.
    pub fn is_loaded(&self) -> bool {
        self.templates.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Return the compiled templates, compiling them on first use.
    ///
    /// Thread-safe: concurrent first callers compile exactly once.
    pub fn load(&self) -> Result<Arc<CompiledTemplates>, RenderError> {
        // Lock poisoning only means another caller panicked mid-compile; the
        // slot still holds either nothing or a complete success.
        if let Some(templates) =
            self.templates.read().unwrap_or_else(PoisonError::into_inner).as_ref()
        {
            return Ok(Arc::clone(templates));
        }

        let mut slot = self.templates.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(templates) = slot.as_ref() {
            return Ok(Arc::clone(templates));
        }

        match CompiledTemplates::compile(&self.source) {
            Ok(compiled) => {
                let compiled = Arc::new(compiled);
                *slot = Some(Arc::clone(&compiled));
                Ok(compiled)
            }
            Err(err) => {
                warn!("Template compilation failed for '{}': {}", self.source.pattern, err);
                Err(err)
            }
        }
    }
}
