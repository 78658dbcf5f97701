//! The Tera manifest renderer.
//!
//! [`TemplateRenderer`] ties every stage together. For each configured source,
//! in configuration order:
//!
//! 1. Resolve the source's declared values (its value function sees the
//!    caller's [`RenderContext`])
//! 2. Deep-merge the render-time values on top
//! 3. Derive a cache key from the selector and merged values
//! 4. On a cache hit, use a copy of the cached objects; on a miss, compile
//!    (once per source), render, annotate, and cache a copy
//!
//! The per-source object sets are concatenated and passed once through the
//! filter and transform stages.
//!
//! # Failure Semantics
//!
//! The first error from any stage of any source aborts the call; objects from
//! sources that already succeeded are discarded. Nothing is retried
//! internally.
//!
//! # Caching
//!
//! What is cached is the per-source object set *before* filters and
//! transformers run, so the pipeline always applies to fresh copies.
//!
//! Keys are `<renderer scope>/<source index>/<key>`. The scope is unique per
//! renderer instance, so a cache shared through
//! [`RendererOptions::with_cache_instance`] never serves one renderer's
//! objects to another, and two sources with the same selector over different
//! collections never collide.
//!
//! # Thread Safety
//!
//! A renderer is `Send + Sync`; share one instance across threads with an
//! `Arc` and call [`process`](TemplateRenderer::process) concurrently.
//!
//! # Examples
//!
//! ```rust
//! use manifest_render::core::RenderContext;
//! use manifest_render::renderer::{RendererOptions, TemplateRenderer};
//! use manifest_render::source::{MemoryCollection, Source};
//! use manifest_render::values::{Values, values};
//! use serde_json::json;
//!
//! # fn example() -> Result<(), manifest_render::core::RenderError> {
//! let files = MemoryCollection::new().with_file(
//!     "cm.yaml",
//!     "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: {{ name }}\n",
//! );
//! let source = Source::new(files, "*.yaml")
//!     .with_values(values(json!({"name": "default"}).as_object().cloned().unwrap()));
//!
//! let renderer = TemplateRenderer::new(vec![source], RendererOptions::new())?;
//!
//! let overrides: Values = json!({"name": "override"}).as_object().cloned().unwrap();
//! let objects = renderer.process(&RenderContext::new(), &overrides)?;
//! assert_eq!(objects[0].name(), Some("override"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod options;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, trace};

use crate::cache::{Cache, KeyFn, TemplateSpec, default_key};
use crate::constants::RENDERER_NAME;
use crate::core::{Object, RenderContext, RenderError};
use crate::engine::Renderer;
use crate::pipeline::{self, Filter, Transformer};
use crate::source::Source;
use crate::templating::{SourceHolder, annotate, render};
use crate::values::{Values, merge};

pub use options::RendererOptions;

static NEXT_CACHE_SCOPE: AtomicU64 = AtomicU64::new(0);

/// Renders Tera template sources into manifest objects.
pub struct TemplateRenderer {
    scope: u64,
    holders: Vec<SourceHolder>,
    filters: Vec<Box<dyn Filter>>,
    transformers: Vec<Box<dyn Transformer>>,
    cache: Option<Arc<dyn Cache>>,
    cache_ttl: Duration,
    key_fn: Option<KeyFn>,
    source_annotations: bool,
}

impl TemplateRenderer {
    /// Create a renderer over `sources`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Validation`] if any source lacks a file
    /// collection or has a blank pattern. Templates are not read here; they
    /// are compiled on first use.
    pub fn new(sources: Vec<Source>, options: RendererOptions) -> Result<Self, RenderError> {
        let mut holders = Vec::with_capacity(sources.len());
        for (index, source) in sources.into_iter().enumerate() {
            source.validate().map_err(|err| match err {
                RenderError::Validation {
                    message,
                } => RenderError::validation(format!("source {index}: {message}")),
                other => other,
            })?;
            holders.push(SourceHolder::new(source));
        }

        let RendererOptions {
            filters,
            transformers,
            cache,
            cache_ttl,
            key_fn,
            source_annotations,
        } = options;

        Ok(Self {
            scope: NEXT_CACHE_SCOPE.fetch_add(1, Ordering::Relaxed),
            holders,
            filters,
            transformers,
            cache,
            cache_ttl,
            key_fn,
            source_annotations,
        })
    }

    /// The renderer kind, reported for diagnostics.
    pub fn name(&self) -> &'static str {
        RENDERER_NAME
    }

    /// Number of configured sources.
    pub fn source_count(&self) -> usize {
        self.holders.len()
    }

    /// Render every source with `values` layered over its declared values.
    ///
    /// # Errors
    ///
    /// - [`RenderError::Cancelled`] if `ctx` is done before a source starts
    /// - [`RenderError::Values`] if a source's value function fails
    /// - [`RenderError::Parse`] if a source's templates cannot be compiled
    /// - [`RenderError::Execution`] if a template fails to expand
    /// - [`RenderError::Decode`] if rendered output is not valid YAML objects
    pub fn process(
        &self,
        ctx: &RenderContext,
        values: &Values,
    ) -> Result<Vec<Object>, RenderError> {
        let mut objects = Vec::new();
        for (index, holder) in self.holders.iter().enumerate() {
            if let Some(err) = ctx.err() {
                return Err(err.into());
            }
            objects.extend(self.render_source(ctx, index, holder, values)?);
        }

        Ok(pipeline::apply(objects, &self.filters, &self.transformers))
    }

    fn render_source(
        &self,
        ctx: &RenderContext,
        index: usize,
        holder: &SourceHolder,
        render_values: &Values,
    ) -> Result<Vec<Object>, RenderError> {
        let pattern = holder.pattern();
        let source_values = holder.source().resolve_values(ctx)?;
        let merged = merge(&source_values, render_values);

        let cache_key = self.cache.as_ref().map(|_| {
            let spec = TemplateSpec {
                path: pattern,
                values: &merged,
            };
            let key = match &self.key_fn {
                Some(key_fn) => key_fn(&spec),
                None => default_key(&spec),
            };
            format!("{}/{}/{}", self.scope, index, key)
        });

        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            if let Some(objects) = cache.get(key) {
                debug!("Cache hit for pattern '{}' ({} object(s))", pattern, objects.len());
                return Ok(objects);
            }
            trace!("Cache miss for pattern '{}' (key: {})", pattern, key);
        }

        let templates = holder.load()?;
        let rendered = render(&templates, pattern, &merged)?;

        let mut objects = Vec::new();
        for mut template in rendered {
            if self.source_annotations {
                annotate(&mut template.objects, pattern, &template.name);
            }
            objects.append(&mut template.objects);
        }

        if let (Some(cache), Some(key)) = (&self.cache, cache_key) {
            cache.set(key, objects.clone(), self.cache_ttl);
        }

        debug!("Rendered {} object(s) for pattern '{}'", objects.len(), pattern);
        Ok(objects)
    }
}

impl Renderer for TemplateRenderer {
    fn name(&self) -> &str {
        RENDERER_NAME
    }

    fn process(&self, ctx: &RenderContext, values: &Values) -> Result<Vec<Object>, RenderError> {
        TemplateRenderer::process(self, ctx, values)
    }
}

impl fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRenderer")
            .field("scope", &self.scope)
            .field("holders", &self.holders)
            .field("filters", &self.filters.len())
            .field("transformers", &self.transformers.len())
            .field("cache", &self.cache)
            .field("cache_ttl", &self.cache_ttl)
            .field("source_annotations", &self.source_annotations)
            .finish()
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
