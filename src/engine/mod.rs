//! Aggregation of several renderers behind one render call.
//!
//! An [`Engine`] calls each registered [`Renderer`] in registration order,
//! concatenates their objects and runs its own filter and transform stages
//! over the combined set. A renderer's failure aborts the call and is
//! reported as [`RenderError::Renderer`] naming the failing renderer.
//!
//! ```rust
//! use manifest_render::core::RenderContext;
//! use manifest_render::engine::new_engine;
//! use manifest_render::renderer::RendererOptions;
//! use manifest_render::source::{MemoryCollection, Source};
//! use manifest_render::values::Values;
//!
//! # fn example() -> Result<(), manifest_render::core::RenderError> {
//! let files = MemoryCollection::new().with_file("ns.yaml", "kind: Namespace\nmetadata:\n  name: demo\n");
//! let engine = new_engine(Source::new(files, "*.yaml"), RendererOptions::new())?;
//!
//! let objects = engine.render(&RenderContext::new(), &Values::new())?;
//! assert_eq!(objects[0].kind(), Some("Namespace"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use std::fmt;

use tracing::debug;

use crate::core::{Object, RenderContext, RenderError};
use crate::pipeline::{self, Filter, Transformer};
use crate::renderer::{RendererOptions, TemplateRenderer};
use crate::source::Source;
use crate::values::Values;

/// Something that turns values into manifest objects.
pub trait Renderer: Send + Sync {
    /// Short identifier used in error reports.
    fn name(&self) -> &str;

    /// Produce objects for one render call.
    fn process(&self, ctx: &RenderContext, values: &Values) -> Result<Vec<Object>, RenderError>;
}

/// Runs registered renderers and post-processes their combined output.
pub struct Engine {
    renderers: Vec<Box<dyn Renderer>>,
    filters: Vec<Box<dyn Filter>>,
    transformers: Vec<Box<dyn Transformer>>,
}

impl Engine {
    /// Start building an engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Render with every renderer, in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Cancelled`] if `ctx` is done before a renderer
    /// starts, or [`RenderError::Renderer`] wrapping the first renderer
    /// failure. No partial output is returned.
    pub fn render(&self, ctx: &RenderContext, values: &Values) -> Result<Vec<Object>, RenderError> {
        let mut objects = Vec::new();
        for renderer in &self.renderers {
            if let Some(err) = ctx.err() {
                return Err(err.into());
            }
            let produced = renderer.process(ctx, values).map_err(|err| RenderError::Renderer {
                renderer: renderer.name().to_string(),
                source: Box::new(err),
            })?;
            debug!("Renderer '{}' produced {} object(s)", renderer.name(), produced.len());
            objects.extend(produced);
        }

        Ok(pipeline::apply(objects, &self.filters, &self.transformers))
    }

    /// Number of registered renderers.
    pub fn renderer_count(&self) -> usize {
        self.renderers.len()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("renderers", &self.renderers.iter().map(|r| r.name()).collect::<Vec<_>>())
            .field("filters", &self.filters.len())
            .field("transformers", &self.transformers.len())
            .finish()
    }
}

/// Builder for [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    renderers: Vec<Box<dyn Renderer>>,
    filters: Vec<Box<dyn Filter>>,
    transformers: Vec<Box<dyn Transformer>>,
}

impl EngineBuilder {
    /// Register a renderer.
    pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderers.push(Box::new(renderer));
        self
    }

    /// Add an engine-level filter.
    pub fn filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Add an engine-level transformer.
    pub fn transformer(mut self, transformer: impl Transformer + 'static) -> Self {
        self.transformers.push(Box::new(transformer));
        self
    }

    /// Finish building.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Validation`] if no renderer was registered.
    pub fn build(self) -> Result<Engine, RenderError> {
        if self.renderers.is_empty() {
            return Err(RenderError::validation("engine requires at least one renderer"));
        }
        Ok(Engine {
            renderers: self.renderers,
            filters: self.filters,
            transformers: self.transformers,
        })
    }
}

/// An engine with a single [`TemplateRenderer`] over `source`.
pub fn new_engine(source: Source, options: RendererOptions) -> Result<Engine, RenderError> {
    let renderer = TemplateRenderer::new(vec![source], options)?;
    Engine::builder().renderer(renderer).build()
}
