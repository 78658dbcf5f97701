//! manifest-render - Tera-based manifest rendering
//!
//! Renders Kubernetes-style manifests from Tera templates. A renderer is
//! configured with one or more template sources; each render call merges the
//! caller's values over every source's declared values, expands the selected
//! templates, decodes the output as YAML objects and runs the combined set
//! through filter and transform stages.
//!
//! # Architecture Overview
//!
//! ```text
//! Source (files + pattern + values fn)
//!    │
//!    ▼
//! SourceHolder ── compile once (RwLock) ──► CompiledTemplates (Tera)
//!    │
//!    ▼
//! merge values ─► cache key ─► cache hit? ──yes──► copy of cached objects
//!                                 │ no
//!                                 ▼
//!                      render ─► decode YAML ─► annotate ─► cache copy
//!    │
//!    ▼
//! concatenate all sources ─► filters ─► transformers ─► Vec<Object>
//! ```
//!
//! ## Key Features
//!
//! - **Strict templates**: referencing an undefined value is an error, with
//!   "did you mean" suggestions drawn from the merged values
//! - **Lazy, shared compilation**: each source is compiled on first use,
//!   exactly once, even under concurrent first calls
//! - **Render cache**: TTL cache keyed by selector and a structural hash of
//!   the merged values, or by selector alone
//! - **Include-only templates**: files whose name starts with `_` can be
//!   included or imported but are never rendered on their own
//! - **Provenance**: optional annotations naming the renderer, selector and
//!   template behind every object
//!
//! # Core Modules
//!
//! - [`renderer`] - [`TemplateRenderer`](renderer::TemplateRenderer) and its options
//! - [`engine`] - combining several renderers behind one call
//! - [`source`] - template sources and file collections
//! - [`templating`] - compilation, execution, decoding and annotation
//! - [`cache`] - render cache and key strategies
//! - [`pipeline`] - filters and transformers
//! - [`values`] - value trees and deep merge
//! - [`config`] - building a renderer from a TOML file
//! - [`core`] - objects, render context and errors
//!
//! # Example
//!
//! ```rust
//! use manifest_render::core::RenderContext;
//! use manifest_render::pipeline::SetLabels;
//! use manifest_render::renderer::{RendererOptions, TemplateRenderer};
//! use manifest_render::source::{MemoryCollection, Source};
//! use manifest_render::values::Values;
//! use serde_json::json;
//!
//! # fn example() -> Result<(), manifest_render::core::RenderError> {
//! let files = MemoryCollection::new()
//!     .with_file("_helpers.yaml", "{% macro fullname(app) %}{{ app }}-svc{% endmacro fullname %}")
//!     .with_file(
//!         "svc.yaml",
//!         "{% import \"_helpers.yaml\" as h %}kind: Service\nmetadata:\n  name: {{ h::fullname(app=app) }}\n",
//!     );
//!
//! let renderer = TemplateRenderer::new(
//!     vec![Source::new(files, "*.yaml")],
//!     RendererOptions::new().with_transformer(SetLabels::new([("env", "prod")])),
//! )?;
//!
//! let values: Values = json!({"app": "web"}).as_object().cloned().unwrap();
//! let objects = renderer.process(&RenderContext::new(), &values)?;
//! assert_eq!(objects[0].name(), Some("web-svc"));
//! assert_eq!(objects[0].label("env"), Some("prod"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// Core functionality modules
pub mod cache;
pub mod config;
pub mod constants;
pub mod core;

// Rendering
pub mod engine;
pub mod renderer;
pub mod templating;

// Inputs and post-processing
pub mod pattern;
pub mod pipeline;
pub mod source;
pub mod values;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::core::{Object, RenderContext, RenderError};
pub use crate::engine::{Engine, Renderer, new_engine};
pub use crate::renderer::{RendererOptions, TemplateRenderer};
pub use crate::source::Source;
pub use crate::values::Values;
