//! Construction-time configuration for [`TemplateRenderer`](super::TemplateRenderer).
//!
//! Options are built up with consuming `with_*` methods and frozen when the
//! renderer is created.
//!
//! ```rust
//! use manifest_render::cache::{CacheOptions, path_key_fn};
//! use manifest_render::pipeline::{KindFilter, SetLabels};
//! use manifest_render::renderer::RendererOptions;
//! use std::time::Duration;
//!
//! let options = RendererOptions::new()
//!     .with_filter(KindFilter::new(["Deployment", "Service"]))
//!     .with_transformer(SetLabels::new([("env", "prod")]))
//!     .with_cache(CacheOptions::with_ttl(Duration::from_secs(60)).key_fn(path_key_fn()))
//!     .with_source_annotations(true);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{Cache, CacheOptions, KeyFn, TtlCache};
use crate::constants::DEFAULT_CACHE_TTL;
use crate::pipeline::{Filter, Transformer};

/// Filters, transformers, cache and annotation settings for a renderer.
pub struct RendererOptions {
    pub(crate) filters: Vec<Box<dyn Filter>>,
    pub(crate) transformers: Vec<Box<dyn Transformer>>,
    pub(crate) cache: Option<Arc<dyn Cache>>,
    pub(crate) cache_ttl: Duration,
    pub(crate) key_fn: Option<KeyFn>,
    pub(crate) source_annotations: bool,
}

impl RendererOptions {
    /// No filters, no transformers, no cache, annotations off.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            transformers: Vec::new(),
            cache: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            key_fn: None,
            source_annotations: false,
        }
    }

    /// Append a filter; filters run in the order they are added.
    pub fn with_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Append a transformer; transformers run in the order they are added.
    pub fn with_transformer(mut self, transformer: impl Transformer + 'static) -> Self {
        self.transformers.push(Box::new(transformer));
        self
    }

    /// Enable caching with a renderer-owned [`TtlCache`].
    pub fn with_cache(mut self, options: CacheOptions) -> Self {
        self.cache = Some(Arc::new(TtlCache::new()));
        self.cache_ttl = options.ttl;
        if options.key_fn.is_some() {
            self.key_fn = options.key_fn;
        }
        self
    }

    /// Enable caching with a caller-supplied cache.
    ///
    /// The cache may be shared between renderers. Each renderer scopes its
    /// keys, so sharing saves allocations but never entries.
    pub fn with_cache_instance(mut self, cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        self.cache = Some(cache);
        self.cache_ttl = ttl;
        self
    }

    /// Override the cache key strategy.
    pub fn with_key_fn(mut self, key_fn: KeyFn) -> Self {
        self.key_fn = Some(key_fn);
        self
    }

    /// Toggle provenance annotations on rendered objects.
    pub fn with_source_annotations(mut self, enabled: bool) -> Self {
        self.source_annotations = enabled;
        self
    }
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RendererOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererOptions")
            .field("filters", &self.filters.len())
            .field("transformers", &self.transformers.len())
            .field("cache", &self.cache)
            .field("cache_ttl", &self.cache_ttl)
            .field("key_fn", &self.key_fn.as_ref().map(|_| "<fn>"))
            .field("source_annotations", &self.source_annotations)
            .finish()
    }
}
