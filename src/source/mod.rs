//! Template sources and the file collections backing them.
//!
//! A [`Source`] names where templates come from: a read-only
//! [`FileCollection`], a glob selector picking member files out of it, and an
//! optional function producing the values those templates are rendered with.
//!
//! Two collections are provided:
//! - [`DirCollection`] - files under a directory on disk (walked with `walkdir`)
//! - [`MemoryCollection`] - an in-memory map of path to content
//!
//! # Examples
//!
//! ```rust
//! use manifest_render::source::{MemoryCollection, Source};
//! use manifest_render::values::values;
//! use serde_json::json;
//!
//! let files = MemoryCollection::new()
//!     .with_file("cm.yaml", "kind: ConfigMap\nmetadata:\n  name: {{ name }}\n");
//!
//! let source = Source::new(files, "*.yaml")
//!     .with_values(values(json!({"name": "demo"}).as_object().cloned().unwrap()));
//! assert!(source.validate().is_ok());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::trace;
use walkdir::WalkDir;

use crate::core::{RenderContext, RenderError};
use crate::values::{Values, ValuesFn};

/// A read-only collection of template files.
///
/// Paths are collection-relative and use `/` as separator on every platform.
pub trait FileCollection: Send + Sync + fmt::Debug {
    /// List every file path in the collection.
    fn list(&self) -> Result<Vec<String>>;

    /// Read the content of the file at `path`.
    fn read(&self, path: &str) -> Result<String>;
}

/// Files under a directory on disk.
///
/// The directory is walked on each [`list`](FileCollection::list) call;
/// symlinks are not followed.
#[derive(Debug, Clone)]
pub struct DirCollection {
    root: PathBuf,
}

impl DirCollection {
    /// A collection rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// The directory this collection reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileCollection for DirCollection {
    fn list(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            anyhow::bail!("template directory does not exist: {}", self.root.display());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = entry
                .with_context(|| format!("Failed to walk directory: {}", self.root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                let relative = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                trace!("Listed file: {}", relative);
                files.push(relative);
            }
        }
        Ok(files)
    }

    fn read(&self, path: &str) -> Result<String> {
        let full = self.root.join(path);
        std::fs::read_to_string(&full)
            .with_context(|| format!("Failed to read template file: {}", full.display()))
    }
}

/// An in-memory file collection.
#[derive(Debug, Clone, Default)]
pub struct MemoryCollection {
    files: BTreeMap<String, String>,
}

impl MemoryCollection {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a file, builder style.
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    /// Add (or replace) a file.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    /// Number of files in the collection.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the collection holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileCollection for MemoryCollection {
    fn list(&self) -> Result<Vec<String>> {
        Ok(self.files.keys().cloned().collect())
    }

    fn read(&self, path: &str) -> Result<String> {
        self.files.get(path).cloned().ok_or_else(|| anyhow::anyhow!("file not found: {path}"))
    }
}

/// A template origin: file collection, selector pattern and value supplier.
#[derive(Clone, Default)]
pub struct Source {
    /// Collection holding the templates
    pub files: Option<Arc<dyn FileCollection>>,
    /// Glob pattern selecting template files within `files`
    pub pattern: String,
    /// Produces the values declared by this source
    pub values: Option<ValuesFn>,
}

impl Source {
    /// A source reading `pattern` out of `files`, with no declared values.
    pub fn new(files: impl FileCollection + 'static, pattern: impl Into<String>) -> Self {
        Self {
            files: Some(Arc::new(files)),
            pattern: pattern.into(),
            values: None,
        }
    }

    /// A source backed by an already shared collection.
    pub fn from_shared(files: Arc<dyn FileCollection>, pattern: impl Into<String>) -> Self {
        Self {
            files: Some(files),
            pattern: pattern.into(),
            values: None,
        }
    }

    /// Set the value function.
    pub fn with_values(mut self, values: ValuesFn) -> Self {
        self.values = Some(values);
        self
    }

    /// Check that the source has a collection and a non-blank pattern.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.files.is_none() {
            return Err(RenderError::validation("file collection is required"));
        }
        if self.pattern.trim().is_empty() {
            return Err(RenderError::validation("pattern must not be empty"));
        }
        Ok(())
    }

    /// Invoke the value function, or return empty values when there is none.
    pub fn resolve_values(&self, ctx: &RenderContext) -> Result<Values, RenderError> {
        match &self.values {
            Some(f) => f(ctx).map_err(|source| RenderError::Values {
                pattern: self.pattern.clone(),
                source,
            }),
            None => Ok(Values::new()),
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("files", &self.files)
            .field("pattern", &self.pattern)
            .field("values", &self.values.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
