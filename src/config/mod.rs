//! Renderer configuration files.
//!
//! A renderer can be described in TOML instead of being assembled in code:
//!
//! ```toml
//! source_annotations = true
//!
//! [cache]
//! ttl_secs = 300
//! key = "full"          # or "path"
//!
//! [[sources]]
//! dir = "templates"     # relative to the base directory given to `build`
//! pattern = "**/*.yaml"
//! values_file = "values.yaml"
//!
//! [sources.values]      # inline values, merged over `values_file`
//! replicas = 3
//! ```
//!
//! Omitting `[cache]` disables caching. Values files are read once, when the
//! renderer is built.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::{CacheOptions, path_key_fn};
use crate::constants::DEFAULT_CACHE_TTL;
use crate::renderer::{RendererOptions, TemplateRenderer};
use crate::source::{DirCollection, Source};
use crate::values::{self, Values, merge};

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RendererConfig {
    /// Stamp provenance annotations on rendered objects
    #[serde(default)]
    pub source_annotations: bool,

    /// Render cache; disabled when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheConfig>,

    /// Template sources, rendered in order
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

/// `[cache]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    #[serde(default)]
    pub key: KeyStrategy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            key: KeyStrategy::default(),
        }
    }
}

const fn default_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL.as_secs()
}

/// Cache key strategy named in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStrategy {
    /// Selector plus full merged values
    #[default]
    Full,
    /// Selector only
    Path,
}

/// One `[[sources]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Template directory
    pub dir: PathBuf,

    /// Glob selecting templates within `dir`
    pub pattern: String,

    /// YAML file with declared values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_file: Option<PathBuf>,

    /// Inline declared values
    #[serde(default, skip_serializing_if = "toml::Table::is_empty")]
    pub values: toml::Table,
}

impl RendererConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse renderer configuration")
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read renderer config from {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse renderer config from {}", path.display()))
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize renderer configuration")
    }

    /// Build a renderer, resolving relative paths against `base_dir`.
    ///
    /// # Errors
    ///
    /// Fails if a values file cannot be read or parsed, inline values cannot
    /// be converted, or a source is rejected by [`TemplateRenderer::new`].
    pub fn build(&self, base_dir: &Path) -> Result<TemplateRenderer> {
        let mut sources = Vec::with_capacity(self.sources.len());
        for (index, entry) in self.sources.iter().enumerate() {
            let declared = entry
                .declared_values(base_dir)
                .with_context(|| format!("Invalid values for source {index} ({})", entry.pattern))?;
            let dir = base_dir.join(&entry.dir);
            debug!("Configured source {}: {} in {}", index, entry.pattern, dir.display());
            sources.push(
                Source::new(DirCollection::new(dir), entry.pattern.clone())
                    .with_values(values::values(declared)),
            );
        }

        let mut options = RendererOptions::new().with_source_annotations(self.source_annotations);
        if let Some(cache) = &self.cache {
            let mut cache_options = CacheOptions::with_ttl(Duration::from_secs(cache.ttl_secs));
            if cache.key == KeyStrategy::Path {
                cache_options = cache_options.key_fn(path_key_fn());
            }
            options = options.with_cache(cache_options);
        }

        Ok(TemplateRenderer::new(sources, options)?)
    }
}

impl SourceConfig {
    fn declared_values(&self, base_dir: &Path) -> Result<Values> {
        let from_file = match &self.values_file {
            Some(file) => {
                let path = base_dir.join(file);
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read values file {}", path.display()))?;
                values::from_yaml_str(&content)
                    .with_context(|| format!("Failed to parse values file {}", path.display()))?
            }
            None => Values::new(),
        };

        let inline = table_to_values(&self.values)?;
        Ok(merge(&from_file, &inline))
    }
}

/// Convert inline TOML values into a value tree.
///
/// Datetimes become their RFC 3339 text, as they would be in a YAML values
/// file. Non-finite floats have no JSON form and are rejected.
fn table_to_values(table: &toml::Table) -> Result<Values> {
    table
        .iter()
        .map(|(key, value)| -> Result<(String, serde_json::Value)> {
            let converted =
                toml_to_json(value).with_context(|| format!("Invalid inline value `{key}`"))?;
            Ok((key.clone(), converted))
        })
        .collect()
}

fn toml_to_json(value: &toml::Value) -> Result<serde_json::Value> {
    use serde_json::Value as Json;

    Ok(match value {
        toml::Value::String(s) => Json::String(s.clone()),
        toml::Value::Integer(i) => Json::from(*i),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Json::Number)
            .with_context(|| format!("{f} cannot be represented as a value"))?,
        toml::Value::Boolean(b) => Json::Bool(*b),
        toml::Value::Datetime(dt) => Json::String(dt.to_string()),
        toml::Value::Array(items) => {
            Json::Array(items.iter().map(toml_to_json).collect::<Result<_>>()?)
        }
        toml::Value::Table(table) => Json::Object(table_to_values(table)?),
    })
}
