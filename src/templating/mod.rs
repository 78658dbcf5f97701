//! Tera templating for manifest sources.
//!
//! This module turns the files of a [`Source`](crate::source::Source) into
//! rendered [`Object`](crate::core::Object)s.
//!
//! # Overview
//!
//! - [`loader`] - per-source lazy, thread-safe compilation ([`SourceHolder`])
//! - [`executor`] - template expansion and multi-document YAML decoding
//! - [`annotate`] - provenance annotations
//! - [`diagnostics`] - Tera error flattening and "did you mean" suggestions
//! - [`strict`] - undefined values in conditions are errors too
//!
//! # Template Syntax
//!
//! Templates use [Tera](https://keats.github.io/tera/) syntax and are rendered
//! with the merged values as top-level context:
//!
//! ```text
//! apiVersion: apps/v1
//! kind: Deployment
//! metadata:
//!   name: {{ name }}
//! spec:
//!   replicas: {{ replicas | default(value=1) }}
//! ```
//!
//! Lookups are strict: referencing a value that does not exist fails the
//! render instead of producing an empty string, including inside `{% if %}`
//! conditions. Use Tera's `default` filter or an `is defined` test when a
//! value is genuinely optional.
//!
//! # Include-only Templates
//!
//! Files whose name starts with `_` (for example `_helpers.yaml`) are compiled
//! with the rest of the set so they can be `{% include %}`d or
//! `{% import %}`ed, but they are never rendered on their own.

pub mod annotate;
pub mod diagnostics;
pub mod executor;
pub mod loader;
pub mod strict;

pub use annotate::annotate;
pub use executor::{RenderedTemplate, decode, render};
pub use loader::{CompiledTemplates, SourceHolder};
