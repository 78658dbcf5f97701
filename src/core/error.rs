//! Error handling for manifest rendering
//!
//! Every failure surfaced by [`TemplateRenderer::process`] is a [`RenderError`].
//! Variants map one-to-one onto the stage that failed, and each carries the
//! selector pattern (and template name where one exists) so a failure can be
//! diagnosed without re-running the render.
//!
//! # Error Categories
//!
//! - [`RenderError::Validation`] - malformed source or engine configuration
//! - [`RenderError::Values`] - a source's value function failed or was cancelled
//! - [`RenderError::Parse`] - no templates matched, or template syntax is invalid
//! - [`RenderError::Execution`] - template expansion failed (including undefined variables)
//! - [`RenderError::Decode`] - rendered text is not valid YAML objects
//! - [`RenderError::Cancelled`] - the render context was cancelled between sources
//! - [`RenderError::Renderer`] - a renderer registered with an [`Engine`] failed
//!
//! [`TemplateRenderer::process`]: crate::renderer::TemplateRenderer::process
//! [`Engine`]: crate::engine::Engine

use thiserror::Error;

use super::context::ContextError;

/// The error type for all render operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Configuration rejected at construction time.
    #[error("invalid configuration: {message}")]
    Validation {
        /// What was wrong with the configuration
        message: String,
    },

    /// The value-producing function of a source failed.
    #[error("failed to resolve values for source '{pattern}': {source}")]
    Values {
        /// Selector pattern of the failing source
        pattern: String,
        /// Underlying failure reported by the value function
        #[source]
        source: anyhow::Error,
    },

    /// Templates could not be enumerated or compiled.
    #[error("failed to parse templates (pattern: {pattern}): {message}")]
    Parse {
        /// Selector pattern of the failing source
        pattern: String,
        /// Description of the parse failure
        message: String,
    },

    /// A template failed while being expanded against the merged values.
    #[error("failed to execute template '{template}' (pattern: {pattern}): {message}")]
    Execution {
        /// Selector pattern of the failing source
        pattern: String,
        /// Name of the template that failed
        template: String,
        /// Undefined variable, when the failure was a strict-lookup violation
        variable: Option<String>,
        /// Similar value paths that exist in the merged values
        suggestions: Vec<String>,
        /// Cleaned-up engine error message
        message: String,
    },

    /// Rendered text could not be decoded into objects.
    #[error("failed to decode output of template '{template}' (pattern: {pattern}): {message}")]
    Decode {
        /// Selector pattern of the failing source
        pattern: String,
        /// Name of the template whose output was malformed
        template: String,
        /// Decoder error message
        message: String,
    },

    /// The render context was cancelled before all sources were processed.
    #[error("render cancelled: {0}")]
    Cancelled(#[from] ContextError),

    /// A renderer registered with an engine failed.
    #[error("renderer '{renderer}' failed: {source}")]
    Renderer {
        /// Name of the failing renderer
        renderer: String,
        /// The renderer's own error
        #[source]
        source: Box<RenderError>,
    },
}

impl RenderError {
    /// Shorthand for a [`RenderError::Validation`] error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Returns `true` when the failure was an undefined variable lookup.
    #[must_use]
    pub fn is_undefined_variable(&self) -> bool {
        match self {
            Self::Execution {
                variable,
                ..
            } => variable.is_some(),
            Self::Renderer {
                source,
                ..
            } => source.is_undefined_variable(),
            _ => false,
        }
    }

    /// Format the error with any "did you mean" suggestions appended.
    pub fn format_with_context(&self) -> String {
        match self {
            Self::Execution {
                variable: Some(variable),
                suggestions,
                ..
            } if !suggestions.is_empty() => {
                format!(
                    "{self}\n  variable '{variable}' is not defined; did you mean: {}?",
                    suggestions.join(", ")
                )
            }
            Self::Renderer {
                renderer,
                source,
            } => format!("renderer '{renderer}' failed: {}", source.format_with_context()),
            _ => self.to_string(),
        }
    }
}
