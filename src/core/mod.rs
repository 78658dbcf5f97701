//! Core types shared by every stage of a render.
//!
//! - [`RenderError`] - the typed error returned by renderers and engines
//! - [`RenderContext`] - cancellation handle passed to source value functions
//! - [`Object`] - a rendered, decoded manifest document

pub mod context;
pub mod error;
pub mod object;

pub use context::{ContextError, RenderContext};
pub use error::RenderError;
pub use object::Object;
