//! Global constants used throughout the manifest-render codebase.
//!
//! Annotation keys, the renderer identity and cache defaults live here so
//! that every module (and downstream consumers matching on provenance)
//! refer to the same values.

use std::time::Duration;

/// Name reported by the Tera template renderer.
///
/// Used as the provenance "source type" value and by the engine when
/// wrapping renderer failures.
pub const RENDERER_NAME: &str = "tera";

/// Annotation recording which renderer kind produced an object.
pub const ANNOTATION_SOURCE_TYPE: &str = "manifest-render.io/source-type";

/// Annotation recording the selector pattern of the source that produced an object.
pub const ANNOTATION_SOURCE_PATH: &str = "manifest-render.io/source-path";

/// Annotation recording the template (collection-relative path) that produced an object.
pub const ANNOTATION_SOURCE_FILE: &str = "manifest-render.io/source-file";

/// Default time-to-live for cached render results (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Prefix of file names that are registered as include-only partials.
///
/// `_helpers.tera` can be `{% include %}`d or `{% import %}`ed by other
/// templates but is never rendered on its own.
pub const PARTIAL_PREFIX: char = '_';

/// Maximum number of "did you mean" suggestions attached to an undefined
/// variable error.
pub const MAX_VARIABLE_SUGGESTIONS: usize = 3;

/// Maximum allowed Levenshtein distance as a percentage of the variable length
/// for a value path to be suggested.
pub const SIMILARITY_THRESHOLD_PERCENT: usize = 50;
