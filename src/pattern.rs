//! Glob selectors identifying template files inside a file collection.
//!
//! A source's selector is a glob pattern matched against collection-relative
//! paths that always use `/` as separator.
//!
//! # Pattern Syntax
//!
//! - `*` matches any sequence of characters within a single path component
//! - `**` matches any sequence of path components (recursive matching)
//! - `?` matches any single character
//! - `[abc]` / `[a-z]` match a character set or range
//!
//! Unlike a plain [`glob::Pattern::matches`], `*` never crosses a `/`, so
//! `templates/*.yaml` does not pick up `templates/nested/x.yaml`.
//!
//! # Examples
//!
//! ```rust
//! use manifest_render::pattern::Selector;
//!
//! # fn example() -> anyhow::Result<()> {
//! let selector = Selector::new("templates/*.yaml")?;
//!
//! assert!(selector.matches("templates/deployment.yaml"));
//! assert!(!selector.matches("templates/nested/service.yaml"));
//! assert!(!selector.matches("values.yaml"));
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use tracing::{debug, trace};

use crate::constants::PARTIAL_PREFIX;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A compiled glob selector.
///
/// # Thread Safety
///
/// `Selector` is immutable after construction and can be shared freely.
#[derive(Debug, Clone)]
pub struct Selector {
    pattern: Pattern,
    original_pattern: String,
}

impl Selector {
    /// Compile a selector from a glob pattern string.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern contains invalid glob syntax.
    pub fn new(pattern_str: &str) -> Result<Self> {
        let pattern = Pattern::new(pattern_str)
            .with_context(|| format!("Invalid glob pattern: {pattern_str}"))?;

        Ok(Self {
            pattern,
            original_pattern: pattern_str.to_string(),
        })
    }

    /// Checks if a collection-relative path matches the selector.
    pub fn matches(&self, path: &str) -> bool {
        self.pattern.matches_with(path, MATCH_OPTIONS)
    }

    /// Filter `paths` down to those matching the selector, sorted and deduplicated.
    pub fn select<I, S>(&self, paths: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matches: Vec<String> = paths
            .into_iter()
            .filter(|path| {
                let path = path.as_ref();
                let hit = self.matches(path);
                trace!("Checking path: {} (match: {})", path, hit);
                hit
            })
            .map(|path| path.as_ref().to_string())
            .collect();

        matches.sort();
        matches.dedup();

        debug!("Found {} matches for pattern '{}'", matches.len(), self.original_pattern);
        matches
    }

    /// Returns the original pattern string used to create this selector.
    pub fn pattern(&self) -> &str {
        &self.original_pattern
    }
}

/// Whether `path` names an include-only partial (its file name starts with `_`).
pub fn is_partial(path: &str) -> bool {
    path.rsplit('/').next().is_some_and(|name| name.starts_with(PARTIAL_PREFIX))
}
