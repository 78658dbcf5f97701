//! Turning Tera errors into actionable render errors.
//!
//! Tera reports failures as a chain of messages ("Failed to render 'x'" →
//! "Variable `image.tag` not found in context while rendering 'x'"). This
//! module flattens that chain, recognises undefined-variable failures and
//! suggests similar value paths that do exist.

use std::sync::LazyLock;

use regex::Regex;
use strsim::levenshtein;

use super::strict::STRICT_TRUTHY_FN;

use crate::constants::{MAX_VARIABLE_SUGGESTIONS, SIMILARITY_THRESHOLD_PERCENT};
use crate::core::RenderError;
use crate::values::{Values, dotted_paths};

static VARIABLE_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [r"Variable `([^`]+)` not found", r"Unknown variable `([^`]+)`"]
        .map(|pattern| Regex::new(pattern).expect("variable pattern is a valid regex"))
});

/// Flatten a Tera error and its sources into one readable message.
pub fn format_tera_error(error: &tera::Error) -> String {
    use std::error::Error;

    let mut messages: Vec<String> = Vec::new();
    let mut current: Option<&dyn Error> = Some(error as &dyn Error);
    while let Some(err) = current {
        let msg = err.to_string().trim().to_string();
        // The strict condition wrapper is an implementation detail.
        let internal = msg.contains(STRICT_TRUTHY_FN);
        if !msg.is_empty() && !internal && !messages.contains(&msg) {
            messages.push(msg);
        }
        current = err.source();
    }

    if messages.is_empty() {
        "template error (no details available)".to_string()
    } else {
        messages.join(": ")
    }
}

/// Extract the variable name from an undefined-variable message.
pub fn extract_variable_name(message: &str) -> Option<String> {
    VARIABLE_PATTERNS.iter().find_map(|re| {
        re.captures(message).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
    })
}

/// Find value paths similar to `target` using Levenshtein distance.
pub fn find_similar_variables(target: &str, available: &[String]) -> Vec<String> {
    let mut scored: Vec<_> =
        available.iter().map(|var| (var.clone(), levenshtein(target, var))).collect();

    scored.sort_by(|(a_var, a_dist), (b_var, b_dist)| {
        a_dist.cmp(b_dist).then_with(|| a_var.cmp(b_var))
    });

    let threshold = (target.len() * SIMILARITY_THRESHOLD_PERCENT / 100).max(1);
    scored
        .into_iter()
        .filter(|(_, dist)| *dist <= threshold)
        .take(MAX_VARIABLE_SUGGESTIONS)
        .map(|(var, _)| var)
        .collect()
}

/// Build a [`RenderError::Execution`] for a failed template expansion.
pub fn execution_error(
    error: &tera::Error,
    pattern: &str,
    template: &str,
    values: &Values,
) -> RenderError {
    let message = format_tera_error(error);
    let variable = extract_variable_name(&message);
    let suggestions = variable
        .as_deref()
        .map(|name| find_similar_variables(name, &dotted_paths(values)))
        .unwrap_or_default();

    RenderError::Execution {
        pattern: pattern.to_string(),
        template: template.to_string(),
        variable,
        suggestions,
        message,
    }
}
