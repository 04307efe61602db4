// SPDX-License-Identifier: MIT

//! Shared "does this activity string mention this commitment label" logic,
//! used by both [`crate::commitment_evaluator`] and [`crate::drift`].

use vh_perception::tokenize;

/// Whether `text` counts as mentioning `label`: either the full lowercased
/// label appears as a substring, or at least half of the label's own
/// tokens appear in `text`'s tokens.
pub fn mentions(label: &str, text: &str) -> bool {
    let lower = text.to_lowercase();
    if lower.contains(&label.to_lowercase()) {
        return true;
    }
    let label_tokens = tokenize(label);
    if label_tokens.is_empty() {
        return false;
    }
    let text_tokens = tokenize(text);
    let hits = label_tokens.iter().filter(|t| text_tokens.contains(*t)).count();
    hits as f64 / label_tokens.len() as f64 >= 0.5
}

/// Count of `strings` that mention `label`.
pub fn count_mentions<'a>(label: &str, strings: impl Iterator<Item = &'a String>) -> usize {
    strings.filter(|s| mentions(label, s)).count()
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
