// SPDX-License-Identifier: MIT

//! Lowercase tokenization and overlap scoring shared across admission and
//! evaluation. No stemming, no unicode segmentation beyond ASCII
//! word-splitting — the corpus here is short titles and notes, not prose.

use std::collections::HashSet;

/// Closed stopword list. Small and English-only by design: this is scoring
/// a personal vault's own vocabulary, not general-purpose NLP.
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "that", "with", "this", "from", "have", "has", "had",
    "was", "were", "are", "is", "be", "been", "being", "will", "would", "could",
    "should", "can", "not", "but", "you", "your", "they", "them", "their",
    "what", "when", "where", "which", "who", "how", "into", "about", "than",
    "then", "there", "here", "its", "it", "our", "his", "her", "she", "him",
    "a", "an", "of", "to", "in", "on", "at", "by", "as", "or", "if", "so",
];

/// Tokenize text into lowercase words of length ≥ 3, dropping stopwords.
/// Returns a deduplicated set.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(|word| word.to_lowercase())
        .filter(|word| word.len() >= 3 && !STOPWORDS.contains(&word.as_str()))
        .collect()
}

/// Fraction of `phrases` whose own tokens intersect `capture_tokens` at all.
/// Empty `phrases` contributes 0 — an absent context dimension never
/// inflates the score.
pub fn overlap_ratio(phrases: &[String], capture_tokens: &HashSet<String>) -> f64 {
    if phrases.is_empty() {
        return 0.0;
    }
    let matching = phrases
        .iter()
        .filter(|phrase| {
            let phrase_tokens = tokenize(phrase);
            !phrase_tokens.is_disjoint(capture_tokens)
        })
        .count();
    matching as f64 / phrases.len() as f64
}

#[cfg(test)]
#[path = "tokenize_tests.rs"]
mod tests;
