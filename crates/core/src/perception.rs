// SPDX-License-Identifier: MIT

//! Shared perception types: captures, context, and policy configuration.
//! The admission algorithm itself lives in `vh-perception`; these types are
//! here so `vh-adapters`' `FeedSource` trait can depend on them without a
//! cycle back into the scoring crate.

use crate::id::SourceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single item captured by a feed source poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedCapture {
    pub id: String,
    #[serde(rename = "sourceId")]
    pub source_id: SourceId,
    #[serde(rename = "capturedAt")]
    pub captured_at: DateTime<Utc>,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    #[serde(rename = "rawRelevanceScore", default)]
    pub raw_relevance_score: f64,
}

impl FeedCapture {
    /// Deterministic slug for `inbox/<slug>.md`, derived from the title.
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }
}

/// Convert arbitrary text into a filesystem-safe slug: lowercase,
/// non-alphanumerics collapsed to single hyphens, trimmed.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_was_hyphen = false;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen && !slug.is_empty() {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// Context against which captures are scored for identity-relevance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerceptionContext {
    pub commitment_labels: Vec<String>,
    pub identity_themes: Vec<String>,
    pub vault_topics: Vec<String>,
    pub recent_thoughts: Vec<String>,
}

/// Tunable admission policy, per spec.md §4.4.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerceptionPolicy {
    pub max_signals_per_channel: usize,
    pub umwelt_budget_lines: usize,
    pub relevance_floor: f64,
    pub brief_threshold: f64,
    pub max_inbox_writes_per_cycle: usize,
}

impl Default for PerceptionPolicy {
    fn default() -> Self {
        Self {
            max_signals_per_channel: 3,
            umwelt_budget_lines: 50,
            relevance_floor: 0.3,
            brief_threshold: 0.6,
            max_inbox_writes_per_cycle: 10,
        }
    }
}

/// A noise alert: a source that has been mostly filtered for several
/// consecutive days, per spec.md §4.4.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseAlert {
    #[serde(rename = "sourceId")]
    pub source_id: SourceId,
    #[serde(rename = "filterRate")]
    pub filter_rate: f64,
    #[serde(rename = "consecutiveDays")]
    pub consecutive_days: u32,
    pub recommendation: String,
}

#[cfg(test)]
#[path = "perception_tests.rs"]
mod tests;
