// SPDX-License-Identifier: MIT

//! Thought (proposition) types: the atomic markdown notes in `thoughts/`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Epistemic confidence attached to a thought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Felt,
    Observed,
    Tested,
}

/// Frontmatter of a `thoughts/<slug>.md` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThoughtFrontmatter {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    pub created: DateTime<Utc>,
    /// `type: map` marks a thought as an aggregating map per the GLOSSARY.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ThoughtFrontmatter {
    pub fn is_map(&self) -> bool {
        self.kind.as_deref() == Some("map")
    }
}

/// A parsed thought: frontmatter plus body, identified by its filename slug.
#[derive(Debug, Clone, PartialEq)]
pub struct Thought {
    pub slug: String,
    pub frontmatter: ThoughtFrontmatter,
    pub body: String,
}

impl Thought {
    pub fn is_map(&self) -> bool {
        self.frontmatter.is_map()
    }
}

/// Canonicalize a wiki-link target per spec.md §6: lower-case, drop
/// `#anchor`, drop `|alias`, drop `.md`, drop any path prefix.
pub fn canonicalize_wiki_link(raw: &str) -> String {
    let without_alias = raw.split('|').next().unwrap_or(raw);
    let without_anchor = without_alias.split('#').next().unwrap_or(without_alias);
    let basename = without_anchor
        .rsplit('/')
        .next()
        .unwrap_or(without_anchor);
    let without_ext = basename.strip_suffix(".md").unwrap_or(basename);
    without_ext.trim().to_lowercase()
}

/// Extract every `[[wiki-link]]` target from a body of text, canonicalized.
/// Skips content inside fenced code blocks (` ``` `), per spec.md §4.11.
pub fn extract_wiki_links(body: &str) -> Vec<String> {
    let mut links = Vec::new();
    let mut in_fence = false;
    for line in body.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        let mut rest = line;
        while let Some(start) = rest.find("[[") {
            let after = &rest[start + 2..];
            if let Some(end) = after.find("]]") {
                let raw = &after[..end];
                links.push(canonicalize_wiki_link(raw));
                rest = &after[end + 2..];
            } else {
                break;
            }
        }
    }
    links
}

#[cfg(test)]
#[path = "thought_tests.rs"]
mod tests;
