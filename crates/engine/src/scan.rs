// SPDX-License-Identifier: MIT

//! Reads `thoughts/*.md` off disk into [`ThoughtNode`]s for the graph-impact
//! pass (C11) and the perception context (4a). Per spec.md §4.9's graph
//! topology context: a thought is classified as a "map" when its frontmatter
//! carries `type: map`.

use chrono::{DateTime, Utc};
use vh_evaluate::thought_evaluator::ThoughtNode;
use vh_storage::Vault;

pub(crate) fn scan_thoughts(vault: &Vault) -> Vec<ThoughtNode> {
    let Ok(paths) = vault.list_md(&vault.thoughts_dir()) else {
        return Vec::new();
    };

    let mut nodes = Vec::new();
    for path in paths {
        let Ok(Some(text)) = vault.read(&path) else { continue };
        let slug = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let (thought, warnings) = vh_storage::frontmatter::parse_thought(&path.display().to_string(), &slug, &text);
        for warning in warnings {
            tracing::warn!(path = %warning.path, message = %warning.message, "thought frontmatter warning");
        }

        let mtime = vault
            .stat(&path)
            .and_then(|m| m.modified().ok())
            .map(DateTime::<Utc>::from)
            .unwrap_or(thought.frontmatter.created);

        nodes.push(ThoughtNode {
            slug: thought.slug,
            is_map: thought.frontmatter.kind.as_deref() == Some("map"),
            confidence: thought.frontmatter.confidence,
            created: thought.frontmatter.created,
            mtime,
            body: thought.body,
            topics: thought.frontmatter.topics,
        });
    }
    nodes
}

#[cfg(test)]
#[path = "scan_tests.rs"]
mod tests;
