// SPDX-License-Identifier: MIT

//! Lenient YAML-frontmatter + markdown-body parsing.
//!
//! Every function here is total: malformed input never returns `Err`, it
//! returns a best-effort result plus a list of [`Warning`]s, per spec.md
//! §4.1 and the design note in §9.

use vh_core::{Confidence, Thought, ThoughtFrontmatter, Warning};

const DELIMITER: &str = "---";

/// Split `text` into (raw YAML frontmatter, body). Returns an empty
/// frontmatter string when no `---` fence is present — the file is treated
/// as body-only, never an error.
pub fn split_frontmatter(text: &str) -> (&str, &str) {
    let trimmed_start = text.trim_start_matches('\u{feff}');
    let Some(rest) = trimmed_start.strip_prefix(DELIMITER) else {
        return ("", text);
    };
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    let Some(end) = rest.find("\n---") else {
        return ("", text);
    };
    let yaml = &rest[..end];
    let after = &rest[end + 4..];
    let body = after.strip_prefix('\n').unwrap_or(after);
    (yaml, body)
}

/// Parse raw YAML into a `serde_yaml::Value`, falling back to an empty
/// mapping plus a warning on any parse error.
pub fn parse_yaml_lenient(path: &str, raw: &str) -> (serde_yaml::Value, Vec<Warning>) {
    if raw.trim().is_empty() {
        return (serde_yaml::Value::Mapping(Default::default()), Vec::new());
    }
    match serde_yaml::from_str::<serde_yaml::Value>(raw) {
        Ok(value) => (value, Vec::new()),
        Err(e) => (
            serde_yaml::Value::Mapping(Default::default()),
            vec![Warning::new(path, format!("malformed YAML frontmatter: {e}"))],
        ),
    }
}

/// Read a string-list field that may be a YAML sequence (`topics: [a, b]`
/// or block list form) or an inline comma-separated scalar (`topics: a, b`),
/// per spec.md §4.1's "topics field accepts either YAML list or inline
/// array syntax".
pub fn read_string_list(value: &serde_yaml::Value, key: &str) -> Vec<String> {
    let Some(field) = value.get(key) else {
        return Vec::new();
    };
    match field {
        serde_yaml::Value::Sequence(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        serde_yaml::Value::String(s) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn read_str<'a>(value: &'a serde_yaml::Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(|v| v.as_str())
}

fn parse_confidence(raw: Option<&str>) -> Option<Confidence> {
    match raw {
        Some("felt") => Some(Confidence::Felt),
        Some("observed") => Some(Confidence::Observed),
        Some("tested") => Some(Confidence::Tested),
        _ => None,
    }
}

/// Parse a `thoughts/<slug>.md` file's full text into a [`Thought`].
/// Missing `id`/`description`/`created` fall back to the slug, an empty
/// description, and the current parse time respectively — never an error.
pub fn parse_thought(path: &str, slug: &str, text: &str) -> (Thought, Vec<Warning>) {
    let (raw_yaml, body) = split_frontmatter(text);
    let (value, mut warnings) = parse_yaml_lenient(path, raw_yaml);

    let id = read_str(&value, "id").unwrap_or(slug).to_string();
    let description = read_str(&value, "description").unwrap_or_default().to_string();
    let topics = read_string_list(&value, "topics");
    let confidence = parse_confidence(read_str(&value, "confidence"));
    let sources = {
        let s = read_string_list(&value, "sources");
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    };
    let kind = read_str(&value, "type").map(str::to_string);

    let created = match value.get("created").and_then(|v| v.as_str()) {
        Some(raw) => match chrono::DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => dt.with_timezone(&chrono::Utc),
            Err(_) => {
                warnings.push(Warning::new(path, format!("malformed `created` timestamp: {raw}")));
                chrono::Utc::now()
            }
        },
        None => chrono::Utc::now(),
    };

    let frontmatter = ThoughtFrontmatter {
        id,
        description,
        topics,
        confidence,
        sources,
        created,
        kind,
    };

    (
        Thought {
            slug: slug.to_string(),
            frontmatter,
            body: body.to_string(),
        },
        warnings,
    )
}

/// Serialize a thought's frontmatter + body back to markdown text. The
/// canonical key set (`id`, `description`, `topics`, `confidence`, `sources`,
/// `created`, `type`) round-trips through [`parse_thought`] exactly.
pub fn write_thought(thought: &Thought) -> String {
    let fm = &thought.frontmatter;
    let mut out = String::from("---\n");
    out.push_str(&format!("id: {}\n", fm.id));
    out.push_str(&format!("description: {}\n", fm.description));
    if fm.topics.is_empty() {
        out.push_str("topics: []\n");
    } else {
        out.push_str("topics:\n");
        for topic in &fm.topics {
            out.push_str(&format!("  - {topic}\n"));
        }
    }
    if let Some(confidence) = fm.confidence {
        let raw = match confidence {
            Confidence::Felt => "felt",
            Confidence::Observed => "observed",
            Confidence::Tested => "tested",
        };
        out.push_str(&format!("confidence: {raw}\n"));
    }
    if let Some(sources) = &fm.sources {
        out.push_str("sources:\n");
        for source in sources {
            out.push_str(&format!("  - {source}\n"));
        }
    }
    out.push_str(&format!("created: {}\n", fm.created.to_rfc3339()));
    if let Some(kind) = &fm.kind {
        out.push_str(&format!("type: {kind}\n"));
    }
    out.push_str("---\n");
    out.push_str(&thought.body);
    out
}

#[cfg(test)]
#[path = "frontmatter_tests.rs"]
mod tests;
