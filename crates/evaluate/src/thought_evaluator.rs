// SPDX-License-Identifier: MIT

//! `ThoughtEvaluator` (C11): per spec.md §4.11 and the graph-topology
//! context spec.md §4.9 asks the morning brief to include. Operates over
//! already-read thought data (slug, frontmatter, body, file mtime); the
//! filesystem scan itself lives in `vh-engine`, which supplies
//! [`ThoughtNode`]s built from `vh-storage` reads.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use vh_core::{extract_wiki_links, Confidence};

/// Grace period below which a thought's age contributes no penalty.
const AGE_GRACE_DAYS: i64 = 7;
const AGE_PENALTY_PER_DAY: f64 = 0.01;
const INCOMING_LINK_WEIGHT: f64 = 1.0;
const MAP_MEMBERSHIP_WEIGHT: f64 = 2.0;
const THIN_MAP_THRESHOLD: usize = 5;
const SINK_NODE_MIN_INCOMING: usize = 3;
const SINK_NODE_MAX_OUTGOING: usize = 1;

/// One thought (or map) as read from disk, ready for graph analysis.
#[derive(Debug, Clone)]
pub struct ThoughtNode {
    pub slug: String,
    pub is_map: bool,
    pub confidence: Option<Confidence>,
    pub created: DateTime<Utc>,
    pub mtime: DateTime<Utc>,
    pub body: String,
    pub topics: Vec<String>,
}

impl ThoughtNode {
    fn outgoing_links(&self) -> Vec<String> {
        extract_wiki_links(&self.body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImpactEntry {
    pub slug: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImpactReport {
    pub top: Vec<ImpactEntry>,
    pub orphans: Vec<String>,
    pub orphan_rate: f64,
    pub avg_impact_score: f64,
}

fn incoming_link_count(slug: &str, nodes: &[ThoughtNode]) -> usize {
    nodes.iter().filter(|n| n.outgoing_links().iter().any(|l| l == slug)).count()
}

fn map_membership_count(slug: &str, nodes: &[ThoughtNode]) -> usize {
    nodes
        .iter()
        .filter(|n| n.is_map && n.outgoing_links().iter().any(|l| l == slug))
        .count()
}

fn days_since_last_incoming_link(slug: &str, nodes: &[ThoughtNode], now: DateTime<Utc>) -> f64 {
    let newest = nodes
        .iter()
        .filter(|n| n.outgoing_links().iter().any(|l| l == slug))
        .map(|n| n.mtime)
        .max();
    match newest {
        Some(mtime) => (now - mtime).num_days().max(0) as f64,
        None => (now - DateTime::<Utc>::from_timestamp(0, 0).unwrap_or(now)).num_days() as f64,
    }
}

fn age_days(created: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created).num_days().max(0)
}

fn impact_score(node: &ThoughtNode, all: &[ThoughtNode], now: DateTime<Utc>) -> f64 {
    let incoming = incoming_link_count(&node.slug, all) as f64 * INCOMING_LINK_WEIGHT;
    let memberships = map_membership_count(&node.slug, all) as f64 * MAP_MEMBERSHIP_WEIGHT;
    let age = age_days(node.created, now);
    let penalty = if age < AGE_GRACE_DAYS {
        0.0
    } else {
        AGE_PENALTY_PER_DAY * days_since_last_incoming_link(&node.slug, all, now)
    };
    incoming + memberships - penalty
}

/// Compute impact scores and aggregates over the whole thought graph.
pub fn evaluate_thoughts(nodes: &[ThoughtNode], now: DateTime<Utc>) -> ImpactReport {
    let mut entries: Vec<ImpactEntry> = nodes
        .iter()
        .map(|n| ImpactEntry {
            slug: n.slug.clone(),
            score: impact_score(n, nodes, now),
        })
        .collect();
    entries.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let orphans: Vec<String> = nodes
        .iter()
        .zip(entries.iter())
        .filter(|(n, e)| e.score <= 0.0 && age_days(n.created, now) > AGE_GRACE_DAYS)
        .map(|(n, _)| n.slug.clone())
        .collect();

    let orphan_rate = if nodes.is_empty() {
        0.0
    } else {
        orphans.len() as f64 / nodes.len() as f64
    };

    let avg_impact_score = if entries.is_empty() {
        0.0
    } else {
        entries.iter().map(|e| e.score).sum::<f64>() / entries.len() as f64
    };

    let top = entries.into_iter().take(10).collect();

    ImpactReport {
        top,
        orphans,
        orphan_rate,
        avg_impact_score,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapSummary {
    pub slug: String,
    pub backlink_count: usize,
    pub open_questions: Vec<String>,
    pub is_thin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfidenceDistribution {
    pub felt: usize,
    pub observed: usize,
    pub tested: usize,
    pub unspecified: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SinkNode {
    pub slug: String,
    pub incoming: usize,
    pub outgoing: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphTopology {
    pub maps: Vec<MapSummary>,
    pub confidence_distribution: ConfidenceDistribution,
    pub sink_nodes: Vec<SinkNode>,
}

/// Extract the bullet lines under a `## Open Questions` heading, stopping
/// at the next `##` heading or end of body.
fn extract_open_questions(body: &str) -> Vec<String> {
    let mut questions = Vec::new();
    let mut in_section = false;
    for line in body.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("## ") {
            in_section = trimmed.trim_start_matches("## ").trim().eq_ignore_ascii_case("open questions");
            continue;
        }
        if in_section {
            if let Some(bullet) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
                questions.push(bullet.trim().to_string());
            }
        }
    }
    questions
}

/// Build the graph-topology context the morning brief uses: map summaries,
/// the confidence distribution across plain thoughts, and sink nodes.
pub fn graph_topology(nodes: &[ThoughtNode]) -> GraphTopology {
    let maps: Vec<MapSummary> = nodes
        .iter()
        .filter(|n| n.is_map)
        .map(|n| {
            let backlink_count = incoming_link_count(&n.slug, nodes);
            MapSummary {
                slug: n.slug.clone(),
                backlink_count,
                open_questions: extract_open_questions(&n.body),
                is_thin: backlink_count < THIN_MAP_THRESHOLD,
            }
        })
        .collect();

    let mut confidence_distribution = ConfidenceDistribution::default();
    for node in nodes.iter().filter(|n| !n.is_map) {
        match node.confidence {
            Some(Confidence::Felt) => confidence_distribution.felt += 1,
            Some(Confidence::Observed) => confidence_distribution.observed += 1,
            Some(Confidence::Tested) => confidence_distribution.tested += 1,
            None => confidence_distribution.unspecified += 1,
        }
    }

    let sink_nodes: Vec<SinkNode> = nodes
        .iter()
        .filter_map(|n| {
            let incoming = incoming_link_count(&n.slug, nodes);
            let outgoing: HashSet<String> = n.outgoing_links().into_iter().collect();
            if incoming >= SINK_NODE_MIN_INCOMING && outgoing.len() <= SINK_NODE_MAX_OUTGOING {
                Some(SinkNode {
                    slug: n.slug.clone(),
                    incoming,
                    outgoing: outgoing.len(),
                })
            } else {
                None
            }
        })
        .collect();

    GraphTopology {
        maps,
        confidence_distribution,
        sink_nodes,
    }
}

#[cfg(test)]
#[path = "thought_evaluator_tests.rs"]
mod tests;
