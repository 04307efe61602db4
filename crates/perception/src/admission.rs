// SPDX-License-Identifier: MIT

//! The admission policy pipeline: identity-relevance scoring, floor/cap
//! gating, per-channel surfacing, and a self-tuning advisory, per spec.md
//! §4.4.

use crate::tokenize::{overlap_ratio, tokenize};
use std::cmp::Ordering;
use std::collections::HashMap;
use vh_core::{FeedCapture, PerceptionContext, PerceptionPolicy, SourceId};

const COMMITMENT_WEIGHT: f64 = 0.5;
const IDENTITY_WEIGHT: f64 = 0.3;
const VAULT_WEIGHT: f64 = 0.2;

/// A filter-rate fraction above which the policy is flagged as too strict.
const OVER_FILTER_THRESHOLD: f64 = 0.8;
/// A filter-rate fraction below which the policy is flagged as too lax.
const UNDER_FILTER_THRESHOLD: f64 = 0.2;

/// A capture paired with the identity-relevance score it was admitted (or
/// rejected) on.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCapture {
    pub capture: FeedCapture,
    pub identity_score: f64,
}

/// Result of running [`admit`] over one cycle's captures for one source
/// batch (or across sources — the algorithm is source-agnostic; the engine
/// calls it once per cycle over the combined batch).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdmissionOutcome {
    /// Captures that passed the identity gate and relevance floor, within
    /// the global per-cycle cap, sorted by descending identity score.
    pub admitted: Vec<ScoredCapture>,
    /// Subset of `admitted` selected for the morning brief: first
    /// `max_signals_per_channel` per `sourceId`.
    pub surfaced: Vec<ScoredCapture>,
    /// Count of captures that did not make it into `admitted`.
    pub filtered: usize,
    /// Advisory-only hint when the filter rate is lopsided; never mutates
    /// policy.
    pub tuning_hint: Option<String>,
}

/// Score a single capture's identity-relevance in `[0, 1]`, per spec.md
/// §4.4: tokenize title+content, compute three weighted overlap ratios
/// against the context's commitment labels, identity themes, and vault
/// topics.
pub fn identity_relevance_score(capture: &FeedCapture, ctx: &PerceptionContext) -> f64 {
    let combined = format!("{} {}", capture.title, capture.content);
    let tokens = tokenize(&combined);

    let commitment_ratio = overlap_ratio(&ctx.commitment_labels, &tokens);
    let identity_ratio = overlap_ratio(&ctx.identity_themes, &tokens);
    let vault_ratio = overlap_ratio(&ctx.vault_topics, &tokens);

    let weighted = commitment_ratio * COMMITMENT_WEIGHT
        + identity_ratio * IDENTITY_WEIGHT
        + vault_ratio * VAULT_WEIGHT;

    weighted.min(1.0)
}

/// Run the full admission pipeline over one cycle's captures.
pub fn admit(captures: Vec<FeedCapture>, ctx: &PerceptionContext, policy: &PerceptionPolicy) -> AdmissionOutcome {
    let total = captures.len();

    let mut scored: Vec<ScoredCapture> = captures
        .into_iter()
        .map(|capture| {
            let identity_score = identity_relevance_score(&capture, ctx);
            ScoredCapture { capture, identity_score }
        })
        // 1. Identity gate: discard zero-score captures.
        .filter(|sc| sc.identity_score > 0.0)
        // 2. Relevance floor.
        .filter(|sc| sc.identity_score >= policy.relevance_floor)
        .collect();

    // 3. Sort remaining by identity-score desc.
    scored.sort_by(|a, b| b.identity_score.partial_cmp(&a.identity_score).unwrap_or(Ordering::Equal));

    // 4. Global cap.
    scored.truncate(policy.max_inbox_writes_per_cycle);
    let admitted = scored;

    // 5. Per-channel surfacing.
    let mut per_channel: HashMap<SourceId, usize> = HashMap::new();
    let mut surfaced = Vec::new();
    for sc in &admitted {
        let count = per_channel.entry(sc.capture.source_id.clone()).or_insert(0);
        if *count < policy.max_signals_per_channel {
            surfaced.push(sc.clone());
            *count += 1;
        }
    }

    let filtered = total - admitted.len();

    // 6. Self-tuning advisory.
    let tuning_hint = if total == 0 {
        None
    } else {
        let filter_rate = filtered as f64 / total as f64;
        if filter_rate > OVER_FILTER_THRESHOLD {
            Some(format!(
                "{:.0}% of this cycle's captures were filtered — consider lowering relevanceFloor or pruning noisy sources",
                filter_rate * 100.0
            ))
        } else if filter_rate < UNDER_FILTER_THRESHOLD {
            Some(format!(
                "only {:.0}% of this cycle's captures were filtered — consider raising relevanceFloor or maxInboxWritesPerCycle",
                filter_rate * 100.0
            ))
        } else {
            None
        }
    };

    AdmissionOutcome {
        admitted,
        surfaced,
        filtered,
        tuning_hint,
    }
}

#[cfg(test)]
#[path = "admission_tests.rs"]
mod tests;
