// SPDX-License-Identifier: MIT

//! Phase 4a — Perception: poll every enabled feed source, admit captures,
//! write `inbox/*.md`, track per-source noise. Per spec.md §4.9.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use vh_adapters::{FeedSourceAdapter, FeedSourceError};
use vh_core::{CommitmentState, CommitmentStoreFile, NoiseAlert, PerceptionContext, PerceptionPolicy};
use vh_evaluate::thought_evaluator::ThoughtNode;
use vh_perception::admit;
use vh_storage::{PerceptionStore, Vault};

use crate::config::HeartbeatConfig;
use crate::HeartbeatCounters;

/// Build the scoring context perception admission runs against: active and
/// candidate commitment labels, identity themes from `self/identity.md` and
/// `self/goals.md`, and vault topics sampled from thought frontmatter.
pub(crate) fn build_perception_context(
    vault: &Vault,
    commitments: &CommitmentStoreFile,
    thoughts: &[ThoughtNode],
) -> PerceptionContext {
    let commitment_labels = commitments
        .commitments
        .iter()
        .filter(|c| matches!(c.state, CommitmentState::Active | CommitmentState::Candidate))
        .map(|c| c.label.clone())
        .collect();

    let mut identity_themes = Vec::new();
    for path in [vault.identity_path(), vault.goals_path()] {
        if let Ok(Some(contents)) = vault.read(&path) {
            identity_themes.extend(theme_lines(&contents));
        }
    }

    let mut vault_topics: Vec<String> = thoughts.iter().flat_map(|t| t.topics.clone()).collect();
    vault_topics.sort();
    vault_topics.dedup();

    PerceptionContext {
        commitment_labels,
        identity_themes,
        vault_topics,
        recent_thoughts: thoughts.iter().map(|t| t.slug.clone()).collect(),
    }
}

/// Pull non-empty body lines out of a `self/*.md` file, stripping bullet and
/// heading markers, as rough "themes" text to score captures against.
fn theme_lines(contents: &str) -> Vec<String> {
    let (_, body) = vh_storage::frontmatter::split_frontmatter(contents);
    body.lines()
        .map(|l| l.trim().trim_start_matches(['-', '*', '#']).trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

pub(crate) struct PerceptionOutcome {
    pub noise_alerts: Vec<NoiseAlert>,
}

/// Run the full perception phase: concurrent per-source polls (each bounded
/// by `config.feed_poll_timeout_secs`), admission, inbox writes, and noise
/// tracking. Per-source poll errors are logged and treated as empty
/// batches; nothing here is fatal to the cycle.
pub(crate) async fn run_perception_phase(
    vault: &Vault,
    feed_sources: &[Arc<dyn FeedSourceAdapter>],
    ctx: &PerceptionContext,
    policy: &PerceptionPolicy,
    config: &HeartbeatConfig,
    counters: &mut HeartbeatCounters,
    now: DateTime<Utc>,
) -> PerceptionOutcome {
    let timeout = std::time::Duration::from_secs(config.feed_poll_timeout_secs);
    let vault_root = vault.root().display().to_string();

    let mut polls = Vec::new();
    for source in feed_sources {
        if !source.config().enabled {
            continue;
        }
        let source = Arc::clone(source);
        let vault_root = vault_root.clone();
        polls.push(tokio::spawn(async move {
            let id = source.config().id.clone();
            match tokio::time::timeout(timeout, source.poll(&vault_root)).await {
                Ok(Ok(captures)) => (id, Ok(captures)),
                Ok(Err(e)) => (id, Err(e)),
                Err(_) => (
                    id.clone(),
                    Err(FeedSourceError::Timeout {
                        source_id: id,
                        detail: format!("exceeded {}s", timeout.as_secs()),
                    }),
                ),
            }
        }));
    }

    let adapters_by_id: HashMap<String, Arc<dyn FeedSourceAdapter>> =
        feed_sources.iter().map(|s| (s.config().id.clone(), Arc::clone(s))).collect();

    let mut all_captures = Vec::new();
    let mut totals_by_source: HashMap<String, (u32, u32)> = HashMap::new();

    for handle in polls {
        let Ok((source_id, outcome)) = handle.await else { continue };
        match outcome {
            Ok(captures) => {
                totals_by_source.entry(source_id.clone()).or_insert((0, 0)).1 += captures.len() as u32;
                all_captures.extend(captures);
            }
            Err(e) => {
                tracing::warn!(source = %source_id, error = %e, "feed source poll failed");
            }
        }
    }

    let outcome = admit(all_captures, ctx, policy);
    counters.captures_admitted += outcome.admitted.len();
    counters.captures_filtered += outcome.filtered;

    // `total` tracked per source against every polled capture, regardless
    // of admission outcome, per spec.md §4.4's noise-rate definition.
    let mut admitted_by_source: HashMap<String, u32> = HashMap::new();
    for scored in &outcome.admitted {
        *admitted_by_source.entry(scored.capture.source_id.as_str().to_string()).or_insert(0) += 1;
    }

    let inbox_dir = vault.inbox_dir();
    let mut cursors = PerceptionStore::read_cursors(vault).unwrap_or_default();
    for scored in &outcome.admitted {
        let source_id = scored.capture.source_id.as_str().to_string();
        let is_new = PerceptionStore::observe(
            &mut cursors,
            &source_id,
            &scored.capture.id,
            vh_core::DEFAULT_MAX_RETAINED_IDS,
            now,
        );
        if !is_new {
            continue;
        }

        let Some(adapter) = adapters_by_id.get(&source_id) else { continue };
        let slug = scored.capture.slug();
        let path = inbox_dir.join(format!("{slug}.md"));
        if vault.stat(&path).is_some() {
            continue;
        }
        let markdown = adapter.to_inbox_markdown(&scored.capture);
        if let Err(e) = vault.write_atomic(&path, &markdown) {
            tracing::warn!(path = %path.display(), error = %e, "failed to write inbox item");
        }
    }
    let _ = PerceptionStore::write_cursors(vault, &cursors);

    let mut noise = PerceptionStore::read_noise(vault).unwrap_or_default();
    let mut alerts = Vec::new();
    let date = now.date_naive();
    for (source_id, (_, total)) in &totals_by_source {
        let admitted = admitted_by_source.get(source_id).copied().unwrap_or(0);
        PerceptionStore::record_noise(&mut noise, source_id, date, admitted, *total, now);
        if let Some(history) = noise.sources.get(source_id) {
            if let Some(alert) = vh_perception::check_noise_alert(&vh_core::SourceId::new(source_id.clone()), history) {
                alerts.push(alert);
            }
        }
    }
    let _ = PerceptionStore::write_noise(vault, &noise);

    PerceptionOutcome { noise_alerts: alerts }
}
