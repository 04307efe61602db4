// SPDX-License-Identifier: MIT

//! Phase 5a — Evaluation: threshold checks, commitment staleness and
//! advancement, drift detection, and the thought-graph pass. Per spec.md
//! §4.9's five-step evaluation breakdown.

use chrono::{DateTime, Utc};
use vh_core::{Commitment, CommitmentStoreFile, DriftSnapshot, QueueFile, SignalMethod};
use vh_evaluate::thought_evaluator::ThoughtNode;
use vh_evaluate::{detect_drift, evaluate_commitment, evaluate_thoughts, graph_topology, GraphTopology, ImpactReport, RecentActivity};
use vh_storage::{Vault, VaultStoreError};

use crate::config::MaintenanceThresholds;

/// Weak advancement-signal score recorded when a commitment has an aligned
/// pending task, per spec.md §4.9 5a.2.
const ALIGNED_TASK_SIGNAL_SCORE: f64 = 0.3;
/// `DriftDetector` snapshots are appended once a commitment's drift score
/// crosses this, per spec.md §4.9 5a.4.
const DRIFT_SNAPSHOT_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ThresholdKind {
    Inbox,
    Orphan,
    Observation,
    Tension,
    UnprocessedSessions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ThresholdFlag {
    pub kind: ThresholdKind,
    pub count: usize,
    pub threshold: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ThresholdCounts {
    pub inbox: usize,
    pub observations: usize,
    pub tensions: usize,
    pub unprocessed_sessions: usize,
}

/// Count items in `inbox/`, `ops/observations/`, `ops/tensions/` and the
/// mineable subset of `ops/sessions/`, per spec.md §4.9 5a.1.
pub(crate) fn count_thresholds(vault: &Vault) -> ThresholdCounts {
    ThresholdCounts {
        inbox: vault.list_md(&vault.inbox_dir()).map(|v| v.len()).unwrap_or(0),
        observations: vault.list_md(&vault.observations_dir()).map(|v| v.len()).unwrap_or(0),
        tensions: vault.list_md(&vault.tensions_dir()).map(|v| v.len()).unwrap_or(0),
        unprocessed_sessions: count_mineable_sessions(vault),
    }
}

/// Keys that, if they are the *only* keys present, mark a session file as
/// pure bookkeeping rather than mineable content.
const METADATA_ONLY_KEYS: &[&str] = &["id", "createdAt", "updatedAt", "status", "path", "version", "source"];

/// Classify a session JSON file as mineable, per spec.md §9's
/// `hasStructuredSessionContent` heuristic: not mineable if `status`
/// mentions stub/metadata/no-content, or every key present is in the
/// metadata-only allowlist. Malformed JSON is treated as mineable rather
/// than silently dropped from the count.
pub(crate) fn is_mineable_session(value: &serde_json::Value) -> bool {
    if let Some(status) = value.get("status").and_then(|v| v.as_str()) {
        let lower = status.to_lowercase();
        if ["stub", "metadata", "no-content"].iter().any(|needle| lower.contains(needle)) {
            return false;
        }
    }
    if let Some(obj) = value.as_object() {
        if !obj.is_empty() && obj.keys().all(|k| METADATA_ONLY_KEYS.contains(&k.as_str())) {
            return false;
        }
    }
    true
}

fn count_mineable_sessions(vault: &Vault) -> usize {
    let dir = vault.sessions_dir();
    let Ok(entries) = std::fs::read_dir(&dir) else { return 0 };
    entries
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("json"))
        .filter(|e| {
            let Ok(contents) = std::fs::read_to_string(e.path()) else { return true };
            let value: serde_json::Value = serde_json::from_str(&contents).unwrap_or(serde_json::Value::Null);
            is_mineable_session(&value)
        })
        .count()
}

fn flag(kind: ThresholdKind, count: usize, threshold: u32) -> Option<ThresholdFlag> {
    let threshold = threshold as usize;
    if count > threshold {
        Some(ThresholdFlag { kind, count, threshold })
    } else {
        None
    }
}

/// Build the `RecentActivity` the commitment evaluator and drift detector
/// score against: tasks completed and thoughts created since the marker.
pub(crate) fn build_recent_activity(queue: &QueueFile, thoughts: &[ThoughtNode], since: DateTime<Utc>) -> RecentActivity {
    let queue_tasks_completed = queue
        .tasks
        .iter()
        .filter(|t| t.status == vh_core::TaskStatus::Done && t.updated_at >= since)
        .map(|t| t.target.clone())
        .collect();
    let thoughts_created = thoughts.iter().filter(|t| t.created >= since).map(|t| t.slug.clone()).collect();
    RecentActivity {
        session_summaries: Vec::new(),
        queue_tasks_completed,
        thoughts_created,
    }
}

fn activity_strings(activity: &RecentActivity) -> Vec<String> {
    activity
        .session_summaries
        .iter()
        .chain(activity.queue_tasks_completed.iter())
        .chain(activity.thoughts_created.iter())
        .cloned()
        .collect()
}

fn has_aligned_pending_task(commitment: &Commitment, queue: &QueueFile) -> bool {
    let label_lower = commitment.label.to_lowercase();
    queue
        .tasks
        .iter()
        .filter(|t| t.status == vh_core::TaskStatus::Pending)
        .any(|t| t.combined_text().to_lowercase().contains(&label_lower))
}

pub(crate) struct EvaluationOutcome {
    pub commitments_evaluated: usize,
    pub recommendations: Vec<String>,
    pub threshold_flags: Vec<ThresholdFlag>,
    pub graph_topology: GraphTopology,
    pub impact_report: ImpactReport,
}

/// Run the full evaluation phase. Mutates `commitments` in place
/// (advancement signals and drift snapshots); proposed state transitions
/// are surfaced as recommendations only, never applied automatically.
pub(crate) fn run_evaluation_phase(
    vault: &Vault,
    commitments: &mut CommitmentStoreFile,
    queue: &QueueFile,
    thoughts: &[ThoughtNode],
    thresholds: &MaintenanceThresholds,
    since_last_evaluation: DateTime<Utc>,
    now: DateTime<Utc>,
) -> EvaluationOutcome {
    let mut recommendations = Vec::new();

    // 5a.1 — threshold check.
    let counts = count_thresholds(vault);
    let mut threshold_flags = Vec::new();
    threshold_flags.extend(flag(ThresholdKind::Inbox, counts.inbox, thresholds.inbox_threshold));
    threshold_flags.extend(flag(ThresholdKind::Observation, counts.observations, thresholds.observation_threshold));
    threshold_flags.extend(flag(ThresholdKind::Tension, counts.tensions, thresholds.tension_threshold));
    threshold_flags.extend(flag(
        ThresholdKind::UnprocessedSessions,
        counts.unprocessed_sessions,
        thresholds.unprocessed_sessions_threshold,
    ));

    let activity = build_recent_activity(queue, thoughts, since_last_evaluation);
    let activity_strs = activity_strings(&activity);

    // 5a.2 — staleness + weak advancement signal from aligned pending tasks.
    let active_ids: Vec<vh_core::CommitmentId> = commitments
        .commitments
        .iter()
        .filter(|c| c.is_active())
        .map(|c| c.id.clone())
        .collect();
    for id in &active_ids {
        let Some(commitment) = commitments.commitments.iter_mut().find(|c| &c.id == id) else { continue };
        let window_start = now - chrono::Duration::days(commitment.horizon.window_days());
        let last_activity = commitment.last_advanced_at.or(commitment.created_at);
        let is_stale = last_activity.map(|at| at < window_start).unwrap_or(true);
        if is_stale {
            recommendations.push(format!("commitment \"{}\" has had no advancement within its horizon", commitment.label));
        }
        if has_aligned_pending_task(commitment, queue) {
            commitment.record_advancement_signal(
                "aligned pending task present in queue",
                ALIGNED_TASK_SIGNAL_SCORE,
                SignalMethod::Inferred,
                now,
            );
        }
    }

    // 5a.3 — CommitmentEvaluator.
    let active: Vec<Commitment> = commitments.commitments.iter().filter(|c| c.is_active()).cloned().collect();
    for commitment in &active {
        let evaluated = evaluate_commitment(commitment, &activity, now);
        if let Some(transition) = evaluated.proposed_transition {
            recommendations.push(format!(
                "propose transitioning \"{}\" from {:?} to {:?}: {}",
                commitment.label, commitment.state, transition, evaluated.brief_summary
            ));
        }
    }

    // 5a.4 — DriftDetector.
    let drift_report = detect_drift(&commitments.commitments, &activity_strs);
    for drift in &drift_report.commitment_drifts {
        if drift.drift_score > DRIFT_SNAPSHOT_THRESHOLD {
            if let Some(commitment) = commitments.commitments.iter_mut().find(|c| c.id == drift.commitment_id) {
                commitment.append_drift_snapshot(DriftSnapshot {
                    at: now,
                    drift_score: drift.drift_score,
                    summary: drift.summary.clone(),
                });
            }
        }
    }
    for inversion in &drift_report.priority_inversions {
        recommendations.push(inversion.summary.clone());
    }
    if let Some(sprawl) = &drift_report.sprawl_warning {
        recommendations.push(sprawl.clone());
    }

    // 5a.5 / 5d — ThoughtEvaluator.
    let impact_report = evaluate_thoughts(thoughts, now);
    let topology = graph_topology(thoughts);
    threshold_flags.extend(flag(ThresholdKind::Orphan, impact_report.orphans.len(), thresholds.orphan_threshold));
    if let Err(e) = write_evaluation_record(vault, &impact_report, now) {
        tracing::warn!(error = %e, "failed to persist evaluation record");
    }

    EvaluationOutcome {
        commitments_evaluated: active.len(),
        recommendations,
        threshold_flags,
        graph_topology: topology,
        impact_report,
    }
}

fn write_evaluation_record(vault: &Vault, report: &ImpactReport, now: DateTime<Utc>) -> Result<(), VaultStoreError> {
    let date = now.format("%Y-%m-%d").to_string();
    let mut out = String::new();
    out.push_str("---\n");
    out.push_str(&format!("id: {date}\n"));
    out.push_str(&format!("evaluatedAt: {}\n", now.to_rfc3339()));
    out.push_str(&format!("thoughtsScored: {}\n", report.top.len() + report.orphans.len()));
    out.push_str(&format!("avgImpactScore: {:.3}\n", report.avg_impact_score));
    out.push_str(&format!("orphanRate: {:.3}\n", report.orphan_rate));
    out.push_str("---\n\n");

    out.push_str("## Top Thoughts\n\n| slug | impact |\n| --- | --- |\n");
    for entry in &report.top {
        out.push_str(&format!("| {} | {:.2} |\n", entry.slug, entry.score));
    }

    out.push_str("\n## Orphans\n\n");
    if report.orphans.is_empty() {
        out.push_str("none\n");
    } else {
        for slug in &report.orphans {
            out.push_str(&format!("- {slug}\n"));
        }
    }

    vault.write_atomic(&vault.evaluations_dir().join(format!("{date}.md")), &out)
}

#[cfg(test)]
#[path = "phase_evaluation_tests.rs"]
mod tests;
