// SPDX-License-Identifier: MIT

//! `CommitmentFilter` (C7): per spec.md §4.7, reorders pending tasks by
//! relevance to active commitments and defers tasks that conflict with a
//! paused commitment or a creative-focus priority.

use vh_perception::tokenize;
use vh_core::{Commitment, CommitmentId, CommitmentState, PipelineTask};

/// Verbs that mark a commitment label as "creative" for sprint protection.
const CREATIVE_VERBS: &[&str] = &["write", "build", "design", "ship", "create"];
/// Maintenance-action task targets deferred during a creative sprint.
const MAINTENANCE_TARGETS: &[&str] = &["process-inbox", "connect-orphans", "triage-observations", "resolve-tensions"];

/// A task annotated with its commitment-relevance score and, if applicable,
/// a deferral rationale.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredTask {
    pub task: PipelineTask,
    pub relevance_score: f64,
    pub matched_commitment: Option<CommitmentId>,
    pub deferred_reason: Option<String>,
}

/// Score a task against one commitment label: 1.0 on a substring match,
/// else the fraction of the label's tokens present in the task's combined
/// target+sourcePath tokens.
fn score_against_label(task: &PipelineTask, label: &str) -> f64 {
    let combined = task.combined_text().to_lowercase();
    if combined.contains(&label.to_lowercase()) {
        return 1.0;
    }
    let label_tokens = tokenize(label);
    if label_tokens.is_empty() {
        return 0.0;
    }
    let combined_tokens = tokenize(&combined);
    let hits = label_tokens.iter().filter(|t| combined_tokens.contains(*t)).count();
    hits as f64 / label_tokens.len() as f64
}

fn best_match<'a>(task: &PipelineTask, active: &[&'a Commitment]) -> Option<(&'a Commitment, f64)> {
    active
        .iter()
        .map(|c| (*c, score_against_label(task, &c.label)))
        .filter(|(_, score)| *score > 0.0)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
}

/// Reorder and defer `tasks` according to `commitments`. Returns the tasks
/// unchanged (wrapped, no deferrals, score 0) if `commitments` is empty.
pub fn filter_tasks(tasks: Vec<PipelineTask>, commitments: &[Commitment]) -> Vec<FilteredTask> {
    if commitments.is_empty() {
        return tasks
            .into_iter()
            .map(|task| FilteredTask {
                task,
                relevance_score: 0.0,
                matched_commitment: None,
                deferred_reason: None,
            })
            .collect();
    }

    let active: Vec<&Commitment> = commitments.iter().filter(|c| c.state == CommitmentState::Active).collect();
    let paused: Vec<&Commitment> = commitments.iter().filter(|c| c.state == CommitmentState::Paused).collect();
    let top_active = active.iter().min_by_key(|c| c.priority).copied();

    let mut annotated: Vec<(usize, FilteredTask)> = tasks
        .into_iter()
        .enumerate()
        .map(|(index, task)| {
            let matched = best_match(&task, &active);
            let (relevance_score, matched_commitment) = match &matched {
                Some((c, score)) => (*score, Some(c.id.clone())),
                None => (0.0, None),
            };

            let combined = task.combined_text().to_lowercase();
            let paused_hit = paused.iter().find(|c| combined.contains(&c.label.to_lowercase()));

            let deferred_reason = if let Some(c) = paused_hit {
                Some(format!("deferred: matches paused commitment \"{}\"", c.label))
            } else if is_creative_sprint_conflict(&task, top_active) {
                Some("deferred: maintenance task during a creative-focus sprint".to_string())
            } else {
                None
            };

            (
                index,
                FilteredTask {
                    task,
                    relevance_score,
                    matched_commitment,
                    deferred_reason,
                },
            )
        })
        .collect();

    annotated.sort_by(|(ia, a), (ib, b)| {
        let priority_a = a.matched_commitment.as_ref().and_then(|id| active.iter().find(|c| &c.id == id)).map(|c| c.priority).unwrap_or(i32::MAX);
        let priority_b = b.matched_commitment.as_ref().and_then(|id| active.iter().find(|c| &c.id == id)).map(|c| c.priority).unwrap_or(i32::MAX);

        priority_a
            .cmp(&priority_b)
            .then_with(|| b.relevance_score.partial_cmp(&a.relevance_score).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| ia.cmp(ib))
    });

    annotated.into_iter().map(|(_, ft)| ft).collect()
}

fn is_creative_sprint_conflict(task: &PipelineTask, top_active: Option<&Commitment>) -> bool {
    let Some(top) = top_active else { return false };
    let label_lower = top.label.to_lowercase();
    let is_creative = CREATIVE_VERBS.iter().any(|verb| label_lower.contains(verb));
    if !is_creative {
        return false;
    }
    MAINTENANCE_TARGETS.iter().any(|target| task.target == *target)
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
