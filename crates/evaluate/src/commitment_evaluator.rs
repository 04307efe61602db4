// SPDX-License-Identifier: MIT

//! `CommitmentEvaluator` (C5): per spec.md §4.5, scores one commitment's
//! advancement from its recent advancement signals and observed activity.

use crate::activity::count_mentions;
use vh_core::{AdvancementSignal, Commitment, CommitmentState};

const HIGH_RELEVANCE_THRESHOLD: f64 = 0.5;
const SATISFIED_ADVANCEMENT_THRESHOLD: f64 = 0.7;
const OUTCOME_WORDS: &[&str] = &["done", "shipped", "complete", "finished", "launched", "resolved", "satisfied"];

/// Text observed since the last evaluation, grouped by where it came from.
/// All three groups feed the same `activityMentions` computation; the
/// grouping exists for the engine's own bookkeeping, not the scoring rule.
#[derive(Debug, Clone, Default)]
pub struct RecentActivity {
    pub session_summaries: Vec<String>,
    pub queue_tasks_completed: Vec<String>,
    pub thoughts_created: Vec<String>,
}

impl RecentActivity {
    fn all_strings(&self) -> impl Iterator<Item = &String> {
        self.session_summaries
            .iter()
            .chain(self.queue_tasks_completed.iter())
            .chain(self.thoughts_created.iter())
    }

    fn is_empty(&self) -> bool {
        self.session_summaries.is_empty() && self.queue_tasks_completed.is_empty() && self.thoughts_created.is_empty()
    }
}

/// One commitment's advancement status for this cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedCommitment {
    pub status: AdvancementStatus,
    pub advancement_score: f64,
    pub proposed_transition: Option<CommitmentState>,
    pub brief_summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvancementStatus {
    Advancing,
    Stalled,
    Drifting,
}

fn activity_mentions(label: &str, activity: &RecentActivity) -> usize {
    count_mentions(label, activity.all_strings())
}

/// Evaluate one commitment's advancement for the cycle, per spec.md §4.5's
/// decision rule and lifecycle-proposal table.
pub fn evaluate_commitment(commitment: &Commitment, activity: &RecentActivity, now: chrono::DateTime<chrono::Utc>) -> EvaluatedCommitment {
    let window_days = commitment.horizon.window_days();
    let window_start = now - chrono::Duration::days(window_days);

    let recent_signals: Vec<&AdvancementSignal> = commitment
        .advancement_signals
        .iter()
        .filter(|s| s.at >= window_start)
        .collect();
    let high_relevance_signals: Vec<&&AdvancementSignal> =
        recent_signals.iter().filter(|s| s.relevance_score > HIGH_RELEVANCE_THRESHOLD).collect();

    let mentions = activity_mentions(&commitment.label, activity);

    let (status, advancement_score) = if !high_relevance_signals.is_empty() {
        let base = (high_relevance_signals.len() as f64 / (window_days.max(1) as f64)).min(1.0);
        let score = (base + 0.1 * mentions as f64).min(1.0);
        (AdvancementStatus::Advancing, score)
    } else if !recent_signals.is_empty() {
        let mean_relevance: f64 = recent_signals.iter().map(|s| s.relevance_score).sum::<f64>() / recent_signals.len() as f64;
        (AdvancementStatus::Stalled, mean_relevance * 0.5)
    } else if mentions > 0 {
        (AdvancementStatus::Stalled, (0.1 * mentions as f64).min(0.4))
    } else {
        (AdvancementStatus::Drifting, 0.0)
    };

    let proposed_transition = propose_transition(commitment, activity, mentions, recent_signals.len(), advancement_score, now, window_days);

    let brief_summary = format!(
        "{} — {:?} (score {:.2}, {} recent signal(s), {} activity mention(s))",
        commitment.label,
        status,
        advancement_score,
        recent_signals.len(),
        mentions
    );

    EvaluatedCommitment {
        status,
        advancement_score,
        proposed_transition,
        brief_summary,
    }
}

fn propose_transition(
    commitment: &Commitment,
    activity: &RecentActivity,
    mentions: usize,
    signal_count: usize,
    advancement_score: f64,
    now: chrono::DateTime<chrono::Utc>,
    window_days: i64,
) -> Option<CommitmentState> {
    match commitment.state {
        CommitmentState::Candidate => {
            if mentions + signal_count >= 3 {
                Some(CommitmentState::Active)
            } else {
                None
            }
        }
        CommitmentState::Active => {
            let double_horizon_start = now - chrono::Duration::days(window_days * 2);
            let any_signal_in_double_window = commitment.advancement_signals.iter().any(|s| s.at >= double_horizon_start);
            if !any_signal_in_double_window && activity.is_empty() {
                return Some(CommitmentState::Abandoned);
            }
            let label_lower = commitment.label.to_lowercase();
            let satisfied = advancement_score > SATISFIED_ADVANCEMENT_THRESHOLD
                && activity.all_strings().any(|s| {
                    let lower = s.to_lowercase();
                    lower.contains(&label_lower) && OUTCOME_WORDS.iter().any(|w| lower.contains(w))
                });
            if satisfied {
                Some(CommitmentState::Satisfied)
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "commitment_evaluator_tests.rs"]
mod tests;
