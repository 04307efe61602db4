// SPDX-License-Identifier: MIT

//! `DriftDetector` (C6): per spec.md §4.6, measures how far active
//! commitments have drifted from observed activity and flags priority
//! inversions and commitment sprawl.

use crate::activity::count_mentions;
use vh_core::{Commitment, CommitmentId};

/// Sprawl warning fires once more than this many commitments are active
/// at once.
const MAX_ACTIVE_COMMITMENTS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct CommitmentDrift {
    pub commitment_id: CommitmentId,
    pub label: String,
    pub drift_score: f64,
    pub activity_overlap: f64,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriorityInversion {
    pub higher: CommitmentId,
    pub lower: CommitmentId,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DriftReport {
    pub commitment_drifts: Vec<CommitmentDrift>,
    pub priority_inversions: Vec<PriorityInversion>,
    pub sprawl_warning: Option<String>,
    pub overall_drift_score: f64,
}

/// Fraction of `activity_strings` that mention `label`, per spec.md §4.6.
pub fn activity_overlap(label: &str, activity_strings: &[String]) -> f64 {
    if activity_strings.is_empty() {
        return 0.0;
    }
    count_mentions(label, activity_strings.iter()) as f64 / activity_strings.len() as f64
}

/// Run drift detection over all commitments (only `active` ones
/// contribute drift/inversion/sprawl signals; the caller passes the full
/// list so priority comparisons can reference everything).
pub fn detect_drift(commitments: &[Commitment], activity_strings: &[String]) -> DriftReport {
    let active: Vec<&Commitment> = commitments.iter().filter(|c| c.is_active()).collect();

    let commitment_drifts: Vec<CommitmentDrift> = active
        .iter()
        .map(|c| {
            let overlap = activity_overlap(&c.label, activity_strings);
            let drift_score = 1.0 - overlap;
            CommitmentDrift {
                commitment_id: c.id.clone(),
                label: c.label.clone(),
                drift_score,
                activity_overlap: overlap,
                summary: format!("{} has {:.0}% activity overlap this cycle", c.label, overlap * 100.0),
            }
        })
        .collect();

    let mentions_by_id: Vec<(CommitmentId, usize)> = active
        .iter()
        .map(|c| (c.id.clone(), count_mentions(&c.label, activity_strings.iter())))
        .collect();

    let mut priority_inversions = Vec::new();
    for (i, higher) in active.iter().enumerate() {
        for lower in active.iter().skip(i + 1) {
            let (first, second) = if higher.priority < lower.priority {
                (higher, lower)
            } else if lower.priority < higher.priority {
                (lower, higher)
            } else {
                continue;
            };
            let second_mentions = mentions_by_id.iter().find(|(id, _)| id == &second.id).map(|(_, n)| *n).unwrap_or(0);
            let first_mentions = mentions_by_id.iter().find(|(id, _)| id == &first.id).map(|(_, n)| *n).unwrap_or(0);
            if second_mentions > first_mentions {
                priority_inversions.push(PriorityInversion {
                    higher: first.id.clone(),
                    lower: second.id.clone(),
                    summary: format!(
                        "lower-priority commitment \"{}\" ({} mentions) is getting more attention than higher-priority \"{}\" ({} mentions)",
                        second.label, second_mentions, first.label, first_mentions
                    ),
                });
            }
        }
    }

    let sprawl_warning = if active.len() > MAX_ACTIVE_COMMITMENTS {
        Some(format!("{} commitments are active at once; consider pausing or merging some", active.len()))
    } else {
        None
    };

    let overall_drift_score = if commitment_drifts.is_empty() {
        0.0
    } else {
        commitment_drifts.iter().map(|d| d.drift_score).sum::<f64>() / commitment_drifts.len() as f64
    };

    DriftReport {
        commitment_drifts,
        priority_inversions,
        sprawl_warning,
        overall_drift_score,
    }
}

#[cfg(test)]
#[path = "drift_tests.rs"]
mod tests;
