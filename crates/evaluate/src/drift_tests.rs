use super::*;
use vh_core::{CommitmentId, CommitmentState, DesireClass, FrictionClass, Horizon};

fn commitment(id: &str, label: &str, priority: i32, state: CommitmentState) -> Commitment {
    Commitment {
        id: CommitmentId::new(id),
        label: label.to_string(),
        state,
        priority,
        horizon: Horizon::Week,
        desire_class: DesireClass::Unknown,
        friction_class: FrictionClass::Unknown,
        source: "test".to_string(),
        last_advanced_at: None,
        evidence: Vec::new(),
        created_at: None,
        state_history: Vec::new(),
        advancement_signals: Vec::new(),
        outcome_pattern: None,
        drift_snapshots: None,
        desire_class_rationale: None,
    }
}

#[test]
fn activity_overlap_is_zero_for_empty_activity() {
    assert_eq!(activity_overlap("ship the release", &[]), 0.0);
}

#[test]
fn activity_overlap_counts_matching_fraction() {
    let strings = vec!["ship the release today".to_string(), "gardening".to_string()];
    assert_eq!(activity_overlap("ship the release", &strings), 0.5);
}

#[test]
fn drift_score_is_one_minus_overlap() {
    let commitments = vec![commitment("c1", "ship the release", 1, CommitmentState::Active)];
    let activity = vec!["ship the release today".to_string()];
    let report = detect_drift(&commitments, &activity);
    assert_eq!(report.commitment_drifts.len(), 1);
    assert_eq!(report.commitment_drifts[0].drift_score, 0.0);
}

#[test]
fn ignores_non_active_commitments() {
    let commitments = vec![commitment("c1", "paused thing", 1, CommitmentState::Paused)];
    let report = detect_drift(&commitments, &[]);
    assert!(report.commitment_drifts.is_empty());
    assert_eq!(report.overall_drift_score, 0.0);
}

#[test]
fn detects_priority_inversion() {
    let commitments = vec![
        commitment("c1", "write the design doc", 1, CommitmentState::Active),
        commitment("c2", "clean the garage", 2, CommitmentState::Active),
    ];
    let activity = vec!["spent the afternoon cleaning the garage".to_string()];
    let report = detect_drift(&commitments, &activity);
    assert_eq!(report.priority_inversions.len(), 1);
    assert_eq!(report.priority_inversions[0].higher, CommitmentId::new("c1"));
    assert_eq!(report.priority_inversions[0].lower, CommitmentId::new("c2"));
}

#[test]
fn no_inversion_when_higher_priority_gets_more_attention() {
    let commitments = vec![
        commitment("c1", "write the design doc", 1, CommitmentState::Active),
        commitment("c2", "clean the garage", 2, CommitmentState::Active),
    ];
    let activity = vec!["wrote the design doc today".to_string()];
    let report = detect_drift(&commitments, &activity);
    assert!(report.priority_inversions.is_empty());
}

#[test]
fn sprawl_warning_above_three_active_commitments() {
    let commitments = vec![
        commitment("c1", "a", 1, CommitmentState::Active),
        commitment("c2", "b", 2, CommitmentState::Active),
        commitment("c3", "c", 3, CommitmentState::Active),
        commitment("c4", "d", 4, CommitmentState::Active),
    ];
    let report = detect_drift(&commitments, &[]);
    assert!(report.sprawl_warning.is_some());
}

#[test]
fn no_sprawl_warning_at_exactly_three_active() {
    let commitments = vec![
        commitment("c1", "a", 1, CommitmentState::Active),
        commitment("c2", "b", 2, CommitmentState::Active),
        commitment("c3", "c", 3, CommitmentState::Active),
    ];
    let report = detect_drift(&commitments, &[]);
    assert!(report.sprawl_warning.is_none());
}

#[test]
fn overall_drift_score_is_mean_of_per_commitment_scores() {
    let commitments = vec![
        commitment("c1", "ship the release", 1, CommitmentState::Active),
        commitment("c2", "write the design doc", 2, CommitmentState::Active),
    ];
    let activity = vec!["ship the release today".to_string()];
    let report = detect_drift(&commitments, &activity);
    assert_eq!(report.commitment_drifts.len(), 2);
    let expected = (0.0 + 1.0) / 2.0;
    assert_eq!(report.overall_drift_score, expected);
}
