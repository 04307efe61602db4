use super::*;
use chrono::{Duration, Utc};
use tempfile::tempdir;
use vh_core::{CommitmentState, DesireClass, FrictionClass, Horizon, TaskId, TaskStatus};

fn commitment(id: &str, label: &str, state: CommitmentState, priority: i32, horizon: Horizon) -> Commitment {
    Commitment {
        id: vh_core::CommitmentId::new(id),
        label: label.to_string(),
        state,
        priority,
        horizon,
        desire_class: DesireClass::Thick,
        friction_class: FrictionClass::Constitutive,
        source: "self/goals.md".to_string(),
        last_advanced_at: None,
        evidence: vec![],
        created_at: Some(Utc::now() - Duration::days(30)),
        state_history: vec![],
        advancement_signals: vec![],
        outcome_pattern: None,
        drift_snapshots: None,
        desire_class_rationale: None,
    }
}

#[test]
fn is_mineable_session_rejects_stub_status() {
    let value: serde_json::Value = serde_json::from_str(r#"{"status": "stub", "id": "s1"}"#).unwrap();
    assert!(!is_mineable_session(&value));
}

#[test]
fn is_mineable_session_rejects_metadata_only_keys() {
    let value: serde_json::Value = serde_json::from_str(r#"{"id": "s1", "createdAt": "2026-01-01"}"#).unwrap();
    assert!(!is_mineable_session(&value));
}

#[test]
fn is_mineable_session_accepts_structured_content() {
    let value: serde_json::Value = serde_json::from_str(r#"{"id": "s1", "summary": "built the thing", "decisions": ["a"]}"#).unwrap();
    assert!(is_mineable_session(&value));
}

#[test]
fn count_thresholds_counts_md_files_per_directory() {
    let dir = tempdir().unwrap();
    let vault = Vault::new(dir.path().to_path_buf());
    std::fs::create_dir_all(vault.inbox_dir()).unwrap();
    vault.write_atomic(&vault.inbox_dir().join("a.md"), "body").unwrap();
    vault.write_atomic(&vault.inbox_dir().join("b.md"), "body").unwrap();

    let counts = count_thresholds(&vault);
    assert_eq!(counts.inbox, 2);
    assert_eq!(counts.observations, 0);
}

#[test]
fn stale_active_commitment_is_flagged_and_aligned_task_records_weak_signal() {
    let dir = tempdir().unwrap();
    let vault = Vault::new(dir.path().to_path_buf());
    let now = Utc::now();
    let mut commitments = CommitmentStoreFile::empty(now);
    commitments.commitments.push(commitment("ship-site", "ship the site", CommitmentState::Active, 1, Horizon::Week));

    let mut queue = QueueFile::empty(now);
    let mut task = vh_core::PipelineTask::new_surface(TaskId::new("t1"), "ship the site landing page".to_string(), "thoughts/x.md".to_string(), now);
    task.status = TaskStatus::Pending;
    queue.tasks.push(task);

    let thresholds = MaintenanceThresholds::default();
    let outcome = run_evaluation_phase(&vault, &mut commitments, &queue, &[], &thresholds, now - Duration::days(1), now);

    assert_eq!(outcome.commitments_evaluated, 1);
    assert!(outcome.recommendations.iter().any(|r| r.contains("no advancement")));
    let updated = &commitments.commitments[0];
    assert_eq!(updated.advancement_signals.len(), 1);
    assert_eq!(updated.advancement_signals[0].relevance_score, ALIGNED_TASK_SIGNAL_SCORE);
}

#[test]
fn sprawl_warning_fires_over_three_active_commitments() {
    let dir = tempdir().unwrap();
    let vault = Vault::new(dir.path().to_path_buf());
    let now = Utc::now();
    let mut commitments = CommitmentStoreFile::empty(now);
    for i in 0..4 {
        commitments
            .commitments
            .push(commitment(&format!("c{i}"), &format!("commitment {i}"), CommitmentState::Active, 1, Horizon::Week));
    }
    let queue = QueueFile::empty(now);
    let thresholds = MaintenanceThresholds::default();

    let outcome = run_evaluation_phase(&vault, &mut commitments, &queue, &[], &thresholds, now - Duration::days(1), now);
    assert!(outcome.recommendations.iter().any(|r| r.contains("are active at once")));
}

#[test]
fn drift_snapshot_appended_when_score_exceeds_threshold() {
    let dir = tempdir().unwrap();
    let vault = Vault::new(dir.path().to_path_buf());
    let now = Utc::now();
    let mut commitments = CommitmentStoreFile::empty(now);
    commitments.commitments.push(commitment("quiet", "a quiet commitment", CommitmentState::Active, 1, Horizon::Week));
    let queue = QueueFile::empty(now);
    let thresholds = MaintenanceThresholds::default();

    run_evaluation_phase(&vault, &mut commitments, &queue, &[], &thresholds, now - Duration::days(1), now);

    let updated = &commitments.commitments[0];
    assert!(updated.drift_snapshots.as_ref().map(|s| !s.is_empty()).unwrap_or(false));
}

#[test]
fn evaluation_record_is_persisted_to_disk() {
    let dir = tempdir().unwrap();
    let vault = Vault::new(dir.path().to_path_buf());
    let now = Utc::now();
    let mut commitments = CommitmentStoreFile::empty(now);
    let queue = QueueFile::empty(now);
    let thresholds = MaintenanceThresholds::default();

    run_evaluation_phase(&vault, &mut commitments, &queue, &[], &thresholds, now - Duration::days(1), now);

    let date = now.format("%Y-%m-%d").to_string();
    let contents = vault.read(&vault.evaluations_dir().join(format!("{date}.md"))).unwrap();
    assert!(contents.is_some());
    assert!(contents.unwrap().contains("evaluatedAt"));
}
