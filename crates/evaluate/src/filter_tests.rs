use super::*;
use chrono::Utc;
use vh_core::{CommitmentId, DesireClass, FrictionClass, Horizon, Phase, TaskId};

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

fn task(id: &str, target: &str, source_path: &str) -> PipelineTask {
    let now = Utc::now();
    let mut t = PipelineTask::new_surface(TaskId::new(id), target.to_string(), source_path.to_string(), now);
    t.phase = Phase::Surface;
    t
}

#[test]
fn passthrough_when_no_commitments() {
    let tasks = vec![task("t1", "a", "a.md"), task("t2", "b", "b.md")];
    let result = filter_tasks(tasks.clone(), &[]);
    assert_eq!(result.len(), 2);
    assert!(result.iter().all(|ft| ft.deferred_reason.is_none() && ft.relevance_score == 0.0));
}

#[test]
fn substring_match_scores_one() {
    let commitments = vec![commitment("c1", "design doc", 1, CommitmentState::Active)];
    let tasks = vec![task("t1", "design doc draft", "notes.md")];
    let result = filter_tasks(tasks, &commitments);
    assert_eq!(result[0].relevance_score, 1.0);
    assert_eq!(result[0].matched_commitment, Some(CommitmentId::new("c1")));
}

#[test]
fn paused_commitment_defers_matching_task() {
    let commitments = vec![commitment("c1", "archive project", 1, CommitmentState::Paused)];
    let tasks = vec![task("t1", "archive project cleanup", "notes.md")];
    let result = filter_tasks(tasks, &commitments);
    assert!(result[0].deferred_reason.is_some());
}

#[test]
fn higher_priority_commitment_sorts_first() {
    let commitments = vec![
        commitment("c1", "low priority item", 5, CommitmentState::Active),
        commitment("c2", "high priority item", 1, CommitmentState::Active),
    ];
    let tasks = vec![task("t1", "low priority item work", "a.md"), task("t2", "high priority item work", "b.md")];
    let result = filter_tasks(tasks, &commitments);
    assert_eq!(result[0].task.task_id, TaskId::new("t2"));
    assert_eq!(result[1].task.task_id, TaskId::new("t1"));
}

#[test]
fn ties_break_by_original_queue_order() {
    let commitments = vec![commitment("c1", "shared focus", 1, CommitmentState::Active)];
    let tasks = vec![
        task("t1", "shared focus work one", "a.md"),
        task("t2", "shared focus work two", "b.md"),
    ];
    let result = filter_tasks(tasks, &commitments);
    assert_eq!(result[0].relevance_score, result[1].relevance_score);
    assert_eq!(result[0].task.task_id, TaskId::new("t1"));
    assert_eq!(result[1].task.task_id, TaskId::new("t2"));
}

#[test]
fn creative_sprint_protection_defers_maintenance_tasks() {
    let commitments = vec![commitment("c1", "write the novel", 1, CommitmentState::Active)];
    let tasks = vec![task("t1", "process-inbox", "inbox/x.md")];
    let result = filter_tasks(tasks, &commitments);
    assert!(result[0].deferred_reason.is_some());
}

#[test]
fn non_creative_top_commitment_does_not_defer_maintenance_tasks() {
    let commitments = vec![commitment("c1", "review the backlog", 1, CommitmentState::Active)];
    let tasks = vec![task("t1", "process-inbox", "inbox/x.md")];
    let result = filter_tasks(tasks, &commitments);
    assert!(result[0].deferred_reason.is_none());
}
