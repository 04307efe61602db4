use super::*;
use std::sync::Arc;
use tempfile::tempdir;
use vh_adapters::{FakeDiffCollector, FakeLlmRunner, FakeTaskRunner};
use vh_core::{PipelineTask, QueueFile, SequentialIdGen, TaskId, TaskStatus};

use crate::config::RunSlot;

fn engine(
    dir: &std::path::Path,
    runner: FakeTaskRunner,
    diff_collector: FakeDiffCollector,
    llm: FakeLlmRunner,
    config: HeartbeatConfig,
) -> HeartbeatEngine {
    HeartbeatEngine::new(
        Vault::new(dir.to_path_buf()),
        Vec::new(),
        Arc::new(runner),
        Arc::new(llm),
        Arc::new(diff_collector),
        Arc::new(SequentialIdGen::new("id")),
        config,
    )
}

fn seed_queue(vault: &Vault, task: PipelineTask, now: DateTime<Utc>) {
    let mut queue = QueueFile::empty(now);
    queue.tasks.push(task);
    QueueManager::write(vault, &queue).unwrap();
}

#[tokio::test]
async fn depth_at_max_skips_the_cycle() {
    let dir = tempdir().unwrap();
    let now = Utc::now();
    let vault = Vault::new(dir.path().to_path_buf());
    let eng = engine(dir.path(), FakeTaskRunner::new(), FakeDiffCollector::new(), FakeLlmRunner::new(), HeartbeatConfig::default());

    let result = eng.run_cycle(MAX_HEARTBEAT_DEPTH, now).await.unwrap();

    assert!(result.skipped.is_some());
    assert!(result.task_outcomes.is_empty());
    assert!(vault.stat(&vault.heartbeat_marker_path()).is_some());
}

#[tokio::test]
async fn successful_task_advances_to_next_phase_and_persists() {
    let dir = tempdir().unwrap();
    let now = Utc::now();
    let vault = Vault::new(dir.path().to_path_buf());
    seed_queue(
        &vault,
        PipelineTask::new_surface(TaskId::new("t1"), "x".to_string(), "thoughts/x.md".to_string(), now),
        now,
    );

    let runner = FakeTaskRunner::new();
    runner.push_success("t1", vh_core::Phase::Surface);
    let mut config = HeartbeatConfig::default();
    config.phases = vec![EnginePhase::Execution];

    let eng = engine(dir.path(), runner, FakeDiffCollector::new(), FakeLlmRunner::new(), config);
    let result = eng.run_cycle(0, now).await.unwrap();

    assert_eq!(result.counters.tasks_executed, 1);
    let persisted = QueueManager::read(&vault, now).unwrap();
    let original = persisted.tasks.iter().find(|t| t.task_id == TaskId::new("t1")).unwrap();
    assert_eq!(original.status, TaskStatus::Done);
    assert!(persisted.tasks.iter().any(|t| t.task_id == TaskId::new("t1-reflect")));
    assert!(vault.stat(&vault.heartbeat_marker_path()).is_some());
}

#[tokio::test]
async fn failed_task_spawns_exactly_one_repair() {
    let dir = tempdir().unwrap();
    let now = Utc::now();
    let vault = Vault::new(dir.path().to_path_buf());
    seed_queue(
        &vault,
        PipelineTask::new_surface(TaskId::new("t1"), "x".to_string(), "thoughts/x.md".to_string(), now),
        now,
    );

    let runner = FakeTaskRunner::new();
    runner.push_failure("t1", vh_core::Phase::Surface, "boom");
    let mut config = HeartbeatConfig::default();
    config.phases = vec![EnginePhase::Execution];

    let eng = engine(dir.path(), runner, FakeDiffCollector::new(), FakeLlmRunner::new(), config);
    let result = eng.run_cycle(0, now).await.unwrap();

    assert_eq!(result.counters.repairs_queued, 1);
    let persisted = QueueManager::read(&vault, now).unwrap();
    let repairs: Vec<_> = persisted.tasks.iter().filter(|t| t.is_repair()).collect();
    assert_eq!(repairs.len(), 1);
}

#[tokio::test]
async fn commitments_are_persisted_after_evaluation() {
    let dir = tempdir().unwrap();
    let now = Utc::now();
    let vault = Vault::new(dir.path().to_path_buf());
    let mut store = vh_core::CommitmentStoreFile::empty(now);
    store.commitments.push(vh_core::Commitment {
        id: vh_core::CommitmentId::new("ship-site"),
        label: "ship the site".to_string(),
        state: vh_core::CommitmentState::Active,
        priority: 1,
        horizon: vh_core::Horizon::Week,
        desire_class: vh_core::DesireClass::Thick,
        friction_class: vh_core::FrictionClass::Constitutive,
        source: "self/goals.md".to_string(),
        last_advanced_at: None,
        evidence: vec![],
        created_at: Some(now - chrono::Duration::days(30)),
        state_history: vec![],
        advancement_signals: vec![],
        outcome_pattern: None,
        drift_snapshots: None,
        desire_class_rationale: None,
    });
    vh_storage::CommitmentStore::write_atomic(&vault, &store).unwrap();

    let mut config = HeartbeatConfig::default();
    config.phases = vec![EnginePhase::Evaluation];
    let eng = engine(dir.path(), FakeTaskRunner::new(), FakeDiffCollector::new(), FakeLlmRunner::new(), config);

    let result = eng.run_cycle(0, now).await.unwrap();

    assert_eq!(result.counters.commitments_evaluated, 1);
    let reloaded = vh_storage::CommitmentStore::load(&vault, now).unwrap();
    assert_eq!(reloaded.commitments[0].advancement_signals.len(), 0);
}

#[tokio::test]
async fn morning_brief_written_on_manual_slot_with_executed_task() {
    let dir = tempdir().unwrap();
    let now = Utc::now();
    let vault = Vault::new(dir.path().to_path_buf());
    seed_queue(
        &vault,
        PipelineTask::new_surface(TaskId::new("t1"), "x".to_string(), "thoughts/x.md".to_string(), now),
        now,
    );

    let runner = FakeTaskRunner::new();
    runner.push_success("t1", vh_core::Phase::Surface);
    let llm = FakeLlmRunner::new();
    llm.push_response("a".repeat(40));
    let mut config = HeartbeatConfig::default();
    config.run_slot = RunSlot::Manual;
    config.phases = vec![EnginePhase::Execution, EnginePhase::Brief];

    let eng = engine(dir.path(), runner, FakeDiffCollector::new(), llm, config);
    let result = eng.run_cycle(0, now).await.unwrap();

    assert!(result.brief_written);
    assert!(vault.read(&vault.morning_brief_path()).unwrap().is_some());
}
