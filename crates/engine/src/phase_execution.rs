// SPDX-License-Identifier: MIT

//! Phase 5b — Execution and 5c — Threshold actions. Per spec.md §4.9.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use vh_adapters::{DiffCollectorAdapter, RunnerContext, TaskContext, TaskRunnerAdapter};
use vh_core::{
    Commitment, DesireClass, FrictionClass, IdGen, Phase, PipelineTask, QueueFile, TaskId, TaskStatus, TelemetryEventType,
};
use vh_evaluate::filter_tasks;
use vh_storage::{QueueManager, Vault};

use crate::config::{HeartbeatConfig, RepairMode, TaskSelection, ThresholdMode};
use crate::phase_evaluation::{ThresholdFlag, ThresholdKind};
use crate::repair::RepairBuilder;
use crate::result::{HeartbeatCounters, TaskOutcome};
use crate::telemetry::Telemetry;

/// Advisory deferral reason when a task only aligns with a thin-desire
/// commitment, per spec.md §4.9 5b.
const THIN_DESIRE_REASON: &str = "thin-desire";
/// Advisory deferral reason when a task only aligns with a
/// constitutive-friction commitment.
const CONSTITUTIVE_FRICTION_REASON: &str = "constitutive-friction";
/// Lock held on a task while the runner executes it.
const EXECUTION_LOCK_SECONDS: i64 = 300;
/// Cap on other-threshold actions executed or queued per cycle.
const MAX_THRESHOLD_ACTIONS_PER_CYCLE: usize = 2;

/// Build the candidate list per `task_selection`: all pending tasks for
/// `queue-first`, or only those whose combined text aligns with an active
/// commitment for `aligned-first`.
fn build_candidates(queue: &QueueFile, commitments: &[Commitment], selection: TaskSelection) -> Vec<PipelineTask> {
    let pending: Vec<PipelineTask> = queue.tasks.iter().filter(|t| t.status == TaskStatus::Pending).cloned().collect();
    match selection {
        TaskSelection::QueueFirst => pending,
        TaskSelection::AlignedFirst => {
            let active: Vec<&Commitment> = commitments.iter().filter(|c| c.is_active()).collect();
            pending
                .into_iter()
                .filter(|t| {
                    let combined = t.combined_text().to_lowercase();
                    active.iter().any(|c| combined.contains(&c.label.to_lowercase()))
                })
                .collect()
        }
    }
}

/// Run phase 5b: select, filter, and execute (or advise on) up to
/// `max_actions_per_run` candidate tasks.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn run_execution_phase(
    vault: &Vault,
    queue: &mut QueueFile,
    commitments: &[Commitment],
    config: &HeartbeatConfig,
    runner: &dyn TaskRunnerAdapter,
    diff_collector: &(dyn DiffCollectorAdapter + Send + Sync),
    id_gen: &dyn IdGen,
    telemetry: &Telemetry<'_>,
    counters: &mut HeartbeatCounters,
    now: DateTime<Utc>,
) -> Vec<TaskOutcome> {
    let candidates = build_candidates(queue, commitments, config.task_selection);
    let filtered = filter_tasks(candidates, commitments);

    let mut outcomes = Vec::new();
    for candidate in filtered.into_iter().take(config.max_actions_per_run) {
        let task_id = candidate.task.task_id.clone();

        let advisory_reason = if let Some(reason) = &candidate.deferred_reason {
            Some(reason.clone())
        } else if config.dry_run {
            Some("dry-run".to_string())
        } else if config.repair_mode == RepairMode::QueueOnly && candidate.task.is_repair() {
            Some("repair-mode=queue-only".to_string())
        } else {
            candidate
                .matched_commitment
                .as_ref()
                .and_then(|id| commitments.iter().find(|c| &c.id == id))
                .and_then(|c| {
                    if c.desire_class == DesireClass::Thin {
                        Some(THIN_DESIRE_REASON.to_string())
                    } else if c.friction_class == FrictionClass::Constitutive {
                        Some(CONSTITUTIVE_FRICTION_REASON.to_string())
                    } else {
                        None
                    }
                })
        };

        if let Some(reason) = advisory_reason {
            counters.tasks_advisory += 1;
            telemetry.record(TelemetryEventType::ThresholdTriggered, json!({"taskId": task_id.as_str(), "reason": reason}), None, now);
            outcomes.push(TaskOutcome {
                task_id,
                executed: false,
                success: None,
                advisory_reason: Some(reason),
            });
            continue;
        }

        let (outcome, repair_queued) = execute_one(vault, queue, &candidate.task, runner, diff_collector, id_gen, telemetry, config, counters, now).await;
        counters.tasks_executed += 1;
        if repair_queued {
            counters.repairs_queued += 1;
        }
        outcomes.push(outcome);
    }

    outcomes
}

#[allow(clippy::too_many_arguments)]
async fn execute_one(
    vault: &Vault,
    queue: &mut QueueFile,
    task: &PipelineTask,
    runner: &dyn TaskRunnerAdapter,
    diff_collector: &(dyn DiffCollectorAdapter + Send + Sync),
    id_gen: &dyn IdGen,
    telemetry: &Telemetry<'_>,
    config: &HeartbeatConfig,
    counters: &mut HeartbeatCounters,
    now: DateTime<Utc>,
) -> (TaskOutcome, bool) {
    let task_id = task.task_id.clone();
    if let Some(queued) = queue.tasks.iter_mut().find(|t| t.task_id == task_id) {
        queued.status = TaskStatus::InProgress;
        queued.locked_until = Some(now + Duration::seconds(EXECUTION_LOCK_SECONDS));
        queued.updated_at = now;
    }

    let task_context = TaskContext {
        task_id: task_id.as_str().to_string(),
        target: task.target.clone(),
        source_path: task.source_path.clone(),
        phase: task.phase,
        execution_mode: task.execution_mode,
        prompt: format!("{:?} {}", task.phase, task.target),
    };
    let runner_ctx = RunnerContext {
        vault_root: vault.root().display().to_string(),
        runner_command: None,
        timeout: std::time::Duration::from_millis(config.runner_timeout_ms),
    };

    match runner.run(task_context, runner_ctx).await {
        Ok(result) if result.success => {
            QueueManager::advance_on_success(queue, &task_id, now);
            telemetry.record(
                TelemetryEventType::TaskExecuted,
                json!({"taskId": task_id.as_str(), "success": true}),
                Some(task_id.as_str().to_string()),
                now,
            );
            (
                TaskOutcome {
                    task_id,
                    executed: true,
                    success: Some(true),
                    advisory_reason: None,
                },
                false,
            )
        }
        Ok(result) => {
            let repair_queued =
                handle_failure(vault, queue, task, result.detail, result.stdout, result.stderr, diff_collector, id_gen, telemetry, counters, now).await;
            (
                TaskOutcome {
                    task_id,
                    executed: true,
                    success: Some(false),
                    advisory_reason: None,
                },
                repair_queued,
            )
        }
        Err(e) => {
            let detail = e.to_string();
            let repair_queued = handle_failure(vault, queue, task, detail, None, None, diff_collector, id_gen, telemetry, counters, now).await;
            (
                TaskOutcome {
                    task_id,
                    executed: true,
                    success: Some(false),
                    advisory_reason: None,
                },
                repair_queued,
            )
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_failure(
    vault: &Vault,
    queue: &mut QueueFile,
    task: &PipelineTask,
    error_message: String,
    last_stdout: Option<String>,
    last_stderr: Option<String>,
    diff_collector: &(dyn DiffCollectorAdapter + Send + Sync),
    id_gen: &dyn IdGen,
    telemetry: &Telemetry<'_>,
    counters: &mut HeartbeatCounters,
    now: DateTime<Utc>,
) -> bool {
    QueueManager::record_failure(queue, &task.task_id, now);
    telemetry.record(
        TelemetryEventType::TaskFailed,
        json!({"taskId": task.task_id.as_str(), "error": error_message}),
        None,
        now,
    );

    let repair_builder = RepairBuilder::new(vault, diff_collector);
    let failed = queue.tasks.iter().find(|t| t.task_id == task.task_id).cloned().unwrap_or_else(|| task.clone());
    let should_enqueue = failed
        .repair_context
        .as_ref()
        .map(|ctx| QueueManager::should_enqueue_repair(queue, ctx))
        .unwrap_or(true)
        && !QueueManager::has_pending_repair_for_original(queue, task.phase.as_str(), &task.target);

    if !should_enqueue {
        counters.repairs_skipped += 1;
        telemetry.record(TelemetryEventType::RepairSkipped, json!({"taskId": task.task_id.as_str()}), None, now);
        return false;
    }

    let next_id = TaskId::new(format!("{}-repair-{}", task.task_id.as_str(), id_gen.next()));
    let repair = repair_builder
        .build_repair_task(&failed, next_id, error_message, last_stdout, last_stderr, queue, now)
        .await;
    telemetry.record(TelemetryEventType::RepairQueued, json!({"taskId": repair.task_id.as_str()}), None, now);
    QueueManager::push(queue, repair);
    true
}

/// Run phase 5c: auto-seed inbox items into surface tasks, then act on any
/// other exceeded threshold, capped at `MAX_THRESHOLD_ACTIONS_PER_CYCLE`.
pub(crate) fn run_threshold_actions_phase(
    vault: &Vault,
    queue: &mut QueueFile,
    threshold_flags: &[ThresholdFlag],
    config: &HeartbeatConfig,
    counters: &mut HeartbeatCounters,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut recommendations = Vec::new();
    auto_seed_inbox(vault, queue, config, counters, now);

    let mut acted = 0usize;
    for flag in threshold_flags {
        if flag.kind == ThresholdKind::Inbox {
            continue;
        }
        if acted >= MAX_THRESHOLD_ACTIONS_PER_CYCLE {
            recommendations.push(format!(
                "threshold action cap reached; {:?} ({} > {}) deferred to next cycle",
                flag.kind, flag.count, flag.threshold
            ));
            continue;
        }
        let target = threshold_target(flag.kind);
        let message = format!("{:?} threshold exceeded ({} > {})", flag.kind, flag.count, flag.threshold);
        match config.threshold_mode {
            ThresholdMode::QueueOnly => {
                let task_id = TaskId::new(format!("threshold-{}-{}", target, now.timestamp()));
                if !queue.tasks.iter().any(|t| t.target == target && t.status == TaskStatus::Pending) {
                    QueueManager::push(queue, PipelineTask::new_surface(task_id, target.to_string(), String::new(), now));
                    acted += 1;
                }
            }
            ThresholdMode::Execute => {
                acted += 1;
            }
        }
        recommendations.push(message);
    }

    recommendations
}

fn threshold_target(kind: ThresholdKind) -> &'static str {
    match kind {
        ThresholdKind::Inbox => "process-inbox",
        ThresholdKind::Orphan => "connect-orphans",
        ThresholdKind::Observation => "triage-observations",
        ThresholdKind::Tension => "resolve-tensions",
        ThresholdKind::UnprocessedSessions => "mine-sessions",
    }
}

fn auto_seed_inbox(vault: &Vault, queue: &mut QueueFile, config: &HeartbeatConfig, counters: &mut HeartbeatCounters, now: DateTime<Utc>) {
    let Ok(items) = vault.list_md(&vault.inbox_dir()) else { return };
    let limit = config.effective_auto_seed_limit();
    let date = now.format("%Y-%m-%d").to_string();

    for path in items.iter() {
        if let Some(limit) = limit {
            if counters.inbox_items_seeded >= limit {
                break;
            }
        }
        let slug = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        let target = format!("inbox-item:{slug}");
        if queue.tasks.iter().any(|t| t.target == target || t.source_path == path.display().to_string()) {
            continue;
        }

        let archive_dir = vault.queue_archive_dir().join(format!("{date}-{slug}"));
        let Some(contents) = vault.read(path).ok().flatten() else { continue };
        let file_name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        if vault.write_atomic(&archive_dir.join(&file_name), &contents).is_err() {
            continue;
        }
        let _ = std::fs::remove_file(path);

        let task_id = TaskId::new(format!("seed-{slug}-{}", now.timestamp()));
        let mut task = PipelineTask::new_surface(task_id, target, archive_dir.join(&file_name).display().to_string(), now);
        task.phase = Phase::Surface;
        QueueManager::push(queue, task);
        counters.inbox_items_seeded += 1;
    }
}

#[cfg(test)]
#[path = "phase_execution_tests.rs"]
mod tests;
