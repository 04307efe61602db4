// SPDX-License-Identifier: MIT

//! The durable task queue: `ops/queue/queue.json`.

use crate::error::QueueError;
use crate::vault::Vault;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{debug, info};
use vh_core::{
    ExecutionMode, Phase, PipelineTask, QueueFile, RepairContext, TaskId, TaskStatus, DEFAULT_MAX_ATTEMPTS, MAX_REPAIR_ATTEMPTS,
};

/// Tasks whose status is `done` and which are older than this are pruned at
/// the end of every heartbeat, per spec.md §4.2.
const PRUNE_AFTER_DAYS: i64 = 7;

/// Options for [`QueueManager::pop`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PopOptions {
    pub lock_ttl_seconds: i64,
}

/// Stateless façade over `ops/queue/queue.json`. All mutation methods take
/// an explicit `now` so callers (and tests) control time.
pub struct QueueManager;

impl QueueManager {
    /// Read the queue file, defaulting to an empty (but valid) queue when
    /// absent. Unknown `status`/`phase` strings never fail deserialization:
    /// tasks are read through [`RawPipelineTask`], which keeps both as
    /// plain strings, then coerced via [`QueueManager::coerce_status_phase`]
    /// per spec.md §3/§4.2's queue-file invariant.
    pub fn read(vault: &Vault, now: DateTime<Utc>) -> Result<QueueFile, QueueError> {
        match vault.read(&vault.queue_path())? {
            None => Ok(QueueFile::empty(now)),
            Some(contents) => {
                let raw: RawQueueFile =
                    serde_json::from_str(&contents).map_err(|e| QueueError::Corrupt(format!("queue.json: {e}")))?;
                Ok(raw.into())
            }
        }
    }

    /// Write the queue file. Callers must hold the `"queue"` advisory lock
    /// (via [`Vault::with_lock`]) for the full read-mutate-merge-write span.
    pub fn write(vault: &Vault, queue: &QueueFile) -> Result<(), QueueError> {
        let rendered = serde_json::to_string_pretty(queue)
            .map_err(|e| QueueError::Corrupt(format!("serializing queue.json: {e}")))?;
        vault.write_atomic(&vault.queue_path(), &rendered)?;
        Ok(())
    }

    /// Append a task to the queue, skipping the insert outright if a task
    /// with the same id already exists (idempotent enqueue).
    pub fn push(queue: &mut QueueFile, task: PipelineTask) {
        if queue.tasks.iter().any(|t| t.task_id == task.task_id) {
            return;
        }
        queue.tasks.push(task);
    }

    /// Pop the first eligible task (`pending`/`failed`, lock expired or
    /// absent). With `lock_ttl_seconds > 0` the task is left in place,
    /// flipped to `in-progress` with a fresh `lockedUntil`; with `0` it is
    /// removed from the queue entirely.
    pub fn pop(queue: &mut QueueFile, opts: PopOptions, now: DateTime<Utc>) -> Option<PipelineTask> {
        let idx = queue.tasks.iter().position(|t| t.eligible_for_pop(now))?;
        if opts.lock_ttl_seconds > 0 {
            let task = &mut queue.tasks[idx];
            task.status = TaskStatus::InProgress;
            task.locked_until = Some(now + Duration::seconds(opts.lock_ttl_seconds));
            task.updated_at = now;
            Some(task.clone())
        } else {
            Some(queue.tasks.remove(idx))
        }
    }

    /// Advance a successfully completed task to its next phase, pushing a
    /// deterministic follow-up task to defeat external writers that mark
    /// the original `done` out from under us. A `verify`-phase success has
    /// no next phase and is simply marked `done`.
    pub fn advance_on_success(queue: &mut QueueFile, task_id: &TaskId, now: DateTime<Utc>) {
        let Some(pos) = queue.tasks.iter().position(|t| &t.task_id == task_id) else {
            return;
        };
        let phase = queue.tasks[pos].phase;
        queue.tasks[pos].completed_phases.push(phase);
        queue.tasks[pos].updated_at = now;

        match phase.next() {
            None => {
                queue.tasks[pos].status = TaskStatus::Done;
            }
            Some(next_phase) => {
                queue.tasks[pos].status = TaskStatus::Done;
                let original = &queue.tasks[pos];
                let follow_up_id = original.follow_up_id(next_phase);
                if !queue.tasks.iter().any(|t| t.task_id == follow_up_id) {
                    let mut follow_up = original.clone();
                    follow_up.task_id = follow_up_id;
                    follow_up.phase = next_phase;
                    follow_up.status = TaskStatus::Pending;
                    follow_up.attempts = 0;
                    follow_up.locked_until = None;
                    follow_up.created_at = now;
                    follow_up.updated_at = now;
                    follow_up.repair_context = None;
                    queue.tasks.push(follow_up);
                }
            }
        }
    }

    /// Record a failed attempt: increments `attempts`, clears the lock, and
    /// marks the task `failed` once `attempts >= maxAttempts`, otherwise
    /// returns it to `pending` for a later retry.
    pub fn record_failure(queue: &mut QueueFile, task_id: &TaskId, now: DateTime<Utc>) {
        let Some(task) = queue.tasks.iter_mut().find(|t| &t.task_id == task_id) else {
            return;
        };
        task.attempts += 1;
        task.locked_until = None;
        task.updated_at = now;
        task.status = if task.attempts >= task.max_attempts {
            TaskStatus::Failed
        } else {
            TaskStatus::Pending
        };
    }

    /// Whether `queue` already carries a pending (non-terminal) repair task
    /// targeting the same original `(kind, target)` pair.
    pub fn has_pending_repair_for_original(queue: &QueueFile, kind: &str, target: &str) -> bool {
        queue.tasks.iter().any(|t| match &t.repair_context {
            Some(ctx) => {
                ctx.original_task.kind == kind
                    && ctx.original_task.target == target
                    && matches!(t.status, TaskStatus::Pending | TaskStatus::InProgress)
            }
            None => false,
        })
    }

    /// Whether a repair task should be enqueued for a failed task, per
    /// spec.md §4.2/§4.8: attempt budget not exhausted and no pending
    /// repair already covers the same original target.
    pub fn should_enqueue_repair(queue: &QueueFile, ctx: &RepairContext) -> bool {
        ctx.attempt_count < MAX_REPAIR_ATTEMPTS
            && !Self::has_pending_repair_for_original(
                queue,
                &ctx.original_task.kind,
                &ctx.original_task.target,
            )
    }

    /// Delta-merge an in-memory mutation (`baseline -> mutated`) against a
    /// freshly re-read queue (`fresh`), per spec.md §4.2's concurrent-write
    /// algorithm:
    ///
    /// - For each task present in `baseline`: overwrite the corresponding
    ///   entry in `fresh` with our mutated version *only if* `fresh`'s
    ///   `updatedAt` still equals `baseline`'s — otherwise a concurrent
    ///   writer has already touched it and wins, so we keep `fresh` as-is.
    /// - Additions in `mutated` not present in `baseline`: append to
    ///   `fresh` unless a task with the same id already exists there;
    ///   repair-task additions are further skipped if `fresh` already has a
    ///   pending repair for the same original.
    /// - `merged.lastUpdated = now`.
    pub fn delta_merge(
        baseline: &QueueFile,
        mutated: &QueueFile,
        fresh: &QueueFile,
        now: DateTime<Utc>,
    ) -> QueueFile {
        let mut merged = fresh.clone();

        for base_task in &baseline.tasks {
            let Some(our_task) = mutated.tasks.iter().find(|t| t.task_id == base_task.task_id) else {
                continue;
            };
            if let Some(fresh_idx) = merged.tasks.iter().position(|t| t.task_id == base_task.task_id) {
                if merged.tasks[fresh_idx].updated_at == base_task.updated_at {
                    merged.tasks[fresh_idx] = our_task.clone();
                } else {
                    debug!(task_id = %base_task.task_id, "concurrent writer wins delta-merge for task");
                }
            }
        }

        let added: Vec<_> = mutated
            .tasks
            .iter()
            .filter(|t| !baseline.tasks.iter().any(|b| b.task_id == t.task_id))
            .collect();
        for task in added {
            if merged.tasks.iter().any(|t| t.task_id == task.task_id) {
                continue;
            }
            if let Some(ctx) = &task.repair_context {
                if Self::has_pending_repair_for_original(&merged, &ctx.original_task.kind, &ctx.original_task.target) {
                    info!(task_id = %task.task_id, "skipping duplicate repair addition during delta-merge");
                    continue;
                }
            }
            merged.tasks.push(task.clone());
        }

        merged.last_updated = now;
        merged
    }

    /// Drop `done` tasks whose `updatedAt` is older than 7 days.
    pub fn prune(queue: &mut QueueFile, now: DateTime<Utc>) {
        let cutoff = now - Duration::days(PRUNE_AFTER_DAYS);
        queue
            .tasks
            .retain(|t| !(t.status == TaskStatus::Done && t.updated_at < cutoff));
    }

    /// Coerce a raw, possibly-historical status/phase pair read from
    /// untrusted input (e.g. an externally-written task file) into the
    /// closed enums the rest of the system assumes.
    pub fn coerce_status_phase(raw_status: &str, raw_phase: &str) -> (TaskStatus, Phase) {
        (TaskStatus::coerce(raw_status), Phase::coerce(raw_phase))
    }
}

/// Mirror of [`PipelineTask`] with `status`/`phase` left as raw strings, so
/// an externally-written `queue.json` carrying an unknown or historical
/// spelling never hard-fails deserialization. Converted to [`PipelineTask`]
/// via [`QueueManager::coerce_status_phase`].
#[derive(Debug, Deserialize)]
struct RawPipelineTask {
    #[serde(rename = "taskId")]
    task_id: TaskId,
    target: String,
    #[serde(rename = "sourcePath")]
    source_path: String,
    phase: String,
    status: String,
    #[serde(rename = "executionMode")]
    execution_mode: ExecutionMode,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    updated_at: DateTime<Utc>,
    #[serde(rename = "lockedUntil", default)]
    locked_until: Option<DateTime<Utc>>,
    #[serde(default)]
    attempts: u32,
    #[serde(rename = "maxAttempts", default = "raw_default_max_attempts")]
    max_attempts: u32,
    #[serde(rename = "completedPhases", default)]
    completed_phases: Vec<Phase>,
    #[serde(rename = "repair_context", default)]
    repair_context: Option<RepairContext>,
}

fn raw_default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl From<RawPipelineTask> for PipelineTask {
    fn from(raw: RawPipelineTask) -> Self {
        let (status, phase) = QueueManager::coerce_status_phase(&raw.status, &raw.phase);
        PipelineTask {
            task_id: raw.task_id,
            target: raw.target,
            source_path: raw.source_path,
            phase,
            status,
            execution_mode: raw.execution_mode,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            locked_until: raw.locked_until,
            attempts: raw.attempts,
            max_attempts: raw.max_attempts,
            completed_phases: raw.completed_phases,
            repair_context: raw.repair_context,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawQueueFile {
    version: u32,
    #[serde(default)]
    tasks: Vec<RawPipelineTask>,
    #[serde(rename = "lastUpdated")]
    last_updated: DateTime<Utc>,
}

impl From<RawQueueFile> for QueueFile {
    fn from(raw: RawQueueFile) -> Self {
        QueueFile {
            version: raw.version,
            tasks: raw.tasks.into_iter().map(PipelineTask::from).collect(),
            last_updated: raw.last_updated,
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
