// SPDX-License-Identifier: MIT

//! Pipeline task types: the unit of work carried in `ops/queue/queue.json`.

use crate::id::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A stage in the fixed `surface -> reflect -> revisit -> verify` chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Surface,
    Reflect,
    Revisit,
    Verify,
}

impl Phase {
    /// The next phase in the chain, or `None` if this is terminal (`verify`).
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Surface => Some(Phase::Reflect),
            Phase::Reflect => Some(Phase::Revisit),
            Phase::Revisit => Some(Phase::Verify),
            Phase::Verify => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Surface => "surface",
            Phase::Reflect => "reflect",
            Phase::Revisit => "revisit",
            Phase::Verify => "verify",
        }
    }

    /// Parse a phase name, coercing any unrecognized value to `surface`
    /// per the queue-file invariant in spec.md §3.
    pub fn coerce(raw: &str) -> Phase {
        match raw {
            "reflect" => Phase::Reflect,
            "revisit" => Phase::Revisit,
            "verify" => Phase::Verify,
            _ => Phase::Surface,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    #[serde(rename = "in-progress")]
    InProgress,
    Done,
    Failed,
    Archived,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
            TaskStatus::Failed => "failed",
            TaskStatus::Archived => "archived",
        }
    }

    /// Normalize historical status spellings, coercing anything unknown to
    /// `pending` per spec.md §3's queue-file invariant.
    pub fn coerce(raw: &str) -> TaskStatus {
        match raw {
            "pending" => TaskStatus::Pending,
            "in-progress" | "in_progress" => TaskStatus::InProgress,
            "done" | "complete" | "completed" => TaskStatus::Done,
            "failed" | "error" => TaskStatus::Failed,
            "archived" => TaskStatus::Archived,
            _ => TaskStatus::Pending,
        }
    }

    /// Eligible for `QueueManager::pop` per spec.md §4.2.
    pub fn is_eligible_for_pop(self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a task is meant to be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Orchestrated,
    Interactive,
}

impl ExecutionMode {
    pub fn coerce(raw: &str) -> ExecutionMode {
        match raw {
            "interactive" => ExecutionMode::Interactive,
            _ => ExecutionMode::Orchestrated,
        }
    }
}

/// A file-state snapshot captured for repair diagnostics: path -> truncated
/// content (at most 4,000 chars per spec.md §4.8).
pub type FileStateMap = BTreeMap<String, String>;

/// One file's before/after diff, collected by the external [`DiffCollector`]
/// (see `vh-adapters`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    pub path: String,
    pub diff: String,
}

/// Identity of the task that failed, carried into a repair task's context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalTaskRef {
    pub kind: String,
    pub target: String,
}

/// Context attached to a repair task, populated by [`crate`]-external
/// `RepairBuilder` (`vh-engine`). See spec.md §3 and §4.8.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairContext {
    pub original_task: OriginalTaskRef,
    pub error_message: String,
    pub vault_root: String,
    pub absolute_source_path: String,
    pub expected_output_contract: String,
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_or_skill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_stderr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_stdout: Option<String>,
    pub queue_excerpt: String,
    #[serde(default)]
    pub relevant_file_diffs: Vec<FileDiff>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_state: Option<FileStateMap>,
    pub attempted_at: DateTime<Utc>,
    pub attempt_count: u32,
}

/// Default number of attempts a task gets before it is marked `failed`.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Maximum number of repair attempts for a single (kind, target) per
/// spec.md §3 invariants.
pub const MAX_REPAIR_ATTEMPTS: u32 = 2;

/// A unit of work in the pipeline task queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineTask {
    #[serde(rename = "taskId")]
    pub task_id: TaskId,
    pub target: String,
    #[serde(rename = "sourcePath")]
    pub source_path: String,
    pub phase: Phase,
    pub status: TaskStatus,
    #[serde(rename = "executionMode")]
    pub execution_mode: ExecutionMode,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "lockedUntil", default, skip_serializing_if = "Option::is_none")]
    pub locked_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attempts: u32,
    #[serde(rename = "maxAttempts", default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(rename = "completedPhases", default)]
    pub completed_phases: Vec<Phase>,
    #[serde(rename = "repair_context", default, skip_serializing_if = "Option::is_none")]
    pub repair_context: Option<RepairContext>,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl PipelineTask {
    /// A fresh, pending `surface`-phase task.
    pub fn new_surface(task_id: TaskId, target: String, source_path: String, now: DateTime<Utc>) -> Self {
        Self {
            task_id,
            target,
            source_path,
            phase: Phase::Surface,
            status: TaskStatus::Pending,
            execution_mode: ExecutionMode::Orchestrated,
            created_at: now,
            updated_at: now,
            locked_until: None,
            attempts: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            completed_phases: Vec::new(),
            repair_context: None,
        }
    }

    /// Whether `now` has passed this task's lock expiry (or there is none).
    pub fn lock_expired(&self, now: DateTime<Utc>) -> bool {
        match self.locked_until {
            None => true,
            Some(until) => until <= now,
        }
    }

    /// Eligible for `QueueManager::pop` per spec.md §4.2.
    pub fn eligible_for_pop(&self, now: DateTime<Utc>) -> bool {
        self.status.is_eligible_for_pop() && self.lock_expired(now)
    }

    /// Combined text used by the commitment filter for substring/token
    /// matching (target + sourcePath).
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.target, self.source_path)
    }

    /// Deterministic id for the follow-up task spawned on auto-advance:
    /// `"<taskId>-<phase>"`, per spec.md §4.2 and §8.
    pub fn follow_up_id(&self, next_phase: Phase) -> TaskId {
        TaskId::new(format!("{}-{}", self.task_id.as_str(), next_phase.as_str()))
    }

    pub fn is_repair(&self) -> bool {
        self.repair_context.is_some()
    }
}

/// The full, durable queue file: `ops/queue/queue.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueFile {
    pub version: u32,
    pub tasks: Vec<PipelineTask>,
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
}

impl QueueFile {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            version: 1,
            tasks: Vec::new(),
            last_updated: now,
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
