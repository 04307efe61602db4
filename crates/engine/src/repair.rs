// SPDX-License-Identifier: MIT

//! `RepairBuilder` (C8): turns a failed task into a fresh repair task
//! carrying enough context for an external runner to diagnose and fix the
//! underlying problem, per spec.md §4.8.

use chrono::{DateTime, Utc};
use std::path::Path;
use vh_adapters::DiffCollectorAdapter;
use vh_core::{
    ExecutionMode, FileStateMap, OriginalTaskRef, Phase, PipelineTask, QueueFile, RepairContext, TaskId, TaskStatus,
};
use vh_storage::Vault;

/// Cap applied to `file_state` and `relevant_file_diffs` text, per spec.md
/// §4.8.
const TRUNCATE_CHARS: usize = 4_000;
/// How many queue tasks are summarized into `queue_excerpt`.
const QUEUE_EXCERPT_SIZE: usize = 12;

fn truncate(text: String) -> String {
    if text.chars().count() <= TRUNCATE_CHARS {
        text
    } else {
        text.chars().take(TRUNCATE_CHARS).collect()
    }
}

fn expected_output_contract(phase: Phase) -> &'static str {
    match phase {
        Phase::Surface => "Diagnose the failure and apply a concrete fix so this note can be surfaced.",
        Phase::Reflect => "Diagnose the failure and apply a concrete fix so this note's reflection can complete.",
        Phase::Revisit => "Diagnose the failure and apply a concrete fix so this note's revisit can complete.",
        Phase::Verify => "Diagnose the failure and apply a concrete fix so this note's verification can complete.",
    }
}

/// Resolve the absolute path a repair should inspect: `sourcePath` if set,
/// falling back to `target` (some task kinds only carry a logical target).
fn resolve_absolute_source_path(vault: &Vault, source_path: &str, target: &str) -> String {
    let relative = if source_path.is_empty() { target } else { source_path };
    let path = Path::new(relative);
    if path.is_absolute() {
        relative.to_string()
    } else {
        vault.root().join(path).display().to_string()
    }
}

fn summarize_queue(queue: &QueueFile) -> String {
    queue
        .tasks
        .iter()
        .take(QUEUE_EXCERPT_SIZE)
        .map(|t| format!("{} [{}/{}] {}", t.task_id, t.phase, t.status, t.target))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds repair tasks from failed tasks. Holds the collaborators that
/// require I/O (`Vault` for the file-state read, `DiffCollectorAdapter` for
/// the diff) so the construction logic itself stays testable against a
/// fake collector.
pub struct RepairBuilder<'a> {
    vault: &'a Vault,
    diff_collector: &'a (dyn DiffCollectorAdapter + Send + Sync),
}

impl<'a> RepairBuilder<'a> {
    pub fn new(vault: &'a Vault, diff_collector: &'a (dyn DiffCollectorAdapter + Send + Sync)) -> Self {
        Self { vault, diff_collector }
    }

    /// Build a fresh repair task from `failed`. `next_task_id` is the
    /// caller-supplied id generator output (kept as a parameter so tests
    /// and callers stay deterministic).
    pub async fn build_repair_task(
        &self,
        failed: &PipelineTask,
        next_task_id: TaskId,
        error_message: String,
        last_stdout: Option<String>,
        last_stderr: Option<String>,
        queue: &QueueFile,
        now: DateTime<Utc>,
    ) -> PipelineTask {
        let attempt_count = failed.repair_context.as_ref().map(|c| c.attempt_count).unwrap_or(0) + 1;
        let absolute_source_path = resolve_absolute_source_path(self.vault, &failed.source_path, &failed.target);

        let file_state = self.read_file_state(&absolute_source_path);
        let relevant_file_diffs = self.diff_collector.collect(&absolute_source_path).await;

        let repair_context = RepairContext {
            original_task: OriginalTaskRef {
                kind: failed.phase.as_str().to_string(),
                target: failed.target.clone(),
            },
            error_message,
            vault_root: self.vault.root().display().to_string(),
            absolute_source_path,
            expected_output_contract: expected_output_contract(failed.phase).to_string(),
            phase: failed.phase,
            command_or_skill: None,
            last_stderr,
            last_stdout,
            queue_excerpt: summarize_queue(queue),
            relevant_file_diffs,
            stack_trace: None,
            file_state,
            attempted_at: now,
            attempt_count,
        };

        PipelineTask {
            task_id: next_task_id,
            target: failed.target.clone(),
            source_path: failed.source_path.clone(),
            phase: failed.phase,
            status: TaskStatus::Pending,
            execution_mode: ExecutionMode::Orchestrated,
            created_at: now,
            updated_at: now,
            locked_until: None,
            attempts: 0,
            max_attempts: failed.max_attempts,
            completed_phases: failed.completed_phases.clone(),
            repair_context: Some(repair_context),
        }
    }

    fn read_file_state(&self, absolute_source_path: &str) -> Option<FileStateMap> {
        let contents = self.vault.read(Path::new(absolute_source_path)).ok().flatten()?;
        let mut map = FileStateMap::new();
        map.insert(absolute_source_path.to_string(), truncate(contents));
        Some(map)
    }
}

#[cfg(test)]
#[path = "repair_tests.rs"]
mod tests;
