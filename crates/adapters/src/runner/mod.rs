// SPDX-License-Identifier: MIT

//! Task runner adapters: the external collaborator invoked once per
//! selected task during phase 5b.

mod noop;
mod process;

pub use noop::NoOpTaskRunner;
pub use process::ProcessTaskRunner;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeTaskRunner, RunnerCall};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use vh_core::{ExecutionMode, Phase};

/// Context passed to a `TaskRunner` invocation, per spec.md §6.
#[derive(Debug, Clone)]
pub struct RunnerContext {
    pub vault_root: String,
    pub runner_command: Option<String>,
    pub timeout: Duration,
}

/// Result of one `TaskRunner` invocation, per spec.md §6's task-runner
/// contract.
#[derive(Debug, Clone)]
pub struct RunnerOutcome {
    pub task_id: String,
    pub phase: Phase,
    pub success: bool,
    pub executed: bool,
    pub execution_mode: ExecutionMode,
    pub detail: String,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub command_or_skill: Option<String>,
    pub expected_output_contract: Option<String>,
}

/// Errors surfaced by a task runner invocation. Both variants are treated
/// identically by the engine: mark the task failed/for-retry and consider
/// spawning a repair task (spec.md §7: `ErrRunnerFailure` / `ErrRunnerTimeout`).
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("runner for task {task_id} timed out: {detail}")]
    Timeout { task_id: String, detail: String },
    #[error("runner for task {task_id} failed: {detail}")]
    Failed { task_id: String, detail: String },
}

/// External collaborator that executes one pipeline task.
#[async_trait]
pub trait TaskRunnerAdapter: Send + Sync {
    async fn run(&self, task_context: TaskContext, ctx: RunnerContext) -> Result<RunnerOutcome, RunnerError>;
}

/// The subset of a `PipelineTask` a runner needs, kept adapter-local so this
/// crate does not need to depend on queue internals beyond `vh-core`.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub task_id: String,
    pub target: String,
    pub source_path: String,
    pub phase: Phase,
    pub execution_mode: ExecutionMode,
    pub prompt: String,
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
