// SPDX-License-Identifier: MIT

//! No-op task runner: always reports success without executing anything.
//! Used for minimal/dry-run deployments where no external runner is wired.

use super::{RunnerContext, RunnerError, RunnerOutcome, TaskContext, TaskRunnerAdapter};
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpTaskRunner;

impl NoOpTaskRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TaskRunnerAdapter for NoOpTaskRunner {
    async fn run(&self, task: TaskContext, _ctx: RunnerContext) -> Result<RunnerOutcome, RunnerError> {
        Ok(RunnerOutcome {
            task_id: task.task_id,
            phase: task.phase,
            success: true,
            executed: false,
            execution_mode: task.execution_mode,
            detail: "no-op runner: advisory only".to_string(),
            stdout: None,
            stderr: None,
            command_or_skill: None,
            expected_output_contract: None,
        })
    }
}
