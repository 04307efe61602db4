// SPDX-License-Identifier: MIT

//! Fake task runner for testing: returns scripted outcomes, records calls.

use super::{RunnerContext, RunnerError, RunnerOutcome, TaskContext, TaskRunnerAdapter};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RunnerCall {
    pub task_id: String,
    pub prompt: String,
}

enum ScriptedResult {
    Outcome(RunnerOutcome),
    Error(RunnerError),
}

struct FakeTaskRunnerState {
    scripted: VecDeque<ScriptedResult>,
    calls: Vec<RunnerCall>,
}

/// Task runner that replays a queue of scripted outcomes/errors in order.
/// Once the queue is empty, further calls return a default success outcome.
#[derive(Clone)]
pub struct FakeTaskRunner {
    inner: Arc<Mutex<FakeTaskRunnerState>>,
}

impl Default for FakeTaskRunner {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeTaskRunnerState {
                scripted: VecDeque::new(),
                calls: Vec::new(),
            })),
        }
    }
}

impl FakeTaskRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_success(&self, task_id: impl Into<String>, phase: vh_core::Phase) {
        self.push_outcome(RunnerOutcome {
            task_id: task_id.into(),
            phase,
            success: true,
            executed: true,
            execution_mode: vh_core::ExecutionMode::Orchestrated,
            detail: "ok".to_string(),
            stdout: None,
            stderr: None,
            command_or_skill: None,
            expected_output_contract: None,
        });
    }

    pub fn push_failure(&self, task_id: impl Into<String>, phase: vh_core::Phase, detail: impl Into<String>) {
        self.push_outcome(RunnerOutcome {
            task_id: task_id.into(),
            phase,
            success: false,
            executed: true,
            execution_mode: vh_core::ExecutionMode::Orchestrated,
            detail: detail.into(),
            stdout: None,
            stderr: None,
            command_or_skill: None,
            expected_output_contract: None,
        });
    }

    pub fn push_outcome(&self, outcome: RunnerOutcome) {
        self.inner.lock().scripted.push_back(ScriptedResult::Outcome(outcome));
    }

    pub fn push_error(&self, error: RunnerError) {
        self.inner.lock().scripted.push_back(ScriptedResult::Error(error));
    }

    pub fn calls(&self) -> Vec<RunnerCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl TaskRunnerAdapter for FakeTaskRunner {
    async fn run(&self, task: TaskContext, _ctx: RunnerContext) -> Result<RunnerOutcome, RunnerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RunnerCall {
            task_id: task.task_id.clone(),
            prompt: task.prompt.clone(),
        });

        match inner.scripted.pop_front() {
            Some(ScriptedResult::Outcome(outcome)) => Ok(outcome),
            Some(ScriptedResult::Error(err)) => Err(err),
            None => Ok(RunnerOutcome {
                task_id: task.task_id,
                phase: task.phase,
                success: true,
                executed: true,
                execution_mode: task.execution_mode,
                detail: "default fake success".to_string(),
                stdout: None,
                stderr: None,
                command_or_skill: None,
                expected_output_contract: None,
            }),
        }
    }
}
