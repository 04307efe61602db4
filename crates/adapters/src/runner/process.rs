// SPDX-License-Identifier: MIT

//! Subprocess-backed task runner: pipes a task-context prompt to an
//! external command's stdin and parses its stdout as a JSON outcome.

use super::{RunnerContext, RunnerError, RunnerOutcome, TaskContext, TaskRunnerAdapter};
use crate::env::{self, STRIPPED_VAR};
use crate::subprocess::run_with_timeout;
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use vh_core::ExecutionMode;

/// Task runner whose execution contract is an external shell command given
/// by [`RunnerContext::runner_command`]. Environment is inherited with the
/// `INTENT_TASK_*`/`INTENT_VAULT_ROOT` variables added and `CLAUDECODE`
/// stripped, per spec.md §6.
pub struct ProcessTaskRunner;

impl ProcessTaskRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProcessTaskRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct RawOutcome {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    executed: bool,
    #[serde(rename = "executionMode", default)]
    execution_mode: Option<String>,
    #[serde(default)]
    detail: String,
    #[serde(default)]
    stdout: Option<String>,
    #[serde(default)]
    stderr: Option<String>,
    #[serde(rename = "commandOrSkill", default)]
    command_or_skill: Option<String>,
    #[serde(rename = "expectedOutputContract", default)]
    expected_output_contract: Option<String>,
}

#[async_trait]
impl TaskRunnerAdapter for ProcessTaskRunner {
    async fn run(&self, task: TaskContext, ctx: RunnerContext) -> Result<RunnerOutcome, RunnerError> {
        let Some(command) = &ctx.runner_command else {
            return Err(RunnerError::Failed {
                task_id: task.task_id.clone(),
                detail: "no runnerCommand configured".to_string(),
            });
        };

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .env_remove(STRIPPED_VAR)
            .envs(env::task_env_vars(
                &task.task_id,
                &task.target,
                &task.source_path,
                task.phase.as_str(),
                &ctx.vault_root,
            ))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| RunnerError::Failed {
            task_id: task.task_id.clone(),
            detail: format!("spawn failed: {e}"),
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(task.prompt.as_bytes()).await;
        }

        let output = match tokio::time::timeout(ctx.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(RunnerError::Failed {
                    task_id: task.task_id.clone(),
                    detail: e.to_string(),
                })
            }
            Err(_elapsed) => {
                return Err(RunnerError::Timeout {
                    task_id: task.task_id.clone(),
                    detail: format!("exceeded {}ms", ctx.timeout.as_millis()),
                })
            }
        };

        let raw: RawOutcome = serde_json::from_slice(&output.stdout).unwrap_or(RawOutcome {
            success: output.status.success(),
            executed: true,
            execution_mode: None,
            detail: String::from_utf8_lossy(&output.stdout).to_string(),
            stdout: None,
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
            command_or_skill: None,
            expected_output_contract: None,
        });

        Ok(RunnerOutcome {
            task_id: task.task_id,
            phase: task.phase,
            success: raw.success,
            executed: raw.executed,
            execution_mode: raw
                .execution_mode
                .as_deref()
                .map(ExecutionMode::coerce)
                .unwrap_or(task.execution_mode),
            detail: raw.detail,
            stdout: raw.stdout,
            stderr: raw.stderr,
            command_or_skill: raw.command_or_skill,
            expected_output_contract: raw.expected_output_contract,
        })
    }
}
