// SPDX-License-Identifier: MIT

//! Subprocess-backed LLM runner: pipes a prompt to an external command's
//! stdin, collects its stdout as the completion.

use super::{LlmError, LlmRunnerAdapter};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// LLM runner whose backend is an external command (e.g. a wrapper script
/// around a hosted model). The prompt is written to stdin; stdout is the
/// completion.
pub struct ProcessLlmRunner {
    command: String,
}

impl ProcessLlmRunner {
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into() }
    }
}

#[async_trait]
impl LlmRunnerAdapter for ProcessLlmRunner {
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, LlmError> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| LlmError::Failed(e.to_string()))?;
        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(prompt.as_bytes()).await;
        }

        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| LlmError::Timeout(timeout))?
            .map_err(|e| LlmError::Failed(e.to_string()))?;

        if !output.status.success() {
            return Err(LlmError::Failed(String::from_utf8_lossy(&output.stderr).to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
