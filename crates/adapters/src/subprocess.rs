// SPDX-License-Identifier: MIT

//! Subprocess execution helpers shared by every process-backed adapter.

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Hard timeout for a single `FeedSource::poll` call (spec.md §5).
pub const FEED_POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for a `TaskRunner` invocation (spec.md §6: `runnerTimeoutMs`).
pub const TASK_RUNNER_DEFAULT_TIMEOUT: Duration = Duration::from_millis(1_800_000);

/// Timeout for the morning-brief LLM synthesis call.
pub const BRIEF_LLM_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for the working-memory LLM synthesis call.
pub const WORKING_MEMORY_LLM_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for a single `git diff` invocation made while building repair context.
pub const DIFF_COLLECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`, converting timeout
/// expiration into a descriptive error message. The child process is killed
/// automatically if the timeout elapses (via the tokio `Child` drop impl).
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{description} failed: {io_err}")),
        Err(_elapsed) => Err(format!(
            "{description} timed out after {}s",
            timeout.as_secs()
        )),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
