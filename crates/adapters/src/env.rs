// SPDX-License-Identifier: MIT

//! Centralized environment variable access for the adapters crate.

/// Variables copied into every external runner's environment, per spec.md
/// §6's task-runner contract.
pub const TASK_ID_VAR: &str = "INTENT_TASK_ID";
pub const TASK_TARGET_VAR: &str = "INTENT_TASK_TARGET";
pub const TASK_SOURCE_VAR: &str = "INTENT_TASK_SOURCE";
pub const TASK_PHASE_VAR: &str = "INTENT_TASK_PHASE";
pub const VAULT_ROOT_VAR: &str = "INTENT_VAULT_ROOT";

/// Process-wide recursion guard copied into spawned children's environment,
/// per spec.md §5 and §4.9's depth guard.
pub const HEARTBEAT_DEPTH_VAR: &str = "INTENT_HEARTBEAT_DEPTH";

/// Variable stripped from the runner's inherited environment so a nested
/// LLM subprocess doesn't believe it is already inside a Claude Code session.
pub const STRIPPED_VAR: &str = "CLAUDECODE";

/// Build the task-identity environment variables for a `TaskRunner`
/// invocation: task id/target/source/phase plus the vault root.
pub fn task_env_vars(
    task_id: &str,
    target: &str,
    source_path: &str,
    phase: &str,
    vault_root: &str,
) -> Vec<(String, String)> {
    vec![
        (TASK_ID_VAR.to_string(), task_id.to_string()),
        (TASK_TARGET_VAR.to_string(), target.to_string()),
        (TASK_SOURCE_VAR.to_string(), source_path.to_string()),
        (TASK_PHASE_VAR.to_string(), phase.to_string()),
        (VAULT_ROOT_VAR.to_string(), vault_root.to_string()),
    ]
}

/// Read the current heartbeat recursion depth from the process environment.
/// Absent or unparsable values are treated as depth 0.
pub fn current_heartbeat_depth() -> u32 {
    std::env::var(HEARTBEAT_DEPTH_VAR)
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
