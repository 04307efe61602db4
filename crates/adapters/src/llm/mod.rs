// SPDX-License-Identifier: MIT

//! LLM runner adapters: the external collaborator synthesizing the morning
//! brief and working-memory updates.

mod noop;
mod process;

pub use noop::NoOpLlmRunner;
pub use process::ProcessLlmRunner;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeLlmRunner;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Raised when LLM synthesis is unavailable or its output is unusable.
/// Callers always fall back to a template on error (spec.md §7: `ErrLlmSynthesis`).
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm runner timed out after {0:?}")]
    Timeout(Duration),
    #[error("llm runner failed: {0}")]
    Failed(String),
}

/// Minimum response length below which output is treated as synthesis
/// failure and the template fallback runs, per spec.md §7.
pub const MIN_VIABLE_RESPONSE_LEN: usize = 20;

/// External collaborator: fire a prompt, get text back.
#[async_trait]
pub trait LlmRunnerAdapter: Send + Sync {
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, LlmError>;
}

/// Whether a completion is long enough to use as-is rather than falling
/// back to the template.
pub fn is_viable_response(text: &str) -> bool {
    text.trim().len() >= MIN_VIABLE_RESPONSE_LEN
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
