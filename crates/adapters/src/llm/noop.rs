// SPDX-License-Identifier: MIT

//! No-op LLM runner: always reports failure, forcing the template fallback.
//! Used when no LLM backend is configured.

use super::{LlmError, LlmRunnerAdapter};
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLlmRunner;

impl NoOpLlmRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LlmRunnerAdapter for NoOpLlmRunner {
    async fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, LlmError> {
        Err(LlmError::Failed("no LLM runner configured".to_string()))
    }
}
