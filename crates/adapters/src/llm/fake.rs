// SPDX-License-Identifier: MIT

//! Fake LLM runner for testing: returns scripted completions, records prompts.

use super::{LlmError, LlmRunnerAdapter};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

enum Scripted {
    Text(String),
    Error,
}

struct FakeLlmState {
    scripted: VecDeque<Scripted>,
    prompts: Vec<String>,
}

#[derive(Clone)]
pub struct FakeLlmRunner {
    inner: Arc<Mutex<FakeLlmState>>,
}

impl Default for FakeLlmRunner {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeLlmState {
                scripted: VecDeque::new(),
                prompts: Vec::new(),
            })),
        }
    }
}

impl FakeLlmRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, text: impl Into<String>) {
        self.inner.lock().scripted.push_back(Scripted::Text(text.into()));
    }

    pub fn push_error(&self) {
        self.inner.lock().scripted.push_back(Scripted::Error);
    }

    pub fn prompts(&self) -> Vec<String> {
        self.inner.lock().prompts.clone()
    }
}

#[async_trait]
impl LlmRunnerAdapter for FakeLlmRunner {
    async fn complete(&self, prompt: &str, _timeout: Duration) -> Result<String, LlmError> {
        let mut inner = self.inner.lock();
        inner.prompts.push(prompt.to_string());
        match inner.scripted.pop_front() {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::Error) => Err(LlmError::Failed("scripted failure".to_string())),
            None => Ok(String::new()),
        }
    }
}
