// SPDX-License-Identifier: MIT

//! Fake feed source for testing: returns scripted captures, records calls.

use super::{render_default_inbox_markdown, FeedSourceAdapter, FeedSourceConfig, FeedSourceError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use vh_core::FeedCapture;

struct FakeFeedState {
    captures: Vec<FeedCapture>,
    error: Option<FeedSourceError>,
    poll_calls: u32,
}

/// Feed source that returns a fixed batch (or error) set by the test.
pub struct FakeFeedSource {
    config: FeedSourceConfig,
    inner: Arc<Mutex<FakeFeedState>>,
}

impl FakeFeedSource {
    pub fn new(config: FeedSourceConfig) -> Self {
        Self {
            config,
            inner: Arc::new(Mutex::new(FakeFeedState {
                captures: Vec::new(),
                error: None,
                poll_calls: 0,
            })),
        }
    }

    pub fn set_captures(&self, captures: Vec<FeedCapture>) {
        self.inner.lock().captures = captures;
    }

    pub fn fail_next_with(&self, error: FeedSourceError) {
        self.inner.lock().error = Some(error);
    }

    pub fn poll_call_count(&self) -> u32 {
        self.inner.lock().poll_calls
    }
}

#[async_trait]
impl FeedSourceAdapter for FakeFeedSource {
    fn config(&self) -> &FeedSourceConfig {
        &self.config
    }

    async fn poll(&self, _vault_root: &str) -> Result<Vec<FeedCapture>, FeedSourceError> {
        let mut inner = self.inner.lock();
        inner.poll_calls += 1;
        if let Some(err) = inner.error.take() {
            return Err(err);
        }
        Ok(inner.captures.clone())
    }

    fn to_inbox_markdown(&self, capture: &FeedCapture) -> String {
        render_default_inbox_markdown(&self.config.name, capture)
    }
}
