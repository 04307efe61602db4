// SPDX-License-Identifier: MIT

//! No-op feed source for disabled channels / minimal deployments.

use super::{render_default_inbox_markdown, FeedSourceAdapter, FeedSourceConfig, FeedSourceError};
use async_trait::async_trait;
use vh_core::FeedCapture;

#[derive(Debug, Clone)]
pub struct NoOpFeedSource {
    config: FeedSourceConfig,
}

impl NoOpFeedSource {
    pub fn new(config: FeedSourceConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl FeedSourceAdapter for NoOpFeedSource {
    fn config(&self) -> &FeedSourceConfig {
        &self.config
    }

    async fn poll(&self, _vault_root: &str) -> Result<Vec<FeedCapture>, FeedSourceError> {
        Ok(Vec::new())
    }

    fn to_inbox_markdown(&self, capture: &FeedCapture) -> String {
        render_default_inbox_markdown(&self.config.name, capture)
    }
}
