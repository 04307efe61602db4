// SPDX-License-Identifier: MIT

//! Subprocess-backed feed source: shells out to an external fetcher and
//! parses its stdout as a JSON array of captures.

use super::{render_default_inbox_markdown, FeedSourceAdapter, FeedSourceConfig, FeedSourceError};
use crate::subprocess::{run_with_timeout, FEED_POLL_TIMEOUT};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::warn;
use vh_core::FeedCapture;

/// A feed source whose transport is an external command. The command
/// receives `vault_root` as its sole argument and is expected to print a
/// JSON array of [`FeedCapture`] to stdout.
pub struct ProcessFeedSource {
    config: FeedSourceConfig,
    command: String,
}

impl ProcessFeedSource {
    pub fn new(config: FeedSourceConfig, command: impl Into<String>) -> Self {
        Self {
            config,
            command: command.into(),
        }
    }
}

#[async_trait]
impl FeedSourceAdapter for ProcessFeedSource {
    fn config(&self) -> &FeedSourceConfig {
        &self.config
    }

    async fn poll(&self, vault_root: &str) -> Result<Vec<FeedCapture>, FeedSourceError> {
        let mut cmd = Command::new(&self.command);
        cmd.arg(vault_root);

        let output = run_with_timeout(cmd, FEED_POLL_TIMEOUT, &self.config.name)
            .await
            .map_err(|detail| {
                if detail.contains("timed out") {
                    FeedSourceError::Timeout {
                        source_id: self.config.id.clone(),
                        detail,
                    }
                } else {
                    FeedSourceError::PollFailed {
                        source_id: self.config.id.clone(),
                        detail,
                    }
                }
            })?;

        if !output.status.success() {
            warn!(source = %self.config.id, "feed poll exited non-zero");
            return Err(FeedSourceError::PollFailed {
                source_id: self.config.id.clone(),
                detail: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        let captures: Vec<FeedCapture> = serde_json::from_slice(&output.stdout).map_err(|e| {
            FeedSourceError::PollFailed {
                source_id: self.config.id.clone(),
                detail: format!("malformed capture batch: {e}"),
            }
        })?;

        let cap = self.config.max_items_per_poll as usize;
        Ok(if captures.len() > cap {
            captures.into_iter().take(cap).collect()
        } else {
            captures
        })
    }

    fn to_inbox_markdown(&self, capture: &FeedCapture) -> String {
        render_default_inbox_markdown(&self.config.name, capture)
    }
}
