// SPDX-License-Identifier: MIT

//! Feed source adapters: the external collaborator that turns a poll of
//! some outside transport into a batch of [`FeedCapture`]s.

mod noop;
mod process;

pub use noop::NoOpFeedSource;
pub use process::ProcessFeedSource;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeFeedSource;

use async_trait::async_trait;
use thiserror::Error;
use vh_core::FeedCapture;

/// Static configuration of one feed source, per spec.md §6's feed-source
/// contract.
#[derive(Debug, Clone)]
pub struct FeedSourceConfig {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub poll_interval_minutes: u32,
    pub max_items_per_poll: u32,
}

/// Errors raised by a feed source poll. Always caught by the caller and
/// turned into an empty capture batch plus a recommendation (spec.md §7:
/// `ErrFeedTimeout` / `ErrFeedPoll`).
#[derive(Debug, Error)]
pub enum FeedSourceError {
    #[error("feed {source_id} timed out: {detail}")]
    Timeout { source_id: String, detail: String },
    #[error("feed {source_id} poll failed: {detail}")]
    PollFailed { source_id: String, detail: String },
}

/// External collaborator providing a batch of captures per cycle.
#[async_trait]
pub trait FeedSourceAdapter: Send + Sync {
    fn config(&self) -> &FeedSourceConfig;

    /// Poll the underlying transport for new captures. Implementations are
    /// expected to bound themselves to [`crate::subprocess::FEED_POLL_TIMEOUT`];
    /// the caller applies the same bound defensively.
    async fn poll(&self, vault_root: &str) -> Result<Vec<FeedCapture>, FeedSourceError>;

    /// Render a capture as the body of an `inbox/<slug>.md` file.
    fn to_inbox_markdown(&self, capture: &FeedCapture) -> String;
}

/// Render a capture's YAML frontmatter + body, matching spec.md §6's
/// `inbox/*.md` requirement (`title`/`source`/`captured`/`tags` required).
pub fn render_default_inbox_markdown(source_name: &str, capture: &FeedCapture) -> String {
    let tags = if capture.urls.is_empty() {
        "tags: []".to_string()
    } else {
        let lines: Vec<_> = capture.urls.iter().map(|u| format!("  - {u}")).collect();
        format!("tags:\n{}", lines.join("\n"))
    };
    format!(
        "---\ntitle: {title}\nsource: {source}\ncaptured: {captured}\n{tags}\n---\n{content}\n",
        title = capture.title,
        source = source_name,
        captured = capture.captured_at.to_rfc3339(),
        content = capture.content,
    )
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
