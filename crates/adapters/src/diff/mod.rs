// SPDX-License-Identifier: MIT

//! Diff collector adapters: the external collaborator consulted while
//! building repair context (spec.md §4.8). Never surfaces an error — an
//! empty diff list on failure is itself the contract.

mod noop;
mod process;

pub use noop::NoOpDiffCollector;
pub use process::ProcessDiffCollector;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeDiffCollector;

use async_trait::async_trait;
use vh_core::FileDiff;

/// Diffs longer than this are truncated, per spec.md §4.8.
pub const MAX_DIFF_CHARS: usize = 4_000;

pub fn truncate_diff(text: String) -> String {
    if text.len() <= MAX_DIFF_CHARS {
        text
    } else {
        text.chars().take(MAX_DIFF_CHARS).collect()
    }
}

#[async_trait]
pub trait DiffCollectorAdapter: Send + Sync {
    /// Collect the diff for `absolute_source_path`, e.g. via `git diff`.
    /// Returns an empty vec on any error (not found, not a repo, timeout).
    async fn collect(&self, absolute_source_path: &str) -> Vec<FileDiff>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
