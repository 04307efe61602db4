// SPDX-License-Identifier: MIT

//! No-op diff collector: always returns an empty diff list.

use super::DiffCollectorAdapter;
use async_trait::async_trait;
use vh_core::FileDiff;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpDiffCollector;

impl NoOpDiffCollector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DiffCollectorAdapter for NoOpDiffCollector {
    async fn collect(&self, _absolute_source_path: &str) -> Vec<FileDiff> {
        Vec::new()
    }
}
