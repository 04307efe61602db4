// SPDX-License-Identifier: MIT

//! Fake diff collector for testing: returns scripted diffs, records calls.

use super::DiffCollectorAdapter;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use vh_core::FileDiff;

#[derive(Default)]
struct FakeDiffState {
    diffs: HashMap<String, Vec<FileDiff>>,
    calls: Vec<String>,
}

#[derive(Clone, Default)]
pub struct FakeDiffCollector {
    inner: Arc<Mutex<FakeDiffState>>,
}

impl FakeDiffCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_diff(&self, path: impl Into<String>, diffs: Vec<FileDiff>) {
        self.inner.lock().diffs.insert(path.into(), diffs);
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl DiffCollectorAdapter for FakeDiffCollector {
    async fn collect(&self, absolute_source_path: &str) -> Vec<FileDiff> {
        let mut inner = self.inner.lock();
        inner.calls.push(absolute_source_path.to_string());
        inner.diffs.get(absolute_source_path).cloned().unwrap_or_default()
    }
}
