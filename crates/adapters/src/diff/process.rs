// SPDX-License-Identifier: MIT

//! `git diff`-backed diff collector.

use super::{truncate_diff, DiffCollectorAdapter};
use crate::subprocess::{run_with_timeout, DIFF_COLLECT_TIMEOUT};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;
use vh_core::FileDiff;

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessDiffCollector;

impl ProcessDiffCollector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DiffCollectorAdapter for ProcessDiffCollector {
    async fn collect(&self, absolute_source_path: &str) -> Vec<FileDiff> {
        let parent = match Path::new(absolute_source_path).parent() {
            Some(parent) => parent,
            None => return Vec::new(),
        };

        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(parent).arg("diff").arg("--").arg(absolute_source_path);

        match run_with_timeout(cmd, DIFF_COLLECT_TIMEOUT, "git diff").await {
            Ok(output) if output.status.success() => {
                let text = String::from_utf8_lossy(&output.stdout).to_string();
                if text.trim().is_empty() {
                    Vec::new()
                } else {
                    vec![FileDiff {
                        path: absolute_source_path.to_string(),
                        diff: truncate_diff(text),
                    }]
                }
            }
            Ok(_) => Vec::new(),
            Err(detail) => {
                debug!(path = absolute_source_path, detail, "diff collection failed");
                Vec::new()
            }
        }
    }
}
