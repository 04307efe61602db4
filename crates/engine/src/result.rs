// SPDX-License-Identifier: MIT

//! `HeartbeatResult`: the summary every cycle produces, per spec.md §7 —
//! "the cycle always produces a `HeartbeatResult`... no throw escapes to
//! the caller except fatal init."

use vh_core::{NoiseAlert, TaskId};

/// One task's disposition during phase 5b/5c, kept for the cycle summary.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutcome {
    pub task_id: TaskId,
    pub executed: bool,
    pub success: Option<bool>,
    pub advisory_reason: Option<String>,
}

/// Counters accumulated over the cycle, surfaced for tests and telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeartbeatCounters {
    pub captures_admitted: usize,
    pub captures_filtered: usize,
    pub inbox_items_seeded: usize,
    pub tasks_executed: usize,
    pub tasks_advisory: usize,
    pub repairs_queued: usize,
    pub repairs_skipped: usize,
    pub commitments_evaluated: usize,
}

/// Everything a heartbeat cycle produced, per spec.md §7.
#[derive(Debug, Clone, Default)]
pub struct HeartbeatResult {
    pub counters: HeartbeatCounters,
    pub task_outcomes: Vec<TaskOutcome>,
    pub noise_alerts: Vec<NoiseAlert>,
    pub recommendations: Vec<String>,
    pub brief_written: bool,
    pub skipped: Option<String>,
}

impl HeartbeatResult {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            skipped: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn recommend(&mut self, message: impl Into<String>) {
        self.recommendations.push(message.into());
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
