// SPDX-License-Identifier: MIT

//! Telemetry event shapes, appended to `ops/runtime/telemetry.jsonl`.
//!
//! Writing and swallowing-on-error is the job of `vh-engine::telemetry`;
//! this module only defines the wire shape, kept in `vh-core` so every
//! crate can emit events without depending on the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed enum of event kinds a heartbeat cycle may emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryEventType {
    HeartbeatRun,
    TaskExecuted,
    TaskFailed,
    RepairQueued,
    RepairSkipped,
    CommitmentEvaluated,
    EvaluationRun,
    PerceptionAdmitted,
    NoiseAlert,
    DriftDetected,
    ThresholdTriggered,
    BriefWritten,
    WorkingMemoryUpdated,
}

impl TelemetryEventType {
    /// Types that must carry a `session_id` (interactive, human-in-the-loop
    /// events); all others are cycle-scoped and session-less.
    pub fn requires_session_id(&self) -> bool {
        matches!(self, TelemetryEventType::TaskExecuted)
    }
}

/// One line of `ops/runtime/telemetry.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: TelemetryEventType,
    pub data: Value,
    #[serde(rename = "sessionId", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl TelemetryEvent {
    pub fn new(event_type: TelemetryEventType, data: Value, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: at,
            event_type,
            data,
            session_id: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

#[cfg(test)]
#[path = "telemetry_tests.rs"]
mod tests;
