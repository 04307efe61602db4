// SPDX-License-Identifier: MIT

//! `Telemetry` (C10): append-only writer for `ops/runtime/telemetry.jsonl`.
//!
//! Per spec.md §7, telemetry is best-effort: a write failure never aborts a
//! heartbeat cycle, it only logs a warning.

use std::fs::OpenOptions;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde_json::Value;
use vh_core::{TelemetryEvent, TelemetryEventType};
use vh_storage::Vault;

/// Appends [`TelemetryEvent`]s to the vault's `ops/runtime/telemetry.jsonl`.
pub struct Telemetry<'a> {
    vault: &'a Vault,
}

impl<'a> Telemetry<'a> {
    pub fn new(vault: &'a Vault) -> Self {
        Self { vault }
    }

    /// Record one event. Validates that session-bound event types carry a
    /// `session_id`; all I/O errors are swallowed after a warning log,
    /// never propagated to the caller.
    pub fn record(&self, event_type: TelemetryEventType, data: Value, session_id: Option<String>, at: DateTime<Utc>) {
        if event_type.requires_session_id() && session_id.is_none() {
            tracing::warn!(event = ?event_type, "telemetry event requires a session_id but none was given");
        }

        let mut event = TelemetryEvent::new(event_type, data, at);
        if let Some(session_id) = session_id {
            event = event.with_session(session_id);
        }

        if let Err(e) = self.append(&event) {
            tracing::warn!(error = %e, "failed to write telemetry event");
        }
    }

    fn append(&self, event: &TelemetryEvent) -> std::io::Result<()> {
        let path = self.vault.telemetry_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(event).map_err(std::io::Error::other)?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "telemetry_tests.rs"]
mod tests;
