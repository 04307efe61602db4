// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The heartbeat cycle: depth guard, perception, evaluation, execution,
//! threshold actions, graph evaluation, morning brief, working memory.

mod config;
mod depth;
mod error;
mod heartbeat;
mod phase_brief;
mod phase_evaluation;
mod phase_execution;
mod phase_perception;
mod repair;
mod result;
mod scan;
mod telemetry;

pub use config::{
    load_maintenance_thresholds, EnginePhase, HeartbeatConfig, MaintenanceThresholds, RepairMode, RunSlot,
    TaskSelection, ThresholdMode, ALL_PHASES,
};
pub use error::EngineError;
pub use heartbeat::HeartbeatEngine;
pub use result::{HeartbeatCounters, HeartbeatResult, TaskOutcome};
