// SPDX-License-Identifier: MIT

//! Engine configuration: the run-time options the orchestrator takes plus
//! the on-disk `ops/config.yaml` maintenance thresholds, per spec.md §6.

use serde::Deserialize;
use std::path::Path;
use vh_storage::{Vault, VaultStoreError};

/// Which scheduled run this is; controls whether the brief is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunSlot {
    Morning,
    Evening,
    Overnight,
    Manual,
}

impl Default for RunSlot {
    fn default() -> Self {
        RunSlot::Manual
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskSelection {
    QueueFirst,
    AlignedFirst,
}

impl Default for TaskSelection {
    fn default() -> Self {
        TaskSelection::QueueFirst
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepairMode {
    QueueOnly,
    Execute,
}

impl Default for RepairMode {
    fn default() -> Self {
        RepairMode::Execute
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThresholdMode {
    QueueOnly,
    Execute,
}

impl Default for ThresholdMode {
    fn default() -> Self {
        ThresholdMode::QueueOnly
    }
}

/// A phase an invocation may select. `HeartbeatConfig::phases` is a subset
/// of these, defaulting to all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnginePhase {
    Perception,
    Evaluation,
    Execution,
    ThresholdActions,
    GraphEvaluation,
    Brief,
    WorkingMemory,
}

pub const ALL_PHASES: &[EnginePhase] = &[
    EnginePhase::Perception,
    EnginePhase::Evaluation,
    EnginePhase::Execution,
    EnginePhase::ThresholdActions,
    EnginePhase::GraphEvaluation,
    EnginePhase::Brief,
    EnginePhase::WorkingMemory,
];

/// Per spec.md §6's "configuration options" list.
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    pub phases: Vec<EnginePhase>,
    pub run_slot: RunSlot,
    pub dry_run: bool,
    pub max_actions_per_run: usize,
    pub task_selection: TaskSelection,
    pub repair_mode: RepairMode,
    pub threshold_mode: ThresholdMode,
    pub runner_timeout_ms: u64,
    pub auto_seed_limit: usize,
    pub feed_poll_timeout_secs: u64,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            phases: ALL_PHASES.to_vec(),
            run_slot: RunSlot::default(),
            dry_run: false,
            max_actions_per_run: 3,
            task_selection: TaskSelection::default(),
            repair_mode: RepairMode::default(),
            threshold_mode: ThresholdMode::default(),
            runner_timeout_ms: 1_800_000,
            auto_seed_limit: 3,
            feed_poll_timeout_secs: 30,
        }
    }
}

impl HeartbeatConfig {
    pub fn includes(&self, phase: EnginePhase) -> bool {
        self.phases.contains(&phase)
    }

    /// Auto-seed is unbounded on the overnight slot, per spec.md §4.9 5c.1.
    pub fn effective_auto_seed_limit(&self) -> Option<usize> {
        if self.run_slot == RunSlot::Overnight {
            None
        } else {
            Some(self.auto_seed_limit)
        }
    }
}

/// Maintenance thresholds read from `ops/config.yaml`'s
/// `maintenance.conditions.*` keys, per spec.md §6.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct MaintenanceThresholds {
    pub inbox_threshold: u32,
    pub orphan_threshold: u32,
    pub observation_threshold: u32,
    pub tension_threshold: u32,
    pub unprocessed_sessions_threshold: u32,
    pub stale_days_threshold: u32,
}

impl Default for MaintenanceThresholds {
    fn default() -> Self {
        Self {
            inbox_threshold: 10,
            orphan_threshold: 5,
            observation_threshold: 10,
            tension_threshold: 5,
            unprocessed_sessions_threshold: 5,
            stale_days_threshold: 14,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct MaintenanceConditions {
    #[serde(flatten)]
    thresholds: MaintenanceThresholds,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MaintenanceSection {
    #[serde(default)]
    conditions: Option<MaintenanceConditions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    maintenance: MaintenanceSection,
}

/// Load `ops/config.yaml`, defaulting every threshold when the file is
/// absent or a key is missing. Malformed YAML falls back to all defaults
/// per spec.md §7's `ErrParse` policy rather than aborting the cycle.
pub fn load_maintenance_thresholds(vault: &Vault) -> Result<MaintenanceThresholds, VaultStoreError> {
    let path: &Path = &vault.config_path();
    let contents = match vault.read(path)? {
        None => return Ok(MaintenanceThresholds::default()),
        Some(contents) => contents,
    };
    match serde_yaml::from_str::<ConfigFile>(&contents) {
        Ok(parsed) => Ok(parsed
            .maintenance
            .conditions
            .map(|c| c.thresholds)
            .unwrap_or_default()),
        Err(e) => {
            tracing::warn!(error = %e, "ops/config.yaml is malformed; using default maintenance thresholds");
            Ok(MaintenanceThresholds::default())
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
