// SPDX-License-Identifier: MIT

//! Flag surface mapped onto [`vh_engine::HeartbeatConfig`], per spec.md
//! §6's "Configuration options" list.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use vh_engine::{EnginePhase, HeartbeatConfig, RepairMode, RunSlot, TaskSelection, ThresholdMode};

#[derive(Parser, Clone)]
#[command(name = "vh", version, about = "Run one knowledge-vault heartbeat cycle")]
pub struct Cli {
    /// Vault root directory
    #[arg(long = "vault-root", default_value = ".", value_name = "DIR")]
    pub vault_root: PathBuf,

    /// Phases to run this cycle; defaults to all
    #[arg(long = "phase", value_enum)]
    pub phases: Vec<Phase>,

    /// Which scheduled run this is
    #[arg(long = "run-slot", value_enum, default_value_t = Slot::Manual)]
    pub run_slot: Slot,

    /// Compute and report actions without executing or writing them
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Maximum tasks executed in one cycle
    #[arg(long = "max-actions-per-run", default_value_t = 3)]
    pub max_actions_per_run: usize,

    /// How execution candidates are ordered
    #[arg(long = "task-selection", value_enum, default_value_t = Selection::QueueFirst)]
    pub task_selection: Selection,

    /// Whether a failed task's repair is queued only or also executed
    #[arg(long = "repair-mode", value_enum, default_value_t = Repair::Execute)]
    pub repair_mode: Repair,

    /// Whether a tripped maintenance threshold queues only or also executes
    #[arg(long = "threshold-mode", value_enum, default_value_t = Threshold::QueueOnly)]
    pub threshold_mode: Threshold,

    /// External shell command a task runner invokes; omit to run with no-op tasks
    #[arg(long = "runner-command")]
    pub runner_command: Option<String>,

    /// External shell command invoked for brief/working-memory synthesis; omit to run without an LLM
    #[arg(long = "llm-command")]
    pub llm_command: Option<String>,

    /// Timeout for a task-runner invocation, in milliseconds
    #[arg(long = "runner-timeout-ms", default_value_t = 1_800_000)]
    pub runner_timeout_ms: u64,

    /// Cap on inbox items auto-seeded per cycle
    #[arg(long = "auto-seed-limit", default_value_t = 3)]
    pub auto_seed_limit: usize,

    /// Feed poll timeout, in seconds
    #[arg(long = "feed-poll-timeout-secs", default_value_t = 30)]
    pub feed_poll_timeout_secs: u64,

    /// Output format for the cycle summary
    #[arg(short = 'o', long = "output", value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

impl Cli {
    pub fn into_config(self) -> HeartbeatConfig {
        let phases = if self.phases.is_empty() {
            vh_engine::ALL_PHASES.to_vec()
        } else {
            self.phases.into_iter().map(EnginePhase::from).collect()
        };

        HeartbeatConfig {
            phases,
            run_slot: self.run_slot.into(),
            dry_run: self.dry_run,
            max_actions_per_run: self.max_actions_per_run,
            task_selection: self.task_selection.into(),
            repair_mode: self.repair_mode.into(),
            threshold_mode: self.threshold_mode.into(),
            runner_timeout_ms: self.runner_timeout_ms,
            auto_seed_limit: self.auto_seed_limit,
            feed_poll_timeout_secs: self.feed_poll_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Phase {
    Perception,
    Evaluation,
    Execution,
    ThresholdActions,
    GraphEvaluation,
    Brief,
    WorkingMemory,
}

impl From<Phase> for EnginePhase {
    fn from(p: Phase) -> Self {
        match p {
            Phase::Perception => EnginePhase::Perception,
            Phase::Evaluation => EnginePhase::Evaluation,
            Phase::Execution => EnginePhase::Execution,
            Phase::ThresholdActions => EnginePhase::ThresholdActions,
            Phase::GraphEvaluation => EnginePhase::GraphEvaluation,
            Phase::Brief => EnginePhase::Brief,
            Phase::WorkingMemory => EnginePhase::WorkingMemory,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Slot {
    Morning,
    Evening,
    Overnight,
    Manual,
}

impl From<Slot> for RunSlot {
    fn from(s: Slot) -> Self {
        match s {
            Slot::Morning => RunSlot::Morning,
            Slot::Evening => RunSlot::Evening,
            Slot::Overnight => RunSlot::Overnight,
            Slot::Manual => RunSlot::Manual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Selection {
    QueueFirst,
    AlignedFirst,
}

impl From<Selection> for TaskSelection {
    fn from(s: Selection) -> Self {
        match s {
            Selection::QueueFirst => TaskSelection::QueueFirst,
            Selection::AlignedFirst => TaskSelection::AlignedFirst,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Repair {
    QueueOnly,
    Execute,
}

impl From<Repair> for RepairMode {
    fn from(r: Repair) -> Self {
        match r {
            Repair::QueueOnly => RepairMode::QueueOnly,
            Repair::Execute => RepairMode::Execute,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Threshold {
    QueueOnly,
    Execute,
}

impl From<Threshold> for ThresholdMode {
    fn from(t: Threshold) -> Self {
        match t {
            Threshold::QueueOnly => ThresholdMode::QueueOnly,
            Threshold::Execute => ThresholdMode::Execute,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
