use super::*;
use args::{Cli, OutputFormat, Repair, Selection, Slot, Threshold};
use clap::Parser;
use vh_engine::{EnginePhase, RepairMode, RunSlot, TaskSelection, ThresholdMode};

#[test]
fn defaults_map_onto_heartbeat_config_default() {
    let cli = Cli::try_parse_from(["vh"]).unwrap();
    let config = cli.into_config();

    assert_eq!(config.phases, vh_engine::ALL_PHASES.to_vec());
    assert_eq!(config.run_slot, RunSlot::Manual);
    assert!(!config.dry_run);
    assert_eq!(config.max_actions_per_run, 3);
    assert_eq!(config.task_selection, TaskSelection::QueueFirst);
    assert_eq!(config.repair_mode, RepairMode::Execute);
    assert_eq!(config.threshold_mode, ThresholdMode::QueueOnly);
    assert_eq!(config.runner_timeout_ms, 1_800_000);
}

#[test]
fn explicit_phases_and_flags_are_mapped() {
    let cli = Cli::try_parse_from([
        "vh",
        "--phase",
        "execution",
        "--phase",
        "brief",
        "--run-slot",
        "morning",
        "--dry-run",
        "--task-selection",
        "aligned-first",
        "--repair-mode",
        "queue-only",
        "--threshold-mode",
        "execute",
    ])
    .unwrap();
    let config = cli.into_config();

    assert_eq!(config.phases, vec![EnginePhase::Execution, EnginePhase::Brief]);
    assert_eq!(config.run_slot, RunSlot::Morning);
    assert!(config.dry_run);
    assert_eq!(config.task_selection, TaskSelection::AlignedFirst);
    assert_eq!(config.repair_mode, RepairMode::QueueOnly);
    assert_eq!(config.threshold_mode, ThresholdMode::Execute);
}

#[test]
fn runner_and_llm_commands_are_optional() {
    let cli = Cli::try_parse_from(["vh", "--runner-command", "./run.sh", "--llm-command", "./brief.sh"]).unwrap();

    assert_eq!(cli.runner_command.as_deref(), Some("./run.sh"));
    assert_eq!(cli.llm_command.as_deref(), Some("./brief.sh"));
}

#[test]
fn rejects_unknown_phase() {
    assert!(Cli::try_parse_from(["vh", "--phase", "nonsense"]).is_err());
}

#[test]
fn output_format_defaults_to_text() {
    let cli = Cli::try_parse_from(["vh"]).unwrap();
    assert_eq!(cli.output, OutputFormat::Text);
}

#[test]
fn value_enum_conversions_cover_every_variant() {
    let _: RunSlot = Slot::Overnight.into();
    let _: TaskSelection = Selection::AlignedFirst.into();
    let _: RepairMode = Repair::QueueOnly.into();
    let _: ThresholdMode = Threshold::Execute.into();
}

#[test]
fn empty_vault_cycle_exits_successfully() {
    let dir = tempfile::tempdir().unwrap();
    assert_cmd::Command::cargo_bin("vh")
        .unwrap()
        .arg("--vault-root")
        .arg(dir.path())
        .arg("--run-slot")
        .arg("manual")
        .assert()
        .success();
}
