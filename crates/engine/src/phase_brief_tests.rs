use super::*;
use tempfile::tempdir;
use vh_adapters::FakeLlmRunner;
use vh_evaluate::thought_evaluator::{ConfidenceDistribution, GraphTopology, ImpactReport};

fn empty_topology() -> GraphTopology {
    GraphTopology {
        maps: vec![],
        confidence_distribution: ConfidenceDistribution::default(),
        sink_nodes: vec![],
    }
}

fn empty_evaluation() -> ImpactReport {
    ImpactReport {
        top: vec![],
        orphans: vec![],
        orphan_rate: 0.0,
        avg_impact_score: 0.0,
    }
}

#[tokio::test]
async fn brief_written_on_morning_slot_with_actions() {
    let dir = tempdir().unwrap();
    let vault = Vault::new(dir.path().to_path_buf());
    let now = Utc::now();
    let mut config = HeartbeatConfig::default();
    config.run_slot = RunSlot::Morning;
    let mut counters = HeartbeatCounters::default();
    counters.tasks_executed = 1;
    let llm = FakeLlmRunner::new();
    llm.push_response("a".repeat(40));

    let written = run_brief_phase(&vault, &config, &[], &counters, &[], &empty_topology(), &empty_evaluation(), &[], &llm, now).await;

    assert!(written);
    let contents = vault.read(&vault.morning_brief_path()).unwrap().unwrap();
    assert_eq!(contents, "a".repeat(40));
    assert_eq!(llm.prompts().len(), 1);
}

#[tokio::test]
async fn brief_skipped_on_evening_slot_with_no_stale_brief() {
    let dir = tempdir().unwrap();
    let vault = Vault::new(dir.path().to_path_buf());
    let now = Utc::now();
    let mut config = HeartbeatConfig::default();
    config.run_slot = RunSlot::Evening;
    let counters = HeartbeatCounters::default();
    let llm = FakeLlmRunner::new();

    let written = run_brief_phase(&vault, &config, &[], &counters, &[], &empty_topology(), &empty_evaluation(), &[], &llm, now).await;

    assert!(!written);
    assert!(llm.prompts().is_empty());
}

#[tokio::test]
async fn brief_written_when_stale_even_without_actions() {
    let dir = tempdir().unwrap();
    let vault = Vault::new(dir.path().to_path_buf());
    let now = Utc::now();
    let mut config = HeartbeatConfig::default();
    config.run_slot = RunSlot::Morning;
    let counters = HeartbeatCounters::default();
    let llm = FakeLlmRunner::new();
    llm.push_response("b".repeat(40));

    let written = run_brief_phase(&vault, &config, &[], &counters, &[], &empty_topology(), &empty_evaluation(), &[], &llm, now).await;

    assert!(written);
}

#[tokio::test]
async fn template_fallback_used_on_llm_failure() {
    let dir = tempdir().unwrap();
    let vault = Vault::new(dir.path().to_path_buf());
    let now = Utc::now();
    let mut config = HeartbeatConfig::default();
    config.run_slot = RunSlot::Manual;
    let mut counters = HeartbeatCounters::default();
    counters.tasks_executed = 1;
    let llm = FakeLlmRunner::new();
    llm.push_error();

    let recommendations = vec!["check the inbox".to_string()];
    let written = run_brief_phase(&vault, &config, &[], &counters, &recommendations, &empty_topology(), &empty_evaluation(), &[], &llm, now).await;

    assert!(written);
    let contents = vault.read(&vault.morning_brief_path()).unwrap().unwrap();
    assert!(contents.contains("Attention Needed"));
    assert!(contents.contains("check the inbox"));
}

#[tokio::test]
async fn working_memory_appends_entry() {
    let dir = tempdir().unwrap();
    let vault = Vault::new(dir.path().to_path_buf());
    let now = Utc::now();
    vault.write_atomic(&vault.working_memory_path(), "existing entry\n").unwrap();
    let llm = FakeLlmRunner::new();
    llm.push_response("did some useful things today across the vault");

    let written = run_working_memory_phase(&vault, "ran 2 tasks, seeded 1 inbox item", &llm, now).await;

    assert!(written);
    let contents = vault.read(&vault.working_memory_path()).unwrap().unwrap();
    assert!(contents.contains("existing entry"));
    assert!(contents.contains("did some useful things today across the vault"));
}

#[tokio::test]
async fn working_memory_falls_back_to_template_on_llm_failure() {
    let dir = tempdir().unwrap();
    let vault = Vault::new(dir.path().to_path_buf());
    let now = Utc::now();
    let llm = FakeLlmRunner::new();
    llm.push_error();

    let written = run_working_memory_phase(&vault, "ran 1 task", &llm, now).await;

    assert!(written);
    let contents = vault.read(&vault.working_memory_path()).unwrap().unwrap();
    assert!(contents.contains("ran 1 task"));
}
