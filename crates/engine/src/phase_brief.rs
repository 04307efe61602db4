// SPDX-License-Identifier: MIT

//! Phase 6 — Morning brief and phase 7 — Working memory. Per spec.md §4.9.

use chrono::{DateTime, Utc};
use vh_adapters::{is_viable_response, LlmRunnerAdapter};
use vh_core::{Commitment, NoiseAlert};
use vh_evaluate::thought_evaluator::{GraphTopology, ImpactReport};
use vh_storage::Vault;

use crate::config::{HeartbeatConfig, RunSlot};
use crate::result::HeartbeatCounters;

/// A brief older than this is considered stale and resynthesized even
/// without any actions this cycle, per spec.md §4.9 step 6.
const BRIEF_STALE_HOURS: i64 = 12;
/// Lines of `self/working-memory.md` sent to the LLM and quoted in the
/// brief prompt.
const WORKING_MEMORY_TAIL_LINES: usize = 30;

fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

fn brief_is_stale(vault: &Vault, now: DateTime<Utc>) -> bool {
    match vault.stat(&vault.morning_brief_path()).and_then(|m| m.modified().ok()) {
        Some(modified) => {
            let modified = DateTime::<Utc>::from(modified);
            (now - modified) > chrono::Duration::hours(BRIEF_STALE_HOURS)
        }
        None => true,
    }
}

fn should_write_brief(config: &HeartbeatConfig, counters: &HeartbeatCounters, vault: &Vault, now: DateTime<Utc>) -> bool {
    let right_slot = matches!(config.run_slot, RunSlot::Morning | RunSlot::Manual);
    if !right_slot {
        return false;
    }
    let actions_occurred = counters.tasks_executed > 0 || counters.tasks_advisory > 0 || counters.repairs_queued > 0 || counters.inbox_items_seeded > 0;
    actions_occurred || brief_is_stale(vault, now)
}

#[allow(clippy::too_many_arguments)]
fn build_brief_prompt(
    commitments: &[Commitment],
    counters: &HeartbeatCounters,
    recommendations: &[String],
    working_memory_tail: &str,
    topology: &GraphTopology,
    evaluation: &ImpactReport,
    noise_alerts: &[NoiseAlert],
) -> String {
    let mut prompt = String::new();
    prompt.push_str("Synthesize a morning brief for a knowledge-vault owner.\n\n");

    prompt.push_str("## Conditions\n");
    if recommendations.is_empty() {
        prompt.push_str("none flagged\n");
    } else {
        for r in recommendations {
            prompt.push_str(&format!("- {r}\n"));
        }
    }

    prompt.push_str("\n## Active Commitments\n");
    for c in commitments.iter().filter(|c| c.is_active()) {
        prompt.push_str(&format!("- {} (priority {})\n", c.label, c.priority));
    }

    prompt.push_str("\n## Execution Metrics\n");
    prompt.push_str(&format!(
        "executed={} advisory={} repairs_queued={} inbox_seeded={} captures_admitted={} captures_filtered={}\n",
        counters.tasks_executed, counters.tasks_advisory, counters.repairs_queued, counters.inbox_items_seeded, counters.captures_admitted, counters.captures_filtered
    ));

    if !noise_alerts.is_empty() {
        prompt.push_str("\n## Noise Alerts\n");
        for alert in noise_alerts {
            prompt.push_str(&format!(
                "- {}: filter rate {:.2} over {} days — {}\n",
                alert.source_id.as_str(),
                alert.filter_rate,
                alert.consecutive_days,
                alert.recommendation
            ));
        }
    }

    prompt.push_str("\n## Recent Working Memory\n");
    prompt.push_str(working_memory_tail);

    prompt.push_str("\n\n## Graph Topology\n");
    for map in &topology.maps {
        prompt.push_str(&format!("- map {} backlinks={} thin={}\n", map.slug, map.backlink_count, map.is_thin));
    }
    for sink in &topology.sink_nodes {
        prompt.push_str(&format!("- sink node {} incoming={} outgoing={}\n", sink.slug, sink.incoming, sink.outgoing));
    }

    prompt.push_str("\n## Evaluation\n");
    prompt.push_str(&format!(
        "avg_impact_score={:.2} orphan_rate={:.2} orphans={}\n",
        evaluation.avg_impact_score,
        evaluation.orphan_rate,
        evaluation.orphans.len()
    ));

    prompt
}

fn template_brief(commitments: &[Commitment], recommendations: &[String]) -> String {
    let mut out = String::new();
    out.push_str("# Morning Brief\n\n## Attention Needed\n");
    if recommendations.is_empty() {
        out.push_str("nothing flagged this cycle\n");
    } else {
        for r in recommendations {
            out.push_str(&format!("- {r}\n"));
        }
    }

    out.push_str("\n## Active Commitments\n");
    for c in commitments.iter().filter(|c| c.is_active()) {
        out.push_str(&format!("- {}\n", c.label));
    }

    out.push_str("\n## Recommendations\n");
    if recommendations.is_empty() {
        out.push_str("none\n");
    } else {
        for r in recommendations {
            out.push_str(&format!("- {r}\n"));
        }
    }
    out
}

/// Run phase 6: assemble and synthesize the morning brief, or skip outright
/// when the run slot and staleness conditions don't call for one.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn run_brief_phase(
    vault: &Vault,
    config: &HeartbeatConfig,
    commitments: &[Commitment],
    counters: &HeartbeatCounters,
    recommendations: &[String],
    topology: &GraphTopology,
    evaluation: &ImpactReport,
    noise_alerts: &[NoiseAlert],
    llm_runner: &dyn LlmRunnerAdapter,
    now: DateTime<Utc>,
) -> bool {
    if !should_write_brief(config, counters, vault, now) {
        return false;
    }

    let working_memory_tail = vault
        .read(&vault.working_memory_path())
        .ok()
        .flatten()
        .map(|text| last_lines(&text, WORKING_MEMORY_TAIL_LINES))
        .unwrap_or_default();

    let prompt = build_brief_prompt(commitments, counters, recommendations, &working_memory_tail, topology, evaluation, noise_alerts);
    let timeout = std::time::Duration::from_millis(config.runner_timeout_ms);

    let brief = match llm_runner.complete(&prompt, timeout).await {
        Ok(text) if is_viable_response(&text) => text,
        _ => template_brief(commitments, recommendations),
    };

    vault.write_atomic(&vault.morning_brief_path(), &brief).is_ok()
}

/// Run phase 7: append a short working-memory entry summarizing this
/// cycle's actions.
pub(crate) async fn run_working_memory_phase(vault: &Vault, actions_summary: &str, llm_runner: &dyn LlmRunnerAdapter, now: DateTime<Utc>) -> bool {
    let existing = vault.read(&vault.working_memory_path()).ok().flatten().unwrap_or_default();
    let tail = last_lines(&existing, WORKING_MEMORY_TAIL_LINES);

    let prompt = format!(
        "Append a 3-5 line working-memory entry for {} summarizing this cycle.\n\nRecent memory:\n{}\n\nActions this cycle:\n{}\n",
        now.to_rfc3339(),
        tail,
        actions_summary
    );
    let entry = match llm_runner.complete(&prompt, std::time::Duration::from_secs(60)).await {
        Ok(text) if is_viable_response(&text) => text,
        _ => format!("{} — {}", now.format("%Y-%m-%d %H:%M"), actions_summary),
    };

    let mut updated = existing;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(entry.trim());
    updated.push('\n');

    vault.write_atomic(&vault.working_memory_path(), &updated).is_ok()
}

#[cfg(test)]
#[path = "phase_brief_tests.rs"]
mod tests;
