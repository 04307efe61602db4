// SPDX-License-Identifier: MIT

//! `HeartbeatEngine`: the orchestrator tying every phase together into one
//! cycle, per spec.md §4.9 and §7.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use vh_adapters::{DiffCollectorAdapter, FeedSourceAdapter, LlmRunnerAdapter, TaskRunnerAdapter};
use vh_core::{IdGen, PerceptionPolicy, TelemetryEventType};
use vh_storage::{CommitmentStore, QueueManager, Vault};

use crate::config::{EnginePhase, HeartbeatConfig, MaintenanceThresholds};
use crate::depth::{depth_allows_run, should_reset_depth, MAX_HEARTBEAT_DEPTH};
use crate::error::EngineError;
use crate::phase_brief::{run_brief_phase, run_working_memory_phase};
use crate::phase_evaluation::run_evaluation_phase;
use crate::phase_execution::{run_execution_phase, run_threshold_actions_phase};
use crate::phase_perception::{build_perception_context, run_perception_phase};
use crate::result::{HeartbeatCounters, HeartbeatResult};
use crate::scan::scan_thoughts;
use crate::telemetry::Telemetry;

/// Session stub files in `ops/sessions/` older than this are pruned at the
/// end of every cycle, per spec.md §4.9's persistence-ordering note.
const SESSION_PRUNE_AFTER_DAYS: i64 = 30;

/// Writes `ops/.heartbeat-marker` on drop, so the marker is touched on
/// every `run_cycle` exit path — the depth-guard skip, a fatal `?` bail,
/// and the normal end of cycle alike — per spec.md §4.9/§5's "always
/// executes" requirement. Best-effort: a failed write is not itself a
/// cycle error.
struct MarkerGuard<'a> {
    vault: &'a Vault,
    now: DateTime<Utc>,
}

impl Drop for MarkerGuard<'_> {
    fn drop(&mut self) {
        let _ = self.vault.write_atomic(&self.vault.heartbeat_marker_path(), &self.now.to_rfc3339());
    }
}

/// The collaborators and configuration a heartbeat cycle needs. Holds
/// nothing that changes between cycles; `run_cycle` takes `depth` and `now`
/// explicitly so callers (and tests) control both.
pub struct HeartbeatEngine {
    vault: Vault,
    feed_sources: Vec<Arc<dyn FeedSourceAdapter>>,
    task_runner: Arc<dyn TaskRunnerAdapter>,
    llm_runner: Arc<dyn LlmRunnerAdapter>,
    diff_collector: Arc<dyn DiffCollectorAdapter>,
    id_gen: Arc<dyn IdGen>,
    config: HeartbeatConfig,
    perception_policy: PerceptionPolicy,
}

impl HeartbeatEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        vault: Vault,
        feed_sources: Vec<Arc<dyn FeedSourceAdapter>>,
        task_runner: Arc<dyn TaskRunnerAdapter>,
        llm_runner: Arc<dyn LlmRunnerAdapter>,
        diff_collector: Arc<dyn DiffCollectorAdapter>,
        id_gen: Arc<dyn IdGen>,
        config: HeartbeatConfig,
    ) -> Self {
        Self {
            vault,
            feed_sources,
            task_runner,
            llm_runner,
            diff_collector,
            id_gen,
            config,
            perception_policy: PerceptionPolicy::default(),
        }
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    /// Run one heartbeat cycle at recursion `depth`. Never returns `Err`
    /// except for the fatal-init failures `EngineError` names; everything
    /// else is folded into the `HeartbeatResult`'s recommendations or
    /// counters instead, per spec.md §7.
    pub async fn run_cycle(&self, depth: u32, now: DateTime<Utc>) -> Result<HeartbeatResult, EngineError> {
        let _marker_guard = MarkerGuard { vault: &self.vault, now };

        let effective_depth = if should_reset_depth(&self.vault) { 0 } else { depth };
        if !depth_allows_run(effective_depth) {
            let mut result = HeartbeatResult::skipped(format!(
                "heartbeat depth {effective_depth} exceeds the maximum of {MAX_HEARTBEAT_DEPTH}"
            ));
            result.recommend("a nested heartbeat invocation was skipped to avoid runaway recursion");
            return Ok(result);
        }

        let telemetry = Telemetry::new(&self.vault);
        let thresholds = load_thresholds_or_default(&self.vault);
        let mut counters = HeartbeatCounters::default();
        let mut recommendations = Vec::new();

        let since_last_evaluation = self
            .vault
            .stat(&self.vault.heartbeat_marker_path())
            .and_then(|m| m.modified().ok())
            .map(DateTime::<Utc>::from)
            .unwrap_or(now - chrono::Duration::days(1));

        let commitments = CommitmentStore::load(&self.vault, now)?;
        let thoughts = scan_thoughts(&self.vault);

        let mut noise_alerts = Vec::new();
        if self.config.includes(EnginePhase::Perception) {
            let ctx = build_perception_context(&self.vault, &commitments, &thoughts);
            let outcome = run_perception_phase(
                &self.vault,
                &self.feed_sources,
                &ctx,
                &self.perception_policy,
                &self.config,
                &mut counters,
                now,
            )
            .await;
            noise_alerts = outcome.noise_alerts;
        }

        let mut working_commitments = commitments.clone();
        let (graph_topology, impact_report) = if self.config.includes(EnginePhase::Evaluation) || self.config.includes(EnginePhase::GraphEvaluation) {
            let queue_snapshot = QueueManager::read(&self.vault, now)?;
            let evaluation = run_evaluation_phase(
                &self.vault,
                &mut working_commitments,
                &queue_snapshot,
                &thoughts,
                &thresholds,
                since_last_evaluation,
                now,
            );
            counters.commitments_evaluated = evaluation.commitments_evaluated;
            recommendations.extend(evaluation.recommendations);
            for flag in &evaluation.threshold_flags {
                telemetry.record(
                    TelemetryEventType::ThresholdTriggered,
                    serde_json::json!({"kind": format!("{:?}", flag.kind), "count": flag.count, "threshold": flag.threshold}),
                    None,
                    now,
                );
            }
            (evaluation.graph_topology, evaluation.impact_report)
        } else {
            (Default::default(), Default::default())
        };

        let mut queue = QueueManager::read(&self.vault, now)?;
        let baseline_queue = queue.clone();

        let mut task_outcomes = Vec::new();
        if self.config.includes(EnginePhase::Execution) {
            task_outcomes = run_execution_phase(
                &self.vault,
                &mut queue,
                &working_commitments.commitments,
                &self.config,
                self.task_runner.as_ref(),
                self.diff_collector.as_ref(),
                self.id_gen.as_ref(),
                &telemetry,
                &mut counters,
                now,
            )
            .await;
        }

        if self.config.includes(EnginePhase::ThresholdActions) {
            let flags = recompute_threshold_flags(&self.vault, &thresholds, impact_report.orphans.len());
            let seeded = run_threshold_actions_phase(&self.vault, &mut queue, &flags, &self.config, &mut counters, now);
            recommendations.extend(seeded);
        }

        let mut brief_written = false;
        if self.config.includes(EnginePhase::Brief) {
            brief_written = run_brief_phase(
                &self.vault,
                &self.config,
                &working_commitments.commitments,
                &counters,
                &recommendations,
                &graph_topology,
                &impact_report,
                &noise_alerts,
                self.llm_runner.as_ref(),
                now,
            )
            .await;
        }

        if self.config.includes(EnginePhase::WorkingMemory) {
            let summary = format!(
                "executed={} advisory={} repairs_queued={} inbox_seeded={}",
                counters.tasks_executed, counters.tasks_advisory, counters.repairs_queued, counters.inbox_items_seeded
            );
            run_working_memory_phase(&self.vault, &summary, self.llm_runner.as_ref(), now).await;
        }

        self.persist_commitments(&working_commitments, now)?;
        self.persist_queue(&baseline_queue, &queue, now)?;
        prune_stale_sessions(&self.vault, now);

        Ok(HeartbeatResult {
            counters,
            task_outcomes,
            noise_alerts,
            recommendations,
            brief_written,
            skipped: None,
        })
    }

    /// Persist commitments under the `"commitments"` lock. Re-reads the
    /// current store and overwrites it with our computed result — a
    /// concurrent heartbeat writing the same commitments is not expected
    /// within the depth-guarded recursion this engine allows.
    fn persist_commitments(&self, computed: &vh_core::CommitmentStoreFile, now: DateTime<Utc>) -> Result<(), EngineError> {
        CommitmentStore::with_commitment_lock(&self.vault, now, |store| {
            *store = computed.clone();
            Ok(())
        })?;
        Ok(())
    }

    /// Persist the queue under the `"queue"` lock via delta-merge against a
    /// fresh read, so a concurrent writer's changes to tasks we never
    /// touched this cycle survive.
    fn persist_queue(&self, baseline: &vh_core::QueueFile, mutated: &vh_core::QueueFile, now: DateTime<Utc>) -> Result<(), EngineError> {
        self.vault.with_lock("queue", || {
            let fresh = QueueManager::read(&self.vault, now).map_err(|e| match e {
                vh_storage::QueueError::Store(inner) => inner,
                other => vh_storage::VaultStoreError::Io {
                    path: self.vault.queue_path().display().to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, other.to_string()),
                },
            })?;
            let mut merged = QueueManager::delta_merge(baseline, mutated, &fresh, now);
            QueueManager::prune(&mut merged, now);
            QueueManager::write(&self.vault, &merged).map_err(|e| match e {
                vh_storage::QueueError::Store(inner) => inner,
                other => vh_storage::VaultStoreError::Io {
                    path: self.vault.queue_path().display().to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, other.to_string()),
                },
            })
        })?;
        Ok(())
    }
}

fn load_thresholds_or_default(vault: &Vault) -> MaintenanceThresholds {
    crate::config::load_maintenance_thresholds(vault).unwrap_or_default()
}

/// Re-derive threshold flags against current on-disk counts for the
/// threshold-actions phase, which runs after evaluation may have mutated
/// the inbox via auto-seeding in an earlier cycle.
fn recompute_threshold_flags(vault: &Vault, thresholds: &MaintenanceThresholds, orphan_count: usize) -> Vec<crate::phase_evaluation::ThresholdFlag> {
    use crate::phase_evaluation::{count_thresholds, ThresholdFlag, ThresholdKind};
    let counts = count_thresholds(vault);
    let mut flags = Vec::new();
    let mut push = |kind: ThresholdKind, count: usize, threshold: u32| {
        if count > threshold as usize {
            flags.push(ThresholdFlag { kind, count, threshold: threshold as usize });
        }
    };
    push(ThresholdKind::Inbox, counts.inbox, thresholds.inbox_threshold);
    push(ThresholdKind::Observation, counts.observations, thresholds.observation_threshold);
    push(ThresholdKind::Tension, counts.tensions, thresholds.tension_threshold);
    push(ThresholdKind::UnprocessedSessions, counts.unprocessed_sessions, thresholds.unprocessed_sessions_threshold);
    push(ThresholdKind::Orphan, orphan_count, thresholds.orphan_threshold);
    flags
}

fn prune_stale_sessions(vault: &Vault, now: DateTime<Utc>) {
    let dir = vault.sessions_dir();
    let Ok(entries) = std::fs::read_dir(&dir) else { return };
    let cutoff = now - chrono::Duration::days(SESSION_PRUNE_AFTER_DAYS);
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(metadata) = vault.stat(&path) else { continue };
        let Ok(modified) = metadata.modified() else { continue };
        if DateTime::<Utc>::from(modified) < cutoff {
            let _ = std::fs::remove_file(&path);
        }
    }
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
