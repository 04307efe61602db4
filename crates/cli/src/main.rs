// SPDX-License-Identifier: MIT

//! Thin CLI entry point that wires adapters together and runs one
//! heartbeat cycle. Argument parsing, adapter selection, and logging live
//! here; the orchestration itself lives in `vh-engine`, per spec.md's
//! framing of CLI parsing as an external collaborator, not the core.

mod args;
mod feeds;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use vh_adapters::{
    FeedSourceAdapter, NoOpFeedSource, NoOpLlmRunner, NoOpTaskRunner, ProcessDiffCollector, ProcessFeedSource, ProcessLlmRunner,
    ProcessTaskRunner,
};
use vh_core::{IdGen, UuidIdGen};
use vh_engine::{HeartbeatConfig, HeartbeatEngine};
use vh_storage::Vault;

use args::Cli;

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(std::io::stderr)).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "heartbeat cycle failed to start");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let vault = Vault::new(cli.vault_root.clone());
    let config: HeartbeatConfig = cli.clone().into_config();

    let task_runner: Arc<dyn vh_adapters::TaskRunnerAdapter> = match &cli.runner_command {
        Some(_) => Arc::new(ProcessTaskRunner::new()),
        None => Arc::new(NoOpTaskRunner),
    };
    let llm_runner: Arc<dyn vh_adapters::LlmRunnerAdapter> = match &cli.llm_command {
        Some(command) => Arc::new(ProcessLlmRunner::new(command.clone())),
        None => Arc::new(NoOpLlmRunner),
    };
    let diff_collector: Arc<dyn vh_adapters::DiffCollectorAdapter> = Arc::new(ProcessDiffCollector::new());
    let id_gen: Arc<dyn IdGen> = Arc::new(UuidIdGen);

    let feed_sources = feeds::load_feed_sources(&vault).context("loading feed sources from ops/config.yaml")?;
    let feed_sources: Vec<Arc<dyn FeedSourceAdapter>> = feed_sources
        .into_iter()
        .map(|(config, command)| -> Arc<dyn FeedSourceAdapter> {
            match command {
                Some(command) => Arc::new(ProcessFeedSource::new(config, command)),
                None => Arc::new(NoOpFeedSource::new(config)),
            }
        })
        .collect();

    let engine = HeartbeatEngine::new(vault, feed_sources, task_runner, llm_runner, diff_collector, id_gen, config);

    let depth = vh_adapters::env::current_heartbeat_depth();
    let result = engine.run_cycle(depth, Utc::now()).await?;

    if let Some(reason) = &result.skipped {
        tracing::info!(reason = %reason, "heartbeat cycle skipped");
    } else {
        tracing::info!(
            tasks_executed = result.counters.tasks_executed,
            tasks_advisory = result.counters.tasks_advisory,
            repairs_queued = result.counters.repairs_queued,
            repairs_skipped = result.counters.repairs_skipped,
            inbox_items_seeded = result.counters.inbox_items_seeded,
            brief_written = result.brief_written,
            "heartbeat cycle complete"
        );
    }

    if matches!(cli.output, args::OutputFormat::Json) {
        println!("{}", serde_json::to_string_pretty(&result_to_json(&result))?);
    }

    Ok(())
}

fn result_to_json(result: &vh_engine::HeartbeatResult) -> serde_json::Value {
    serde_json::json!({
        "skipped": result.skipped,
        "briefWritten": result.brief_written,
        "recommendations": result.recommendations,
        "counters": {
            "capturesAdmitted": result.counters.captures_admitted,
            "capturesFiltered": result.counters.captures_filtered,
            "inboxItemsSeeded": result.counters.inbox_items_seeded,
            "tasksExecuted": result.counters.tasks_executed,
            "tasksAdvisory": result.counters.tasks_advisory,
            "repairsQueued": result.counters.repairs_queued,
            "repairsSkipped": result.counters.repairs_skipped,
            "commitmentsEvaluated": result.counters.commitments_evaluated,
        },
    })
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
