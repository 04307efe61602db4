// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vh-adapters: external collaborators the heartbeat core invokes but does
//! not own — feed polling, task execution, LLM synthesis, and diff
//! collection. Each has a trait, a subprocess-backed implementation, a
//! no-op implementation, and (behind `test-support`) a scripted fake.

pub mod diff;
pub mod env;
pub mod feed;
pub mod llm;
pub mod runner;
pub mod subprocess;

pub use diff::{DiffCollectorAdapter, NoOpDiffCollector, ProcessDiffCollector};
pub use feed::{FeedSourceAdapter, FeedSourceConfig, FeedSourceError, NoOpFeedSource, ProcessFeedSource};
pub use llm::{is_viable_response, LlmError, LlmRunnerAdapter, NoOpLlmRunner, ProcessLlmRunner};
pub use runner::{
    NoOpTaskRunner, ProcessTaskRunner, RunnerContext, RunnerError, RunnerOutcome, TaskContext,
    TaskRunnerAdapter,
};

#[cfg(any(test, feature = "test-support"))]
pub use diff::FakeDiffCollector;
#[cfg(any(test, feature = "test-support"))]
pub use feed::FakeFeedSource;
#[cfg(any(test, feature = "test-support"))]
pub use llm::FakeLlmRunner;
#[cfg(any(test, feature = "test-support"))]
pub use runner::{FakeTaskRunner, RunnerCall};
