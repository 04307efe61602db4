// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vh-core: shared types for the autonomous knowledge-vault heartbeat.
//!
//! No filesystem or process I/O lives here — just the data model from
//! spec.md §3 and the small abstractions (ids, clock) that let the rest of
//! the workspace stay deterministic under test.

#[macro_use]
pub mod id;

pub mod clock;
pub mod commitment;
pub mod cursor;
pub mod perception;
pub mod telemetry;
pub mod thought;
pub mod task;
pub mod time_fmt;
pub mod warning;

pub use clock::{Clock, FakeClock, SystemClock};
pub use commitment::{
    AdvancementSignal, Commitment, CommitmentError, CommitmentState, CommitmentStoreFile,
    DesireClass, DriftSnapshot, FrictionClass, Horizon, ProposedBy, SignalMethod, StateTransition,
    ADVANCEMENT_THRESHOLD,
};
pub use cursor::{
    CursorStoreFile, DailyRate, NoiseStoreFile, SourceCursor, SourceNoiseHistory,
    DEFAULT_MAX_RETAINED_IDS, NOISE_HISTORY_DAYS,
};
pub use id::{CommitmentId, IdGen, SequentialIdGen, ShortId, SourceId, TaskId, UuidIdGen};
pub use perception::{slugify, FeedCapture, NoiseAlert, PerceptionContext, PerceptionPolicy};
pub use task::{
    ExecutionMode, FileDiff, FileStateMap, OriginalTaskRef, Phase, PipelineTask, QueueFile,
    RepairContext, TaskStatus, DEFAULT_MAX_ATTEMPTS, MAX_REPAIR_ATTEMPTS,
};
pub use telemetry::{TelemetryEvent, TelemetryEventType};
pub use thought::{canonicalize_wiki_link, extract_wiki_links, Confidence, Thought, ThoughtFrontmatter};
pub use time_fmt::{format_elapsed, format_elapsed_ms};
pub use warning::Warning;
