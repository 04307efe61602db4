// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vh-evaluate: the commitment and thought-graph scoring logic —
//! `CommitmentEvaluator` (C5), `DriftDetector` (C6), `CommitmentFilter`
//! (C7), and `ThoughtEvaluator` (C11). Pure functions over `vh-core` types
//! and pre-read graph data; no filesystem or process I/O.

mod activity;

pub mod commitment_evaluator;
pub mod drift;
pub mod filter;
pub mod thought_evaluator;

pub use commitment_evaluator::{evaluate_commitment, AdvancementStatus, EvaluatedCommitment, RecentActivity};
pub use drift::{activity_overlap, detect_drift, CommitmentDrift, DriftReport, PriorityInversion};
pub use filter::{filter_tasks, FilteredTask};
pub use thought_evaluator::{evaluate_thoughts, graph_topology, ConfidenceDistribution, GraphTopology, ImpactEntry, ImpactReport, MapSummary, SinkNode, ThoughtNode};
