// SPDX-License-Identifier: MIT

//! Error types for the heartbeat engine runtime.

use thiserror::Error;

/// Errors that can abort a heartbeat cycle outright. Per spec.md §7,
/// everything else (feed timeouts, runner failures, parse errors) is
/// recoverable and surfaces as a recommendation or telemetry event instead
/// of one of these.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Queue(#[from] vh_storage::QueueError),
    #[error(transparent)]
    Commitment(#[from] vh_storage::CommitmentStoreError),
    #[error(transparent)]
    Perception(#[from] vh_storage::PerceptionStoreError),
    #[error(transparent)]
    Vault(#[from] vh_storage::VaultStoreError),
    #[error("heartbeat depth {depth} exceeds the maximum of {max}; cycle skipped")]
    DepthExceeded { depth: u32, max: u32 },
}
