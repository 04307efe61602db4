// SPDX-License-Identifier: MIT

//! Error kinds for the storage layer.

use thiserror::Error;

/// Errors from [`crate::vault::Vault`] operations.
#[derive(Debug, Error)]
pub enum VaultStoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("timed out waiting for the {kind} lock")]
    LockTimeout { kind: String },
}

/// Errors from [`crate::queue::QueueManager`] operations. Most malformed
/// input is handled leniently (coerced to defaults); this enum only covers
/// cases spec.md §7 treats as surfaced failures.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error(transparent)]
    Store(#[from] VaultStoreError),
    #[error("queue file corrupt and unrecoverable: {0}")]
    Corrupt(String),
}

/// Errors from [`crate::commitments::CommitmentStore`] operations.
#[derive(Debug, Error)]
pub enum CommitmentStoreError {
    #[error(transparent)]
    Store(#[from] VaultStoreError),
    #[error(transparent)]
    InvalidTransition(#[from] vh_core::CommitmentError),
}

/// Errors from [`crate::perception::PerceptionStore`] operations.
#[derive(Debug, Error)]
pub enum PerceptionStoreError {
    #[error(transparent)]
    Store(#[from] VaultStoreError),
    #[error("perception runtime file corrupt: {0}")]
    Corrupt(String),
}
