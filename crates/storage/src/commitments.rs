// SPDX-License-Identifier: MIT

//! The durable commitment store: `ops/commitments.json`.

use crate::error::CommitmentStoreError;
use crate::vault::Vault;
use chrono::{DateTime, Utc};
use vh_core::{slugify, Commitment, CommitmentId, CommitmentStoreFile};

/// Stateless façade over `ops/commitments.json`.
pub struct CommitmentStore;

impl CommitmentStore {
    /// Load the store, defaulting to empty when absent. `stateHistory` and
    /// `advancementSignals` on each commitment already default to `[]` via
    /// serde (see `vh_core::commitment`), which is the full migration this
    /// layer needs to perform on load per spec.md §4.3.
    pub fn load(vault: &Vault, now: DateTime<Utc>) -> Result<CommitmentStoreFile, CommitmentStoreError> {
        match vault.read(&vault.commitments_path())? {
            None => Ok(CommitmentStoreFile::empty(now)),
            Some(contents) => serde_json::from_str(&contents).map_err(|e| {
                CommitmentStoreError::Store(crate::error::VaultStoreError::Io {
                    path: vault.commitments_path().display().to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
                })
            }),
        }
    }

    /// Acquire the `"commitments"` advisory lock and run `f` with the
    /// current store, writing back whatever it returns.
    pub fn with_commitment_lock<T>(
        vault: &Vault,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut CommitmentStoreFile) -> Result<T, CommitmentStoreError>,
    ) -> Result<T, CommitmentStoreError> {
        vault.with_lock("commitments", || {
            let mut store = match Self::load(vault, now) {
                Ok(store) => store,
                Err(e) => return Err(into_vault_error(e)),
            };
            let result = f(&mut store).map_err(into_vault_error)?;
            Self::write_atomic_inner(vault, &store)?;
            Ok(result)
        })
        .map_err(CommitmentStoreError::Store)
    }

    /// Write the store file directly. Prefer [`Self::with_commitment_lock`]
    /// for read-modify-write cycles; this is exposed for callers that
    /// already hold the lock (e.g. the heartbeat's end-of-cycle write).
    pub fn write_atomic(vault: &Vault, store: &CommitmentStoreFile) -> Result<(), CommitmentStoreError> {
        Self::write_atomic_inner(vault, store).map_err(CommitmentStoreError::Store)
    }

    fn write_atomic_inner(
        vault: &Vault,
        store: &CommitmentStoreFile,
    ) -> Result<(), crate::error::VaultStoreError> {
        let rendered = serde_json::to_string_pretty(store).unwrap_or_else(|_| "{}".to_string());
        vault.write_atomic(&vault.commitments_path(), &rendered)
    }

    /// Derive a stable, deterministic commitment id from its label: slugify,
    /// then suffix with `-2`, `-3`, ... on collision against `existing`, per
    /// spec.md §4.3's determinism requirement. Re-deriving the same label
    /// against the same existing set always yields the same id, which is
    /// what keeps ids stable across migrations that re-derive rather than
    /// store an id directly.
    pub fn derive_id(label: &str, existing: &[Commitment]) -> CommitmentId {
        let base = slugify(label);
        if !existing.iter().any(|c| c.id.as_str() == base) {
            return CommitmentId::new(base);
        }
        let mut n = 2u32;
        loop {
            let candidate = format!("{base}-{n}");
            if !existing.iter().any(|c| c.id.as_str() == candidate) {
                return CommitmentId::new(candidate);
            }
            n += 1;
        }
    }
}

fn into_vault_error(e: CommitmentStoreError) -> crate::error::VaultStoreError {
    match e {
        CommitmentStoreError::Store(inner) => inner,
        CommitmentStoreError::InvalidTransition(err) => crate::error::VaultStoreError::Io {
            path: "ops/commitments.json".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, err.to_string()),
        },
    }
}

#[cfg(test)]
#[path = "commitments_tests.rs"]
mod tests;
