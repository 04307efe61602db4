// SPDX-License-Identifier: MIT

//! Persistence for the two perception runtime files: polling cursors
//! (`ops/runtime/perception-cursors.json`) and per-source noise history
//! (`ops/runtime/perception-noise.json`). The admission algorithm itself
//! lives in `vh-perception`; this is just the load/merge/write plumbing,
//! grounded the same way as [`crate::queue::QueueManager`].

use crate::error::PerceptionStoreError;
use crate::vault::Vault;
use chrono::{DateTime, NaiveDate, Utc};
use vh_core::{CursorStoreFile, NoiseStoreFile, SourceCursor};

/// Stateless façade over the cursor and noise runtime files.
pub struct PerceptionStore;

impl PerceptionStore {
    pub fn read_cursors(vault: &Vault) -> Result<CursorStoreFile, PerceptionStoreError> {
        match vault.read(&vault.cursors_path())? {
            None => Ok(CursorStoreFile::default()),
            Some(contents) => serde_json::from_str(&contents)
                .map_err(|e| PerceptionStoreError::Corrupt(format!("perception-cursors.json: {e}"))),
        }
    }

    pub fn write_cursors(vault: &Vault, store: &CursorStoreFile) -> Result<(), PerceptionStoreError> {
        let rendered = serde_json::to_string_pretty(store)
            .map_err(|e| PerceptionStoreError::Corrupt(format!("serializing perception-cursors.json: {e}")))?;
        vault.write_atomic(&vault.cursors_path(), &rendered)?;
        Ok(())
    }

    pub fn read_noise(vault: &Vault) -> Result<NoiseStoreFile, PerceptionStoreError> {
        match vault.read(&vault.noise_path())? {
            None => Ok(NoiseStoreFile::default()),
            Some(contents) => serde_json::from_str(&contents)
                .map_err(|e| PerceptionStoreError::Corrupt(format!("perception-noise.json: {e}"))),
        }
    }

    pub fn write_noise(vault: &Vault, store: &NoiseStoreFile) -> Result<(), PerceptionStoreError> {
        let rendered = serde_json::to_string_pretty(store)
            .map_err(|e| PerceptionStoreError::Corrupt(format!("serializing perception-noise.json: {e}")))?;
        vault.write_atomic(&vault.noise_path(), &rendered)?;
        Ok(())
    }

    /// Mark `id` as seen for `source_id`, creating an id-set cursor with
    /// `max_retained` on first use. Returns `true` if the id was new.
    pub fn observe(store: &mut CursorStoreFile, source_id: &str, id: &str, max_retained: usize, now: DateTime<Utc>) -> bool {
        let cursor = store
            .sources
            .entry(source_id.to_string())
            .or_insert_with(|| SourceCursor::new_id_set(max_retained));
        let is_new = cursor.observe(id);
        store.last_updated = Some(now);
        is_new
    }

    /// Merge today's admission counts into `source_id`'s noise history.
    pub fn record_noise(store: &mut NoiseStoreFile, source_id: &str, date: NaiveDate, admitted: u32, total: u32, now: DateTime<Utc>) {
        store
            .sources
            .entry(source_id.to_string())
            .or_default()
            .record(date, admitted, total);
        store.last_updated = Some(now);
    }
}

#[cfg(test)]
#[path = "perception_tests.rs"]
mod tests;
