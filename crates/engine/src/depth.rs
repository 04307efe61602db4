// SPDX-License-Identifier: MIT

//! Heartbeat recursion depth guard and the human-activity reset heuristic,
//! per spec.md §4.9.

use std::time::SystemTime;
use vh_storage::Vault;

/// Maximum nesting depth before a cycle exits early with a recommendation.
pub const MAX_HEARTBEAT_DEPTH: u32 = 2;

/// Whether the cycle should proceed at `depth`.
pub fn depth_allows_run(depth: u32) -> bool {
    depth < MAX_HEARTBEAT_DEPTH
}

/// If `ops/.heartbeat-marker`'s mtime is older than the newest file in
/// `thoughts/`, human activity has happened since the last heartbeat and
/// depth should reset to 0.
pub fn should_reset_depth(vault: &Vault) -> bool {
    let Some(marker) = vault.stat(&vault.heartbeat_marker_path()) else {
        return false;
    };
    let Ok(marker_mtime) = marker.modified() else {
        return false;
    };

    let Ok(entries) = vault.list_md(&vault.thoughts_dir()) else {
        return false;
    };
    let newest_thought_mtime: Option<SystemTime> = entries
        .iter()
        .filter_map(|p| vault.stat(p))
        .filter_map(|m| m.modified().ok())
        .max();

    match newest_thought_mtime {
        Some(newest) => marker_mtime < newest,
        None => false,
    }
}

#[cfg(test)]
#[path = "depth_tests.rs"]
mod tests;
