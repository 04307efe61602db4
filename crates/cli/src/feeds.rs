// SPDX-License-Identifier: MIT

//! Feed-source configuration: reads the `feeds` list out of
//! `ops/config.yaml`, per spec.md §6's feed-source contract. Absent or
//! malformed config yields no feed sources rather than aborting startup.

use serde::Deserialize;
use vh_adapters::FeedSourceConfig;
use vh_storage::Vault;

#[derive(Debug, Clone, Deserialize)]
struct FeedEntry {
    id: String,
    name: String,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(rename = "pollIntervalMinutes", default = "default_poll_interval")]
    poll_interval_minutes: u32,
    #[serde(rename = "maxItemsPerPoll", default = "default_max_items")]
    max_items_per_poll: u32,
    /// External command the feed is polled through; a feed with no command
    /// is wired to a no-op source.
    #[serde(default)]
    command: Option<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_poll_interval() -> u32 {
    60
}

fn default_max_items() -> u32 {
    10
}

#[derive(Debug, Clone, Default, Deserialize)]
struct FeedsFile {
    #[serde(default)]
    feeds: Vec<FeedEntry>,
}

pub fn load_feed_sources(vault: &Vault) -> anyhow::Result<Vec<(FeedSourceConfig, Option<String>)>> {
    let contents = match vault.read(&vault.config_path())? {
        None => return Ok(Vec::new()),
        Some(contents) => contents,
    };

    let parsed: FeedsFile = match serde_yaml::from_str(&contents) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "ops/config.yaml is malformed; starting with no feed sources");
            return Ok(Vec::new());
        }
    };

    Ok(parsed
        .feeds
        .into_iter()
        .filter(|f| f.enabled)
        .map(|f| {
            (
                FeedSourceConfig {
                    id: f.id,
                    name: f.name,
                    enabled: f.enabled,
                    poll_interval_minutes: f.poll_interval_minutes,
                    max_items_per_poll: f.max_items_per_poll,
                },
                f.command,
            )
        })
        .collect())
}
