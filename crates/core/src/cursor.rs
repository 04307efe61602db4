// SPDX-License-Identifier: MIT

//! Per-source perception runtime state: polling cursors and noise history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Default retention ceiling for id-set cursors.
pub const DEFAULT_MAX_RETAINED_IDS: usize = 500;

/// Per-source polling state. Modeled as a tagged union so additional cursor
/// strategies (cursor-token, timestamp) can be added without breaking the
/// `id-set` variant already on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SourceCursor {
    #[serde(rename = "id-set")]
    IdSet {
        #[serde(rename = "seenIds")]
        seen_ids: Vec<String>,
        #[serde(rename = "maxRetained")]
        max_retained: usize,
    },
}

impl SourceCursor {
    pub fn new_id_set(max_retained: usize) -> Self {
        SourceCursor::IdSet {
            seen_ids: Vec::new(),
            max_retained,
        }
    }

    /// Record a newly-seen id, pruning to the retention ceiling. Returns
    /// `true` if the id was new.
    pub fn observe(&mut self, id: &str) -> bool {
        match self {
            SourceCursor::IdSet {
                seen_ids,
                max_retained,
            } => {
                if seen_ids.iter().any(|seen| seen == id) {
                    return false;
                }
                seen_ids.push(id.to_string());
                if seen_ids.len() > *max_retained {
                    let overflow = seen_ids.len() - *max_retained;
                    seen_ids.drain(0..overflow);
                }
                true
            }
        }
    }

    pub fn has_seen(&self, id: &str) -> bool {
        match self {
            SourceCursor::IdSet { seen_ids, .. } => seen_ids.iter().any(|seen| seen == id),
        }
    }
}

/// `ops/runtime/perception-cursors.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CursorStoreFile {
    #[serde(default)]
    pub sources: BTreeMap<String, SourceCursor>,
    #[serde(rename = "lastUpdated", default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Maximum number of daily rate entries retained per source, per spec.md §3.
pub const NOISE_HISTORY_DAYS: usize = 30;

/// One day's filter-rate summary for a source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRate {
    pub date: NaiveDate,
    pub admitted: u32,
    pub total: u32,
    pub rate: f64,
}

/// Per-source filter-rate history, bounded to [`NOISE_HISTORY_DAYS`] entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceNoiseHistory {
    #[serde(rename = "dailyRates", default)]
    pub daily_rates: VecDeque<DailyRate>,
}

impl SourceNoiseHistory {
    /// Merge today's counts into the history: adds to the existing entry for
    /// `date` if present, else appends a new one; then prunes to the most
    /// recent [`NOISE_HISTORY_DAYS`] days, sorted ascending by date.
    pub fn record(&mut self, date: NaiveDate, admitted: u32, total: u32) {
        if let Some(existing) = self.daily_rates.iter_mut().find(|d| d.date == date) {
            existing.admitted += admitted;
            existing.total += total;
            existing.rate = rate(existing.admitted, existing.total);
        } else {
            self.daily_rates.push_back(DailyRate {
                date,
                admitted,
                total,
                rate: rate(admitted, total),
            });
        }
        self.daily_rates.make_contiguous().sort_by_key(|d| d.date);
        while self.daily_rates.len() > NOISE_HISTORY_DAYS {
            self.daily_rates.pop_front();
        }
    }

    /// Number of consecutive most-recent days at or above `threshold`.
    pub fn consecutive_days_at_or_above(&self, threshold: f64) -> u32 {
        let mut count = 0u32;
        for entry in self.daily_rates.iter().rev() {
            if entry.rate >= threshold {
                count += 1;
            } else {
                break;
            }
        }
        count
    }
}

fn rate(admitted: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        1.0 - (admitted as f64 / total as f64)
    }
}

/// `ops/runtime/perception-noise.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoiseStoreFile {
    #[serde(default)]
    pub sources: BTreeMap<String, SourceNoiseHistory>,
    #[serde(rename = "lastUpdated", default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[path = "cursor_tests.rs"]
mod tests;
