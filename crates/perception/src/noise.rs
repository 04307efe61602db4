// SPDX-License-Identifier: MIT

//! Noise-tracking: turning a source's filter-rate history into an alert
//! once it has been mostly-filtered for a run of consecutive days, per
//! spec.md §4.4.

use vh_core::{NoiseAlert, SourceId, SourceNoiseHistory};

/// Consecutive-day threshold past which a source is flagged.
const CONSECUTIVE_DAYS_THRESHOLD: u32 = 7;
/// Filter-rate threshold a day must meet to count toward the streak.
const FILTER_RATE_THRESHOLD: f64 = 0.9;

/// Emit a [`NoiseAlert`] for `source_id` if its history shows at least
/// [`CONSECUTIVE_DAYS_THRESHOLD`] consecutive most-recent days at or above
/// [`FILTER_RATE_THRESHOLD`]. Returns `None` otherwise — including when the
/// streak is broken by a single better day, which resets the count to zero
/// (the alert never reflects a stale streak).
pub fn check_noise_alert(source_id: &SourceId, history: &SourceNoiseHistory) -> Option<NoiseAlert> {
    let consecutive_days = history.consecutive_days_at_or_above(FILTER_RATE_THRESHOLD);
    if consecutive_days < CONSECUTIVE_DAYS_THRESHOLD {
        return None;
    }
    let filter_rate = history.daily_rates.back().map(|d| d.rate).unwrap_or(0.0);
    Some(NoiseAlert {
        source_id: source_id.clone(),
        filter_rate,
        consecutive_days,
        recommendation: format!(
            "source {source_id} has filtered {:.0}% of captures for {consecutive_days} consecutive days — consider disabling it or narrowing its scope",
            filter_rate * 100.0
        ),
    })
}

#[cfg(test)]
#[path = "noise_tests.rs"]
mod tests;
