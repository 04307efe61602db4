use super::*;
use chrono::NaiveDate;
use vh_core::DailyRate;

fn history_at_rate(days: u32, rate: f64) -> SourceNoiseHistory {
    let mut history = SourceNoiseHistory::default();
    let base = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    for offset in 0..days {
        history.daily_rates.push_back(DailyRate {
            date: base + chrono::Duration::days(offset as i64),
            admitted: 1,
            total: 20,
            rate,
        });
    }
    history
}

#[test]
fn no_alert_below_consecutive_day_threshold() {
    let history = history_at_rate(6, 0.95);
    assert!(check_noise_alert(&SourceId::new("feed-a"), &history).is_none());
}

#[test]
fn exactly_seven_consecutive_days_produces_one_alert() {
    let history = history_at_rate(7, 0.95);
    let alert = check_noise_alert(&SourceId::new("feed-a"), &history).expect("alert");
    assert_eq!(alert.consecutive_days, 7);
    assert_eq!(alert.source_id, SourceId::new("feed-a"));
}

#[test]
fn eighth_consecutive_day_still_produces_exactly_one_alert() {
    let history = history_at_rate(8, 0.95);
    let alert = check_noise_alert(&SourceId::new("feed-a"), &history).expect("alert");
    assert_eq!(alert.consecutive_days, 8);
}

#[test]
fn no_alert_below_rate_threshold() {
    let history = history_at_rate(10, 0.5);
    assert!(check_noise_alert(&SourceId::new("feed-a"), &history).is_none());
}

#[test]
fn streak_broken_by_a_better_day_resets_count() {
    let mut history = history_at_rate(7, 0.95);
    history.daily_rates.push_back(DailyRate {
        date: NaiveDate::from_ymd_opt(2026, 1, 8).unwrap(),
        admitted: 15,
        total: 20,
        rate: 0.25,
    });
    assert!(check_noise_alert(&SourceId::new("feed-a"), &history).is_none());
}
