use super::*;
use chrono::NaiveDate;

fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + chrono::Duration::days(offset)
}

#[test]
fn id_set_cursor_dedupes_and_prunes() {
    let mut cursor = SourceCursor::new_id_set(2);
    assert!(cursor.observe("a"));
    assert!(!cursor.observe("a"));
    assert!(cursor.observe("b"));
    assert!(cursor.observe("c"));
    match &cursor {
        SourceCursor::IdSet { seen_ids, .. } => {
            assert_eq!(seen_ids.len(), 2);
            assert_eq!(seen_ids, &vec!["b".to_string(), "c".to_string()]);
        }
    }
}

#[test]
fn noise_history_merges_same_day_and_prunes_to_30() {
    let mut history = SourceNoiseHistory::default();
    for i in 0..40 {
        history.record(day(i), 1, 10);
    }
    assert_eq!(history.daily_rates.len(), NOISE_HISTORY_DAYS);
    // oldest day retained should be day(40-30)=day(10)
    assert_eq!(history.daily_rates.front().unwrap().date, day(10));
}

#[test]
fn noise_history_merge_same_day_accumulates() {
    let mut history = SourceNoiseHistory::default();
    history.record(day(0), 1, 10);
    history.record(day(0), 0, 5);
    assert_eq!(history.daily_rates.len(), 1);
    let entry = history.daily_rates.front().unwrap();
    assert_eq!(entry.admitted, 1);
    assert_eq!(entry.total, 15);
}

#[test]
fn seven_consecutive_days_at_rate_yields_alert_threshold() {
    let mut history = SourceNoiseHistory::default();
    for i in 0..7 {
        // rate = 1 - admitted/total = 0.95 at admitted=1,total=20
        history.record(day(i), 1, 20);
    }
    assert_eq!(history.consecutive_days_at_or_above(0.9), 7);
}

#[test]
fn one_low_noise_day_breaks_the_streak() {
    let mut history = SourceNoiseHistory::default();
    for i in 0..6 {
        history.record(day(i), 1, 20);
    }
    history.record(day(6), 15, 20); // rate = 0.25, breaks streak
    assert_eq!(history.consecutive_days_at_or_above(0.9), 0);
}
