//! Share of expected minute readings that are actually present, as a percentage.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

pub const POINTS_PER_DAY: i64 = 1440;

/// Minute points in the closed interval `[start, end]`; zero when `end < start`.
pub fn expected_minute_points(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let seconds = (end - start).num_seconds();
    if seconds < 0 { 0 } else { seconds / 60 + 1 }
}

/// `observed / expected * 100`, rounded to two decimals. An empty expectation yields `0.0`.
pub fn completeness_pct(observed: usize, expected: i64) -> f64 {
    if expected <= 0 {
        return 0.0;
    }
    let pct = observed as f64 / expected as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

pub fn compute_raw_completeness(start: DateTime<Utc>, end: DateTime<Utc>, observed: usize) -> f64 {
    completeness_pct(observed, expected_minute_points(start, end))
}

pub fn daily_completeness(observed: usize) -> f64 {
    completeness_pct(observed, POINTS_PER_DAY)
}

/// Number of days in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> i64 {
    let (year, month) = (date.year(), date.month());
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days(),
        // only reachable at the very end of chrono's date range
        _ => 31,
    }
}

pub fn monthly_completeness(month: NaiveDate, observed: usize) -> f64 {
    completeness_pct(observed, days_in_month(month) * POINTS_PER_DAY)
}
