//! Calendar helpers: business-day counts and monthly expiration detection.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Trading days per year used for time-to-expiry
pub const TRADING_DAYS_PER_YEAR: f64 = 262.0;

/// Count Monday–Friday days in `[from, to)`.
///
/// When `to < from` the count over `[to, from)` is returned negated.
/// Holidays are not modelled.
pub fn business_days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    if to < from {
        return -business_days_between(to, from);
    }
    let total = (to - from).num_days();
    let full_weeks = total / 7;
    let mut count = full_weeks * 5;

    let mut day = from + Duration::days(full_weeks * 7);
    while day < to {
        if is_weekday(day) {
            count += 1;
        }
        day += Duration::days(1);
    }
    count
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Standard monthly expiration: a Friday falling on day 15 through 21
pub fn is_third_friday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Fri && (15..=21).contains(&date.day())
}

/// Year fraction from `as_of` to `expiration` on a business-day basis.
///
/// Same-day and already-expired contracts are floored at one business day
/// so 0DTE gamma is not zeroed out.
pub fn years_to_expiry(as_of: NaiveDate, expiration: NaiveDate, days_per_year: f64) -> f64 {
    business_days_between(as_of, expiration).max(1) as f64 / days_per_year
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_business_days() {
        // Mon 2024-01-15 .. Fri 2024-01-19: Mon..Thu
        assert_eq!(business_days_between(d(2024, 1, 15), d(2024, 1, 19)), 4);
        // Fri -> next Mon spans a weekend
        assert_eq!(business_days_between(d(2024, 1, 19), d(2024, 1, 22)), 1);
        assert_eq!(business_days_between(d(2024, 1, 19), d(2024, 1, 19)), 0);
        // Two full weeks
        assert_eq!(business_days_between(d(2024, 1, 1), d(2024, 1, 15)), 10);
        // Starting on a Saturday
        assert_eq!(business_days_between(d(2024, 1, 20), d(2024, 1, 23)), 1);
        // Reversed range
        assert_eq!(business_days_between(d(2024, 1, 19), d(2024, 1, 15)), -4);
    }

    #[test]
    fn test_third_friday() {
        assert!(is_third_friday(d(2024, 1, 19)));
        assert!(is_third_friday(d(2024, 3, 15)));
        assert!(is_third_friday(d(2024, 6, 21)));
        assert!(!is_third_friday(d(2024, 1, 12))); // second Friday
        assert!(!is_third_friday(d(2024, 1, 26))); // fourth Friday
        assert!(!is_third_friday(d(2024, 1, 18))); // Thursday
    }

    #[test]
    fn test_years_to_expiry_floor() {
        let today = d(2024, 1, 19);
        let same_day = years_to_expiry(today, today, TRADING_DAYS_PER_YEAR);
        assert!((same_day - 1.0 / 262.0).abs() < 1e-15);

        let expired = years_to_expiry(today, d(2024, 1, 17), TRADING_DAYS_PER_YEAR);
        assert!((expired - 1.0 / 262.0).abs() < 1e-15);

        let week = years_to_expiry(d(2024, 1, 15), today, TRADING_DAYS_PER_YEAR);
        assert!((week - 4.0 / 262.0).abs() < 1e-15);
    }
}
