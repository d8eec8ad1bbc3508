//! Deadline arithmetic, normalized to Indian Standard Time.
//!
//! Deadlines are calendar dates. Comparing them against a raw UTC instant
//! shifts the boundary by up to 5h30m, so both sides are first truncated to
//! an IST civil date and only then compared. Every caller that needs
//! expiry, days-left, or the "closes in" label goes through this module.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

fn ist() -> FixedOffset {
    // +05:30 is always within the valid offset range
    FixedOffset::east_opt(IST_OFFSET_SECS).unwrap()
}

/// The current civil date in IST.
pub fn today_ist() -> NaiveDate {
    as_ist_date(Utc::now())
}

/// Truncates a UTC instant to its IST civil date.
pub fn as_ist_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&ist()).date_naive()
}

/// Whole days between `today` and the deadline. Zero on the deadline day
/// itself, negative once it has passed.
pub fn days_left(deadline: NaiveDate, today: NaiveDate) -> i64 {
    (deadline - today).num_days()
}

pub fn is_expired(deadline: NaiveDate, today: NaiveDate) -> bool {
    days_left(deadline, today) < 0
}

/// Human label for the landing widget.
pub fn closes_in(deadline: NaiveDate, today: NaiveDate) -> String {
    match days_left(deadline, today) {
        d if d < 0 => "closed".to_string(),
        0 => "today".to_string(),
        1 => "1 day".to_string(),
        d => format!("{} days", d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn deadline_today_is_zero_days_left_and_not_expired() {
        let today = date(2025, 6, 10);
        assert_eq!(days_left(today, today), 0);
        assert!(!is_expired(today, today));
    }

    #[test]
    fn deadline_yesterday_is_expired() {
        let today = date(2025, 6, 10);
        let deadline = date(2025, 6, 9);
        assert_eq!(days_left(deadline, today), -1);
        assert!(is_expired(deadline, today));
    }

    #[test]
    fn deadline_tomorrow_is_open() {
        let today = date(2025, 6, 10);
        let deadline = date(2025, 6, 11);
        assert_eq!(days_left(deadline, today), 1);
        assert!(!is_expired(deadline, today));
    }

    #[test]
    fn utc_evening_rolls_over_to_the_next_ist_date() {
        // 20:00 UTC is already 01:30 the next day in IST
        let instant = Utc.with_ymd_and_hms(2025, 6, 10, 20, 0, 0).unwrap();
        assert_eq!(as_ist_date(instant), date(2025, 6, 11));

        // 05:00 UTC is 10:30 the same day
        let instant = Utc.with_ymd_and_hms(2025, 6, 10, 5, 0, 0).unwrap();
        assert_eq!(as_ist_date(instant), date(2025, 6, 10));
    }

    #[test]
    fn closes_in_labels() {
        let today = date(2025, 6, 10);
        assert_eq!(closes_in(today, today), "today");
        assert_eq!(closes_in(date(2025, 6, 11), today), "1 day");
        assert_eq!(closes_in(date(2025, 6, 13), today), "3 days");
        assert_eq!(closes_in(date(2025, 6, 9), today), "closed");
    }
}
