//! Daily visit streaks.
//!
//! Dates are calendar days in one time zone chosen by the caller. A visit on
//! the day after the last recorded visit extends the streak; a visit on the
//! same day is already counted; anything else starts over at 1.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Date format used by persisted snapshots (`YYYY-MM-DD`).
pub const VISIT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Result of applying one visit to a streak pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakStep {
    pub current: u32,
    pub longest: u32,
    /// A previous streak existed and this visit did not continue it.
    pub broken: bool,
    /// False for a repeat visit on an already-counted day.
    pub counted: bool,
}

/// Apply a visit on `today` to a streak last credited on `last_visit`.
///
/// `last_visit == None` means the user has never visited: the streak starts at
/// 1 and is not reported as broken. A `last_visit` after `today` (clock skew
/// between devices) is treated like any other gap.
pub fn advance_streak(
    current: u32,
    longest: u32,
    today: NaiveDate,
    last_visit: Option<NaiveDate>,
) -> StreakStep {
    let (current, broken, counted) = match last_visit {
        Some(last) if last == today => (current, false, false),
        Some(last) if last.succ_opt() == Some(today) => (current.saturating_add(1), false, true),
        Some(_) => (1, true, true),
        None => (1, false, true),
    };
    StreakStep {
        current,
        longest: longest.max(current),
        broken,
        counted,
    }
}

/// Parse a stored `YYYY-MM-DD` date. Empty or malformed input reads as
/// "never visited".
pub fn parse_visit_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), VISIT_DATE_FORMAT).ok()
}

pub fn format_visit_date(date: NaiveDate) -> String {
    date.format(VISIT_DATE_FORMAT).to_string()
}

/// Midnight UTC at the start of `date`; the timestamp given to badges earned
/// by a streak checkpoint.
pub(crate) fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_visit_date(s).expect("valid date")
    }

    #[test]
    fn consecutive_day_extends() {
        let step = advance_streak(4, 4, d("2025-06-02"), Some(d("2025-06-01")));
        assert_eq!(step.current, 5);
        assert_eq!(step.longest, 5);
        assert!(!step.broken);
        assert!(step.counted);
    }

    #[test]
    fn same_day_is_noop() {
        let step = advance_streak(4, 9, d("2025-06-02"), Some(d("2025-06-02")));
        assert_eq!(step.current, 4);
        assert_eq!(step.longest, 9);
        assert!(!step.counted);
        assert!(!step.broken);
    }

    #[test]
    fn gap_resets_and_breaks() {
        let step = advance_streak(12, 12, d("2025-06-04"), Some(d("2025-06-02")));
        assert_eq!(step.current, 1);
        assert_eq!(step.longest, 12);
        assert!(step.broken);
    }

    #[test]
    fn first_visit_starts_unbroken() {
        let step = advance_streak(0, 0, d("2025-06-04"), None);
        assert_eq!(step.current, 1);
        assert_eq!(step.longest, 1);
        assert!(!step.broken);
    }

    #[test]
    fn month_and_year_rollover() {
        assert_eq!(advance_streak(1, 1, d("2025-03-01"), Some(d("2025-02-28"))).current, 2);
        assert_eq!(advance_streak(1, 1, d("2024-03-01"), Some(d("2024-02-29"))).current, 2);
        assert_eq!(advance_streak(1, 1, d("2025-01-01"), Some(d("2024-12-31"))).current, 2);
        // 2024 is a leap year, so Feb 28 -> Mar 1 skips a day.
        assert!(advance_streak(1, 1, d("2024-03-01"), Some(d("2024-02-28"))).broken);
    }

    #[test]
    fn future_last_visit_resets() {
        let step = advance_streak(5, 5, d("2025-06-01"), Some(d("2025-06-02")));
        assert_eq!(step.current, 1);
        assert!(step.broken);
    }

    #[test]
    fn lenient_parsing() {
        assert!(parse_visit_date("").is_none());
        assert!(parse_visit_date("2025-13-01").is_none());
        assert_eq!(parse_visit_date(" 2025-06-01 "), Some(d("2025-06-01")));
        assert_eq!(format_visit_date(d("2025-06-01")), "2025-06-01");
    }

    #[test]
    fn badge_timestamp_is_midnight() {
        let at = start_of_day(d("2025-06-01"));
        assert_eq!(at.to_rfc3339(), "2025-06-01T00:00:00+00:00");
    }
}
