//! Calendar helpers shared by the amortization and payday calculators

use chrono::{Datelike, NaiveDate, Weekday};

/// Number of days in a month, leap years included
pub fn days_in_month(year: i32, month: u32) -> u32 {
    // The day before the 1st of the following month
    let (next_y, next_m) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_y, next_m, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

/// The (year, month) pair `months` calendar months after `date`'s month
pub fn month_after(date: NaiveDate, months: u32) -> (i32, u32) {
    let zero_based = date.year() * 12 + date.month0() as i32 + months as i32;
    (zero_based.div_euclid(12), zero_based.rem_euclid(12) as u32 + 1)
}

/// A date in (year, month) on `day`, clamped to the month's last day
pub fn clamped_day(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.min(days_in_month(year, month));
    // Both components are in range after clamping
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("clamped day is always a valid date")
}

/// The last day of (year, month) that is not a Saturday or Sunday
pub fn last_working_day(year: i32, month: u32) -> NaiveDate {
    let mut date = clamped_day(year, month, 31);
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date = date.pred_opt().expect("month has a weekday");
    }
    date
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2025, 4), 30);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 12), 31);
    }

    #[test]
    fn test_month_after_wraps_year() {
        let d = NaiveDate::from_ymd_opt(2025, 11, 15).unwrap();
        assert_eq!(month_after(d, 0), (2025, 11));
        assert_eq!(month_after(d, 1), (2025, 12));
        assert_eq!(month_after(d, 2), (2026, 1));
        assert_eq!(month_after(d, 14), (2027, 1));
    }

    #[test]
    fn test_clamped_day() {
        assert_eq!(
            clamped_day(2025, 4, 31),
            NaiveDate::from_ymd_opt(2025, 4, 30).unwrap()
        );
        assert_eq!(
            clamped_day(2025, 2, 30),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert_eq!(
            clamped_day(2025, 1, 15),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_last_working_day_skips_weekend() {
        // 2025-08-31 is a Sunday, 2025-08-30 a Saturday
        assert_eq!(
            last_working_day(2025, 8),
            NaiveDate::from_ymd_opt(2025, 8, 29).unwrap()
        );
        // 2025-07-31 is a Thursday
        assert_eq!(
            last_working_day(2025, 7),
            NaiveDate::from_ymd_opt(2025, 7, 31).unwrap()
        );
    }
}
