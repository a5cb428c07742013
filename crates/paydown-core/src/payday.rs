//! Payday and salary-cycle computation
//!
//! Paydays come from the singleton salary profile: either a fixed day of the
//! month (clamped to month length) or the last working day (weekends only,
//! no holiday calendar). The cycle interval is what the dashboard uses to
//! bucket "this month's" bills.

use chrono::{Datelike, Duration, NaiveDate};

use crate::dates::{clamped_day, last_working_day, month_after};
use crate::error::{Error, Result};
use crate::models::{PaydayRule, SalaryProfile};

/// The payday for the month containing (year, month)
fn payday_in_month(rule: PaydayRule, fixed_day: u32, year: i32, month: u32) -> NaiveDate {
    match rule {
        PaydayRule::FixedDay => clamped_day(year, month, fixed_day),
        PaydayRule::LastWorkingDay => last_working_day(year, month),
    }
}

/// The next `count` payday dates on or after `today`.
///
/// Starts from the current month and slides forward past any payday that has
/// already gone by, so the result always holds `count` dates >= today.
pub fn next_paydays(profile: &SalaryProfile, count: u32, today: NaiveDate) -> Result<Vec<NaiveDate>> {
    let fixed_day = match profile.payday_rule {
        PaydayRule::FixedDay => profile
            .fixed_day
            .filter(|d| (1..=31).contains(d))
            .ok_or_else(|| {
                Error::Validation("fixed_day payday rule requires a day between 1 and 31".into())
            })?,
        PaydayRule::LastWorkingDay => 0,
    };

    let mut paydays = Vec::with_capacity(count as usize);
    let mut offset = 0;
    while paydays.len() < count as usize {
        let (year, month) = month_after(today, offset);
        let payday = payday_in_month(profile.payday_rule, fixed_day, year, month);
        if payday >= today {
            paydays.push(payday);
        }
        offset += 1;
    }
    Ok(paydays)
}

/// Start and end (inclusive) of the salary cycle containing `today`.
///
/// The cycle is anchored at the profile's cycle start day; the end is the day
/// before the next cycle starts. Today always falls inside the interval.
pub fn current_cycle(profile: &SalaryProfile, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start_day = profile.cycle_start_day.clamp(1, 31);

    let this_month_start = clamped_day(today.year(), today.month(), start_day);
    let start = if today >= this_month_start {
        this_month_start
    } else {
        let (y, m) = if today.month() == 1 {
            (today.year() - 1, 12)
        } else {
            (today.year(), today.month() - 1)
        };
        clamped_day(y, m, start_day)
    };

    let (next_y, next_m) = month_after(start, 1);
    let end = clamped_day(next_y, next_m, start_day) - Duration::days(1);
    (start, end)
}
