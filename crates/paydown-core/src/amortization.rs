//! Reducing-balance EMI amortization
//!
//! Pure math, no I/O. Everything runs on `Decimal` with round-half-up at two
//! decimal places; binary floats would drift at the cent level over long
//! tenures. The final installment's principal component absorbs all rounding
//! drift so the principal components always sum to the principal exactly.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::dates::{clamped_day, month_after};
use crate::error::{Error, Result};

/// Longest tenure accepted (50 years)
pub const MAX_TENURE_MONTHS: u32 = 600;

/// One row of a computed schedule, before persistence
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledInstallment {
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub emi_amount: Decimal,
    pub principal_component: Decimal,
    pub interest_component: Decimal,
}

/// Round to 2 decimal places, half away from zero
fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn validate_terms(principal: Decimal, annual_rate: Decimal, tenure_months: u32) -> Result<()> {
    if principal <= Decimal::ZERO {
        return Err(Error::Validation(format!(
            "Principal must be positive, got {}",
            principal
        )));
    }
    if tenure_months == 0 {
        return Err(Error::Validation("Tenure must be at least 1 month".into()));
    }
    // Decimal's 96-bit range overflows on (1+r)^N for huge N; 600 months
    // (50 years) is far beyond any real loan.
    if tenure_months > MAX_TENURE_MONTHS {
        return Err(Error::Validation(format!(
            "Tenure cannot exceed {} months, got {}",
            MAX_TENURE_MONTHS, tenure_months
        )));
    }
    if annual_rate < Decimal::ZERO {
        return Err(Error::Validation(format!(
            "Interest rate cannot be negative, got {}",
            annual_rate
        )));
    }
    Ok(())
}

/// Standard EMI for the given terms: `P * r * (1+r)^N / ((1+r)^N - 1)`
/// with `r = annual_rate / 1200`. A zero rate degenerates to `P / N`.
pub fn monthly_emi(principal: Decimal, annual_rate: Decimal, tenure_months: u32) -> Result<Decimal> {
    validate_terms(principal, annual_rate, tenure_months)?;

    if annual_rate.is_zero() {
        return Ok(round2(principal / Decimal::from(tenure_months)));
    }

    let r = annual_rate / Decimal::from(1200);
    let factor = compound(Decimal::ONE + r, tenure_months);
    Ok(round2(principal * r * factor / (factor - Decimal::ONE)))
}

/// `(base)^n` by repeated multiplication; tenures are capped at
/// `MAX_TENURE_MONTHS` so this stays cheap and avoids pulling in the maths
/// feature.
fn compound(base: Decimal, n: u32) -> Decimal {
    let mut acc = Decimal::ONE;
    for _ in 0..n {
        acc *= base;
    }
    acc
}

/// Build a full amortization schedule.
///
/// `start_date` anchors the due dates: installment number `n` falls due
/// `n` months after the start, on `emi_due_day` clamped to the month length.
/// `first_number` is 1 for a fresh loan; regeneration passes the number after
/// the last paid installment so the sequence stays contiguous.
pub fn build_schedule(
    principal: Decimal,
    annual_rate: Decimal,
    tenure_months: u32,
    start_date: NaiveDate,
    emi_due_day: u32,
    first_number: u32,
) -> Result<Vec<ScheduledInstallment>> {
    validate_terms(principal, annual_rate, tenure_months)?;
    if !(1..=31).contains(&emi_due_day) {
        return Err(Error::Validation(format!(
            "EMI due day must be 1-31, got {}",
            emi_due_day
        )));
    }

    let emi = monthly_emi(principal, annual_rate, tenure_months)?;
    let r = if annual_rate.is_zero() {
        Decimal::ZERO
    } else {
        annual_rate / Decimal::from(1200)
    };

    let mut schedule = Vec::with_capacity(tenure_months as usize);
    let mut outstanding = principal;

    for i in 0..tenure_months {
        let number = first_number + i;
        let interest = round2(outstanding * r);
        let last = i == tenure_months - 1;

        // The last installment closes the balance exactly
        let principal_component = if last { outstanding } else { emi - interest };
        let emi_amount = if last {
            principal_component + interest
        } else {
            emi
        };

        outstanding -= principal_component;

        let (year, month) = month_after(start_date, number);
        schedule.push(ScheduledInstallment {
            installment_number: number,
            due_date: clamped_day(year, month, emi_due_day),
            emi_amount,
            principal_component,
            interest_component: interest,
        });
    }

    debug_assert!(outstanding.is_zero());
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_standard_emi() {
        // 120000 at 12% over 12 months: r = 0.01
        let emi = monthly_emi(dec("120000"), dec("12"), 12).unwrap();
        assert_eq!(emi, dec("10661.85"));
    }

    #[test]
    fn test_zero_rate_emi_is_simple_division() {
        assert_eq!(monthly_emi(dec("1200"), dec("0"), 12).unwrap(), dec("100"));
        assert_eq!(monthly_emi(dec("100"), dec("0"), 3).unwrap(), dec("33.33"));
    }

    #[test]
    fn test_rejects_invalid_terms() {
        assert!(monthly_emi(dec("0"), dec("10"), 12).is_err());
        assert!(monthly_emi(dec("-5"), dec("10"), 12).is_err());
        assert!(monthly_emi(dec("1000"), dec("-1"), 12).is_err());
        assert!(monthly_emi(dec("1000"), dec("10"), 0).is_err());
        assert!(build_schedule(dec("1000"), dec("10"), 12, date(2025, 1, 5), 0, 1).is_err());
        assert!(build_schedule(dec("1000"), dec("10"), 12, date(2025, 1, 5), 32, 1).is_err());
    }

    #[test]
    fn test_rejects_excessive_tenure_instead_of_overflowing() {
        // Unchecked, (1.01)^10000 blows past Decimal's range and panics
        let err = monthly_emi(dec("120000"), dec("12"), 10_000).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        assert!(monthly_emi(dec("120000"), dec("12"), MAX_TENURE_MONTHS + 1).is_err());
        assert!(monthly_emi(dec("120000"), dec("12"), MAX_TENURE_MONTHS).is_ok());
        assert!(
            build_schedule(dec("1000"), dec("10"), 601, date(2025, 1, 5), 5, 1).is_err()
        );
    }

    #[test]
    fn test_first_and_last_installment_split() {
        let schedule =
            build_schedule(dec("120000"), dec("12"), 12, date(2025, 1, 15), 15, 1).unwrap();
        assert_eq!(schedule.len(), 12);

        let first = &schedule[0];
        assert_eq!(first.interest_component, dec("1200.00"));
        assert_eq!(first.principal_component, dec("9461.85"));
        assert_eq!(first.due_date, date(2025, 2, 15));

        // Last installment absorbs rounding drift and closes the balance
        let total_principal: Decimal = schedule.iter().map(|s| s.principal_component).sum();
        assert_eq!(total_principal, dec("120000"));
        let last = &schedule[11];
        assert_eq!(
            last.emi_amount,
            last.principal_component + last.interest_component
        );
    }

    #[test]
    fn test_emi_constant_except_final_adjustment() {
        let schedule =
            build_schedule(dec("50000"), dec("9.5"), 24, date(2025, 3, 1), 1, 1).unwrap();
        let emi = schedule[0].emi_amount;
        for inst in &schedule[..23] {
            assert_eq!(inst.emi_amount, emi);
            assert_eq!(
                inst.emi_amount,
                inst.principal_component + inst.interest_component
            );
        }
    }

    #[test]
    fn test_zero_rate_remainder_goes_to_last() {
        let schedule = build_schedule(dec("100"), dec("0"), 3, date(2025, 1, 10), 10, 1).unwrap();
        assert_eq!(schedule[0].principal_component, dec("33.33"));
        assert_eq!(schedule[1].principal_component, dec("33.33"));
        assert_eq!(schedule[2].principal_component, dec("33.34"));
        for inst in &schedule {
            assert_eq!(inst.interest_component, Decimal::ZERO);
        }
    }

    #[test]
    fn test_due_day_clamps_to_short_months() {
        let schedule =
            build_schedule(dec("12000"), dec("10"), 4, date(2025, 1, 31), 31, 1).unwrap();
        assert_eq!(schedule[0].due_date, date(2025, 2, 28));
        assert_eq!(schedule[1].due_date, date(2025, 3, 31));
        assert_eq!(schedule[2].due_date, date(2025, 4, 30));
        assert_eq!(schedule[3].due_date, date(2025, 5, 31));
    }

    #[test]
    fn test_renumbered_schedule_for_regeneration() {
        // Remaining 6 months of a 12-month loan, numbered 7..12, dates still
        // anchored at the original start
        let schedule =
            build_schedule(dec("55000"), dec("12"), 6, date(2025, 1, 5), 5, 7).unwrap();
        assert_eq!(schedule[0].installment_number, 7);
        assert_eq!(schedule[0].due_date, date(2025, 8, 5));
        assert_eq!(schedule[5].installment_number, 12);
        assert_eq!(schedule[5].due_date, date(2026, 1, 5));
        let total: Decimal = schedule.iter().map(|s| s.principal_component).sum();
        assert_eq!(total, dec("55000"));
    }

    #[test]
    fn test_long_tenure_closes_exactly() {
        let schedule =
            build_schedule(dec("2500000"), dec("8.5"), 360, date(2025, 6, 10), 10, 1).unwrap();
        assert_eq!(schedule.len(), 360);
        let total: Decimal = schedule.iter().map(|s| s.principal_component).sum();
        assert_eq!(total, dec("2500000"));
    }
}
