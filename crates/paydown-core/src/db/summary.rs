//! Cross-loan summary projection
//!
//! Read-only and stateless: recomputed on every request. The dataset is
//! loans x tenure, which is small, so no caching is needed.

use chrono::{Datelike, NaiveDate};
use rusqlite::params;
use rust_decimal::Decimal;

use super::{date_from_row, decimal_from_row, Database};
use crate::dates::{clamped_day, days_in_month};
use crate::error::Result;
use crate::models::{LoanSummary, NextEmiDue};

impl Database {
    /// Compute the dashboard summary over active loans.
    ///
    /// `bounds` is the interval used to bucket "this month's" EMIs: the
    /// caller passes a salary-cycle interval, or None for the calendar month
    /// containing `today`. The next EMI due is the nearest future pending
    /// installment, ties broken by lowest loan id.
    pub fn loan_summary(
        &self,
        today: NaiveDate,
        bounds: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<LoanSummary> {
        let conn = self.conn()?;

        let (from, to) = bounds.unwrap_or_else(|| {
            let start = clamped_day(today.year(), today.month(), 1);
            let end = clamped_day(
                today.year(),
                today.month(),
                days_in_month(today.year(), today.month()),
            );
            (start, end)
        });

        let total_loans: i64 = conn.query_row(
            "SELECT COUNT(*) FROM loans WHERE status = 'active'",
            [],
            |row| row.get(0),
        )?;

        let mut stmt =
            conn.prepare("SELECT outstanding_amount FROM loans WHERE status = 'active'")?;
        let outstanding_rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut total_outstanding = Decimal::ZERO;
        for s in outstanding_rows {
            total_outstanding += s.parse::<Decimal>()?;
        }

        // ISO date strings compare correctly as text
        let mut stmt = conn.prepare(
            r#"
            SELECT i.emi_amount
            FROM loan_installments i
            JOIN loans l ON l.id = i.loan_id
            WHERE l.status = 'active' AND i.status = 'pending'
              AND i.due_date >= ? AND i.due_date <= ?
            "#,
        )?;
        let emi_rows = stmt
            .query_map(params![from.to_string(), to.to_string()], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut total_emi_this_month = Decimal::ZERO;
        for s in emi_rows {
            total_emi_this_month += s.parse::<Decimal>()?;
        }

        let next = conn.query_row(
            r#"
            SELECT i.id, i.loan_id, l.name, i.installment_number, i.due_date, i.emi_amount
            FROM loan_installments i
            JOIN loans l ON l.id = i.loan_id
            WHERE l.status = 'active' AND i.status = 'pending' AND i.due_date >= ?
            ORDER BY i.due_date ASC, i.loan_id ASC
            LIMIT 1
            "#,
            params![today.to_string()],
            |row| {
                Ok(NextEmiDue {
                    installment_id: row.get(0)?,
                    loan_id: row.get(1)?,
                    loan_name: row.get(2)?,
                    installment_number: row.get(3)?,
                    due_date: date_from_row(row, 4)?,
                    emi_amount: decimal_from_row(row, 5)?,
                })
            },
        );
        let next_emi_due = match next {
            Ok(next) => Some(next),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };

        Ok(LoanSummary {
            total_loans,
            total_outstanding,
            total_emi_this_month,
            next_emi_due,
        })
    }
}
