//! Loan operations
//!
//! The loan row is the single source of truth for a loan's outstanding
//! balance. Only the installment ledger mutates it (payment, regeneration).

use chrono::NaiveDate;
use rusqlite::{params, TransactionBehavior};

use super::installments::{insert_schedule, list_installment_rows};
use super::{date_from_row, decimal_from_row, parse_datetime, Database};
use crate::amortization;
use crate::error::{Error, Result};
use crate::models::{Loan, LoanStatus, LoanUpdate, NewLoan};

pub(crate) const LOAN_COLUMNS: &str = "id, name, loan_type, lender, account_number, \
     principal_amount, interest_rate, tenure_months, emi_amount, emi_due_day, \
     start_date, outstanding_amount, status, linked_account_id, created_at";

pub(crate) fn map_loan(row: &rusqlite::Row<'_>) -> rusqlite::Result<Loan> {
    let loan_type_str: String = row.get(2)?;
    let status_str: String = row.get(12)?;
    let created_at_str: String = row.get(14)?;

    Ok(Loan {
        id: row.get(0)?,
        name: row.get(1)?,
        loan_type: loan_type_str.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                e.into(),
            )
        })?,
        lender: row.get(3)?,
        account_number: row.get(4)?,
        principal_amount: decimal_from_row(row, 5)?,
        interest_rate: decimal_from_row(row, 6)?,
        tenure_months: row.get(7)?,
        emi_amount: decimal_from_row(row, 8)?,
        emi_due_day: row.get(9)?,
        start_date: date_from_row(row, 10)?,
        outstanding_amount: decimal_from_row(row, 11)?,
        status: status_str.parse().unwrap_or(LoanStatus::Active),
        linked_account_id: row.get(13)?,
        created_at: parse_datetime(&created_at_str),
        installments: vec![],
    })
}

/// Fetch a loan row without installments (works inside a transaction)
pub(crate) fn get_loan_row(conn: &rusqlite::Connection, id: i64) -> Result<Option<Loan>> {
    let result = conn.query_row(
        &format!("SELECT {} FROM loans WHERE id = ?", LOAN_COLUMNS),
        params![id],
        map_loan,
    );

    match result {
        Ok(loan) => Ok(Some(loan)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Database {
    /// Create a loan and generate its full installment schedule atomically.
    ///
    /// The EMI is computed from the terms when the caller does not supply one.
    pub fn create_loan(&self, new: &NewLoan, today: NaiveDate) -> Result<Loan> {
        // Validates terms (principal, rate, tenure, due day) up front
        let schedule = amortization::build_schedule(
            new.principal_amount,
            new.interest_rate,
            new.tenure_months,
            new.start_date,
            new.emi_due_day,
            1,
        )?;

        let emi = match new.emi_amount {
            Some(emi) if emi > rust_decimal::Decimal::ZERO => emi,
            Some(emi) => {
                return Err(Error::Validation(format!(
                    "EMI amount must be positive, got {}",
                    emi
                )))
            }
            None => schedule[0].emi_amount,
        };

        if let Some(account_id) = new.linked_account_id {
            if self.get_account(account_id)?.is_none() {
                return Err(Error::Validation(format!(
                    "Linked account {} not found",
                    account_id
                )));
            }
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            r#"
            INSERT INTO loans (name, loan_type, lender, account_number, principal_amount,
                               interest_rate, tenure_months, emi_amount, emi_due_day,
                               start_date, outstanding_amount, status, linked_account_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'active', ?)
            "#,
            params![
                new.name,
                new.loan_type.as_str(),
                new.lender,
                new.account_number,
                new.principal_amount.to_string(),
                new.interest_rate.to_string(),
                new.tenure_months,
                emi.to_string(),
                new.emi_due_day,
                new.start_date.to_string(),
                new.principal_amount.to_string(),
                new.linked_account_id,
            ],
        )?;
        let loan_id = tx.last_insert_rowid();

        insert_schedule(&tx, loan_id, &schedule)?;

        let mut loan =
            get_loan_row(&tx, loan_id)?.ok_or_else(|| Error::NotFound("Loan vanished".into()))?;
        loan.installments = list_installment_rows(&tx, loan_id, today)?;

        tx.commit()?;
        Ok(loan)
    }

    /// List all loans with installments embedded
    pub fn list_loans(&self, today: NaiveDate) -> Result<Vec<Loan>> {
        let conn = self.conn()?;

        let mut stmt =
            conn.prepare(&format!("SELECT {} FROM loans ORDER BY id", LOAN_COLUMNS))?;
        let mut loans = stmt
            .query_map([], map_loan)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for loan in &mut loans {
            loan.installments = list_installment_rows(&conn, loan.id, today)?;
        }

        Ok(loans)
    }

    /// Get a loan with installments embedded
    pub fn get_loan(&self, id: i64, today: NaiveDate) -> Result<Option<Loan>> {
        let conn = self.conn()?;

        let Some(mut loan) = get_loan_row(&conn, id)? else {
            return Ok(None);
        };
        loan.installments = list_installment_rows(&conn, id, today)?;
        Ok(Some(loan))
    }

    /// Update loan terms (PATCH semantics: only provided fields change).
    ///
    /// Changing the rate or tenure does not touch existing installments;
    /// the client triggers regeneration explicitly.
    pub fn update_loan(&self, id: i64, update: &LoanUpdate, today: NaiveDate) -> Result<Loan> {
        let conn = self.conn()?;

        let existing = get_loan_row(&conn, id)?
            .ok_or_else(|| Error::NotFound(format!("Loan {} not found", id)))?;

        let tenure = update.tenure_months.unwrap_or(existing.tenure_months);
        if tenure == 0 {
            return Err(Error::Validation("Tenure must be at least 1 month".into()));
        }
        if tenure > amortization::MAX_TENURE_MONTHS {
            return Err(Error::Validation(format!(
                "Tenure cannot exceed {} months, got {}",
                amortization::MAX_TENURE_MONTHS,
                tenure
            )));
        }
        let rate = update.interest_rate.unwrap_or(existing.interest_rate);
        if rate < rust_decimal::Decimal::ZERO {
            return Err(Error::Validation(format!(
                "Interest rate cannot be negative, got {}",
                rate
            )));
        }
        let due_day = update.emi_due_day.unwrap_or(existing.emi_due_day);
        if !(1..=31).contains(&due_day) {
            return Err(Error::Validation(format!(
                "EMI due day must be 1-31, got {}",
                due_day
            )));
        }

        conn.execute(
            r#"
            UPDATE loans
            SET name = ?, loan_type = ?, lender = ?, account_number = ?,
                interest_rate = ?, tenure_months = ?, emi_amount = ?, emi_due_day = ?,
                status = ?, linked_account_id = ?
            WHERE id = ?
            "#,
            params![
                update.name.as_ref().unwrap_or(&existing.name),
                update.loan_type.unwrap_or(existing.loan_type).as_str(),
                update.lender.as_ref().or(existing.lender.as_ref()),
                update
                    .account_number
                    .as_ref()
                    .or(existing.account_number.as_ref()),
                rate.to_string(),
                tenure,
                update
                    .emi_amount
                    .unwrap_or(existing.emi_amount)
                    .to_string(),
                due_day,
                update.status.unwrap_or(existing.status).as_str(),
                update.linked_account_id.or(existing.linked_account_id),
                id,
            ],
        )?;

        self.get_loan(id, today)?
            .ok_or_else(|| Error::NotFound(format!("Loan {} not found", id)))
    }

    /// Delete a loan; installments are removed by the cascade
    pub fn delete_loan(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM loans WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Loan {} not found", id)));
        }
        Ok(())
    }
}
