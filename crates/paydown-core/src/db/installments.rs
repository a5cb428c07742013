//! Installment ledger operations
//!
//! Generation and regeneration are all-or-nothing; every write operation
//! runs inside an IMMEDIATE transaction so concurrent writers against the
//! same loan serialize instead of interleaving delete-then-insert.

use chrono::NaiveDate;
use rusqlite::{params, TransactionBehavior};
use rust_decimal::Decimal;

use super::loans::get_loan_row;
use super::{date_from_row, decimal_from_row, opt_decimal_from_row, parse_datetime, Database};
use crate::amortization::{self, ScheduledInstallment};
use crate::error::{Error, Result};
use crate::models::{InstallmentStatus, LoanInstallment, LoanStatus};

const INSTALLMENT_COLUMNS: &str = "id, loan_id, installment_number, due_date, emi_amount, \
     principal_component, interest_component, status, paid_date, paid_amount, created_at";

/// Map a row, deriving the overdue view state from the due date.
/// Overdue is never persisted; a pending row past its due date reads as overdue.
fn map_installment(row: &rusqlite::Row<'_>, today: NaiveDate) -> rusqlite::Result<LoanInstallment> {
    let status_str: String = row.get(7)?;
    let created_at_str: String = row.get(10)?;
    let due_date = date_from_row(row, 3)?;

    let status = match status_str.as_str() {
        "paid" => InstallmentStatus::Paid,
        _ if due_date < today => InstallmentStatus::Overdue,
        _ => InstallmentStatus::Pending,
    };

    let paid_date: Option<String> = row.get(8)?;

    Ok(LoanInstallment {
        id: row.get(0)?,
        loan_id: row.get(1)?,
        installment_number: row.get(2)?,
        due_date,
        emi_amount: decimal_from_row(row, 4)?,
        principal_component: decimal_from_row(row, 5)?,
        interest_component: decimal_from_row(row, 6)?,
        status,
        paid_date: paid_date.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        paid_amount: opt_decimal_from_row(row, 9)?,
        created_at: parse_datetime(&created_at_str),
    })
}

/// List a loan's installments in schedule order (works inside a transaction)
pub(crate) fn list_installment_rows(
    conn: &rusqlite::Connection,
    loan_id: i64,
    today: NaiveDate,
) -> Result<Vec<LoanInstallment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM loan_installments WHERE loan_id = ? ORDER BY installment_number",
        INSTALLMENT_COLUMNS
    ))?;

    let installments = stmt
        .query_map(params![loan_id], |row| map_installment(row, today))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(installments)
}

/// Insert a computed schedule for a loan (caller owns the transaction)
pub(crate) fn insert_schedule(
    conn: &rusqlite::Connection,
    loan_id: i64,
    schedule: &[ScheduledInstallment],
) -> Result<()> {
    let mut stmt = conn.prepare(
        r#"
        INSERT INTO loan_installments
            (loan_id, installment_number, due_date, emi_amount, principal_component,
             interest_component, status)
        VALUES (?, ?, ?, ?, ?, ?, 'pending')
        "#,
    )?;

    for inst in schedule {
        stmt.execute(params![
            loan_id,
            inst.installment_number,
            inst.due_date.to_string(),
            inst.emi_amount.to_string(),
            inst.principal_component.to_string(),
            inst.interest_component.to_string(),
        ])?;
    }

    Ok(())
}

impl Database {
    /// Generate the initial installment schedule for a loan.
    ///
    /// Fails with Conflict when any installments already exist; use
    /// `regenerate_installments` to replace a schedule.
    pub fn generate_installments(&self, loan_id: i64, today: NaiveDate) -> Result<Vec<LoanInstallment>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let loan = get_loan_row(&tx, loan_id)?
            .ok_or_else(|| Error::NotFound(format!("Loan {} not found", loan_id)))?;

        let existing: i64 = tx.query_row(
            "SELECT COUNT(*) FROM loan_installments WHERE loan_id = ?",
            params![loan_id],
            |row| row.get(0),
        )?;
        if existing > 0 {
            return Err(Error::Conflict(format!(
                "Loan {} already has {} installments",
                loan_id, existing
            )));
        }

        let schedule = amortization::build_schedule(
            loan.principal_amount,
            loan.interest_rate,
            loan.tenure_months,
            loan.start_date,
            loan.emi_due_day,
            1,
        )?;
        insert_schedule(&tx, loan_id, &schedule)?;

        let installments = list_installment_rows(&tx, loan_id, today)?;
        tx.commit()?;

        tracing::info!(loan_id, count = installments.len(), "Generated installments");
        Ok(installments)
    }

    /// Replace a loan's pending installments with a fresh schedule.
    ///
    /// Paid installments are never touched. The new schedule covers the
    /// remaining tenure against the current outstanding balance (recomputed
    /// from paid principal, not trusted from the loan row), numbered after
    /// the last paid installment. The loan's EMI and outstanding amount are
    /// updated to match.
    pub fn regenerate_installments(
        &self,
        loan_id: i64,
        today: NaiveDate,
    ) -> Result<Vec<LoanInstallment>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let loan = get_loan_row(&tx, loan_id)?
            .ok_or_else(|| Error::NotFound(format!("Loan {} not found", loan_id)))?;

        let (paid_count, last_paid_number): (u32, u32) = tx.query_row(
            "SELECT COUNT(*), COALESCE(MAX(installment_number), 0)
             FROM loan_installments WHERE loan_id = ? AND status = 'paid'",
            params![loan_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let paid_principal = sum_paid_principal(&tx, loan_id)?;
        let outstanding = loan.principal_amount - paid_principal;

        if loan.tenure_months < paid_count {
            return Err(Error::Validation(format!(
                "Tenure ({} months) is less than the {} installments already paid",
                loan.tenure_months, paid_count
            )));
        }
        let remaining = loan.tenure_months - paid_count;

        // Raising the tenure after full repayment would otherwise feed a
        // zero principal into the schedule builder
        if remaining > 0 && outstanding <= Decimal::ZERO {
            return Err(Error::Validation(format!(
                "Loan {} is fully repaid; there is no outstanding balance left to schedule",
                loan_id
            )));
        }

        tx.execute(
            "DELETE FROM loan_installments WHERE loan_id = ? AND status = 'pending'",
            params![loan_id],
        )?;

        if remaining > 0 {
            let schedule = amortization::build_schedule(
                outstanding,
                loan.interest_rate,
                remaining,
                loan.start_date,
                loan.emi_due_day,
                last_paid_number + 1,
            )?;
            insert_schedule(&tx, loan_id, &schedule)?;

            tx.execute(
                "UPDATE loans SET emi_amount = ?, outstanding_amount = ? WHERE id = ?",
                params![
                    schedule[0].emi_amount.to_string(),
                    outstanding.to_string(),
                    loan_id
                ],
            )?;
        } else {
            tx.execute(
                "UPDATE loans SET outstanding_amount = ? WHERE id = ?",
                params![outstanding.to_string(), loan_id],
            )?;
        }

        let installments = list_installment_rows(&tx, loan_id, today)?;
        tx.commit()?;

        tracing::info!(
            loan_id,
            regenerated = remaining,
            preserved = paid_count,
            "Regenerated installments"
        );
        Ok(installments)
    }

    /// Record a payment against an installment.
    ///
    /// Not idempotent by design: a second call fails with AlreadyPaid and
    /// does not reduce the outstanding balance again. The balance decreases
    /// by the installment's principal component, not by `paid_amount`, so
    /// over- and underpayments leave the amortization math intact.
    ///
    /// When the loan has a linked account, `affect_transaction` records a
    /// ledger transaction and `affect_account_balance` debits the balance.
    pub fn mark_installment_paid(
        &self,
        installment_id: i64,
        paid_date: NaiveDate,
        paid_amount: Decimal,
        affect_transaction: bool,
        affect_account_balance: bool,
    ) -> Result<LoanInstallment> {
        if paid_amount <= Decimal::ZERO {
            return Err(Error::Validation(format!(
                "Paid amount must be positive, got {}",
                paid_amount
            )));
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let row = tx.query_row(
            &format!(
                "SELECT {} FROM loan_installments WHERE id = ?",
                INSTALLMENT_COLUMNS
            ),
            params![installment_id],
            |row| map_installment(row, paid_date),
        );
        let installment = match row {
            Ok(inst) => inst,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(Error::NotFound(format!(
                    "Installment {} not found",
                    installment_id
                )))
            }
            Err(e) => return Err(e.into()),
        };

        if installment.status.is_paid() {
            return Err(Error::AlreadyPaid(format!(
                "Installment {} was already paid on {}",
                installment_id,
                installment
                    .paid_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "an unknown date".into())
            )));
        }

        let loan = get_loan_row(&tx, installment.loan_id)?.ok_or_else(|| {
            Error::InvariantViolation(format!("Installment {} has no loan", installment_id))
        })?;

        let new_outstanding = loan.outstanding_amount - installment.principal_component;
        if new_outstanding < Decimal::ZERO {
            return Err(Error::InvariantViolation(format!(
                "Outstanding balance for loan {} would go negative ({})",
                loan.id, new_outstanding
            )));
        }

        tx.execute(
            "UPDATE loan_installments SET status = 'paid', paid_date = ?, paid_amount = ? WHERE id = ?",
            params![
                paid_date.to_string(),
                paid_amount.to_string(),
                installment_id
            ],
        )?;

        // Auto-close when the balance reaches zero (within one currency unit)
        let status = if new_outstanding < Decimal::ONE {
            LoanStatus::Closed
        } else {
            loan.status
        };
        tx.execute(
            "UPDATE loans SET outstanding_amount = ?, status = ? WHERE id = ?",
            params![new_outstanding.to_string(), status.as_str(), loan.id],
        )?;

        if let Some(account_id) = loan.linked_account_id {
            if affect_transaction {
                tx.execute(
                    r#"
                    INSERT INTO loan_transactions (account_id, loan_installment_id, date, description, amount)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                    params![
                        account_id,
                        installment_id,
                        paid_date.to_string(),
                        format!(
                            "EMI payment: {} installment {}",
                            loan.name, installment.installment_number
                        ),
                        (-paid_amount).to_string(),
                    ],
                )?;
            }
            if affect_account_balance {
                let balance_str: String = tx.query_row(
                    "SELECT balance FROM accounts WHERE id = ?",
                    params![account_id],
                    |row| row.get(0),
                )?;
                let balance: Decimal = balance_str.parse()?;
                tx.execute(
                    "UPDATE accounts SET balance = ? WHERE id = ?",
                    params![(balance - paid_amount).to_string(), account_id],
                )?;
            }
        }

        let updated = tx.query_row(
            &format!(
                "SELECT {} FROM loan_installments WHERE id = ?",
                INSTALLMENT_COLUMNS
            ),
            params![installment_id],
            |row| map_installment(row, paid_date),
        )?;

        tx.commit()?;

        tracing::info!(
            installment_id,
            loan_id = loan.id,
            %paid_amount,
            closed = status == LoanStatus::Closed,
            "Installment marked paid"
        );
        Ok(updated)
    }
}

/// Sum of principal components across a loan's paid installments
fn sum_paid_principal(conn: &rusqlite::Connection, loan_id: i64) -> Result<Decimal> {
    let mut stmt = conn.prepare(
        "SELECT principal_component FROM loan_installments WHERE loan_id = ? AND status = 'paid'",
    )?;
    let components = stmt
        .query_map(params![loan_id], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut total = Decimal::ZERO;
    for c in components {
        total += c.parse::<Decimal>()?;
    }
    Ok(total)
}
