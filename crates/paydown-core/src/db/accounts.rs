//! Account operations

use rusqlite::params;
use rust_decimal::Decimal;

use super::{date_from_row, decimal_from_row, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Account, AccountType, LedgerTransaction};

fn map_account(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    let type_str: Option<String> = row.get(2)?;
    let created_at_str: String = row.get(4)?;

    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        account_type: type_str.and_then(|s| s.parse().ok()),
        balance: decimal_from_row(row, 3)?,
        created_at: parse_datetime(&created_at_str),
    })
}

impl Database {
    /// Create an account, or return the existing id when the name is taken
    pub fn upsert_account(
        &self,
        name: &str,
        account_type: Option<AccountType>,
        opening_balance: Decimal,
    ) -> Result<i64> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM accounts WHERE name = ?",
                params![name],
                |row| row.get(0),
            )
            .ok();

        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute(
            "INSERT INTO accounts (name, account_type, balance) VALUES (?, ?, ?)",
            params![
                name,
                account_type.map(|t| t.as_str()),
                opening_balance.to_string()
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List all accounts
    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, name, account_type, balance, created_at FROM accounts ORDER BY name",
        )?;
        let accounts = stmt
            .query_map([], map_account)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(accounts)
    }

    /// Get an account by ID
    pub fn get_account(&self, id: i64) -> Result<Option<Account>> {
        let conn = self.conn()?;

        let result = conn.query_row(
            "SELECT id, name, account_type, balance, created_at FROM accounts WHERE id = ?",
            params![id],
            map_account,
        );

        match result {
            Ok(account) => Ok(Some(account)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete an account and its ledger transactions.
    ///
    /// Refused while loans or the salary profile still link to it; the FK
    /// would reject the delete anyway, this just turns it into an
    /// actionable conflict instead of a storage error.
    pub fn delete_account(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;

        let linked_loans: i64 = conn.query_row(
            "SELECT COUNT(*) FROM loans WHERE linked_account_id = ?",
            params![id],
            |row| row.get(0),
        )?;
        if linked_loans > 0 {
            return Err(Error::Conflict(format!(
                "Account {} is linked to {} loan(s); unlink or delete them first",
                id, linked_loans
            )));
        }

        let linked_to_profile: i64 = conn.query_row(
            "SELECT COUNT(*) FROM salary_profile WHERE linked_account_id = ?",
            params![id],
            |row| row.get(0),
        )?;
        if linked_to_profile > 0 {
            return Err(Error::Conflict(format!(
                "Account {} is linked to the salary profile; unlink it first",
                id
            )));
        }

        let deleted = conn.execute("DELETE FROM accounts WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Account {} not found", id)));
        }
        Ok(())
    }

    /// List ledger transactions for an account, newest first
    pub fn list_account_transactions(&self, account_id: i64) -> Result<Vec<LedgerTransaction>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, account_id, loan_installment_id, date, description, amount, created_at
            FROM loan_transactions
            WHERE account_id = ?
            ORDER BY date DESC, id DESC
            "#,
        )?;

        let transactions = stmt
            .query_map(params![account_id], |row| {
                let created_at_str: String = row.get(6)?;
                Ok(LedgerTransaction {
                    id: row.get(0)?,
                    account_id: row.get(1)?,
                    loan_installment_id: row.get(2)?,
                    date: date_from_row(row, 3)?,
                    description: row.get(4)?,
                    amount: decimal_from_row(row, 5)?,
                    created_at: parse_datetime(&created_at_str),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }
}
