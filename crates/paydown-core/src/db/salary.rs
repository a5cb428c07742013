//! Salary profile operations
//!
//! The profile is a singleton: the table's CHECK constraint pins the row id
//! to 1, and the API exposes upsert semantics over it.

use rusqlite::params;

use super::{opt_decimal_from_row, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{PaydayRule, SalaryProfile, SalaryProfileUpdate};

fn map_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<SalaryProfile> {
    let rule_str: String = row.get(0)?;
    let created_at_str: String = row.get(5)?;
    let updated_at_str: String = row.get(6)?;

    Ok(SalaryProfile {
        payday_rule: rule_str.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, e.into())
        })?,
        fixed_day: row.get(1)?,
        monthly_amount: opt_decimal_from_row(row, 2)?,
        linked_account_id: row.get(3)?,
        cycle_start_day: row.get(4)?,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

fn validate(update: &SalaryProfileUpdate) -> Result<()> {
    if let Some(day) = update.fixed_day {
        if !(1..=31).contains(&day) {
            return Err(Error::Validation(format!(
                "Fixed payday must be 1-31, got {}",
                day
            )));
        }
    }
    if let Some(day) = update.cycle_start_day {
        if !(1..=31).contains(&day) {
            return Err(Error::Validation(format!(
                "Cycle start day must be 1-31, got {}",
                day
            )));
        }
    }
    Ok(())
}

impl Database {
    /// Get the salary profile, if one has been configured
    pub fn get_salary_profile(&self) -> Result<Option<SalaryProfile>> {
        let conn = self.conn()?;

        let result = conn.query_row(
            "SELECT payday_rule, fixed_day, monthly_amount, linked_account_id, cycle_start_day, \
             created_at, updated_at FROM salary_profile WHERE id = 1",
            [],
            map_profile,
        );

        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Create the profile if absent, otherwise patch the provided fields
    pub fn upsert_salary_profile(&self, update: &SalaryProfileUpdate) -> Result<SalaryProfile> {
        validate(update)?;

        if self.get_salary_profile()?.is_some() {
            return self.update_salary_profile(update);
        }

        let rule = update.payday_rule.ok_or_else(|| {
            Error::Validation("paydayRule is required when creating a salary profile".into())
        })?;
        if rule == PaydayRule::FixedDay && update.fixed_day.is_none() {
            return Err(Error::Validation(
                "fixedDay is required for the fixed_day payday rule".into(),
            ));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO salary_profile (id, payday_rule, fixed_day, monthly_amount,
                                        linked_account_id, cycle_start_day)
            VALUES (1, ?, ?, ?, ?, ?)
            "#,
            params![
                rule.as_str(),
                update.fixed_day,
                update.monthly_amount.map(|a| a.to_string()),
                update.linked_account_id,
                update.cycle_start_day.unwrap_or(1),
            ],
        )?;

        self.get_salary_profile()?
            .ok_or_else(|| Error::NotFound("Salary profile vanished after insert".into()))
    }

    /// Patch the existing profile; NotFound when none exists
    pub fn update_salary_profile(&self, update: &SalaryProfileUpdate) -> Result<SalaryProfile> {
        validate(update)?;

        let existing = self
            .get_salary_profile()?
            .ok_or_else(|| Error::NotFound("No salary profile configured".into()))?;

        let rule = update.payday_rule.unwrap_or(existing.payday_rule);
        let fixed_day = update.fixed_day.or(existing.fixed_day);
        if rule == PaydayRule::FixedDay && fixed_day.is_none() {
            return Err(Error::Validation(
                "fixedDay is required for the fixed_day payday rule".into(),
            ));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE salary_profile
            SET payday_rule = ?, fixed_day = ?, monthly_amount = ?,
                linked_account_id = ?, cycle_start_day = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = 1
            "#,
            params![
                rule.as_str(),
                fixed_day,
                update
                    .monthly_amount
                    .or(existing.monthly_amount)
                    .map(|a| a.to_string()),
                update.linked_account_id.or(existing.linked_account_id),
                update.cycle_start_day.unwrap_or(existing.cycle_start_day),
            ],
        )?;

        self.get_salary_profile()?
            .ok_or_else(|| Error::NotFound("Salary profile vanished after update".into()))
    }
}
