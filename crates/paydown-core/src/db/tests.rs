//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_loan(name: &str, principal: &str, tenure: u32) -> NewLoan {
        NewLoan {
            name: name.to_string(),
            loan_type: LoanType::PersonalLoan,
            lender: Some("Acme Bank".to_string()),
            account_number: None,
            principal_amount: dec(principal),
            interest_rate: dec("12"),
            tenure_months: tenure,
            emi_amount: None,
            emi_due_day: 15,
            start_date: date(2025, 1, 15),
            linked_account_id: None,
        }
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        let loans = db.list_loans(date(2025, 1, 1)).unwrap();
        assert!(loans.is_empty());
    }

    #[test]
    fn test_create_loan_generates_schedule() {
        let db = Database::in_memory().unwrap();
        let today = date(2025, 1, 20);

        let loan = db.create_loan(&sample_loan("Car loan", "120000", 12), today).unwrap();
        assert!(loan.id > 0);
        assert_eq!(loan.emi_amount, dec("10661.85"));
        assert_eq!(loan.outstanding_amount, dec("120000"));
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.installments.len(), 12);
        assert_eq!(loan.installments[0].installment_number, 1);
        assert_eq!(loan.installments[0].due_date, date(2025, 2, 15));
        assert_eq!(loan.installments[0].interest_component, dec("1200.00"));

        let total_principal: Decimal = loan
            .installments
            .iter()
            .map(|i| i.principal_component)
            .sum();
        assert_eq!(total_principal, dec("120000"));
    }

    #[test]
    fn test_create_loan_honors_supplied_emi() {
        let db = Database::in_memory().unwrap();
        let mut new = sample_loan("Fridge EMI", "30000", 6);
        new.emi_amount = Some(dec("5200"));

        let loan = db.create_loan(&new, date(2025, 1, 20)).unwrap();
        assert_eq!(loan.emi_amount, dec("5200"));
    }

    #[test]
    fn test_create_loan_rejects_bad_terms() {
        let db = Database::in_memory().unwrap();
        let today = date(2025, 1, 20);

        let mut new = sample_loan("Bad", "0", 12);
        assert!(db.create_loan(&new, today).is_err());

        new = sample_loan("Bad", "1000", 0);
        assert!(db.create_loan(&new, today).is_err());

        new = sample_loan("Bad", "1000", 12);
        new.interest_rate = dec("-1");
        assert!(db.create_loan(&new, today).is_err());

        new = sample_loan("Bad", "1000", 12);
        new.emi_due_day = 0;
        assert!(db.create_loan(&new, today).is_err());

        // Failed creates must not leave partial rows behind
        assert!(db.list_loans(today).unwrap().is_empty());
    }

    #[test]
    fn test_generate_conflicts_on_existing_schedule() {
        let db = Database::in_memory().unwrap();
        let today = date(2025, 1, 20);
        let loan = db.create_loan(&sample_loan("Car loan", "60000", 6), today).unwrap();

        let err = db.generate_installments(loan.id, today).unwrap_err();
        assert!(matches!(err, crate::Error::Conflict(_)));
    }

    #[test]
    fn test_mark_paid_reduces_outstanding_by_principal_component() {
        let db = Database::in_memory().unwrap();
        let today = date(2025, 2, 20);
        let loan = db.create_loan(&sample_loan("Car loan", "120000", 12), today).unwrap();

        let first = &loan.installments[0];
        // Overpayment: outstanding still drops by the principal component only
        let paid = db
            .mark_installment_paid(first.id, date(2025, 2, 16), dec("12000"), false, false)
            .unwrap();
        assert_eq!(paid.status, InstallmentStatus::Paid);
        assert_eq!(paid.paid_amount, Some(dec("12000")));
        assert_eq!(paid.paid_date, Some(date(2025, 2, 16)));

        let loan = db.get_loan(loan.id, today).unwrap().unwrap();
        assert_eq!(
            loan.outstanding_amount,
            dec("120000") - first.principal_component
        );
    }

    #[test]
    fn test_mark_paid_is_not_idempotent() {
        let db = Database::in_memory().unwrap();
        let today = date(2025, 2, 20);
        let loan = db.create_loan(&sample_loan("Car loan", "120000", 12), today).unwrap();
        let first_id = loan.installments[0].id;

        db.mark_installment_paid(first_id, date(2025, 2, 16), dec("10661.85"), false, false)
            .unwrap();
        let outstanding_after_one = db
            .get_loan(loan.id, today)
            .unwrap()
            .unwrap()
            .outstanding_amount;

        let err = db
            .mark_installment_paid(first_id, date(2025, 2, 17), dec("10661.85"), false, false)
            .unwrap_err();
        assert!(matches!(err, crate::Error::AlreadyPaid(_)));

        // No double-counting
        let loan = db.get_loan(loan.id, today).unwrap().unwrap();
        assert_eq!(loan.outstanding_amount, outstanding_after_one);
    }

    #[test]
    fn test_mark_paid_unknown_installment() {
        let db = Database::in_memory().unwrap();
        let err = db
            .mark_installment_paid(999, date(2025, 2, 16), dec("100"), false, false)
            .unwrap_err();
        assert!(matches!(err, crate::Error::NotFound(_)));
    }

    #[test]
    fn test_paying_all_installments_closes_loan() {
        let db = Database::in_memory().unwrap();
        let today = date(2025, 1, 20);
        let loan = db.create_loan(&sample_loan("Small loan", "3000", 3), today).unwrap();

        for inst in &loan.installments {
            db.mark_installment_paid(inst.id, inst.due_date, inst.emi_amount, false, false)
                .unwrap();
        }

        let loan = db.get_loan(loan.id, today).unwrap().unwrap();
        assert_eq!(loan.outstanding_amount, Decimal::ZERO);
        assert_eq!(loan.status, LoanStatus::Closed);
    }

    #[test]
    fn test_mark_paid_side_effects_on_linked_account() {
        let db = Database::in_memory().unwrap();
        let today = date(2025, 1, 20);

        let account_id = db
            .upsert_account("Salary account", Some(AccountType::Savings), dec("50000"))
            .unwrap();
        let mut new = sample_loan("Bike loan", "24000", 12);
        new.linked_account_id = Some(account_id);
        let loan = db.create_loan(&new, today).unwrap();

        let first = &loan.installments[0];
        db.mark_installment_paid(first.id, date(2025, 2, 15), first.emi_amount, true, true)
            .unwrap();

        let account = db.get_account(account_id).unwrap().unwrap();
        assert_eq!(account.balance, dec("50000") - first.emi_amount);

        let transactions = db.list_account_transactions(account_id).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, -first.emi_amount);
        assert_eq!(transactions[0].loan_installment_id, Some(first.id));
    }

    #[test]
    fn test_regenerate_preserves_paid_rows() {
        let db = Database::in_memory().unwrap();
        let today = date(2025, 7, 20);
        let loan = db.create_loan(&sample_loan("Car loan", "120000", 12), today).unwrap();

        // Pay the first six
        for inst in &loan.installments[..6] {
            db.mark_installment_paid(inst.id, inst.due_date, inst.emi_amount, false, false)
                .unwrap();
        }
        let paid_principal: Decimal = loan.installments[..6]
            .iter()
            .map(|i| i.principal_component)
            .sum();

        let installments = db.regenerate_installments(loan.id, today).unwrap();
        assert_eq!(installments.len(), 12);

        let paid: Vec<_> = installments.iter().filter(|i| i.status.is_paid()).collect();
        let pending: Vec<_> = installments.iter().filter(|i| !i.status.is_paid()).collect();
        assert_eq!(paid.len(), 6);
        assert_eq!(pending.len(), 6);
        assert_eq!(pending[0].installment_number, 7);
        assert_eq!(pending[5].installment_number, 12);

        // The new schedule amortizes the current outstanding balance exactly
        let pending_principal: Decimal = pending.iter().map(|i| i.principal_component).sum();
        assert_eq!(pending_principal, dec("120000") - paid_principal);

        // Paid rows kept their original amounts
        assert_eq!(paid[0].principal_component, loan.installments[0].principal_component);
    }

    #[test]
    fn test_regenerate_is_idempotent() {
        let db = Database::in_memory().unwrap();
        let today = date(2025, 3, 20);
        let loan = db.create_loan(&sample_loan("Car loan", "120000", 12), today).unwrap();
        db.mark_installment_paid(
            loan.installments[0].id,
            date(2025, 2, 15),
            loan.installments[0].emi_amount,
            false,
            false,
        )
        .unwrap();

        let first = db.regenerate_installments(loan.id, today).unwrap();
        let second = db.regenerate_installments(loan.id, today).unwrap();

        let key = |set: &[LoanInstallment]| {
            set.iter()
                .map(|i| {
                    (
                        i.installment_number,
                        i.due_date,
                        i.emi_amount,
                        i.principal_component,
                        i.interest_component,
                    )
                })
                .collect::<Vec<_>>()
        };
        // Same amounts and dates; row ids may differ
        assert_eq!(key(&first), key(&second));
    }

    #[test]
    fn test_outstanding_round_trip() {
        let db = Database::in_memory().unwrap();
        let today = date(2025, 6, 20);
        let loan = db.create_loan(&sample_loan("Car loan", "120000", 12), today).unwrap();

        for inst in &loan.installments[..4] {
            db.mark_installment_paid(inst.id, inst.due_date, inst.emi_amount, false, false)
                .unwrap();
        }

        // Incrementally-maintained balance equals the from-scratch recompute
        let stored = db
            .get_loan(loan.id, today)
            .unwrap()
            .unwrap()
            .outstanding_amount;
        let recomputed: Decimal = dec("120000")
            - loan.installments[..4]
                .iter()
                .map(|i| i.principal_component)
                .sum::<Decimal>();
        assert_eq!(stored, recomputed);
    }

    #[test]
    fn test_delete_loan_cascades_to_installments() {
        let db = Database::in_memory().unwrap();
        let today = date(2025, 1, 20);
        let loan = db.create_loan(&sample_loan("Car loan", "60000", 6), today).unwrap();

        db.delete_loan(loan.id).unwrap();

        let conn = db.conn().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM loan_installments WHERE loan_id = ?",
                rusqlite::params![loan.id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 0);

        assert!(matches!(
            db.delete_loan(loan.id).unwrap_err(),
            crate::Error::NotFound(_)
        ));
    }

    #[test]
    fn test_overdue_is_derived_not_persisted() {
        let db = Database::in_memory().unwrap();
        let loan = db
            .create_loan(&sample_loan("Car loan", "60000", 6), date(2025, 1, 20))
            .unwrap();

        // Viewed from June, the first four installments read as overdue
        let loan = db.get_loan(loan.id, date(2025, 6, 1)).unwrap().unwrap();
        assert_eq!(loan.installments[0].status, InstallmentStatus::Overdue);
        assert_eq!(loan.installments[3].status, InstallmentStatus::Overdue);
        assert_eq!(loan.installments[4].status, InstallmentStatus::Pending);

        // The stored column never holds "overdue"
        let conn = db.conn().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM loan_installments WHERE status = 'overdue'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_salary_profile_singleton_upsert() {
        let db = Database::in_memory().unwrap();
        assert!(db.get_salary_profile().unwrap().is_none());

        // Creating without a rule fails
        let err = db
            .upsert_salary_profile(&SalaryProfileUpdate::default())
            .unwrap_err();
        assert!(matches!(err, crate::Error::Validation(_)));

        let profile = db
            .upsert_salary_profile(&SalaryProfileUpdate {
                payday_rule: Some(PaydayRule::FixedDay),
                fixed_day: Some(28),
                monthly_amount: Some(dec("75000")),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(profile.payday_rule, PaydayRule::FixedDay);
        assert_eq!(profile.fixed_day, Some(28));
        assert_eq!(profile.cycle_start_day, 1);

        // Second upsert patches in place
        let profile = db
            .upsert_salary_profile(&SalaryProfileUpdate {
                cycle_start_day: Some(25),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(profile.fixed_day, Some(28));
        assert_eq!(profile.cycle_start_day, 25);

        let conn = db.conn().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM salary_profile", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_update_salary_profile_requires_existing_row() {
        let db = Database::in_memory().unwrap();
        let err = db
            .update_salary_profile(&SalaryProfileUpdate {
                cycle_start_day: Some(25),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, crate::Error::NotFound(_)));
    }

    #[test]
    fn test_loan_summary_totals_and_next_due() {
        let db = Database::in_memory().unwrap();
        let today = date(2025, 2, 1);

        let a = db.create_loan(&sample_loan("Loan A", "120000", 12), today).unwrap();
        let b = db.create_loan(&sample_loan("Loan B", "60000", 6), today).unwrap();

        let summary = db.loan_summary(today, None).unwrap();
        assert_eq!(summary.total_loans, 2);
        assert_eq!(summary.total_outstanding, dec("180000"));
        // Both loans have an installment due on Feb 15
        assert_eq!(
            summary.total_emi_this_month,
            a.installments[0].emi_amount + b.installments[0].emi_amount
        );

        // Tie on due date breaks toward the lowest loan id
        let next = summary.next_emi_due.unwrap();
        assert_eq!(next.loan_id, a.id);
        assert_eq!(next.due_date, date(2025, 2, 15));

        // Paying loan A's February EMI moves the next due to loan B
        db.mark_installment_paid(
            a.installments[0].id,
            date(2025, 2, 14),
            a.installments[0].emi_amount,
            false,
            false,
        )
        .unwrap();
        let summary = db.loan_summary(today, None).unwrap();
        let next = summary.next_emi_due.unwrap();
        assert_eq!(next.loan_id, b.id);
    }

    #[test]
    fn test_loan_summary_respects_cycle_bounds() {
        let db = Database::in_memory().unwrap();
        let today = date(2025, 2, 10);
        let loan = db.create_loan(&sample_loan("Loan A", "120000", 12), today).unwrap();

        // A cycle ending before the 15th excludes February's EMI
        let summary = db
            .loan_summary(today, Some((date(2025, 1, 25), date(2025, 2, 14))))
            .unwrap();
        assert_eq!(summary.total_emi_this_month, Decimal::ZERO);

        // A cycle spanning the 15th includes it
        let summary = db
            .loan_summary(today, Some((date(2025, 2, 1), date(2025, 2, 28))))
            .unwrap();
        assert_eq!(summary.total_emi_this_month, loan.installments[0].emi_amount);
    }

    #[test]
    fn test_account_crud() {
        let db = Database::in_memory().unwrap();

        let id = db
            .upsert_account("Wallet", Some(AccountType::Checking), dec("1000"))
            .unwrap();
        assert!(id > 0);

        // Upsert same name returns same ID
        let id2 = db
            .upsert_account("Wallet", Some(AccountType::Checking), dec("999"))
            .unwrap();
        assert_eq!(id, id2);

        let accounts = db.list_accounts().unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].balance, dec("1000"));

        db.delete_account(id).unwrap();
        assert!(db.get_account(id).unwrap().is_none());
    }

    #[test]
    fn test_delete_account_conflicts_while_loan_links_it() {
        let db = Database::in_memory().unwrap();
        let today = date(2025, 1, 20);

        let account_id = db.upsert_account("Salary", None, dec("0")).unwrap();
        let mut new = sample_loan("Car loan", "120000", 12);
        new.linked_account_id = Some(account_id);
        let loan = db.create_loan(&new, today).unwrap();

        match db.delete_account(account_id) {
            Err(crate::Error::Conflict(msg)) => assert!(msg.contains("loan")),
            other => panic!("Expected Conflict, got {:?}", other),
        }

        // Unlinking by deleting the loan frees the account
        db.delete_loan(loan.id).unwrap();
        db.delete_account(account_id).unwrap();
        assert!(db.get_account(account_id).unwrap().is_none());
    }

    #[test]
    fn test_delete_account_conflicts_while_salary_profile_links_it() {
        let db = Database::in_memory().unwrap();

        let account_id = db.upsert_account("Salary", None, dec("0")).unwrap();
        db.upsert_salary_profile(&SalaryProfileUpdate {
            payday_rule: Some(PaydayRule::LastWorkingDay),
            linked_account_id: Some(account_id),
            ..Default::default()
        })
        .unwrap();

        match db.delete_account(account_id) {
            Err(crate::Error::Conflict(msg)) => assert!(msg.contains("salary profile")),
            other => panic!("Expected Conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_regenerate_fully_repaid_loan_is_rejected() {
        let db = Database::in_memory().unwrap();
        let today = date(2025, 1, 20);

        let mut new = sample_loan("Phone EMI", "100", 2);
        new.interest_rate = dec("0");
        let loan = db.create_loan(&new, today).unwrap();

        for inst in &loan.installments {
            db.mark_installment_paid(inst.id, inst.due_date, inst.emi_amount, false, false)
                .unwrap();
        }

        // Raise the tenure after everything is paid off
        db.update_loan(
            loan.id,
            &LoanUpdate {
                tenure_months: Some(4),
                ..Default::default()
            },
            today,
        )
        .unwrap();

        let err = db.regenerate_installments(loan.id, today).unwrap_err();
        match err {
            crate::Error::Validation(msg) => assert!(msg.contains("fully repaid")),
            other => panic!("Expected Validation, got {:?}", other),
        }
    }
}
