//! HTTP request handlers

mod accounts;
mod installments;
mod loans;
mod salary;
mod summary;

pub use accounts::{
    create_account, delete_account, get_account, list_account_transactions, list_accounts,
};
pub use installments::mark_installment_paid;
pub use loans::{
    create_loan, delete_loan, get_loan, list_loans, regenerate_installments, update_loan,
};
pub use salary::{get_salary_profile, next_paydays, patch_salary_profile, upsert_salary_profile};
pub use summary::loan_summary;
