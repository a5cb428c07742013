//! Paydown Core Library
//!
//! Shared functionality for the Paydown loan tracking service:
//! - Database access and migrations
//! - Reducing-balance EMI amortization
//! - Installment ledger (generate, regenerate, mark paid)
//! - Payday and salary-cycle computation
//! - Cross-loan dashboard summaries

pub mod amortization;
pub mod dates;
pub mod db;
pub mod error;
pub mod models;
pub mod payday;

pub use amortization::{build_schedule, monthly_emi, ScheduledInstallment};
pub use db::Database;
pub use error::{Error, Result};
pub use payday::{current_cycle, next_paydays};
