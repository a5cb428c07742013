//! Domain models for Paydown
//!
//! All monetary fields are `rust_decimal::Decimal` and serialize as decimal
//! strings, which is the wire contract the clients rely on. API-facing
//! structs use camelCase field names.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A loan with its terms and live outstanding balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: i64,
    pub name: String,
    pub loan_type: LoanType,
    pub lender: Option<String>,
    pub account_number: Option<String>,
    pub principal_amount: Decimal,
    /// Annual interest rate in percent
    pub interest_rate: Decimal,
    pub tenure_months: u32,
    pub emi_amount: Decimal,
    /// Day of month the EMI falls due (1-31, clamped to month length)
    pub emi_due_day: u32,
    pub start_date: NaiveDate,
    /// Always equals principal minus the sum of paid principal components
    pub outstanding_amount: Decimal,
    pub status: LoanStatus,
    pub linked_account_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    /// Embedded when fetched with relations
    #[serde(default)]
    pub installments: Vec<LoanInstallment>,
}

/// Loan types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    HomeLoan,
    PersonalLoan,
    CreditCardLoan,
    ItemEmi,
}

impl LoanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HomeLoan => "home_loan",
            Self::PersonalLoan => "personal_loan",
            Self::CreditCardLoan => "credit_card_loan",
            Self::ItemEmi => "item_emi",
        }
    }
}

impl std::str::FromStr for LoanType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "home_loan" => Ok(Self::HomeLoan),
            "personal_loan" => Ok(Self::PersonalLoan),
            "credit_card_loan" => Ok(Self::CreditCardLoan),
            "item_emi" => Ok(Self::ItemEmi),
            _ => Err(format!("Unknown loan type: {}", s)),
        }
    }
}

impl std::fmt::Display for LoanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Loan lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Closed,
    Defaulted,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
            Self::Defaulted => "defaulted",
        }
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "closed" => Ok(Self::Closed),
            "defaulted" => Ok(Self::Defaulted),
            _ => Err(format!("Unknown loan status: {}", s)),
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A new loan before DB insertion
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLoan {
    pub name: String,
    pub loan_type: LoanType,
    pub lender: Option<String>,
    pub account_number: Option<String>,
    pub principal_amount: Decimal,
    pub interest_rate: Decimal,
    pub tenure_months: u32,
    /// Computed from the terms when not supplied
    pub emi_amount: Option<Decimal>,
    pub emi_due_day: u32,
    pub start_date: NaiveDate,
    pub linked_account_id: Option<i64>,
}

/// Partial update for loan terms (PATCH semantics: only provided fields change)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanUpdate {
    pub name: Option<String>,
    pub loan_type: Option<LoanType>,
    pub lender: Option<String>,
    pub account_number: Option<String>,
    pub interest_rate: Option<Decimal>,
    pub tenure_months: Option<u32>,
    pub emi_amount: Option<Decimal>,
    pub emi_due_day: Option<u32>,
    pub status: Option<LoanStatus>,
    pub linked_account_id: Option<i64>,
}

/// One scheduled EMI of a loan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanInstallment {
    pub id: i64,
    pub loan_id: i64,
    /// 1-based position in the schedule, unique per loan
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub emi_amount: Decimal,
    pub principal_component: Decimal,
    pub interest_component: Decimal,
    /// Overdue is derived at read time, never persisted
    pub status: InstallmentStatus,
    pub paid_date: Option<NaiveDate>,
    /// May differ from the EMI amount for partial/extra payments
    pub paid_amount: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

/// Installment status as seen by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    Pending,
    Paid,
    /// View-only state: pending with a due date in the past
    Overdue,
}

impl InstallmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Paid)
    }
}

impl std::fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payday rule for the salary profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaydayRule {
    FixedDay,
    LastWorkingDay,
}

impl PaydayRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FixedDay => "fixed_day",
            Self::LastWorkingDay => "last_working_day",
        }
    }
}

impl std::str::FromStr for PaydayRule {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed_day" => Ok(Self::FixedDay),
            "last_working_day" => Ok(Self::LastWorkingDay),
            _ => Err(format!("Unknown payday rule: {}", s)),
        }
    }
}

impl std::fmt::Display for PaydayRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The singleton salary profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryProfile {
    pub payday_rule: PaydayRule,
    /// Only meaningful when the rule is fixed_day
    pub fixed_day: Option<u32>,
    pub monthly_amount: Option<Decimal>,
    pub linked_account_id: Option<i64>,
    /// Day of month the salary cycle starts on (default 1)
    pub cycle_start_day: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upsert payload for the salary profile
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryProfileUpdate {
    pub payday_rule: Option<PaydayRule>,
    pub fixed_day: Option<u32>,
    pub monthly_amount: Option<Decimal>,
    pub linked_account_id: Option<i64>,
    pub cycle_start_day: Option<u32>,
}

/// Derived cross-loan summary for the dashboard (never persisted)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSummary {
    pub total_loans: i64,
    pub total_outstanding: Decimal,
    pub total_emi_this_month: Decimal,
    pub next_emi_due: Option<NextEmiDue>,
}

/// The globally-nearest future pending installment
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextEmiDue {
    pub loan_id: i64,
    pub loan_name: String,
    pub installment_id: i64,
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub emi_amount: Decimal,
}

/// A tracked account that loans and paydays can be linked to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub account_type: Option<AccountType>,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Account types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Checking,
    Savings,
    Credit,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::Credit => "credit",
        }
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "credit" => Ok(Self::Credit),
            _ => Err(format!("Unknown account type: {}", s)),
        }
    }
}

/// A ledger transaction written when an installment payment touches an account
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTransaction {
    pub id: i64,
    pub account_id: i64,
    pub loan_installment_id: Option<i64>,
    pub date: NaiveDate,
    pub description: String,
    /// Negative = debit
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}
