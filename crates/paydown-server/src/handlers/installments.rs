//! Installment payment handler

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use paydown_core::models::LoanInstallment;

use crate::{AppError, AppState};

fn default_true() -> bool {
    true
}

/// Payment request body. `paidDate` defaults to today; the side-effect
/// flags default to on so a bare `{"paidAmount": ...}` behaves like the UI.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkPaidRequest {
    pub paid_amount: Decimal,
    pub paid_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub affect_transaction: bool,
    #[serde(default = "default_true")]
    pub affect_account_balance: bool,
}

/// POST /api/loan-installments/:id/mark-paid
pub async fn mark_installment_paid(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<MarkPaidRequest>,
) -> Result<Json<LoanInstallment>, AppError> {
    let paid_date = req.paid_date.unwrap_or_else(|| Utc::now().date_naive());
    let installment = state.db.mark_installment_paid(
        id,
        paid_date,
        req.paid_amount,
        req.affect_transaction,
        req.affect_account_balance,
    )?;
    Ok(Json(installment))
}
