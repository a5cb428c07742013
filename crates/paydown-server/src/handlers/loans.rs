//! Loan CRUD and schedule regeneration handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use paydown_core::models::{Loan, LoanInstallment, LoanUpdate, NewLoan};

use crate::{AppError, AppState, SuccessResponse};

/// GET /api/loans - list all loans with embedded installments
pub async fn list_loans(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Loan>>, AppError> {
    let today = Utc::now().date_naive();
    let loans = state.db.list_loans(today)?;
    Ok(Json(loans))
}

/// POST /api/loans - create a loan and generate its full schedule
pub async fn create_loan(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewLoan>,
) -> Result<Json<Loan>, AppError> {
    let today = Utc::now().date_naive();
    let loan = state.db.create_loan(&new, today)?;
    Ok(Json(loan))
}

/// GET /api/loans/:id
pub async fn get_loan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Loan>, AppError> {
    let today = Utc::now().date_naive();
    let loan = state
        .db
        .get_loan(id, today)?
        .ok_or_else(|| AppError::not_found(&format!("Loan {} not found", id)))?;
    Ok(Json(loan))
}

/// PATCH /api/loans/:id - partial update of loan terms
///
/// Changing terms does not rebuild the schedule; callers follow up with
/// POST /api/loans/:id/regenerate-installments when they want that.
pub async fn update_loan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(update): Json<LoanUpdate>,
) -> Result<Json<Loan>, AppError> {
    let today = Utc::now().date_naive();
    let loan = state.db.update_loan(id, &update, today)?;
    Ok(Json(loan))
}

/// DELETE /api/loans/:id - removes the loan and cascades to installments
pub async fn delete_loan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_loan(id)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/loans/:id/regenerate-installments
///
/// Rebuilds the pending portion of the schedule against the current
/// outstanding balance. Paid installments are preserved.
pub async fn regenerate_installments(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<LoanInstallment>>, AppError> {
    let today = Utc::now().date_naive();
    let installments = state.db.regenerate_installments(id, today)?;
    Ok(Json(installments))
}
