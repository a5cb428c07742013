//! Account handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use paydown_core::models::{Account, AccountType, LedgerTransaction};

use crate::{AppError, AppState, SuccessResponse};

/// GET /api/accounts
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Account>>, AppError> {
    let accounts = state.db.list_accounts()?;
    Ok(Json(accounts))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub name: String,
    pub account_type: Option<AccountType>,
    #[serde(default)]
    pub balance: Decimal,
}

/// POST /api/accounts - creates an account, or returns the existing one
/// when the name is already taken
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAccountRequest>,
) -> Result<Json<Account>, AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("Account name cannot be empty"));
    }

    let id = state
        .db
        .upsert_account(name, req.account_type, req.balance)?;
    let account = state
        .db
        .get_account(id)?
        .ok_or_else(|| AppError::internal("Account vanished after insert"))?;
    Ok(Json(account))
}

/// GET /api/accounts/:id
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Account>, AppError> {
    let account = state
        .db
        .get_account(id)?
        .ok_or_else(|| AppError::not_found(&format!("Account {} not found", id)))?;
    Ok(Json(account))
}

/// DELETE /api/accounts/:id
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_account(id)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/accounts/:id/transactions
pub async fn list_account_transactions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<LedgerTransaction>>, AppError> {
    // Return 404 for unknown accounts rather than an empty list
    state
        .db
        .get_account(id)?
        .ok_or_else(|| AppError::not_found(&format!("Account {} not found", id)))?;

    let transactions = state.db.list_account_transactions(id)?;
    Ok(Json(transactions))
}
