//! Salary profile and payday handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use paydown_core::models::{SalaryProfile, SalaryProfileUpdate};
use paydown_core::payday;

use crate::{AppError, AppState};

/// GET /api/salary-profile - 404 until one has been created
pub async fn get_salary_profile(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SalaryProfile>, AppError> {
    let profile = state
        .db
        .get_salary_profile()?
        .ok_or_else(|| AppError::not_found("Salary profile not configured"))?;
    Ok(Json(profile))
}

/// POST /api/salary-profile - create or replace the singleton profile
pub async fn upsert_salary_profile(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SalaryProfileUpdate>,
) -> Result<Json<SalaryProfile>, AppError> {
    let profile = state.db.upsert_salary_profile(&update)?;
    Ok(Json(profile))
}

/// PATCH /api/salary-profile - partial update, 404 when absent
pub async fn patch_salary_profile(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SalaryProfileUpdate>,
) -> Result<Json<SalaryProfile>, AppError> {
    let profile = state.db.update_salary_profile(&update)?;
    Ok(Json(profile))
}

#[derive(Deserialize)]
pub struct NextPaydaysQuery {
    pub count: Option<u32>,
}

/// GET /api/salary-profile/next-paydays?count=K
///
/// Defaults to 6 upcoming paydays, capped at 60.
pub async fn next_paydays(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NextPaydaysQuery>,
) -> Result<Json<Vec<NaiveDate>>, AppError> {
    let count = query.count.unwrap_or(6);
    if count == 0 || count > 60 {
        return Err(AppError::bad_request("count must be between 1 and 60"));
    }

    let profile = state
        .db
        .get_salary_profile()?
        .ok_or_else(|| AppError::not_found("Salary profile not configured"))?;

    let today = Utc::now().date_naive();
    let paydays = payday::next_paydays(&profile, count, today)?;
    Ok(Json(paydays))
}
