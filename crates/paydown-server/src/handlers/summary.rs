//! Dashboard summary handler

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use paydown_core::models::LoanSummary;
use paydown_core::payday;

use crate::{AppError, AppState};

#[derive(Deserialize)]
pub struct SummaryQuery {
    pub cycle: Option<bool>,
}

/// GET /api/loan-summary?cycle=bool
///
/// With `cycle=true` the "EMIs this month" bucket uses the salary cycle
/// from the configured profile instead of the calendar month. When no
/// profile exists the calendar month is used regardless.
pub async fn loan_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<LoanSummary>, AppError> {
    let today = Utc::now().date_naive();

    let bounds = if query.cycle.unwrap_or(false) {
        state
            .db
            .get_salary_profile()?
            .map(|profile| payday::current_cycle(&profile, today))
    } else {
        None
    };

    let summary = state.db.loan_summary(today, bounds)?;
    Ok(Json(summary))
}
