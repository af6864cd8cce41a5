use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::Result;
use crate::middleware::permissions::{AccountingView, Authorized};
use crate::services::accounting::{
    accounting_summary, period_report, AccountingSummary, Period, PeriodReport, TransactionFilter,
};
use crate::state::AppState;

/// Create accounting routes
pub fn accounting_routes(state: AppState) -> Router {
    Router::new()
        .route("/summary", get(summary))
        .route("/period-report", get(period))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct PeriodParams {
    #[serde(default)]
    pub period: Period,
    pub business_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

async fn summary(
    State(state): State<AppState>,
    _auth: Authorized<AccountingView>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<AccountingSummary>> {
    Ok(Json(accounting_summary(&state.db, &filter).await?))
}

async fn period(
    State(state): State<AppState>,
    _auth: Authorized<AccountingView>,
    Query(params): Query<PeriodParams>,
) -> Result<Json<PeriodReport>> {
    let filter = TransactionFilter {
        business_id: params.business_id,
        start_date: params.start_date,
        end_date: params.end_date,
        ..Default::default()
    };
    Ok(Json(period_report(&state.db, params.period, filter).await?))
}
