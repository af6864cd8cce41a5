use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::error::Result;
use crate::middleware::permissions::{AccountingView, Authorized};
use crate::services::accounting::{financial_dashboard, FinancialDashboard, TransactionFilter};
use crate::state::AppState;

/// Create financial routes
pub fn financial_routes(state: AppState) -> Router {
    Router::new()
        .route("/dashboard", get(dashboard))
        .with_state(state)
}

async fn dashboard(
    State(state): State<AppState>,
    _auth: Authorized<AccountingView>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<FinancialDashboard>> {
    Ok(Json(financial_dashboard(&state.db, &filter).await?))
}
