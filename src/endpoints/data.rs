use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use sea_orm::{ConnectionTrait, EntityTrait, TransactionTrait};
use serde::Serialize;

use crate::endpoints::extractors::client_ip;
use crate::error::Result;
use crate::middleware::permissions::{Authorized, DataReset};
use crate::models::activity_log::ActivityAction;
use crate::models::prelude::*;
use crate::services::NewActivity;
use crate::state::AppState;

/// Create data maintenance routes
pub fn data_routes(state: AppState) -> Router {
    Router::new()
        .route("/reset", post(reset))
        .with_state(state)
}

/// Rows removed per table
#[derive(Debug, Default, Serialize)]
pub struct ResetSummary {
    pub technical_progress: u64,
    pub transactions: u64,
    pub orders: u64,
    pub loket_reports: u64,
    pub kasir_reports: u64,
    pub loyalty_programs: u64,
    pub csr_programs: u64,
}

/// Delete operational data; users, roles, businesses and settings are kept
pub async fn reset_operational_data<C: ConnectionTrait + TransactionTrait>(
    db: &C,
) -> Result<ResetSummary> {
    let txn = db.begin().await?;

    TechnicalProgressStep::delete_many().exec(&txn).await?;
    let technical_progress = TechnicalProgress::delete_many().exec(&txn).await?.rows_affected;
    let transactions = Transaction::delete_many().exec(&txn).await?.rows_affected;
    let orders = Order::delete_many().exec(&txn).await?.rows_affected;
    LoketBankBalance::delete_many().exec(&txn).await?;
    let loket_reports = LoketReport::delete_many().exec(&txn).await?.rows_affected;
    let kasir_reports = KasirReport::delete_many().exec(&txn).await?.rows_affected;
    let loyalty_programs = LoyaltyProgram::delete_many().exec(&txn).await?.rows_affected;
    let csr_programs = CsrProgram::delete_many().exec(&txn).await?.rows_affected;

    txn.commit().await?;

    Ok(ResetSummary {
        technical_progress,
        transactions,
        orders,
        loket_reports,
        kasir_reports,
        loyalty_programs,
        csr_programs,
    })
}

async fn reset(
    State(state): State<AppState>,
    auth: Authorized<DataReset>,
    headers: HeaderMap,
) -> Result<Json<ResetSummary>> {
    let summary = reset_operational_data(&state.db).await?;

    tracing::warn!("Operational data reset by {}", auth.user().username);

    state
        .activity
        .record(
            NewActivity::new(ActivityAction::DataReset, "Reset operational data")
                .by(auth.user_id())
                .metadata(serde_json::to_value(&summary)?)
                .ip(client_ip(&headers)),
        )
        .await;

    Ok(Json(summary))
}
