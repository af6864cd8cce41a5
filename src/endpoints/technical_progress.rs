use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, put},
    Json, Router,
};

use crate::endpoints::extractors::client_ip;
use crate::endpoints::orders::find_order;
use crate::endpoints::teknisi::ensure_assigned;
use crate::error::Result;
use crate::middleware::permissions::{Authorized, ProgressUpdate, ProgressView};
use crate::models::activity_log::{ActivityAction, RelatedType};
use crate::services::progress::StepUpdate;
use crate::services::technical_progress::{self, StepUpdateOutcome, TechnicalProgressRecord};
use crate::services::NewActivity;
use crate::state::AppState;

/// Create technical progress routes
pub fn technical_progress_routes(state: AppState) -> Router {
    Router::new()
        .route("/{order_id}", get(get_progress))
        .route("/{order_id}/step", put(update_step))
        .with_state(state)
}

async fn get_progress(
    State(state): State<AppState>,
    auth: Authorized<ProgressView>,
    Path(order_id): Path<String>,
) -> Result<Json<TechnicalProgressRecord>> {
    let order = find_order(&state, &order_id).await?;
    ensure_assigned(auth.user(), &order)?;

    let record = technical_progress::get_or_create(&state.db, &order_id, Some(auth.user_id())).await?;
    Ok(Json(record))
}

async fn update_step(
    State(state): State<AppState>,
    auth: Authorized<ProgressUpdate>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    Json(update): Json<StepUpdate>,
) -> Result<Json<StepUpdateOutcome>> {
    let order = find_order(&state, &order_id).await?;
    ensure_assigned(auth.user(), &order)?;

    let outcome = technical_progress::update_step(&state.db, &order_id, update, auth.user_id()).await?;
    let ip = client_ip(&headers);

    state
        .activity
        .record(
            NewActivity::new(
                ActivityAction::ProgressUpdated,
                format!(
                    "Step '{}' set to {} ({}%)",
                    outcome.step.kind, outcome.step.status, outcome.progress.overall_progress
                ),
            )
            .by(auth.user_id())
            .related(RelatedType::TechnicalProgress, outcome.progress.id.as_str())
            .metadata(serde_json::json!({
                "order_id": order_id,
                "step_name": outcome.step.kind.display_name(),
                "status": outcome.step.status,
                "overall_progress": outcome.progress.overall_progress,
            }))
            .ip(ip.clone()),
        )
        .await;

    if let Some(status) = outcome.order_status {
        state
            .activity
            .record(
                NewActivity::new(
                    ActivityAction::OrderStatusChanged,
                    format!("Order moved to {} by technical progress", status),
                )
                .by(auth.user_id())
                .related(RelatedType::Order, order_id.as_str())
                .ip(ip),
            )
            .await;
    }

    Ok(Json(outcome))
}
