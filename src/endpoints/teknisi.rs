use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set};
use serde::Deserialize;

use crate::endpoints::extractors::client_ip;
use crate::endpoints::orders::{find_order, OrderResponse};
use crate::error::{AppError, Result};
use crate::middleware::permissions::{Authorized, TeknisiUpdate, TeknisiView};
use crate::models::activity_log::{ActivityAction, RelatedType};
use crate::models::order::{self, OrderStatus};
use crate::models::prelude::*;
use crate::models::{role, user};
use crate::services::NewActivity;
use crate::state::AppState;

/// Create field technician routes
pub fn teknisi_routes(state: AppState) -> Router {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{order_id}/status", put(update_status))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
    pub notes: Option<String>,
}

/// Append a stamped note to existing order notes
pub fn append_note(existing: Option<&str>, author: &str, note: &str, at: chrono::DateTime<Utc>) -> String {
    let line = format!("[{}] {}: {}", at.format("%Y-%m-%d %H:%M"), author, note.trim());
    match existing.map(str::trim).filter(|n| !n.is_empty()) {
        Some(previous) => format!("{}\n{}", previous, line),
        None => line,
    }
}

/// A Teknisi may only work on orders assigned to them
pub(crate) fn ensure_assigned(user: &user::Model, order: &order::Model) -> Result<()> {
    if user.role_id == role::TEKNISI && order.assigned_to.as_deref() != Some(user.id.as_str()) {
        return Err(AppError::Forbidden(
            "Order is not assigned to you".to_string(),
        ));
    }
    Ok(())
}

async fn list_orders(
    State(state): State<AppState>,
    auth: Authorized<TeknisiView>,
) -> Result<Json<Vec<OrderResponse>>> {
    let mut select = Order::find().filter(order::Column::RequiresTechnician.eq(true));
    if auth.user().role_id == role::TEKNISI {
        select = select.filter(order::Column::AssignedTo.eq(auth.user_id()));
    }

    let orders = select
        .order_by_desc(order::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

async fn update_status(
    State(state): State<AppState>,
    auth: Authorized<TeknisiUpdate>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<OrderResponse>> {
    let status = OrderStatus::parse(&request.status).ok_or_else(|| {
        AppError::BadRequest(format!("Invalid order status '{}'", request.status))
    })?;

    let existing = find_order(&state, &order_id).await?;
    ensure_assigned(auth.user(), &existing)?;

    let now = Utc::now();
    let previous_status = existing.status.clone();
    let notes = match request.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        Some(note) => Some(append_note(
            existing.notes.as_deref(),
            &auth.user().full_name,
            note,
            now,
        )),
        None => existing.notes.clone(),
    };

    let mut active = existing.clone().into_active_model();
    active.status = Set(status.to_string());
    active.notes = Set(notes);
    if status == OrderStatus::Completed && existing.completion_date.is_none() {
        active.completion_date = Set(Some(now));
    }
    active.updated_at = Set(now);
    let updated = active.update(&state.db).await?;

    state
        .activity
        .record(
            NewActivity::new(
                ActivityAction::OrderStatusChanged,
                format!(
                    "Technician set order {} to {}",
                    updated.order_number, updated.status
                ),
            )
            .by(auth.user_id())
            .related(RelatedType::Order, updated.id.as_str())
            .metadata(serde_json::json!({
                "previous_status": previous_status,
                "status": updated.status,
            }))
            .ip(client_ip(&headers)),
        )
        .await;

    Ok(Json(updated.into()))
}
