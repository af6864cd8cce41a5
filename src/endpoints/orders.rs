use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::endpoints::extractors::client_ip;
use crate::error::{AppError, Result};
use crate::middleware::permissions::{Authorized, OrdersCreate, OrdersView};
use crate::models::activity_log::{ActivityAction, RelatedType};
use crate::models::order::{self, OrderStatus, PaymentStatus};
use crate::models::prelude::*;
use crate::models::transaction;
use crate::services::accounting::{self, generate_code, NewTransaction, CATEGORY_ORDER_PAYMENT};
use crate::services::NewActivity;
use crate::state::AppState;

/// Create order routes
pub fn orders_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/{order_id}", get(get_order).put(update_order))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub business_id: Option<String>,
    pub status: Option<String>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub business_id: String,
    #[validate(length(min = 1))]
    pub customer_name: String,
    pub customer_phone: Option<String>,
    #[validate(email)]
    pub customer_email: Option<String>,
    #[validate(length(min = 1))]
    pub service_type: String,
    #[serde(default)]
    pub order_details: Option<serde_json::Value>,
    #[validate(range(min = 0.0))]
    pub total_amount: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub paid_amount: f64,
    pub payment_method: Option<String>,
    #[serde(default)]
    pub requires_technician: bool,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOrderRequest {
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub assigned_to: Option<String>,
    #[validate(range(min = 0.0))]
    pub paid_amount: Option<f64>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

/// Order with its details decoded
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: order::Model,
    pub order_details: serde_json::Value,
}

impl From<order::Model> for OrderResponse {
    fn from(order: order::Model) -> Self {
        let order_details = serde_json::from_str(&order.order_details)
            .unwrap_or_else(|_| serde_json::json!({}));
        Self {
            order,
            order_details,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderMutationResponse {
    pub order: OrderResponse,
    pub auto_transaction_created: bool,
    pub transaction: Option<transaction::Model>,
}

pub(crate) async fn find_order(state: &AppState, order_id: &str) -> Result<order::Model> {
    Order::find_by_id(order_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

async fn list_orders(
    State(state): State<AppState>,
    _auth: Authorized<OrdersView>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<OrderResponse>>> {
    let mut select = Order::find();
    if let Some(business_id) = params.business_id {
        select = select.filter(order::Column::BusinessId.eq(business_id));
    }
    if let Some(status) = params.status {
        select = select.filter(order::Column::Status.eq(status));
    }

    let orders = select
        .order_by_desc(order::Column::CreatedAt)
        .offset(params.skip.unwrap_or(0))
        .limit(params.limit.unwrap_or(100).min(500))
        .all(&state.db)
        .await?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

async fn get_order(
    State(state): State<AppState>,
    _auth: Authorized<OrdersView>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResponse>> {
    Ok(Json(find_order(&state, &order_id).await?.into()))
}

async fn create_order(
    State(state): State<AppState>,
    auth: Authorized<OrdersCreate>,
    headers: HeaderMap,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderMutationResponse>)> {
    request.validate()?;

    Business::find_by_id(request.business_id.as_str())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Business not found".to_string()))?;

    let now = Utc::now();
    let order_number = generate_code("ORD");
    let details = request.order_details.unwrap_or_else(|| serde_json::json!({}));
    let payment_status = PaymentStatus::from_amounts(request.total_amount, request.paid_amount);

    let txn = state.db.begin().await?;

    let created = order::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        order_number: Set(order_number.clone()),
        business_id: Set(request.business_id.clone()),
        customer_name: Set(request.customer_name.trim().to_string()),
        customer_phone: Set(request.customer_phone),
        customer_email: Set(request.customer_email),
        service_type: Set(request.service_type),
        order_details: Set(serde_json::to_string(&details)?),
        total_amount: Set(request.total_amount),
        paid_amount: Set(request.paid_amount),
        payment_method: Set(request.payment_method.clone()),
        status: Set(OrderStatus::Pending.to_string()),
        payment_status: Set(payment_status.to_string()),
        assigned_to: Set(request.assigned_to),
        requires_technician: Set(request.requires_technician),
        notes: Set(request.notes),
        completion_date: Set(None),
        created_by: Set(auth.user_id().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let payment = accounting::record_if_positive(
        &txn,
        NewTransaction::income(
            &created.business_id,
            CATEGORY_ORDER_PAYMENT,
            format!("Payment for order {}", order_number),
            request.paid_amount,
            auth.user_id(),
        )
        .reference(order_number.as_str())
        .for_order(created.id.as_str())
        .paid_with(request.payment_method),
    )
    .await?;

    txn.commit().await?;

    tracing::info!("Created order {}", created.order_number);

    let ip = client_ip(&headers);
    state
        .activity
        .record(
            NewActivity::new(
                ActivityAction::OrderCreated,
                format!("Created order {} for {}", created.order_number, created.customer_name),
            )
            .by(auth.user_id())
            .related(RelatedType::Order, created.id.as_str())
            .metadata(serde_json::json!({
                "order_number": created.order_number,
                "total_amount": created.total_amount,
                "paid_amount": created.paid_amount,
            }))
            .ip(ip.clone()),
        )
        .await;

    if let Some(payment) = &payment {
        log_payment(&state, auth.user_id(), &created, payment, ip).await;
    }

    Ok((
        StatusCode::CREATED,
        Json(OrderMutationResponse {
            order: created.into(),
            auto_transaction_created: payment.is_some(),
            transaction: payment,
        }),
    ))
}

async fn update_order(
    State(state): State<AppState>,
    auth: Authorized<OrdersCreate>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<Json<OrderMutationResponse>> {
    request.validate()?;

    let existing = find_order(&state, &order_id).await?;
    let now = Utc::now();
    let previous_status = existing.status.clone();
    let previous_paid = existing.paid_amount;

    let mut active = existing.clone().into_active_model();

    let new_status = match request.status.as_deref() {
        Some(value) => Some(OrderStatus::parse(value).ok_or_else(|| {
            AppError::BadRequest(format!("Invalid order status '{}'", value))
        })?),
        None => None,
    };
    if let Some(status) = new_status {
        active.status = Set(status.to_string());
        active.completion_date = Set(match status {
            OrderStatus::Completed => existing.completion_date.or(Some(now)),
            _ => existing.completion_date,
        });
    }

    let paid_amount = request.paid_amount.unwrap_or(previous_paid);
    if request.paid_amount.is_some() {
        active.paid_amount = Set(paid_amount);
        active.payment_status =
            Set(PaymentStatus::from_amounts(existing.total_amount, paid_amount).to_string());
    }
    if let Some(value) = request.payment_status.as_deref() {
        let status = PaymentStatus::parse(value).ok_or_else(|| {
            AppError::BadRequest(format!("Invalid payment status '{}'", value))
        })?;
        active.payment_status = Set(status.to_string());
    }
    if let Some(assigned_to) = request.assigned_to {
        active.assigned_to = Set(Some(assigned_to));
    }
    if let Some(method) = request.payment_method.clone() {
        active.payment_method = Set(Some(method));
    }
    if let Some(notes) = request.notes {
        active.notes = Set(Some(notes));
    }
    active.updated_at = Set(now);

    let txn = state.db.begin().await?;
    let updated = active.update(&txn).await?;

    let delta = paid_amount - previous_paid;
    let payment = accounting::record_if_positive(
        &txn,
        NewTransaction::income(
            &updated.business_id,
            CATEGORY_ORDER_PAYMENT,
            format!("Additional payment for order {}", updated.order_number),
            delta,
            auth.user_id(),
        )
        .reference(updated.order_number.as_str())
        .for_order(updated.id.as_str())
        .paid_with(request.payment_method.or_else(|| updated.payment_method.clone())),
    )
    .await?;

    txn.commit().await?;

    let ip = client_ip(&headers);
    let status_changed = updated.status != previous_status;
    let (action, description) = if status_changed {
        (
            ActivityAction::OrderStatusChanged,
            format!(
                "Order {} status {} -> {}",
                updated.order_number, previous_status, updated.status
            ),
        )
    } else {
        (
            ActivityAction::OrderUpdated,
            format!("Updated order {}", updated.order_number),
        )
    };
    state
        .activity
        .record(
            NewActivity::new(action, description)
                .by(auth.user_id())
                .related(RelatedType::Order, updated.id.as_str())
                .metadata(serde_json::json!({
                    "previous_status": previous_status,
                    "status": updated.status,
                    "previous_paid_amount": previous_paid,
                    "paid_amount": updated.paid_amount,
                }))
                .ip(ip.clone()),
        )
        .await;

    if let Some(payment) = &payment {
        log_payment(&state, auth.user_id(), &updated, payment, ip).await;
    }

    Ok(Json(OrderMutationResponse {
        order: updated.into(),
        auto_transaction_created: payment.is_some(),
        transaction: payment,
    }))
}

async fn log_payment(
    state: &AppState,
    user_id: &str,
    order: &order::Model,
    payment: &transaction::Model,
    ip: Option<String>,
) {
    state
        .activity
        .record(
            NewActivity::new(
                ActivityAction::PaymentReceived,
                format!(
                    "Payment {} received for order {}",
                    payment.amount, order.order_number
                ),
            )
            .by(user_id)
            .related(RelatedType::Transaction, payment.id.as_str())
            .metadata(serde_json::json!({
                "order_id": order.id,
                "transaction_code": payment.transaction_code,
            }))
            .ip(ip),
        )
        .await;
}
