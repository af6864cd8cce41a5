use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, ModelTrait, Set};
use serde::Deserialize;
use validator::Validate;

use crate::endpoints::extractors::client_ip;
use crate::error::{AppError, Result};
use crate::middleware::permissions::{
    Authorized, TransactionsCreate, TransactionsDelete, TransactionsEdit, TransactionsView,
};
use crate::models::activity_log::{ActivityAction, RelatedType};
use crate::models::prelude::*;
use crate::models::transaction::{self, TransactionType};
use crate::services::accounting::{self, NewTransaction, TransactionFilter};
use crate::services::NewActivity;
use crate::state::AppState;

/// Create transaction routes
pub fn transactions_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_transactions).post(create_transaction))
        .route(
            "/{transaction_id}",
            put(update_transaction).delete(delete_transaction),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub business_id: Option<String>,
    pub transaction_type: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTransactionRequest {
    pub business_id: String,
    pub transaction_type: String,
    #[validate(length(min = 1))]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    pub payment_method: Option<String>,
    pub reference_number: Option<String>,
    pub order_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTransactionRequest {
    pub transaction_type: Option<String>,
    #[validate(length(min = 1))]
    pub category: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub payment_method: Option<String>,
    pub reference_number: Option<String>,
}

fn parse_type(value: &str) -> Result<TransactionType> {
    TransactionType::parse(value).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Invalid transaction type '{}', expected income, expense, transfer or commission",
            value
        ))
    })
}

async fn list_transactions(
    State(state): State<AppState>,
    _auth: Authorized<TransactionsView>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<transaction::Model>>> {
    let filter = TransactionFilter {
        business_id: params.business_id,
        transaction_type: params.transaction_type,
        category: params.category,
        start_date: params.start_date,
        end_date: params.end_date,
    };
    let limit = params.limit.unwrap_or(100).min(1000);

    let transactions =
        accounting::find_transactions(&state.db, &filter, params.skip.unwrap_or(0), limit).await?;
    Ok(Json(transactions))
}

async fn create_transaction(
    State(state): State<AppState>,
    auth: Authorized<TransactionsCreate>,
    headers: HeaderMap,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<transaction::Model>)> {
    request.validate()?;
    let transaction_type = parse_type(&request.transaction_type)?;

    Business::find_by_id(request.business_id.as_str())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Business not found".to_string()))?;

    let created = accounting::record_transaction(
        &state.db,
        NewTransaction {
            business_id: request.business_id,
            transaction_type,
            category: request.category,
            description: request.description,
            amount: request.amount,
            payment_method: request.payment_method,
            reference_number: request.reference_number,
            order_id: request.order_id,
            created_by: auth.user_id().to_string(),
        },
    )
    .await?;

    state
        .activity
        .record(
            NewActivity::new(
                ActivityAction::TransactionCreated,
                format!(
                    "Recorded {} {} ({})",
                    created.transaction_type, created.transaction_code, created.amount
                ),
            )
            .by(auth.user_id())
            .related(RelatedType::Transaction, created.id.as_str())
            .metadata(serde_json::json!({
                "category": created.category,
                "amount": created.amount,
            }))
            .ip(client_ip(&headers)),
        )
        .await;

    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_transaction(
    State(state): State<AppState>,
    auth: Authorized<TransactionsEdit>,
    headers: HeaderMap,
    Path(transaction_id): Path<String>,
    Json(request): Json<UpdateTransactionRequest>,
) -> Result<Json<transaction::Model>> {
    request.validate()?;

    let existing = Transaction::find_by_id(transaction_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))?;
    let previous_amount = existing.amount;

    let mut active = existing.into_active_model();
    if let Some(value) = request.transaction_type {
        active.transaction_type = Set(parse_type(&value)?.to_string());
    }
    if let Some(category) = request.category {
        active.category = Set(category);
    }
    if let Some(description) = request.description {
        active.description = Set(description);
    }
    if let Some(amount) = request.amount {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(AppError::BadRequest(
                "Transaction amount must be positive".to_string(),
            ));
        }
        active.amount = Set(amount);
    }
    if let Some(method) = request.payment_method {
        active.payment_method = Set(Some(method));
    }
    if let Some(reference) = request.reference_number {
        active.reference_number = Set(Some(reference));
    }
    let updated = active.update(&state.db).await?;

    state
        .activity
        .record(
            NewActivity::new(
                ActivityAction::TransactionUpdated,
                format!("Updated transaction {}", updated.transaction_code),
            )
            .by(auth.user_id())
            .related(RelatedType::Transaction, updated.id.as_str())
            .metadata(serde_json::json!({
                "previous_amount": previous_amount,
                "amount": updated.amount,
            }))
            .ip(client_ip(&headers)),
        )
        .await;

    Ok(Json(updated))
}

async fn delete_transaction(
    State(state): State<AppState>,
    auth: Authorized<TransactionsDelete>,
    headers: HeaderMap,
    Path(transaction_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let existing = Transaction::find_by_id(transaction_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))?;

    let snapshot = serde_json::json!({
        "transaction_code": existing.transaction_code,
        "transaction_type": existing.transaction_type,
        "category": existing.category,
        "amount": existing.amount,
    });
    let id = existing.id.clone();
    let code = existing.transaction_code.clone();
    existing.delete(&state.db).await?;

    state
        .activity
        .record(
            NewActivity::new(
                ActivityAction::TransactionDeleted,
                format!("Deleted transaction {}", code),
            )
            .by(auth.user_id())
            .related(RelatedType::Transaction, id)
            .metadata(snapshot)
            .ip(client_ip(&headers)),
        )
        .await;

    Ok(Json(serde_json::json!({ "message": "Transaction deleted successfully" })))
}
