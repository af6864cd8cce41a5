use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect,
};
use serde::Serialize;

use crate::error::Result;
use crate::middleware::permissions::{Authorized, DashboardView};
use crate::models::order::{self, OrderStatus};
use crate::models::prelude::*;
use crate::models::transaction::{self, TransactionType};
use crate::models::business;
use crate::services::accounting::day_start;
use crate::state::AppState;

/// Create dashboard routes
pub fn dashboard_routes(state: AppState) -> Router {
    Router::new()
        .route("/stats", get(stats))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_businesses: u64,
    pub total_orders: u64,
    pub active_orders: u64,
    pub pending_orders: u64,
    pub completed_orders_today: u64,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub revenue_today: f64,
    pub expenses_today: f64,
    pub net_today: f64,
}

/// Sum of transaction amounts of one type, optionally since a point in time
async fn sum_amount<C: ConnectionTrait>(
    db: &C,
    kind: TransactionType,
    since: Option<DateTime<Utc>>,
) -> Result<f64> {
    let mut select = Transaction::find()
        .select_only()
        .column_as(Expr::col(transaction::Column::Amount).sum(), "total")
        .filter(transaction::Column::TransactionType.eq(kind.as_str()));
    if let Some(since) = since {
        select = select.filter(transaction::Column::CreatedAt.gte(since));
    }

    let total: Option<Option<f64>> = select.into_tuple().one(db).await?;
    Ok(total.flatten().unwrap_or(0.0))
}

async fn stats(
    State(state): State<AppState>,
    _auth: Authorized<DashboardView>,
) -> Result<Json<DashboardStats>> {
    let db = &state.db;
    let today = day_start(Utc::now().date_naive());

    let total_businesses = Business::find()
        .filter(business::Column::IsActive.eq(true))
        .count(db)
        .await?;
    let total_orders = Order::find().count(db).await?;
    let active_orders = Order::find()
        .filter(order::Column::Status.is_not_in([
            OrderStatus::Completed.to_string(),
            OrderStatus::Cancelled.to_string(),
        ]))
        .count(db)
        .await?;
    let pending_orders = Order::find()
        .filter(order::Column::Status.eq(OrderStatus::Pending.to_string()))
        .count(db)
        .await?;
    let completed_orders_today = Order::find()
        .filter(order::Column::Status.eq(OrderStatus::Completed.to_string()))
        .filter(order::Column::CompletionDate.gte(today))
        .count(db)
        .await?;

    let total_revenue = sum_amount(db, TransactionType::Income, None).await?;
    let total_expenses = sum_amount(db, TransactionType::Expense, None).await?;
    let revenue_today = sum_amount(db, TransactionType::Income, Some(today)).await?;
    let expenses_today = sum_amount(db, TransactionType::Expense, Some(today)).await?;

    Ok(Json(DashboardStats {
        total_businesses,
        total_orders,
        active_orders,
        pending_orders,
        completed_orders_today,
        total_revenue,
        total_expenses,
        revenue_today,
        expenses_today,
        net_today: revenue_today - expenses_today,
    }))
}
