//! Persistence for order technical progress.
//!
//! A progress record is created lazily the first time an order's progress is
//! read. The unique index on `order_id` guarantees at most one record per
//! order; the unique `(progress_id, step_name)` index guarantees each step
//! exists once.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;

use crate::db::DbConn;
use crate::error::{AppError, Result};
use crate::models::order::{self, OrderStatus};
use crate::models::{technical_progress, technical_progress_step};
use crate::services::progress::{OrderProgress, ProgressStep, StepKind, StepStatus, StepUpdate};

/// Stored progress of one order, with the derived overall percentage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalProgressRecord {
    pub id: String,
    pub order_id: String,
    pub steps: Vec<ProgressStep>,
    pub overall_progress: f64,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TechnicalProgressRecord {
    fn assemble(row: technical_progress::Model, steps: Vec<ProgressStep>) -> Self {
        let progress = OrderProgress {
            order_id: row.order_id,
            steps,
        };
        Self {
            id: row.id,
            overall_progress: progress.overall_progress(),
            order_id: progress.order_id,
            steps: progress.steps,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Result of a step update
#[derive(Debug, Clone, Serialize)]
pub struct StepUpdateOutcome {
    pub progress: TechnicalProgressRecord,
    pub step: ProgressStep,
    /// New order status when the update moved the order
    pub order_status: Option<OrderStatus>,
}

/// Return the progress record of an order, creating the default checklist if
/// the order has none yet.
pub async fn get_or_create(
    db: &DbConn,
    order_id: &str,
    user_id: Option<&str>,
) -> Result<TechnicalProgressRecord> {
    ensure_order_exists(db, order_id).await?;

    if let Some(record) = load(db, order_id).await? {
        return Ok(record);
    }

    match create_default(db, order_id, user_id).await {
        Ok(record) => {
            tracing::info!("Created technical progress for order {}", order_id);
            Ok(record)
        }
        Err(e) => {
            // A concurrent request may have inserted the record first
            match load(db, order_id).await? {
                Some(record) => Ok(record),
                None => Err(e),
            }
        }
    }
}

/// Load the progress record of an order without creating it
pub async fn load<C: ConnectionTrait>(
    db: &C,
    order_id: &str,
) -> Result<Option<TechnicalProgressRecord>> {
    let Some(row) = technical_progress::Entity::find()
        .filter(technical_progress::Column::OrderId.eq(order_id))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let step_rows = technical_progress_step::Entity::find()
        .filter(technical_progress_step::Column::ProgressId.eq(row.id.as_str()))
        .order_by_asc(technical_progress_step::Column::Position)
        .all(db)
        .await?;

    let steps = step_rows
        .into_iter()
        .map(step_from_row)
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(TechnicalProgressRecord::assemble(row, steps)))
}

/// Apply a step update and move the order status along with the progress.
///
/// Unknown step names are rejected before any record is created or changed.
pub async fn update_step(
    db: &DbConn,
    order_id: &str,
    update: StepUpdate,
    user_id: &str,
) -> Result<StepUpdateOutcome> {
    let kind: StepKind = update.step_name.parse()?;

    let record = get_or_create(db, order_id, Some(user_id)).await?;
    let mut progress = OrderProgress {
        order_id: record.order_id.clone(),
        steps: record.steps,
    };

    let now = Utc::now();
    let step = progress.apply(update, now)?.clone();

    let txn = db.begin().await?;

    let row = technical_progress_step::Entity::find()
        .filter(technical_progress_step::Column::ProgressId.eq(record.id.as_str()))
        .filter(technical_progress_step::Column::StepName.eq(kind.display_name()))
        .one(&txn)
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!(
                "Progress record {} is missing step '{}'",
                record.id, kind
            ))
        })?;

    let mut active = row.into_active_model();
    active.status = Set(step.status.to_string());
    active.notes = Set(step.notes.clone());
    active.started_at = Set(step.started_at);
    active.completed_at = Set(step.completed_at);
    active.update(&txn).await?;

    let updated_row = technical_progress::ActiveModel {
        id: Set(record.id.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .update(&txn)
    .await?;

    let order_status = sync_order_status(&txn, order_id, progress.overall_progress(), now).await?;

    txn.commit().await?;

    Ok(StepUpdateOutcome {
        progress: TechnicalProgressRecord::assemble(updated_row, progress.steps),
        step,
        order_status,
    })
}

/// Order status implied by an overall progress value
pub fn status_for_progress(overall_progress: f64) -> Option<OrderStatus> {
    if overall_progress >= 100.0 {
        Some(OrderStatus::Completed)
    } else if overall_progress > 0.0 {
        Some(OrderStatus::Processing)
    } else {
        None
    }
}

async fn sync_order_status<C: ConnectionTrait>(
    db: &C,
    order_id: &str,
    overall_progress: f64,
    now: DateTime<Utc>,
) -> Result<Option<OrderStatus>> {
    let Some(target) = status_for_progress(overall_progress) else {
        return Ok(None);
    };

    let order = order::Entity::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    if order.status == target.to_string() {
        return Ok(None);
    }

    let mut active = order.into_active_model();
    active.status = Set(target.to_string());
    active.completion_date = Set(match target {
        OrderStatus::Completed => Some(now),
        _ => None,
    });
    active.updated_at = Set(now);
    active.update(db).await?;

    tracing::info!("Order {} moved to {} by technical progress", order_id, target);
    Ok(Some(target))
}

async fn ensure_order_exists(db: &DbConn, order_id: &str) -> Result<()> {
    order::Entity::find_by_id(order_id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

async fn create_default(
    db: &DbConn,
    order_id: &str,
    user_id: Option<&str>,
) -> Result<TechnicalProgressRecord> {
    let now = Utc::now();
    let progress = OrderProgress::new(order_id);

    let txn = db.begin().await?;

    let row = technical_progress::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        order_id: Set(order_id.to_string()),
        created_by: Set(user_id.map(String::from)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    for step in &progress.steps {
        technical_progress_step::ActiveModel {
            progress_id: Set(row.id.clone()),
            position: Set(step.kind.position() as i32),
            step_name: Set(step.kind.display_name().to_string()),
            step_weight: Set(step.weight as i32),
            status: Set(step.status.to_string()),
            notes: Set(None),
            started_at: Set(None),
            completed_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    Ok(TechnicalProgressRecord::assemble(row, progress.steps))
}

fn step_from_row(row: technical_progress_step::Model) -> Result<ProgressStep> {
    let kind = StepKind::parse(&row.step_name).ok_or_else(|| {
        AppError::Internal(format!("Stored progress step '{}' is unknown", row.step_name))
    })?;
    let status: StepStatus = row
        .status
        .parse()
        .map_err(|e: crate::services::progress::ProgressError| AppError::Internal(e.to_string()))?;
    let weight = u32::try_from(row.step_weight).map_err(|_| {
        AppError::Internal(format!("Stored progress step '{}' has a negative weight", kind))
    })?;

    Ok(ProgressStep {
        kind,
        weight,
        status,
        notes: row.notes,
        started_at: row.started_at,
        completed_at: row.completed_at,
    })
}
