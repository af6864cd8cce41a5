use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::Deserialize;

use crate::db::DbConn;
use crate::error::Result;
use crate::models::activity_log::{self, ActivityAction, RelatedType};

const DEFAULT_LIMIT: u64 = 100;
const MAX_LIMIT: u64 = 500;

/// One activity entry waiting to be written
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: Option<String>,
    pub action: ActivityAction,
    pub description: String,
    pub related: Option<(RelatedType, String)>,
    pub metadata: Option<serde_json::Value>,
    pub ip_address: Option<String>,
}

impl NewActivity {
    pub fn new(action: ActivityAction, description: impl Into<String>) -> Self {
        Self {
            user_id: None,
            action,
            description: description.into(),
            related: None,
            metadata: None,
            ip_address: None,
        }
    }

    pub fn by(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn related(mut self, related_type: RelatedType, related_id: impl Into<String>) -> Self {
        self.related = Some((related_type, related_id.into()));
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn ip(mut self, ip_address: Option<String>) -> Self {
        self.ip_address = ip_address;
        self
    }
}

/// Activity service writing the audit trail of state changes
#[derive(Clone)]
pub struct ActivityService {
    db: DbConn,
}

impl ActivityService {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Write an activity entry
    pub async fn log(&self, entry: NewActivity) -> Result<activity_log::Model> {
        let (related_type, related_id) = match entry.related {
            Some((kind, id)) => (Some(kind.to_string()), Some(id)),
            None => (None, None),
        };

        let log_entry = activity_log::ActiveModel {
            user_id: Set(entry.user_id),
            action: Set(entry.action.to_string()),
            description: Set(entry.description),
            related_type: Set(related_type),
            related_id: Set(related_id),
            metadata: Set(entry.metadata.map(|m| m.to_string())),
            ip_address: Set(entry.ip_address),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        Ok(log_entry.insert(&self.db).await?)
    }

    /// Write an activity entry; failures are logged and swallowed
    pub async fn record(&self, entry: NewActivity) {
        let action = entry.action;
        if let Err(e) = self.log(entry).await {
            tracing::warn!("Failed to write activity log ({}): {}", action, e);
        }
    }
}

/// Query parameters for fetching activity logs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityLogQuery {
    pub user_id: Option<String>,
    pub action: Option<String>,
    pub related_type: Option<String>,
    pub related_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<u64>,
}

/// Get activity logs, newest first
pub async fn get_activity_logs(
    db: &DbConn,
    query: ActivityLogQuery,
) -> Result<Vec<activity_log::Model>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let mut select = activity_log::Entity::find();

    if let Some(user_id) = query.user_id {
        select = select.filter(activity_log::Column::UserId.eq(user_id));
    }

    if let Some(action) = query.action {
        select = select.filter(activity_log::Column::Action.eq(action));
    }

    if let Some(related_type) = query.related_type {
        select = select.filter(activity_log::Column::RelatedType.eq(related_type));
    }

    if let Some(related_id) = query.related_id {
        select = select.filter(activity_log::Column::RelatedId.eq(related_id));
    }

    if let Some(from) = query.from {
        select = select.filter(activity_log::Column::CreatedAt.gte(from));
    }

    if let Some(to) = query.to {
        select = select.filter(activity_log::Column::CreatedAt.lte(to));
    }

    let logs = select
        .order_by_desc(activity_log::Column::CreatedAt)
        .order_by_desc(activity_log::Column::Id)
        .limit(limit)
        .all(db)
        .await?;

    Ok(logs)
}
