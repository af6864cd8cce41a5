use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::endpoints::extractors::client_ip;
use crate::error::{AppError, Result};
use crate::middleware::permissions::{Authorized, BusinessesManage, BusinessesView};
use crate::models::activity_log::{ActivityAction, RelatedType};
use crate::models::business::{self, CATEGORIES};
use crate::models::prelude::*;
use crate::services::NewActivity;
use crate::state::AppState;

/// Create business routes
pub fn businesses_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_businesses).post(create_business))
        .route("/{business_id}", get(get_business).put(update_business))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    pub include_inactive: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBusinessRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub settings: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBusinessRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub settings: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}

/// Business with its settings decoded
#[derive(Debug, Serialize)]
pub struct BusinessResponse {
    #[serde(flatten)]
    pub business: business::Model,
    pub settings: serde_json::Value,
}

impl From<business::Model> for BusinessResponse {
    fn from(business: business::Model) -> Self {
        let settings = serde_json::from_str(&business.settings)
            .unwrap_or_else(|_| serde_json::json!({}));
        Self { business, settings }
    }
}

fn check_category(category: &str) -> Result<()> {
    if CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Unknown business category '{}'",
            category
        )))
    }
}

async fn list_businesses(
    State(state): State<AppState>,
    _auth: Authorized<BusinessesView>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<BusinessResponse>>> {
    let mut select = Business::find();
    if let Some(category) = params.category {
        select = select.filter(business::Column::Category.eq(category));
    }
    if !params.include_inactive.unwrap_or(false) {
        select = select.filter(business::Column::IsActive.eq(true));
    }

    let businesses = select
        .order_by_asc(business::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(businesses.into_iter().map(BusinessResponse::from).collect()))
}

async fn get_business(
    State(state): State<AppState>,
    _auth: Authorized<BusinessesView>,
    Path(business_id): Path<String>,
) -> Result<Json<BusinessResponse>> {
    let found = Business::find_by_id(business_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Business not found".to_string()))?;
    Ok(Json(found.into()))
}

async fn create_business(
    State(state): State<AppState>,
    auth: Authorized<BusinessesManage>,
    headers: HeaderMap,
    Json(request): Json<CreateBusinessRequest>,
) -> Result<(StatusCode, Json<BusinessResponse>)> {
    request.validate()?;
    check_category(&request.category)?;

    let now = Utc::now();
    let settings = request.settings.unwrap_or_else(|| serde_json::json!({}));
    let created = business::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        name: Set(request.name.trim().to_string()),
        category: Set(request.category),
        description: Set(request.description),
        address: Set(request.address),
        phone: Set(request.phone),
        email: Set(request.email),
        settings: Set(serde_json::to_string(&settings)?),
        is_active: Set(true),
        created_by: Set(auth.user_id().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    state
        .activity
        .record(
            NewActivity::new(
                ActivityAction::BusinessCreated,
                format!("Created business {}", created.name),
            )
            .by(auth.user_id())
            .related(RelatedType::Business, created.id.as_str())
            .metadata(serde_json::json!({ "category": created.category }))
            .ip(client_ip(&headers)),
        )
        .await;

    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn update_business(
    State(state): State<AppState>,
    auth: Authorized<BusinessesManage>,
    headers: HeaderMap,
    Path(business_id): Path<String>,
    Json(request): Json<UpdateBusinessRequest>,
) -> Result<Json<BusinessResponse>> {
    request.validate()?;

    let existing = Business::find_by_id(business_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Business not found".to_string()))?;

    let mut active = existing.into_active_model();
    if let Some(name) = request.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(category) = request.category {
        check_category(&category)?;
        active.category = Set(category);
    }
    if let Some(description) = request.description {
        active.description = Set(Some(description));
    }
    if let Some(address) = request.address {
        active.address = Set(Some(address));
    }
    if let Some(phone) = request.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(email) = request.email {
        active.email = Set(Some(email));
    }
    if let Some(settings) = request.settings {
        active.settings = Set(serde_json::to_string(&settings)?);
    }
    if let Some(is_active) = request.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    state
        .activity
        .record(
            NewActivity::new(
                ActivityAction::BusinessUpdated,
                format!("Updated business {}", updated.name),
            )
            .by(auth.user_id())
            .related(RelatedType::Business, updated.id.as_str())
            .ip(client_ip(&headers)),
        )
        .await;

    Ok(Json(updated.into()))
}
