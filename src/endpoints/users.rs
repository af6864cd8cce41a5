use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use validator::Validate;

use crate::endpoints::auth::UserResponse;
use crate::endpoints::extractors::client_ip;
use crate::error::{AppError, Result};
use crate::middleware::permissions::{Authorized, UsersEdit, UsersManage, UsersView};
use crate::models::activity_log::{ActivityAction, RelatedType};
use crate::models::prelude::*;
use crate::models::role::{self, role_name};
use crate::models::user;
use crate::services::{hash_password, NewActivity};
use crate::state::AppState;

/// Create users routes
pub fn users_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/{user_id}", put(update_user).delete(delete_user))
        .route("/{user_id}/toggle-active", put(toggle_active))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub role_id: Option<i32>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1))]
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role_id: Option<i32>,
    #[validate(length(min = 6))]
    pub password: Option<String>,
}

async fn find_user(state: &AppState, user_id: &str) -> Result<user::Model> {
    User::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

async fn list_users(
    State(state): State<AppState>,
    _auth: Authorized<UsersView>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<UserResponse>>> {
    let mut select = User::find();
    if let Some(role_id) = params.role_id {
        select = select.filter(user::Column::RoleId.eq(role_id));
    }

    let users = select
        .order_by_asc(user::Column::CreatedAt)
        .offset(params.skip.unwrap_or(0))
        .limit(params.limit.unwrap_or(100).min(500))
        .all(&state.db)
        .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

async fn update_user(
    State(state): State<AppState>,
    auth: Authorized<UsersEdit>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    request.validate()?;

    let target = find_user(&state, &user_id).await?;
    let editor_is_owner = auth.user().role_id == role::OWNER;

    if !editor_is_owner && target.role_id == role::OWNER {
        return Err(AppError::Forbidden("Only an owner can edit an owner".to_string()));
    }

    let mut active = target.clone().into_active_model();
    let mut changed = Vec::new();

    if let Some(email) = request.email {
        let email = email.trim().to_lowercase();
        if email != target.email {
            let taken = User::find()
                .filter(user::Column::Email.eq(email.as_str()))
                .filter(user::Column::Id.ne(target.id.as_str()))
                .one(&state.db)
                .await?;
            if taken.is_some() {
                return Err(AppError::BadRequest("Email already registered".to_string()));
            }
            active.email = Set(email);
            changed.push("email");
        }
    }
    if let Some(full_name) = request.full_name {
        active.full_name = Set(full_name.trim().to_string());
        changed.push("full_name");
    }
    if let Some(phone) = request.phone {
        active.phone = Set(Some(phone));
        changed.push("phone");
    }
    if let Some(address) = request.address {
        active.address = Set(Some(address));
        changed.push("address");
    }
    if let Some(role_id) = request.role_id {
        if role_name(role_id).is_none() {
            return Err(AppError::BadRequest(format!("Unknown role {}", role_id)));
        }
        if role_id == role::OWNER && !editor_is_owner {
            return Err(AppError::Forbidden("Only an owner can grant the owner role".to_string()));
        }
        active.role_id = Set(role_id);
        changed.push("role_id");
    }
    if let Some(password) = request.password {
        active.hashed_password = Set(hash_password(&password)?);
        changed.push("password");
    }

    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    state
        .activity
        .record(
            NewActivity::new(
                ActivityAction::UserUpdated,
                format!("Updated user {}", updated.username),
            )
            .by(auth.user_id())
            .related(RelatedType::User, updated.id.as_str())
            .metadata(serde_json::json!({ "fields": changed }))
            .ip(client_ip(&headers)),
        )
        .await;

    Ok(Json(updated.into()))
}

async fn delete_user(
    State(state): State<AppState>,
    auth: Authorized<UsersManage>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    if auth.user_id() == user_id {
        return Err(AppError::BadRequest("Cannot delete your own account".to_string()));
    }

    let target = find_user(&state, &user_id).await?;
    let username = target.username.clone();
    target.delete(&state.db).await?;

    tracing::info!("User {} deleted by {}", username, auth.user().username);

    state
        .activity
        .record(
            NewActivity::new(ActivityAction::UserDeleted, format!("Deleted user {}", username))
                .by(auth.user_id())
                .related(RelatedType::User, user_id.as_str())
                .ip(client_ip(&headers)),
        )
        .await;

    Ok(Json(serde_json::json!({ "message": "User deleted successfully" })))
}

async fn toggle_active(
    State(state): State<AppState>,
    auth: Authorized<UsersManage>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>> {
    if auth.user_id() == user_id {
        return Err(AppError::BadRequest(
            "Cannot deactivate your own account".to_string(),
        ));
    }

    let target = find_user(&state, &user_id).await?;
    let is_active = !target.is_active;

    let mut active = target.into_active_model();
    active.is_active = Set(is_active);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    let (action, verb) = if is_active {
        (ActivityAction::UserActivated, "Activated")
    } else {
        (ActivityAction::UserDeactivated, "Deactivated")
    };
    state
        .activity
        .record(
            NewActivity::new(action, format!("{} user {}", verb, updated.username))
                .by(auth.user_id())
                .related(RelatedType::User, updated.id.as_str())
                .ip(client_ip(&headers)),
        )
        .await;

    Ok(Json(updated.into()))
}
