use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::endpoints::extractors::client_ip;
use crate::error::{AppError, Result};
use crate::middleware::permissions::{permissions_for_role, Authenticated};
use crate::models::activity_log::{ActivityAction, RelatedType};
use crate::models::prelude::*;
use crate::models::role::{self, role_name};
use crate::models::user;
use crate::services::{create_access_token, hash_password, verify_password, NewActivity};
use crate::state::AppState;

/// Create public auth routes
pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

fn default_role() -> i32 {
    role::FINANCE
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub full_name: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub phone: Option<String>,
    #[serde(default = "default_role")]
    pub role_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email
    pub identifier: String,
    pub password: String,
}

/// A user with its role resolved
#[derive(Debug, Serialize)]
pub struct UserResponse {
    #[serde(flatten)]
    pub user: user::Model,
    pub role_name: Option<&'static str>,
    pub permissions: Vec<&'static str>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            role_name: role_name(user.role_id),
            permissions: permissions_for_role(user.role_id),
            user,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: UserResponse,
}

// ============================================================================
// Handlers
// ============================================================================

async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    request.validate()?;

    if role_name(request.role_id).is_none() {
        return Err(AppError::BadRequest(format!("Unknown role {}", request.role_id)));
    }

    let username = request.username.trim().to_string();
    let email = request.email.trim().to_lowercase();

    let existing = User::find()
        .filter(
            Condition::any()
                .add(user::Column::Username.eq(username.as_str()))
                .add(user::Column::Email.eq(email.as_str())),
        )
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest(
            "Username or email already registered".to_string(),
        ));
    }

    let now = Utc::now();
    let created = user::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        username: Set(username),
        email: Set(email),
        full_name: Set(request.full_name.trim().to_string()),
        phone: Set(request.phone),
        address: Set(None),
        role_id: Set(request.role_id),
        is_active: Set(true),
        hashed_password: Set(hash_password(&request.password)?),
        last_login: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    tracing::info!("Registered user {}", created.username);

    state
        .activity
        .record(
            NewActivity::new(
                ActivityAction::Register,
                format!("User {} registered", created.username),
            )
            .by(created.id.as_str())
            .related(RelatedType::User, created.id.as_str())
            .ip(client_ip(&headers)),
        )
        .await;

    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let identifier = request.identifier.trim();

    let found = User::find()
        .filter(
            Condition::any()
                .add(user::Column::Username.eq(identifier))
                .add(user::Column::Email.eq(identifier.to_lowercase())),
        )
        .one(&state.db)
        .await?;

    let found = match found {
        Some(u) if verify_password(&request.password, &u.hashed_password) => u,
        _ => {
            return Err(AppError::Unauthorized(
                "Incorrect username or password".to_string(),
            ))
        }
    };

    if !found.is_active {
        return Err(AppError::Forbidden("Account is inactive".to_string()));
    }

    let token = create_access_token(&found.id, found.role_id)?;

    let mut active = found.into_active_model();
    active.last_login = Set(Some(Utc::now()));
    let logged_in = active.update(&state.db).await?;

    state
        .activity
        .record(
            NewActivity::new(
                ActivityAction::Login,
                format!("User {} logged in", logged_in.username),
            )
            .by(logged_in.id.as_str())
            .related(RelatedType::User, logged_in.id.as_str())
            .ip(client_ip(&headers)),
        )
        .await;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer",
        user: logged_in.into(),
    }))
}

/// Current user
pub async fn me(auth: Authenticated) -> Json<UserResponse> {
    Json(auth.0.into())
}
