//! Loyalty and CSR programs.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, ModelTrait, QueryOrder, Set};
use serde::Deserialize;
use validator::Validate;

use crate::endpoints::extractors::client_ip;
use crate::error::{AppError, Result};
use crate::middleware::permissions::{
    Authorized, ProgramsCreate, ProgramsDelete, ProgramsUpdate, ProgramsView,
};
use crate::models::activity_log::{ActivityAction, RelatedType};
use crate::models::prelude::*;
use crate::models::{csr_program, loyalty_program};
use crate::services::NewActivity;
use crate::state::AppState;

pub const PROGRAM_STATUSES: [&str; 4] = ["planning", "active", "completed", "cancelled"];

pub fn loyalty_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_loyalty).post(create_loyalty))
        .route("/{program_id}", put(update_loyalty).delete(delete_loyalty))
        .with_state(state)
}

pub fn csr_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_csr).post(create_csr))
        .route("/{program_id}", put(update_csr).delete(delete_csr))
        .with_state(state)
}

fn check_status(status: &str) -> Result<()> {
    if PROGRAM_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Invalid program status '{}'",
            status
        )))
    }
}

fn check_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(AppError::BadRequest(
            "end_date must not be before start_date".to_string(),
        )),
        _ => Ok(()),
    }
}

async fn log_program(
    state: &AppState,
    headers: &HeaderMap,
    user_id: &str,
    action: ActivityAction,
    related_type: RelatedType,
    program_id: &str,
    description: String,
) {
    state
        .activity
        .record(
            NewActivity::new(action, description)
                .by(user_id)
                .related(related_type, program_id)
                .ip(client_ip(headers)),
        )
        .await;
}

// ============================================================================
// Loyalty
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct LoyaltyProgramRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub target_participants: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub actual_participants: i32,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub budget: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub actual_cost: f64,
    pub reward_type: Option<String>,
    pub status: Option<String>,
}

impl LoyaltyProgramRequest {
    fn check(&self) -> Result<()> {
        self.validate()?;
        check_dates(self.start_date, self.end_date)?;
        if let Some(status) = &self.status {
            check_status(status)?;
        }
        Ok(())
    }

    fn apply(self, active: &mut loyalty_program::ActiveModel) {
        active.name = Set(self.name.trim().to_string());
        active.description = Set(self.description);
        active.start_date = Set(self.start_date);
        active.end_date = Set(self.end_date);
        active.target_participants = Set(self.target_participants);
        active.actual_participants = Set(self.actual_participants);
        active.budget = Set(self.budget);
        active.actual_cost = Set(self.actual_cost);
        active.reward_type = Set(self.reward_type);
        if let Some(status) = self.status {
            active.status = Set(status);
        }
    }
}

async fn list_loyalty(
    State(state): State<AppState>,
    _auth: Authorized<ProgramsView>,
) -> Result<Json<Vec<loyalty_program::Model>>> {
    let programs = LoyaltyProgram::find()
        .order_by_desc(loyalty_program::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(programs))
}

async fn create_loyalty(
    State(state): State<AppState>,
    auth: Authorized<ProgramsCreate>,
    headers: HeaderMap,
    Json(request): Json<LoyaltyProgramRequest>,
) -> Result<(StatusCode, Json<loyalty_program::Model>)> {
    request.check()?;

    let now = Utc::now();
    let mut active = loyalty_program::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        status: Set("planning".to_string()),
        created_by: Set(auth.user_id().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    request.apply(&mut active);
    let created = active.insert(&state.db).await?;

    log_program(
        &state,
        &headers,
        auth.user_id(),
        ActivityAction::ProgramCreated,
        RelatedType::LoyaltyProgram,
        &created.id,
        format!("Created loyalty program {}", created.name),
    )
    .await;

    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_loyalty(
    State(state): State<AppState>,
    auth: Authorized<ProgramsUpdate>,
    headers: HeaderMap,
    Path(program_id): Path<String>,
    Json(request): Json<LoyaltyProgramRequest>,
) -> Result<Json<loyalty_program::Model>> {
    request.check()?;

    let existing = LoyaltyProgram::find_by_id(program_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Loyalty program not found".to_string()))?;

    let mut active = existing.into_active_model();
    request.apply(&mut active);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    log_program(
        &state,
        &headers,
        auth.user_id(),
        ActivityAction::ProgramUpdated,
        RelatedType::LoyaltyProgram,
        &updated.id,
        format!("Updated loyalty program {}", updated.name),
    )
    .await;

    Ok(Json(updated))
}

async fn delete_loyalty(
    State(state): State<AppState>,
    auth: Authorized<ProgramsDelete>,
    headers: HeaderMap,
    Path(program_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let existing = LoyaltyProgram::find_by_id(program_id.as_str())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Loyalty program not found".to_string()))?;
    let name = existing.name.clone();
    existing.delete(&state.db).await?;

    log_program(
        &state,
        &headers,
        auth.user_id(),
        ActivityAction::ProgramDeleted,
        RelatedType::LoyaltyProgram,
        &program_id,
        format!("Deleted loyalty program {}", name),
    )
    .await;

    Ok(Json(serde_json::json!({ "message": "Loyalty program deleted successfully" })))
}

// ============================================================================
// CSR
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CsrProgramRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub target_beneficiaries: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub actual_beneficiaries: i32,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub budget: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub actual_cost: f64,
    pub status: Option<String>,
    pub impact_report: Option<String>,
}

impl CsrProgramRequest {
    fn check(&self) -> Result<()> {
        self.validate()?;
        check_dates(self.start_date, self.end_date)?;
        if let Some(status) = &self.status {
            check_status(status)?;
        }
        Ok(())
    }

    fn apply(self, active: &mut csr_program::ActiveModel) {
        active.name = Set(self.name.trim().to_string());
        active.description = Set(self.description);
        active.category = Set(self.category);
        active.start_date = Set(self.start_date);
        active.end_date = Set(self.end_date);
        active.target_beneficiaries = Set(self.target_beneficiaries);
        active.actual_beneficiaries = Set(self.actual_beneficiaries);
        active.budget = Set(self.budget);
        active.actual_cost = Set(self.actual_cost);
        active.impact_report = Set(self.impact_report);
        if let Some(status) = self.status {
            active.status = Set(status);
        }
    }
}

async fn list_csr(
    State(state): State<AppState>,
    _auth: Authorized<ProgramsView>,
) -> Result<Json<Vec<csr_program::Model>>> {
    let programs = CsrProgram::find()
        .order_by_desc(csr_program::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(programs))
}

async fn create_csr(
    State(state): State<AppState>,
    auth: Authorized<ProgramsCreate>,
    headers: HeaderMap,
    Json(request): Json<CsrProgramRequest>,
) -> Result<(StatusCode, Json<csr_program::Model>)> {
    request.check()?;

    let now = Utc::now();
    let mut active = csr_program::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        status: Set("planning".to_string()),
        created_by: Set(auth.user_id().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    request.apply(&mut active);
    let created = active.insert(&state.db).await?;

    log_program(
        &state,
        &headers,
        auth.user_id(),
        ActivityAction::ProgramCreated,
        RelatedType::CsrProgram,
        &created.id,
        format!("Created CSR program {}", created.name),
    )
    .await;

    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_csr(
    State(state): State<AppState>,
    auth: Authorized<ProgramsUpdate>,
    headers: HeaderMap,
    Path(program_id): Path<String>,
    Json(request): Json<CsrProgramRequest>,
) -> Result<Json<csr_program::Model>> {
    request.check()?;

    let existing = CsrProgram::find_by_id(program_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("CSR program not found".to_string()))?;

    let mut active = existing.into_active_model();
    request.apply(&mut active);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    log_program(
        &state,
        &headers,
        auth.user_id(),
        ActivityAction::ProgramUpdated,
        RelatedType::CsrProgram,
        &updated.id,
        format!("Updated CSR program {}", updated.name),
    )
    .await;

    Ok(Json(updated))
}

async fn delete_csr(
    State(state): State<AppState>,
    auth: Authorized<ProgramsDelete>,
    headers: HeaderMap,
    Path(program_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let existing = CsrProgram::find_by_id(program_id.as_str())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("CSR program not found".to_string()))?;
    let name = existing.name.clone();
    existing.delete(&state.db).await?;

    log_program(
        &state,
        &headers,
        auth.user_id(),
        ActivityAction::ProgramDeleted,
        RelatedType::CsrProgram,
        &program_id,
        format!("Deleted CSR program {}", name),
    )
    .await;

    Ok(Json(serde_json::json!({ "message": "CSR program deleted successfully" })))
}
