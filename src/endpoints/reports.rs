use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::endpoints::extractors::client_ip;
use crate::error::Result;
use crate::middleware::permissions::{
    Authorized, ReportsCreate, ReportsDelete, ReportsEdit, ReportsReconcile, ReportsView,
};
use crate::models::activity_log::{ActivityAction, RelatedType};
use crate::models::transaction;
use crate::services::reports::{
    self, KasirReconciliation, KasirReportDraft, KasirReportInput, KasirReportView,
    LoketReconciliation, LoketReportDraft, LoketReportInput, LoketReportView,
    ReconciliationSummary, ReportFilter, VerificationSummary,
};
use crate::services::NewActivity;
use crate::state::AppState;

/// Create daily report routes
pub fn reports_routes(state: AppState) -> Router {
    Router::new()
        .route("/loket-daily", get(list_loket).post(create_loket))
        .route("/loket-daily/{report_id}", put(update_loket).delete(delete_loket))
        .route("/kasir-daily", get(list_kasir).post(create_kasir))
        .route("/kasir-daily/{report_id}", put(update_kasir).delete(delete_kasir))
        .route("/reconciliation/kasir", get(reconcile_kasir))
        .route("/reconciliation/loket", get(reconcile_loket))
        .route("/verification/summary", get(verification_summary))
        .route("/generate-loket", post(generate_loket))
        .route("/generate-kasir", post(generate_kasir))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ReconciliationParams {
    pub report_date: NaiveDate,
    pub business_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DraftParams {
    pub business_id: String,
    pub report_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct CreatedReport<T> {
    pub report: T,
    pub transactions: Vec<transaction::Model>,
}

async fn log_report(
    state: &AppState,
    headers: &HeaderMap,
    user_id: &str,
    action: ActivityAction,
    related_type: RelatedType,
    report_id: &str,
    description: String,
) {
    state
        .activity
        .record(
            NewActivity::new(action, description)
                .by(user_id)
                .related(related_type, report_id)
                .ip(client_ip(headers)),
        )
        .await;
}

// ============================================================================
// Loket
// ============================================================================

async fn list_loket(
    State(state): State<AppState>,
    _auth: Authorized<ReportsView>,
    Query(filter): Query<ReportFilter>,
) -> Result<Json<Vec<LoketReportView>>> {
    Ok(Json(reports::list_loket_reports(&state.db, &filter).await?))
}

async fn create_loket(
    State(state): State<AppState>,
    auth: Authorized<ReportsCreate>,
    headers: HeaderMap,
    Json(input): Json<LoketReportInput>,
) -> Result<(StatusCode, Json<CreatedReport<LoketReportView>>)> {
    let (view, income) = reports::create_loket_report(&state.db, input, auth.user_id()).await?;

    log_report(
        &state,
        &headers,
        auth.user_id(),
        ActivityAction::ReportCreated,
        RelatedType::LoketReport,
        &view.report.id,
        format!(
            "Loket report {} shift {} ({})",
            view.report.report_date, view.report.shift, view.report.total_setoran_shift
        ),
    )
    .await;
    if let Some(income) = &income {
        log_report(
            &state,
            &headers,
            auth.user_id(),
            ActivityAction::TransactionCreated,
            RelatedType::Transaction,
            &income.id,
            format!("Recorded {} from loket report", income.transaction_code),
        )
        .await;
    }

    Ok((
        StatusCode::CREATED,
        Json(CreatedReport {
            report: view,
            transactions: income.into_iter().collect(),
        }),
    ))
}

async fn update_loket(
    State(state): State<AppState>,
    auth: Authorized<ReportsEdit>,
    headers: HeaderMap,
    Path(report_id): Path<String>,
    Json(input): Json<LoketReportInput>,
) -> Result<Json<LoketReportView>> {
    let view = reports::update_loket_report(&state.db, &report_id, input).await?;

    log_report(
        &state,
        &headers,
        auth.user_id(),
        ActivityAction::ReportUpdated,
        RelatedType::LoketReport,
        &report_id,
        format!(
            "Updated loket report {} shift {}",
            view.report.report_date, view.report.shift
        ),
    )
    .await;

    Ok(Json(view))
}

async fn delete_loket(
    State(state): State<AppState>,
    auth: Authorized<ReportsDelete>,
    headers: HeaderMap,
    Path(report_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let deleted = reports::delete_loket_report(&state.db, &report_id).await?;

    log_report(
        &state,
        &headers,
        auth.user_id(),
        ActivityAction::ReportDeleted,
        RelatedType::LoketReport,
        &report_id,
        format!(
            "Deleted loket report {} shift {}",
            deleted.report_date, deleted.shift
        ),
    )
    .await;

    Ok(Json(serde_json::json!({ "message": "Loket report deleted successfully" })))
}

// ============================================================================
// Kasir
// ============================================================================

async fn list_kasir(
    State(state): State<AppState>,
    _auth: Authorized<ReportsView>,
    Query(filter): Query<ReportFilter>,
) -> Result<Json<Vec<KasirReportView>>> {
    Ok(Json(reports::list_kasir_reports(&state.db, &filter).await?))
}

async fn create_kasir(
    State(state): State<AppState>,
    auth: Authorized<ReportsCreate>,
    headers: HeaderMap,
    Json(input): Json<KasirReportInput>,
) -> Result<(StatusCode, Json<CreatedReport<KasirReportView>>)> {
    let (view, booked) = reports::create_kasir_report(&state.db, input, auth.user_id()).await?;

    log_report(
        &state,
        &headers,
        auth.user_id(),
        ActivityAction::ReportCreated,
        RelatedType::KasirReport,
        &view.report.id,
        format!(
            "Kasir report {} (setoran {})",
            view.report.report_date, view.totals.total_setoran
        ),
    )
    .await;
    for entry in &booked {
        log_report(
            &state,
            &headers,
            auth.user_id(),
            ActivityAction::TransactionCreated,
            RelatedType::Transaction,
            &entry.id,
            format!(
                "Recorded {} {} from kasir report",
                entry.category, entry.transaction_code
            ),
        )
        .await;
    }

    Ok((
        StatusCode::CREATED,
        Json(CreatedReport {
            report: view,
            transactions: booked,
        }),
    ))
}

async fn update_kasir(
    State(state): State<AppState>,
    auth: Authorized<ReportsEdit>,
    headers: HeaderMap,
    Path(report_id): Path<String>,
    Json(input): Json<KasirReportInput>,
) -> Result<Json<KasirReportView>> {
    let view = reports::update_kasir_report(&state.db, &report_id, input).await?;

    log_report(
        &state,
        &headers,
        auth.user_id(),
        ActivityAction::ReportUpdated,
        RelatedType::KasirReport,
        &report_id,
        format!("Updated kasir report {}", view.report.report_date),
    )
    .await;

    Ok(Json(view))
}

async fn delete_kasir(
    State(state): State<AppState>,
    auth: Authorized<ReportsDelete>,
    headers: HeaderMap,
    Path(report_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let deleted = reports::delete_kasir_report(&state.db, &report_id).await?;

    log_report(
        &state,
        &headers,
        auth.user_id(),
        ActivityAction::ReportDeleted,
        RelatedType::KasirReport,
        &report_id,
        format!("Deleted kasir report {}", deleted.report_date),
    )
    .await;

    Ok(Json(serde_json::json!({ "message": "Kasir report deleted successfully" })))
}

// ============================================================================
// Reconciliation
// ============================================================================

async fn reconcile_kasir(
    State(state): State<AppState>,
    _auth: Authorized<ReportsReconcile>,
    Query(params): Query<ReconciliationParams>,
) -> Result<Json<ReconciliationSummary<KasirReconciliation>>> {
    let summary = reports::reconcile_kasir_day(
        &state.db,
        params.report_date,
        params.business_id.as_deref(),
    )
    .await?;
    Ok(Json(summary))
}

async fn reconcile_loket(
    State(state): State<AppState>,
    _auth: Authorized<ReportsReconcile>,
    Query(params): Query<ReconciliationParams>,
) -> Result<Json<ReconciliationSummary<LoketReconciliation>>> {
    let summary = reports::reconcile_loket_day(
        &state.db,
        params.report_date,
        params.business_id.as_deref(),
    )
    .await?;
    Ok(Json(summary))
}

async fn verification_summary(
    State(state): State<AppState>,
    _auth: Authorized<ReportsReconcile>,
    Query(filter): Query<ReportFilter>,
) -> Result<Json<VerificationSummary>> {
    Ok(Json(reports::verification_summary(&state.db, &filter).await?))
}

// ============================================================================
// Drafts
// ============================================================================

/// Pre-fill a loket report from the day's orders; nothing is stored
async fn generate_loket(
    State(state): State<AppState>,
    auth: Authorized<ReportsCreate>,
    Query(params): Query<DraftParams>,
) -> Result<Json<LoketReportDraft>> {
    let draft = reports::draft_loket_report(
        &state.db,
        &params.business_id,
        params.report_date,
        &auth.user().full_name,
    )
    .await?;
    Ok(Json(draft))
}

/// Pre-fill a kasir report from the day's transactions; nothing is stored
async fn generate_kasir(
    State(state): State<AppState>,
    _auth: Authorized<ReportsCreate>,
    Query(params): Query<DraftParams>,
) -> Result<Json<KasirReportDraft>> {
    let draft =
        reports::draft_kasir_report(&state.db, &params.business_id, params.report_date).await?;
    Ok(Json(draft))
}
