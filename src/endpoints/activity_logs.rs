use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::error::Result;
use crate::middleware::permissions::{ActivityView, Authorized};
use crate::models::activity_log;
use crate::services::activity::{get_activity_logs, ActivityLogQuery};
use crate::state::AppState;

/// Create activity log routes
pub fn activity_log_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_activity_logs))
        .with_state(state)
}

/// List activity logs, newest first
async fn list_activity_logs(
    State(state): State<AppState>,
    _auth: Authorized<ActivityView>,
    Query(query): Query<ActivityLogQuery>,
) -> Result<Json<Vec<activity_log::Model>>> {
    let logs = get_activity_logs(&state.db, query).await?;
    Ok(Json(logs))
}
