pub mod accounting;
pub mod activity_logs;
pub mod auth;
pub mod businesses;
pub mod dashboard;
pub mod data;
pub mod extractors;
pub mod financial;
pub mod orders;
pub mod programs;
pub mod reports;
pub mod settings;
pub mod technical_progress;
pub mod teknisi;
pub mod transactions;
pub mod users;

use axum::{middleware as axum_middleware, routing::get, Json, Router};

use crate::config::CONFIG;
use crate::middleware::require_auth;
use crate::state::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/system/version", get(get_version))
        .nest("/api/auth", auth::auth_routes(state.clone()));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .nest("/api", api_routes(state.clone()))
        .layer(axum_middleware::from_fn_with_state(state, require_auth));

    public_routes.merge(protected_routes)
}

/// API routes under /api/* (protected by auth middleware)
fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/auth/me", get(auth::me))
        .nest("/dashboard", dashboard::dashboard_routes(state.clone()))
        .nest("/businesses", businesses::businesses_routes(state.clone()))
        .nest("/orders", orders::orders_routes(state.clone()))
        .nest("/transactions", transactions::transactions_routes(state.clone()))
        .nest("/accounting", accounting::accounting_routes(state.clone()))
        .nest("/financial", financial::financial_routes(state.clone()))
        .nest("/reports", reports::reports_routes(state.clone()))
        .nest("/teknisi", teknisi::teknisi_routes(state.clone()))
        .nest(
            "/technical-progress",
            technical_progress::technical_progress_routes(state.clone()),
        )
        .nest("/loyalty-programs", programs::loyalty_routes(state.clone()))
        .nest("/csr-programs", programs::csr_routes(state.clone()))
        .nest("/users", users::users_routes(state.clone()))
        .nest("/activity-logs", activity_logs::activity_log_routes(state.clone()))
        .nest("/settings", settings::settings_routes(state.clone()))
        .nest("/data", data::data_routes(state))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Version info endpoint
async fn get_version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "version": CONFIG.version,
        "commit_hash": CONFIG.commit_hash,
        "build_time": CONFIG.build_time,
        "backend": "rust"
    }))
}
