//! Technical progress: lazy creation, weighted updates and order status sync.

use axum::http::StatusCode;
use sea_orm::{EntityTrait, PaginatorTrait};

mod common;
use common::{app, create_business, create_order, create_test_state, login_as, send};

use gelis::error::AppError;
use gelis::models::prelude::*;
use gelis::models::role;
use gelis::services::progress::{StepKind, StepStatus, StepUpdate};
use gelis::services::technical_progress::{get_or_create, update_step};

fn update(step_name: &str, status: StepStatus) -> StepUpdate {
    StepUpdate {
        step_name: step_name.to_string(),
        status,
        notes: None,
    }
}

#[tokio::test]
async fn test_get_or_create_is_idempotent() {
    let state = create_test_state().await;
    let (owner, _) = login_as(&state.db, "owner1", role::OWNER).await;
    let biz = create_business(&state.db, "PLN Cabang", &owner.id).await;
    let order = create_order(&state.db, &biz.id, &owner.id, None).await;

    let first = get_or_create(&state.db, &order.id, Some(&owner.id)).await.unwrap();
    let second = get_or_create(&state.db, &order.id, None).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.steps.len(), 5);
    assert_eq!(second.overall_progress, 0.0);
    let kinds: Vec<StepKind> = second.steps.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, StepKind::ALL.to_vec());

    assert_eq!(TechnicalProgress::find().count(&state.db).await.unwrap(), 1);
    assert_eq!(TechnicalProgressStep::find().count(&state.db).await.unwrap(), 5);
}

#[tokio::test]
async fn test_get_or_create_unknown_order() {
    let state = create_test_state().await;
    let result = get_or_create(&state.db, "missing-order", None).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(TechnicalProgress::find().count(&state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_step_accumulates_weights() {
    let state = create_test_state().await;
    let (owner, _) = login_as(&state.db, "owner1", role::OWNER).await;
    let biz = create_business(&state.db, "PLN Cabang", &owner.id).await;
    let order = create_order(&state.db, &biz.id, &owner.id, None).await;

    update_step(&state.db, &order.id, update("Survey Teknis", StepStatus::Completed), &owner.id)
        .await
        .unwrap();
    update_step(&state.db, &order.id, update("installation", StepStatus::Completed), &owner.id)
        .await
        .unwrap();
    let outcome = update_step(
        &state.db,
        &order.id,
        update("Pemeriksaan NIDI/SLO", StepStatus::InProgress),
        &owner.id,
    )
    .await
    .unwrap();
    assert_eq!(outcome.progress.overall_progress, 80.0);

    let outcome = update_step(
        &state.db,
        &order.id,
        update("Pemasangan KWH Meter", StepStatus::Completed),
        &owner.id,
    )
    .await
    .unwrap();
    assert_eq!(outcome.progress.overall_progress, 82.0);
    assert_eq!(outcome.step.kind, StepKind::KwhMeter);
    assert!(outcome.step.completed_at.is_some());

    let reloaded = get_or_create(&state.db, &order.id, None).await.unwrap();
    assert_eq!(reloaded.overall_progress, 82.0);
}

#[tokio::test]
async fn test_unknown_step_changes_nothing() {
    let state = create_test_state().await;
    let (owner, _) = login_as(&state.db, "owner1", role::OWNER).await;
    let biz = create_business(&state.db, "PLN Cabang", &owner.id).await;
    let order = create_order(&state.db, &biz.id, &owner.id, None).await;

    update_step(&state.db, &order.id, update("Survey Teknis", StepStatus::Completed), &owner.id)
        .await
        .unwrap();

    let result = update_step(
        &state.db,
        &order.id,
        update("Pengecatan", StepStatus::Completed),
        &owner.id,
    )
    .await;
    assert!(matches!(result, Err(AppError::Progress(_))));

    let record = get_or_create(&state.db, &order.id, None).await.unwrap();
    assert_eq!(record.overall_progress, 50.0);
}

#[tokio::test]
async fn test_order_status_follows_progress() {
    let state = create_test_state().await;
    let (owner, _) = login_as(&state.db, "owner1", role::OWNER).await;
    let biz = create_business(&state.db, "PLN Cabang", &owner.id).await;
    let order = create_order(&state.db, &biz.id, &owner.id, None).await;

    let outcome = update_step(&state.db, &order.id, update("survey", StepStatus::InProgress), &owner.id)
        .await
        .unwrap();
    assert_eq!(outcome.order_status.map(|s| s.to_string()).as_deref(), Some("processing"));

    for kind in StepKind::ALL {
        update_step(&state.db, &order.id, update(kind.key(), StepStatus::Completed), &owner.id)
            .await
            .unwrap();
    }

    let stored = Order::find_by_id(order.id.as_str()).one(&state.db).await.unwrap().unwrap();
    assert_eq!(stored.status, "completed");
    assert!(stored.completion_date.is_some());
}

#[tokio::test]
async fn test_progress_endpoints() {
    let state = create_test_state().await;
    let (teknisi, token) = login_as(&state.db, "teknisi1", role::TEKNISI).await;
    let (owner, _) = login_as(&state.db, "owner1", role::OWNER).await;
    let biz = create_business(&state.db, "PLN Cabang", &owner.id).await;
    let order = create_order(&state.db, &biz.id, &owner.id, Some(&teknisi.id)).await;

    let uri = format!("/api/technical-progress/{}", order.id);
    let (status, body) = send(app(&state), "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["steps"].as_array().unwrap().len(), 5);
    assert_eq!(body["steps"][0]["step_name"], "Survey Teknis");
    assert_eq!(body["steps"][0]["step_weight"], 50);

    let (status, body) = send(
        app(&state),
        "PUT",
        &format!("{}/step", uri),
        Some(&token),
        Some(serde_json::json!({ "step_name": "Survey Teknis", "status": "completed", "notes": "ok" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress"]["overall_progress"], 50.0);
    assert_eq!(body["order_status"], "processing");

    let (status, body) = send(
        app(&state),
        "PUT",
        &format!("{}/step", uri),
        Some(&token),
        Some(serde_json::json!({ "step_name": "Unknown", "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("Unknown"));

    let (status, _) = send(app(&state), "GET", "/api/technical-progress/nope", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_finance_cannot_update_progress() {
    let state = create_test_state().await;
    let (finance, token) = login_as(&state.db, "finance1", role::FINANCE).await;
    let biz = create_business(&state.db, "PLN Cabang", &finance.id).await;
    let order = create_order(&state.db, &biz.id, &finance.id, None).await;

    let (status, _) = send(
        app(&state),
        "PUT",
        &format!("/api/technical-progress/{}/step", order.id),
        Some(&token),
        Some(serde_json::json!({ "step_name": "survey", "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_teknisi_limited_to_assigned_orders() {
    let state = create_test_state().await;
    let (teknisi1, token1) = login_as(&state.db, "teknisi1", role::TEKNISI).await;
    let (teknisi2, token2) = login_as(&state.db, "teknisi2", role::TEKNISI).await;
    let (owner, owner_token) = login_as(&state.db, "owner1", role::OWNER).await;
    let biz = create_business(&state.db, "PLN Cabang", &owner.id).await;
    let order = create_order(&state.db, &biz.id, &owner.id, Some(&teknisi2.id)).await;
    let uri = format!("/api/technical-progress/{}", order.id);
    let step = serde_json::json!({ "step_name": "Survey Teknis", "status": "completed" });

    let (status, _) = send(app(&state), "PUT", &format!("{}/step", uri), Some(&token1), Some(step.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(app(&state), "GET", &uri, Some(&token1), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Nothing was created or moved by the rejected calls
    assert_eq!(TechnicalProgress::find().count(&state.db).await.unwrap(), 0);
    let stored = Order::find_by_id(order.id.as_str()).one(&state.db).await.unwrap().unwrap();
    assert_eq!(stored.status, "pending");
    assert_ne!(stored.assigned_to.as_deref(), Some(teknisi1.id.as_str()));

    let (status, _) = send(app(&state), "PUT", &format!("{}/step", uri), Some(&token2), Some(step.clone())).await;
    assert_eq!(status, StatusCode::OK);

    // Managers and owners are not bound to assignments
    let (status, _) = send(app(&state), "PUT", &format!("{}/step", uri), Some(&owner_token), Some(step)).await;
    assert_eq!(status, StatusCode::OK);
}
