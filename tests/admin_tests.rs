//! Activity trail, settings, dashboard, programs and data reset.

use axum::http::StatusCode;
use sea_orm::{EntityTrait, PaginatorTrait};

mod common;
use common::{app, create_business, create_order, create_test_state, login_as, send};

use gelis::models::prelude::*;
use gelis::models::role;
use gelis::services::activity::{get_activity_logs, ActivityLogQuery};

#[tokio::test]
async fn test_state_changes_are_logged() {
    let state = create_test_state().await;
    let (owner, token) = login_as(&state.db, "owner1", role::OWNER).await;

    let (status, body) = send(
        app(&state),
        "POST",
        "/api/businesses",
        Some(&token),
        Some(serde_json::json!({ "name": "PDAM Kota", "category": "PDAM" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let business_id = body["id"].as_str().unwrap().to_string();

    send(
        app(&state),
        "PUT",
        "/api/settings/company",
        Some(&token),
        Some(serde_json::json!({ "name": "GELIS" })),
    )
    .await;

    let logs = get_activity_logs(
        &state.db,
        ActivityLogQuery {
            user_id: Some(owner.id.clone()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let actions: Vec<&str> = logs.iter().map(|l| l.action.as_str()).collect();
    assert_eq!(actions, vec!["setting_changed", "business_created"]);
    assert_eq!(logs[1].related_id.as_deref(), Some(business_id.as_str()));

    let (status, body) = send(
        app(&state),
        "GET",
        "/api/activity-logs?action=business_created",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["related_type"], "business");
}

#[tokio::test]
async fn test_activity_log_limit_is_clamped() {
    let state = create_test_state().await;
    let (_, token) = login_as(&state.db, "owner1", role::OWNER).await;

    for i in 0..3 {
        send(
            app(&state),
            "PUT",
            &format!("/api/settings/key{}", i),
            Some(&token),
            Some(serde_json::json!({ "v": i })),
        )
        .await;
    }

    let (_, body) = send(app(&state), "GET", "/api/activity-logs?limit=2", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["description"], "Changed setting key2");

    let (_, body) = send(app(&state), "GET", "/api/activity-logs?limit=0", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_settings_round_trip() {
    let state = create_test_state().await;
    let (_, owner_token) = login_as(&state.db, "owner1", role::OWNER).await;
    let (_, kasir_token) = login_as(&state.db, "kasir1", role::KASIR).await;

    let (status, body) = send(app(&state), "GET", "/api/settings/receipt", Some(&kasir_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({}));

    let (status, _) = send(
        app(&state),
        "PUT",
        "/api/settings/receipt",
        Some(&kasir_token),
        Some(serde_json::json!({ "footer": "Terima kasih" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        app(&state),
        "PUT",
        "/api/settings/receipt",
        Some(&owner_token),
        Some(serde_json::json!(["not", "an", "object"])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for footer in ["Terima kasih", "Sampai jumpa"] {
        let (status, _) = send(
            app(&state),
            "PUT",
            "/api/settings/receipt",
            Some(&owner_token),
            Some(serde_json::json!({ "footer": footer })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(app(&state), "GET", "/api/settings/receipt", Some(&kasir_token), None).await;
    assert_eq!(body["footer"], "Sampai jumpa");
    assert_eq!(Setting::find().count(&state.db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_all_settings_and_bulk_update() {
    let state = create_test_state().await;
    let (owner, owner_token) = login_as(&state.db, "owner1", role::OWNER).await;
    let (_, kasir_token) = login_as(&state.db, "kasir1", role::KASIR).await;

    let (status, body) = send(app(&state), "GET", "/api/settings/all", Some(&kasir_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["company_name"], "PT. GELIS Indonesia");
    assert_eq!(body["max_login_attempts"], 5);

    let update = serde_json::json!({
        "section": "company",
        "settings": { "company_name": "PT. GELIS Nusantara", "max_login_attempts": 3 }
    });
    let (status, _) = send(app(&state), "PUT", "/api/settings/bulk", Some(&kasir_token), Some(update.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(app(&state), "PUT", "/api/settings/bulk", Some(&owner_token), Some(update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 2);

    let (_, body) = send(app(&state), "GET", "/api/settings/all", Some(&kasir_token), None).await;
    assert_eq!(body["company_name"], "PT. GELIS Nusantara");
    assert_eq!(body["max_login_attempts"], 3);
    assert_eq!(body["currency"], "IDR");

    let (status, _) = send(
        app(&state),
        "PUT",
        "/api/settings/bulk",
        Some(&owner_token),
        Some(serde_json::json!({ "settings": { "ok_key": 1, "bad key": 2 } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(Setting::find().count(&state.db).await.unwrap(), 2);

    let logs = get_activity_logs(
        &state.db,
        ActivityLogQuery {
            user_id: Some(owner.id.clone()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].description, "Updated company settings");
}

#[tokio::test]
async fn test_dashboard_stats() {
    let state = create_test_state().await;
    let (owner, token) = login_as(&state.db, "owner1", role::OWNER).await;
    let biz = create_business(&state.db, "PLN Cabang", &owner.id).await;
    create_order(&state.db, &biz.id, &owner.id, None).await;

    send(
        app(&state),
        "POST",
        "/api/transactions",
        Some(&token),
        Some(serde_json::json!({
            "business_id": biz.id,
            "transaction_type": "expense",
            "category": "Operasional",
            "amount": 40000.0
        })),
    )
    .await;

    let (status, body) = send(app(&state), "GET", "/api/dashboard/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_businesses"], 1);
    assert_eq!(body["total_orders"], 1);
    assert_eq!(body["pending_orders"], 1);
    assert_eq!(body["active_orders"], 1);
    assert_eq!(body["total_revenue"], 0.0);
    assert_eq!(body["expenses_today"], 40000.0);
    assert_eq!(body["net_today"], -40000.0);
}

#[tokio::test]
async fn test_programs_crud() {
    let state = create_test_state().await;
    let (_, cs_token) = login_as(&state.db, "cs1", role::CUSTOMER_SERVICE).await;
    let (_, manager_token) = login_as(&state.db, "manager1", role::MANAGER).await;

    let (status, body) = send(
        app(&state),
        "POST",
        "/api/loyalty-programs",
        Some(&cs_token),
        Some(serde_json::json!({
            "name": "Poin Pelanggan",
            "start_date": "2025-01-01",
            "end_date": "2025-06-30",
            "target_participants": 100,
            "budget": 5000000.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "planning");
    let id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        app(&state),
        "POST",
        "/api/csr-programs",
        Some(&cs_token),
        Some(serde_json::json!({
            "name": "Bantuan Sekolah",
            "start_date": "2025-06-01",
            "end_date": "2025-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        app(&state),
        "DELETE",
        &format!("/api/loyalty-programs/{}", id),
        Some(&cs_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        app(&state),
        "DELETE",
        &format!("/api/loyalty-programs/{}", id),
        Some(&manager_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(LoyaltyProgram::find().count(&state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_data_reset_keeps_master_data() {
    let state = create_test_state().await;
    let (owner, token) = login_as(&state.db, "owner1", role::OWNER).await;
    let (_, manager_token) = login_as(&state.db, "manager1", role::MANAGER).await;
    let biz = create_business(&state.db, "PLN Cabang", &owner.id).await;
    let order = create_order(&state.db, &biz.id, &owner.id, None).await;

    send(
        app(&state),
        "GET",
        &format!("/api/technical-progress/{}", order.id),
        Some(&token),
        None,
    )
    .await;
    send(
        app(&state),
        "PUT",
        "/api/settings/company",
        Some(&token),
        Some(serde_json::json!({ "name": "GELIS" })),
    )
    .await;

    let (status, _) = send(app(&state), "POST", "/api/data/reset", Some(&manager_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(app(&state), "POST", "/api/data/reset", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orders"], 1);
    assert_eq!(body["technical_progress"], 1);

    assert_eq!(Order::find().count(&state.db).await.unwrap(), 0);
    assert_eq!(TechnicalProgressStep::find().count(&state.db).await.unwrap(), 0);
    assert_eq!(Business::find().count(&state.db).await.unwrap(), 1);
    assert_eq!(User::find().count(&state.db).await.unwrap(), 2);
    assert_eq!(Setting::find().count(&state.db).await.unwrap(), 1);
}
