//! Orders and the payment transactions they record.

use axum::http::StatusCode;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

mod common;
use common::{app, create_business, create_order, create_test_state, login_as, send};

use gelis::models::prelude::*;
use gelis::models::{role, transaction};

#[tokio::test]
async fn test_create_order_with_payment_records_income() {
    let state = create_test_state().await;
    let (owner, token) = login_as(&state.db, "owner1", role::OWNER).await;
    let biz = create_business(&state.db, "PPOB Center", &owner.id).await;

    let (status, body) = send(
        app(&state),
        "POST",
        "/api/orders",
        Some(&token),
        Some(serde_json::json!({
            "business_id": biz.id,
            "customer_name": "Bu Sari",
            "service_type": "Token Listrik",
            "order_details": { "meter": "1234" },
            "total_amount": 200000.0,
            "paid_amount": 50000.0,
            "payment_method": "transfer"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order"]["status"], "pending");
    assert_eq!(body["order"]["payment_status"], "partial");
    assert_eq!(body["order"]["order_details"]["meter"], "1234");
    assert!(body["order"]["order_number"].as_str().unwrap().starts_with("ORD"));
    assert_eq!(body["auto_transaction_created"], true);

    let order_id = body["order"]["id"].as_str().unwrap();
    let payments = Transaction::find()
        .filter(transaction::Column::OrderId.eq(order_id))
        .all(&state.db)
        .await
        .unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount, 50_000.0);
    assert_eq!(payments[0].category, "Order Payment");
    assert_eq!(payments[0].transaction_type, "income");
    assert_eq!(payments[0].payment_method.as_deref(), Some("transfer"));
}

#[tokio::test]
async fn test_unpaid_order_records_nothing() {
    let state = create_test_state().await;
    let (owner, token) = login_as(&state.db, "owner1", role::OWNER).await;
    let biz = create_business(&state.db, "PPOB Center", &owner.id).await;

    let (status, body) = send(
        app(&state),
        "POST",
        "/api/orders",
        Some(&token),
        Some(serde_json::json!({
            "business_id": biz.id,
            "customer_name": "Bu Sari",
            "service_type": "Token Listrik",
            "total_amount": 200000.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order"]["payment_status"], "unpaid");
    assert_eq!(body["auto_transaction_created"], false);
    assert!(Transaction::find().all(&state.db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_payment_increase_records_delta() {
    let state = create_test_state().await;
    let (owner, token) = login_as(&state.db, "owner1", role::OWNER).await;
    let biz = create_business(&state.db, "PLN Cabang", &owner.id).await;
    let order = create_order(&state.db, &biz.id, &owner.id, None).await;
    let uri = format!("/api/orders/{}", order.id);

    let (status, body) = send(
        app(&state),
        "PUT",
        &uri,
        Some(&token),
        Some(serde_json::json!({ "paid_amount": 500000.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["auto_transaction_created"], true);
    assert_eq!(body["transaction"]["amount"], 500000.0);
    assert_eq!(body["order"]["payment_status"], "partial");

    let (_, body) = send(
        app(&state),
        "PUT",
        &uri,
        Some(&token),
        Some(serde_json::json!({ "paid_amount": 1500000.0, "status": "completed" })),
    )
    .await;
    assert_eq!(body["transaction"]["amount"], 1000000.0);
    assert_eq!(body["order"]["payment_status"], "paid");
    assert_eq!(body["order"]["status"], "completed");
    assert!(body["order"]["completion_date"].is_string());

    let (_, body) = send(
        app(&state),
        "PUT",
        &uri,
        Some(&token),
        Some(serde_json::json!({ "paid_amount": 1000000.0 })),
    )
    .await;
    assert_eq!(body["auto_transaction_created"], false);

    let total: f64 = Transaction::find()
        .all(&state.db)
        .await
        .unwrap()
        .iter()
        .map(|t| t.amount)
        .sum();
    assert_eq!(total, 1_500_000.0);
}

#[tokio::test]
async fn test_invalid_status_rejected() {
    let state = create_test_state().await;
    let (owner, token) = login_as(&state.db, "owner1", role::OWNER).await;
    let biz = create_business(&state.db, "PLN Cabang", &owner.id).await;
    let order = create_order(&state.db, &biz.id, &owner.id, None).await;

    let (status, _) = send(
        app(&state),
        "PUT",
        &format!("/api/orders/{}", order.id),
        Some(&token),
        Some(serde_json::json!({ "status": "done" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_teknisi_sees_only_assigned_orders() {
    let state = create_test_state().await;
    let (owner, _) = login_as(&state.db, "owner1", role::OWNER).await;
    let (teknisi, token) = login_as(&state.db, "teknisi1", role::TEKNISI).await;
    let biz = create_business(&state.db, "PLN Cabang", &owner.id).await;
    let mine = create_order(&state.db, &biz.id, &owner.id, Some(&teknisi.id)).await;
    let other = create_order(&state.db, &biz.id, &owner.id, None).await;

    let (status, body) = send(app(&state), "GET", "/api/teknisi/orders", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], mine.id.as_str());

    let (status, _) = send(
        app(&state),
        "PUT",
        &format!("/api/teknisi/orders/{}/status", other.id),
        Some(&token),
        Some(serde_json::json!({ "status": "processing" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        app(&state),
        "PUT",
        &format!("/api/teknisi/orders/{}/status", mine.id),
        Some(&token),
        Some(serde_json::json!({ "status": "processing", "notes": "Kabel sudah ditarik" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "processing");
    assert!(body["notes"].as_str().unwrap().ends_with("teknisi1 tester: Kabel sudah ditarik"));
}
