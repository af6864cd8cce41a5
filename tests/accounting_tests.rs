//! Manual transactions, summaries and period reports.

use axum::http::StatusCode;
use chrono::Utc;

mod common;
use common::{app, create_business, create_order, create_test_state, login_as, send};

use gelis::models::role;

async fn post_transaction(
    state: &gelis::state::AppState,
    token: &str,
    business_id: &str,
    kind: &str,
    category: &str,
    amount: f64,
) -> (StatusCode, serde_json::Value) {
    send(
        app(state),
        "POST",
        "/api/transactions",
        Some(token),
        Some(serde_json::json!({
            "business_id": business_id,
            "transaction_type": kind,
            "category": category,
            "description": "manual entry",
            "amount": amount,
            "payment_method": "cash"
        })),
    )
    .await
}

#[tokio::test]
async fn test_transaction_validation() {
    let state = create_test_state().await;
    let (finance, token) = login_as(&state.db, "finance1", role::FINANCE).await;
    let biz = create_business(&state.db, "Travel Umroh", &finance.id).await;

    let (status, body) = post_transaction(&state, &token, &biz.id, "income", "Tiket", 250000.0).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["transaction_code"].as_str().unwrap().starts_with("TXN"));

    let (status, _) = post_transaction(&state, &token, &biz.id, "refund", "Tiket", 1.0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_transaction(&state, &token, &biz.id, "expense", "Tiket", 0.0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_transaction(&state, &token, "no-such-business", "income", "Tiket", 1.0).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_summary_and_period_report() {
    let state = create_test_state().await;
    let (finance, token) = login_as(&state.db, "finance1", role::FINANCE).await;
    let biz = create_business(&state.db, "Travel Umroh", &finance.id).await;

    post_transaction(&state, &token, &biz.id, "income", "Tiket", 300000.0).await;
    post_transaction(&state, &token, &biz.id, "income", "Paket", 200000.0).await;
    post_transaction(&state, &token, &biz.id, "expense", "Operasional", 120000.0).await;

    let (status, body) = send(
        app(&state),
        "GET",
        &format!("/api/accounting/summary?business_id={}", biz.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_income"], 500000.0);
    assert_eq!(body["total_expense"], 120000.0);
    assert_eq!(body["balance"], 380000.0);
    assert_eq!(body["transaction_count"], 3);
    assert_eq!(body["categories"]["Tiket"]["income"], 300000.0);
    assert_eq!(body["payment_methods"]["cash"]["count"], 3);

    let (status, body) = send(
        app(&state),
        "GET",
        "/api/accounting/period-report?period=monthly",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period_type"], "monthly");
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["period"], Utc::now().format("%Y-%m").to_string());
    assert_eq!(rows[0]["balance"], 380000.0);
}

#[tokio::test]
async fn test_transaction_edit_and_delete_permissions() {
    let state = create_test_state().await;
    let (finance, token) = login_as(&state.db, "finance1", role::FINANCE).await;
    let (_, owner_token) = login_as(&state.db, "owner1", role::OWNER).await;
    let biz = create_business(&state.db, "Travel Umroh", &finance.id).await;

    let (_, created) = post_transaction(&state, &token, &biz.id, "income", "Tiket", 300000.0).await;
    let uri = format!("/api/transactions/{}", created["id"].as_str().unwrap());

    let (status, body) = send(
        app(&state),
        "PUT",
        &uri,
        Some(&token),
        Some(serde_json::json!({ "amount": 350000.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"], 350000.0);

    let (status, _) = send(app(&state), "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(app(&state), "DELETE", &uri, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(app(&state), "GET", "/api/transactions", Some(&token), None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_financial_dashboard() {
    let state = create_test_state().await;
    let (finance, token) = login_as(&state.db, "finance1", role::FINANCE).await;
    let biz = create_business(&state.db, "Travel Umroh", &finance.id).await;

    post_transaction(&state, &token, &biz.id, "income", "Tiket", 400000.0).await;
    post_transaction(&state, &token, &biz.id, "expense", "Operasional", 100000.0).await;
    create_order(&state.db, &biz.id, &finance.id, None).await;

    let today = Utc::now().date_naive();
    let (status, body) = send(
        app(&state),
        "GET",
        &format!(
            "/api/financial/dashboard?business_id={}&start_date={}&end_date={}",
            biz.id, today, today
        ),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"]["start_date"], today.to_string());
    assert_eq!(body["financial_summary"]["net_profit"], 300000.0);
    assert_eq!(body["financial_summary"]["profit_margin"], 75.0);
    assert_eq!(body["income_breakdown"]["Tiket"], 400000.0);
    assert_eq!(body["expense_breakdown"]["Operasional"], 100000.0);
    assert_eq!(body["orders_summary"]["total_orders"], 1);
    assert_eq!(body["orders_summary"]["pending_orders"], 1);
    assert_eq!(body["orders_summary"]["payment_collection_rate"], 0.0);
    assert_eq!(body["transaction_count"]["total"], 2);

    let (_, kasir_token) = login_as(&state.db, "kasir1", role::KASIR).await;
    let (status, _) = send(app(&state), "GET", "/api/financial/dashboard", Some(&kasir_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
