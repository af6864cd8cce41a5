//! Role based access across the API and user administration rules.

use axum::http::StatusCode;

mod common;
use common::{app, create_test_state, login_as, send};

use gelis::models::role;

#[tokio::test]
async fn test_role_matrix_on_endpoints() {
    let state = create_test_state().await;
    let (_, owner) = login_as(&state.db, "owner1", role::OWNER).await;
    let (_, finance) = login_as(&state.db, "finance1", role::FINANCE).await;
    let (_, teknisi) = login_as(&state.db, "teknisi1", role::TEKNISI).await;
    let (_, cs) = login_as(&state.db, "cs1", role::CUSTOMER_SERVICE).await;

    let cases = [
        ("/api/businesses", &owner, StatusCode::OK),
        ("/api/businesses", &finance, StatusCode::FORBIDDEN),
        ("/api/transactions", &finance, StatusCode::OK),
        ("/api/transactions", &cs, StatusCode::FORBIDDEN),
        ("/api/accounting/summary", &finance, StatusCode::OK),
        ("/api/accounting/summary", &teknisi, StatusCode::FORBIDDEN),
        ("/api/loyalty-programs", &cs, StatusCode::OK),
        ("/api/loyalty-programs", &teknisi, StatusCode::FORBIDDEN),
        ("/api/teknisi/orders", &teknisi, StatusCode::OK),
        ("/api/teknisi/orders", &finance, StatusCode::FORBIDDEN),
        ("/api/users", &owner, StatusCode::OK),
        ("/api/users", &finance, StatusCode::FORBIDDEN),
        ("/api/activity-logs", &finance, StatusCode::FORBIDDEN),
        ("/api/dashboard/stats", &teknisi, StatusCode::OK),
        ("/api/settings/company", &teknisi, StatusCode::OK),
    ];

    for (uri, token, expected) in cases {
        let (status, _) = send(app(&state), "GET", uri, Some(token.as_str()), None).await;
        assert_eq!(status, expected, "GET {}", uri);
    }
}

#[tokio::test]
async fn test_manager_cannot_edit_owner() {
    let state = create_test_state().await;
    let (owner, _) = login_as(&state.db, "owner1", role::OWNER).await;
    let (_, manager_token) = login_as(&state.db, "manager1", role::MANAGER).await;
    let (kasir, _) = login_as(&state.db, "kasir1", role::KASIR).await;

    let (status, _) = send(
        app(&state),
        "PUT",
        &format!("/api/users/{}", owner.id),
        Some(&manager_token),
        Some(serde_json::json!({ "full_name": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        app(&state),
        "PUT",
        &format!("/api/users/{}", kasir.id),
        Some(&manager_token),
        Some(serde_json::json!({ "role_id": role::OWNER })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        app(&state),
        "PUT",
        &format!("/api/users/{}", kasir.id),
        Some(&manager_token),
        Some(serde_json::json!({ "full_name": "Kasir Satu", "role_id": role::LOKET })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["full_name"], "Kasir Satu");
    assert_eq!(body["role_name"], "Loket");
}

#[tokio::test]
async fn test_owner_cannot_delete_self() {
    let state = create_test_state().await;
    let (owner, token) = login_as(&state.db, "owner1", role::OWNER).await;
    let (kasir, _) = login_as(&state.db, "kasir1", role::KASIR).await;

    let (status, _) = send(
        app(&state),
        "DELETE",
        &format!("/api/users/{}", owner.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        app(&state),
        "PUT",
        &format!("/api/users/{}/toggle-active", kasir.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);

    let (status, _) = send(
        app(&state),
        "DELETE",
        &format!("/api/users/{}", kasir.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app(&state), "GET", "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}
