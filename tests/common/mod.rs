//! Test helpers shared by the integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use tower::util::ServiceExt; // for `oneshot`

use gelis::endpoints::create_router;
use gelis::migrations::Migrator;
use gelis::models::{business, order, user};
use gelis::services::security::create_access_token;
use gelis::state::AppState;

/// Create an in-memory SQLite database with all migrations applied
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

pub async fn create_test_state() -> AppState {
    AppState::new(create_test_db().await)
}

pub fn app(state: &AppState) -> Router {
    create_router(state.clone())
}

/// Create an active user with a role; passwords are hashed with a low cost
pub async fn create_user_with_role(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    role_id: i32,
) -> user::Model {
    let now = Utc::now();
    user::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        username: Set(username.to_string()),
        email: Set(format!("{}@example.com", username)),
        full_name: Set(format!("{} tester", username)),
        phone: Set(None),
        address: Set(None),
        role_id: Set(role_id),
        is_active: Set(true),
        hashed_password: Set(bcrypt::hash(password, 4).unwrap()),
        last_login: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to create test user")
}

pub fn token_for(user: &user::Model) -> String {
    create_access_token(&user.id, user.role_id).expect("Failed to create token")
}

/// Create a user and return it with a bearer token
pub async fn login_as(db: &DatabaseConnection, username: &str, role_id: i32) -> (user::Model, String) {
    let user = create_user_with_role(db, username, "password123", role_id).await;
    let token = token_for(&user);
    (user, token)
}

pub async fn create_business(db: &DatabaseConnection, name: &str, created_by: &str) -> business::Model {
    let now = Utc::now();
    business::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        name: Set(name.to_string()),
        category: Set("PLN_Installation".to_string()),
        description: Set(None),
        address: Set(None),
        phone: Set(None),
        email: Set(None),
        settings: Set("{}".to_string()),
        is_active: Set(true),
        created_by: Set(created_by.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to create test business")
}

pub async fn create_order(
    db: &DatabaseConnection,
    business_id: &str,
    created_by: &str,
    assigned_to: Option<&str>,
) -> order::Model {
    let now = Utc::now();
    order::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        order_number: Set(format!("ORD-TEST-{}", uuid::Uuid::new_v4().simple())),
        business_id: Set(business_id.to_string()),
        customer_name: Set("Pak Slamet".to_string()),
        customer_phone: Set(None),
        customer_email: Set(None),
        service_type: Set("Pasang Baru".to_string()),
        order_details: Set("{}".to_string()),
        total_amount: Set(1_500_000.0),
        paid_amount: Set(0.0),
        payment_method: Set(None),
        status: Set("pending".to_string()),
        payment_status: Set("unpaid".to_string()),
        assigned_to: Set(assigned_to.map(String::from)),
        requires_technician: Set(true),
        notes: Set(None),
        completion_date: Set(None),
        created_by: Set(created_by.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to create test order")
}

/// Send a request through the router and decode the JSON body
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).to_string())
        })
    };

    (status, json)
}
