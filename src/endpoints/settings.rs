use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::endpoints::extractors::client_ip;
use crate::error::{AppError, Result};
use crate::middleware::permissions::{Authorized, SettingsManage, SettingsView};
use crate::models::activity_log::{ActivityAction, RelatedType};
use crate::models::prelude::*;
use crate::models::setting;
use crate::services::NewActivity;
use crate::state::AppState;

/// Create settings routes
pub fn settings_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_settings))
        .route("/all", get(all_settings))
        .route("/bulk", put(bulk_update))
        .route("/{key}", get(get_setting).put(update_setting))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct SettingResponse {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_by: Option<String>,
    pub updated_at: Option<chrono::DateTime<Utc>>,
}

impl From<setting::Model> for SettingResponse {
    fn from(model: setting::Model) -> Self {
        Self {
            value: decode_value(&model.value),
            key: model.key,
            updated_by: model.updated_by,
            updated_at: Some(model.updated_at),
        }
    }
}

/// Values reported by `/all` for keys that were never saved
fn default_settings() -> serde_json::Map<String, serde_json::Value> {
    let defaults = json!({
        "company_name": "PT. GELIS Indonesia",
        "company_address": "Jl. Contoh No. 123, Jakarta Selatan",
        "company_phone": "021-12345678",
        "company_email": "info@gelis.com",
        "company_website": "https://gelis.com",
        "timezone": "Asia/Jakarta",
        "language": "id",
        "currency": "IDR",
        "date_format": "DD/MM/YYYY",
        "time_format": "24h",
        "email_notifications": true,
        "whatsapp_notifications": false,
        "push_notifications": true,
        "data_retention_days": 365,
        "auto_backup": false,
        "backup_frequency": "daily",
        "session_timeout": 43200,
        "password_expiry_days": 90,
        "max_login_attempts": 5,
        "two_factor_auth": false,
    });
    match defaults {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

fn decode_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::json!({}))
}

fn check_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key.len() <= 100
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid setting key '{}'", key)))
    }
}

/// Insert or overwrite one stored setting
async fn upsert_setting<C: ConnectionTrait>(
    db: &C,
    key: &str,
    value: &serde_json::Value,
    user_id: &str,
) -> Result<setting::Model> {
    let now = Utc::now();
    let encoded = serde_json::to_string(value)?;
    let saved = match Setting::find_by_id(key).one(db).await? {
        Some(existing) => {
            let mut active = existing.into_active_model();
            active.value = Set(encoded);
            active.updated_by = Set(Some(user_id.to_string()));
            active.updated_at = Set(now);
            active.update(db).await?
        }
        None => {
            setting::ActiveModel {
                key: Set(key.to_string()),
                value: Set(encoded),
                updated_by: Set(Some(user_id.to_string())),
                updated_at: Set(now),
            }
            .insert(db)
            .await?
        }
    };
    Ok(saved)
}

async fn list_settings(
    State(state): State<AppState>,
    _auth: Authorized<SettingsView>,
) -> Result<Json<Vec<SettingResponse>>> {
    let settings = Setting::find()
        .order_by_asc(setting::Column::Key)
        .all(&state.db)
        .await?;
    Ok(Json(settings.into_iter().map(SettingResponse::from).collect()))
}

/// A missing key reads as an empty object
async fn get_setting(
    State(state): State<AppState>,
    _auth: Authorized<SettingsView>,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let found = Setting::find_by_id(key).one(&state.db).await?;
    Ok(Json(match found {
        Some(model) => decode_value(&model.value),
        None => serde_json::json!({}),
    }))
}

async fn update_setting(
    State(state): State<AppState>,
    auth: Authorized<SettingsManage>,
    headers: HeaderMap,
    Path(key): Path<String>,
    Json(value): Json<serde_json::Value>,
) -> Result<Json<SettingResponse>> {
    check_key(&key)?;
    if !value.is_object() {
        return Err(AppError::BadRequest(
            "Setting value must be a JSON object".to_string(),
        ));
    }

    let saved = upsert_setting(&state.db, &key, &value, auth.user_id()).await?;

    state
        .activity
        .record(
            NewActivity::new(ActivityAction::SettingChanged, format!("Changed setting {}", key))
                .by(auth.user_id())
                .related(RelatedType::Setting, key.as_str())
                .ip(client_ip(&headers)),
        )
        .await;

    Ok(Json(saved.into()))
}

/// Every stored setting keyed by name, with defaults for missing keys
async fn all_settings(
    State(state): State<AppState>,
    _auth: Authorized<SettingsView>,
) -> Result<Json<serde_json::Map<String, serde_json::Value>>> {
    let mut settings = default_settings();
    for model in Setting::find().all(&state.db).await? {
        let value = decode_value(&model.value);
        settings.insert(model.key, value);
    }
    Ok(Json(settings))
}

#[derive(Debug, Deserialize)]
pub struct BulkSettingsRequest {
    pub settings: serde_json::Map<String, serde_json::Value>,
    pub section: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BulkSettingsResponse {
    pub message: String,
    pub updated: usize,
}

/// Save several settings at once; values may be any JSON
async fn bulk_update(
    State(state): State<AppState>,
    auth: Authorized<SettingsManage>,
    headers: HeaderMap,
    Json(request): Json<BulkSettingsRequest>,
) -> Result<Json<BulkSettingsResponse>> {
    for key in request.settings.keys() {
        check_key(key)?;
    }

    let txn = state.db.begin().await?;
    for (key, value) in &request.settings {
        upsert_setting(&txn, key, value, auth.user_id()).await?;
    }
    txn.commit().await?;

    let section = request.section.unwrap_or_else(|| "all".to_string());
    let keys: Vec<&String> = request.settings.keys().collect();
    state
        .activity
        .record(
            NewActivity::new(
                ActivityAction::SettingChanged,
                format!("Updated {} settings", section),
            )
            .by(auth.user_id())
            .metadata(json!({ "section": section, "keys": keys }))
            .ip(client_ip(&headers)),
        )
        .await;

    Ok(Json(BulkSettingsResponse {
        message: "Settings saved".to_string(),
        updated: request.settings.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_key() {
        assert!(check_key("company_profile").is_ok());
        assert!(check_key("ui.theme").is_ok());
        assert!(check_key("").is_err());
        assert!(check_key("bad key").is_err());
    }

    #[test]
    fn test_default_settings() {
        let defaults = default_settings();
        assert_eq!(defaults["currency"], "IDR");
        assert_eq!(defaults["session_timeout"], 43200);
        assert!(defaults.keys().all(|key| check_key(key).is_ok()));
    }
}
