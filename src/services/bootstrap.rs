//! First-start provisioning.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

use crate::db::DbConn;
use crate::error::Result;
use crate::models::role;
use crate::models::user;
use crate::services::security::hash_password;

pub const DEFAULT_OWNER_USERNAME: &str = "owner";
pub const DEFAULT_OWNER_EMAIL: &str = "owner@gelis.com";
pub const DEFAULT_OWNER_PASSWORD: &str = "owner123";

/// Create the default owner account when no user exists yet.
///
/// Returns the created account, or `None` when users were already present.
pub async fn ensure_default_owner(db: &DbConn) -> Result<Option<user::Model>> {
    if user::Entity::find().count(db).await? > 0 {
        return Ok(None);
    }

    let now = Utc::now();
    let owner = user::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        username: Set(DEFAULT_OWNER_USERNAME.to_string()),
        email: Set(DEFAULT_OWNER_EMAIL.to_string()),
        full_name: Set("Owner GELIS".to_string()),
        phone: Set(None),
        address: Set(None),
        role_id: Set(role::OWNER),
        is_active: Set(true),
        hashed_password: Set(hash_password(DEFAULT_OWNER_PASSWORD)?),
        last_login: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    tracing::warn!(
        "Created default owner account '{}'; change its password",
        DEFAULT_OWNER_USERNAME
    );
    Ok(Some(owner))
}
