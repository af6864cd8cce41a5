use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // Seed the fixed roles
        seed_roles(db).await
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        // Seeding is not reversible - data may have been modified
        Ok(())
    }
}

async fn seed_roles(db: &SchemaManagerConnection<'_>) -> Result<(), DbErr> {
    use crate::models::role;

    if role::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    let now = chrono::Utc::now();
    for (id, name, description) in role::DEFAULT_ROLES {
        role::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            description: Set(Some(description.to_string())),
            created_at: Set(now),
        }
        .insert(db)
        .await?;
    }

    Ok(())
}
