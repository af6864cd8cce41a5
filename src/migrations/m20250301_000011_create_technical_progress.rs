//! Migration: Create technical_progress and technical_progress_steps tables
//!
//! One progress record per order, one step row per (record, step name).

use sea_orm_migration::prelude::*;

use super::m20250301_000004_create_orders::Orders;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TechnicalProgress::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TechnicalProgress::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TechnicalProgress::OrderId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(TechnicalProgress::CreatedBy).string().null())
                    .col(
                        ColumnDef::new(TechnicalProgress::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TechnicalProgress::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TechnicalProgress::Table, TechnicalProgress::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TechnicalProgressSteps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TechnicalProgressSteps::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TechnicalProgressSteps::ProgressId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TechnicalProgressSteps::Position)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TechnicalProgressSteps::StepName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TechnicalProgressSteps::StepWeight)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TechnicalProgressSteps::Status)
                            .string()
                            .not_null()
                            .default("not_started"),
                    )
                    .col(ColumnDef::new(TechnicalProgressSteps::Notes).text().null())
                    .col(
                        ColumnDef::new(TechnicalProgressSteps::StartedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TechnicalProgressSteps::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                TechnicalProgressSteps::Table,
                                TechnicalProgressSteps::ProgressId,
                            )
                            .to(TechnicalProgress::Table, TechnicalProgress::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_progress_steps_unique_name")
                    .table(TechnicalProgressSteps::Table)
                    .col(TechnicalProgressSteps::ProgressId)
                    .col(TechnicalProgressSteps::StepName)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(TechnicalProgressSteps::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(TechnicalProgress::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum TechnicalProgress {
    Table,
    Id,
    OrderId,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TechnicalProgressSteps {
    Table,
    Id,
    ProgressId,
    Position,
    StepName,
    StepWeight,
    Status,
    Notes,
    StartedAt,
    CompletedAt,
}
