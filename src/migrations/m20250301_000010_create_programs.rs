//! Migration: Create loyalty_programs and csr_programs tables

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LoyaltyPrograms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoyaltyPrograms::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LoyaltyPrograms::Name).string().not_null())
                    .col(ColumnDef::new(LoyaltyPrograms::Description).text().null())
                    .col(ColumnDef::new(LoyaltyPrograms::StartDate).date().null())
                    .col(ColumnDef::new(LoyaltyPrograms::EndDate).date().null())
                    .col(
                        ColumnDef::new(LoyaltyPrograms::TargetParticipants)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LoyaltyPrograms::ActualParticipants)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LoyaltyPrograms::Budget)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(LoyaltyPrograms::ActualCost)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(LoyaltyPrograms::RewardType).string().null())
                    .col(
                        ColumnDef::new(LoyaltyPrograms::Status)
                            .string()
                            .not_null()
                            .default("planning"),
                    )
                    .col(ColumnDef::new(LoyaltyPrograms::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(LoyaltyPrograms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyPrograms::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CsrPrograms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CsrPrograms::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CsrPrograms::Name).string().not_null())
                    .col(ColumnDef::new(CsrPrograms::Description).text().null())
                    .col(ColumnDef::new(CsrPrograms::Category).string().null())
                    .col(ColumnDef::new(CsrPrograms::StartDate).date().null())
                    .col(ColumnDef::new(CsrPrograms::EndDate).date().null())
                    .col(
                        ColumnDef::new(CsrPrograms::TargetBeneficiaries)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CsrPrograms::ActualBeneficiaries)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CsrPrograms::Budget)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(CsrPrograms::ActualCost)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(CsrPrograms::Status)
                            .string()
                            .not_null()
                            .default("planning"),
                    )
                    .col(ColumnDef::new(CsrPrograms::ImpactReport).text().null())
                    .col(ColumnDef::new(CsrPrograms::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(CsrPrograms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CsrPrograms::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CsrPrograms::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(LoyaltyPrograms::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum LoyaltyPrograms {
    Table,
    Id,
    Name,
    Description,
    StartDate,
    EndDate,
    TargetParticipants,
    ActualParticipants,
    Budget,
    ActualCost,
    RewardType,
    Status,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CsrPrograms {
    Table,
    Id,
    Name,
    Description,
    Category,
    StartDate,
    EndDate,
    TargetBeneficiaries,
    ActualBeneficiaries,
    Budget,
    ActualCost,
    Status,
    ImpactReport,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
