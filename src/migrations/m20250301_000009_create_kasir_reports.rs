//! Migration: Create kasir_daily_reports table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(KasirDailyReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(KasirDailyReports::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(KasirDailyReports::BusinessId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(KasirDailyReports::ReportDate).date().not_null())
                    .col(money(KasirDailyReports::SetoranPagi))
                    .col(money(KasirDailyReports::SetoranSiang))
                    .col(money(KasirDailyReports::SetoranSore))
                    .col(money(KasirDailyReports::SetoranDepositLoketLuar))
                    .col(money(KasirDailyReports::SetoranPelunasanPagi))
                    .col(money(KasirDailyReports::SetoranPelunasanSiang))
                    .col(
                        ColumnDef::new(KasirDailyReports::TopupTransactions)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(money(KasirDailyReports::PenerimaanKasKecil))
                    .col(money(KasirDailyReports::PenguranganKasKecil))
                    .col(money(KasirDailyReports::BelanjaLoket))
                    .col(money(KasirDailyReports::TotalAdmin))
                    .col(money(KasirDailyReports::SaldoBank))
                    .col(money(KasirDailyReports::SaldoBrankas))
                    .col(ColumnDef::new(KasirDailyReports::Notes).text().null())
                    .col(
                        ColumnDef::new(KasirDailyReports::CreatedBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(KasirDailyReports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(KasirDailyReports::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_kasir_reports_date")
                    .table(KasirDailyReports::Table)
                    .col(KasirDailyReports::BusinessId)
                    .col(KasirDailyReports::ReportDate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(KasirDailyReports::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

fn money(col: KasirDailyReports) -> ColumnDef {
    ColumnDef::new(col).double().not_null().default(0.0).to_owned()
}

#[derive(DeriveIden)]
enum KasirDailyReports {
    Table,
    Id,
    BusinessId,
    ReportDate,
    SetoranPagi,
    SetoranSiang,
    SetoranSore,
    SetoranDepositLoketLuar,
    SetoranPelunasanPagi,
    SetoranPelunasanSiang,
    TopupTransactions,
    PenerimaanKasKecil,
    PenguranganKasKecil,
    BelanjaLoket,
    TotalAdmin,
    SaldoBank,
    SaldoBrankas,
    Notes,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
