//! Migration: Create loket_daily_reports and loket_bank_balances tables

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LoketDailyReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoketDailyReports::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LoketDailyReports::BusinessId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LoketDailyReports::ReportDate).date().not_null())
                    .col(ColumnDef::new(LoketDailyReports::Shift).integer().not_null())
                    .col(
                        ColumnDef::new(LoketDailyReports::NamaPetugas)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoketDailyReports::TotalSetoranShift)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(LoketDailyReports::Notes).text().null())
                    .col(
                        ColumnDef::new(LoketDailyReports::CreatedBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoketDailyReports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoketDailyReports::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_loket_reports_date")
                    .table(LoketDailyReports::Table)
                    .col(LoketDailyReports::BusinessId)
                    .col(LoketDailyReports::ReportDate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LoketBankBalances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoketBankBalances::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LoketBankBalances::ReportId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoketBankBalances::Position)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoketBankBalances::BankName)
                            .string()
                            .not_null(),
                    )
                    .col(money(LoketBankBalances::SaldoAwal))
                    .col(money(LoketBankBalances::SaldoInject))
                    .col(money(LoketBankBalances::DataLunas))
                    .col(money(LoketBankBalances::SetorKasir))
                    .col(money(LoketBankBalances::TransferAmount))
                    .col(money(LoketBankBalances::SisaSetoran))
                    .col(money(LoketBankBalances::SaldoAkhir))
                    .col(
                        ColumnDef::new(LoketBankBalances::ReportedSaldoAkhir)
                            .double()
                            .null(),
                    )
                    .col(money(LoketBankBalances::UangLebih))
                    .foreign_key(
                        ForeignKey::create()
                            .from(LoketBankBalances::Table, LoketBankBalances::ReportId)
                            .to(LoketDailyReports::Table, LoketDailyReports::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(LoketBankBalances::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(LoketDailyReports::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

fn money(col: LoketBankBalances) -> ColumnDef {
    ColumnDef::new(col).double().not_null().default(0.0).to_owned()
}

#[derive(DeriveIden)]
enum LoketDailyReports {
    Table,
    Id,
    BusinessId,
    ReportDate,
    Shift,
    NamaPetugas,
    TotalSetoranShift,
    Notes,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LoketBankBalances {
    Table,
    Id,
    ReportId,
    Position,
    BankName,
    SaldoAwal,
    SaldoInject,
    DataLunas,
    SetorKasir,
    TransferAmount,
    SisaSetoran,
    SaldoAkhir,
    ReportedSaldoAkhir,
    UangLebih,
}
