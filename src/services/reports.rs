//! Daily cash reports of the loket (counter) shifts and the kasir (cashier),
//! and their reconciliation against recorded transactions.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::DbConn;
use crate::error::{AppError, Result};
use crate::models::order::{self, PaymentStatus};
use crate::models::transaction::{self, TransactionType};
use crate::models::{business, kasir_report, loket_bank_balance, loket_report};
use crate::services::accounting::{
    self, day_start, round2, NewTransaction, CATEGORY_ADMIN_FEE, CATEGORY_BELANJA,
    CATEGORY_SETORAN_KASIR, CATEGORY_SETORAN_LOKET,
};

/// Allowed gap between reported and recorded deposit totals
pub const SETORAN_TOLERANCE: f64 = 1000.0;
/// Allowed gap for admin fees, shop expenses and bank balances
pub const DETAIL_TOLERANCE: f64 = 100.0;

// ---------------------------------------------------------------------------
// Loket
// ---------------------------------------------------------------------------

/// Per-bank figures entered by the teller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct BankBalanceInput {
    #[validate(length(min = 1, message = "bank name is required"))]
    pub bank_name: String,
    pub saldo_awal: f64,
    pub saldo_inject: f64,
    pub data_lunas: f64,
    pub setor_kasir: f64,
    pub transfer_amount: f64,
    pub uang_lebih: f64,
    /// Closing balance as counted by the teller
    pub saldo_akhir: Option<f64>,
}

impl BankBalanceInput {
    /// Settled payments still owed to the cashier
    pub fn sisa_setoran(&self) -> f64 {
        self.data_lunas - self.setor_kasir - self.transfer_amount
    }

    /// Closing bank balance implied by the other figures
    pub fn calculated_saldo_akhir(&self) -> f64 {
        calculated_saldo_akhir(self.saldo_awal, self.saldo_inject, self.data_lunas)
    }
}

pub fn calculated_saldo_akhir(saldo_awal: f64, saldo_inject: f64, data_lunas: f64) -> f64 {
    saldo_awal + saldo_inject - data_lunas
}

/// Sum of money figures; empty input yields `0.0`, not `-0.0`
fn total(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().fold(0.0, |acc, v| acc + v)
}

/// Shift total: the sum of what each bank still owes
pub fn total_setoran_shift(banks: &[BankBalanceInput]) -> f64 {
    total(banks.iter().map(BankBalanceInput::sisa_setoran))
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoketReportInput {
    #[validate(length(min = 1, message = "business is required"))]
    pub business_id: String,
    pub report_date: NaiveDate,
    #[validate(range(min = 1, max = 3, message = "shift must be 1, 2 or 3"))]
    pub shift: i32,
    #[validate(length(min = 1, message = "officer name is required"))]
    pub nama_petugas: String,
    #[serde(default)]
    #[validate(nested)]
    pub bank_balances: Vec<BankBalanceInput>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoketReportView {
    #[serde(flatten)]
    pub report: loket_report::Model,
    pub bank_balances: Vec<loket_bank_balance::Model>,
}

/// Filters for daily report listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportFilter {
    pub business_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

fn loket_reference(report_date: NaiveDate, shift: i32) -> String {
    format!("LOKET-{}-SHIFT{}", report_date, shift)
}

fn kasir_reference(report_date: NaiveDate) -> String {
    format!("KASIR-{}", report_date)
}

async fn insert_bank_rows<C: ConnectionTrait>(
    db: &C,
    report_id: &str,
    banks: &[BankBalanceInput],
) -> Result<Vec<loket_bank_balance::Model>> {
    let mut rows = Vec::with_capacity(banks.len());
    for (position, bank) in banks.iter().enumerate() {
        let row = loket_bank_balance::ActiveModel {
            report_id: Set(report_id.to_string()),
            position: Set(position as i32),
            bank_name: Set(bank.bank_name.trim().to_string()),
            saldo_awal: Set(bank.saldo_awal),
            saldo_inject: Set(bank.saldo_inject),
            data_lunas: Set(bank.data_lunas),
            setor_kasir: Set(bank.setor_kasir),
            transfer_amount: Set(bank.transfer_amount),
            sisa_setoran: Set(bank.sisa_setoran()),
            saldo_akhir: Set(bank.calculated_saldo_akhir()),
            reported_saldo_akhir: Set(bank.saldo_akhir),
            uang_lebih: Set(bank.uang_lebih),
            ..Default::default()
        }
        .insert(db)
        .await?;
        rows.push(row);
    }
    Ok(rows)
}

async fn bank_rows<C: ConnectionTrait>(
    db: &C,
    report_id: &str,
) -> Result<Vec<loket_bank_balance::Model>> {
    Ok(loket_bank_balance::Entity::find()
        .filter(loket_bank_balance::Column::ReportId.eq(report_id))
        .order_by_asc(loket_bank_balance::Column::Position)
        .all(db)
        .await?)
}

/// Store a loket report; a positive shift total is booked as income
pub async fn create_loket_report(
    db: &DbConn,
    input: LoketReportInput,
    user_id: &str,
) -> Result<(LoketReportView, Option<transaction::Model>)> {
    input.validate()?;

    let now = Utc::now();
    let total = total_setoran_shift(&input.bank_balances);
    let txn = db.begin().await?;

    let report = loket_report::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        business_id: Set(input.business_id.clone()),
        report_date: Set(input.report_date),
        shift: Set(input.shift),
        nama_petugas: Set(input.nama_petugas.clone()),
        total_setoran_shift: Set(total),
        notes: Set(input.notes.clone()),
        created_by: Set(user_id.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let bank_balances = insert_bank_rows(&txn, &report.id, &input.bank_balances).await?;

    let income = accounting::record_if_positive(
        &txn,
        NewTransaction::income(
            &input.business_id,
            CATEGORY_SETORAN_LOKET,
            format!(
                "Setoran harian loket shift {} - {}",
                input.shift, input.nama_petugas
            ),
            total,
            user_id,
        )
        .reference(loket_reference(input.report_date, input.shift)),
    )
    .await?;

    txn.commit().await?;

    Ok((
        LoketReportView {
            report,
            bank_balances,
        },
        income,
    ))
}

/// Replace the figures of a loket report; bank rows are rewritten
pub async fn update_loket_report(
    db: &DbConn,
    id: &str,
    input: LoketReportInput,
) -> Result<LoketReportView> {
    input.validate()?;

    let existing = loket_report::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Loket report not found".to_string()))?;

    let txn = db.begin().await?;

    loket_bank_balance::Entity::delete_many()
        .filter(loket_bank_balance::Column::ReportId.eq(id))
        .exec(&txn)
        .await?;

    let mut active = existing.into_active_model();
    active.business_id = Set(input.business_id);
    active.report_date = Set(input.report_date);
    active.shift = Set(input.shift);
    active.nama_petugas = Set(input.nama_petugas);
    active.total_setoran_shift = Set(total_setoran_shift(&input.bank_balances));
    active.notes = Set(input.notes);
    active.updated_at = Set(Utc::now());
    let report = active.update(&txn).await?;

    let bank_balances = insert_bank_rows(&txn, id, &input.bank_balances).await?;

    txn.commit().await?;

    Ok(LoketReportView {
        report,
        bank_balances,
    })
}

pub async fn delete_loket_report(db: &DbConn, id: &str) -> Result<loket_report::Model> {
    let report = loket_report::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Loket report not found".to_string()))?;

    let txn = db.begin().await?;
    loket_bank_balance::Entity::delete_many()
        .filter(loket_bank_balance::Column::ReportId.eq(id))
        .exec(&txn)
        .await?;
    report.clone().delete(&txn).await?;
    txn.commit().await?;

    Ok(report)
}

/// Loket reports, newest report date first
pub async fn list_loket_reports(db: &DbConn, filter: &ReportFilter) -> Result<Vec<LoketReportView>> {
    let mut select = loket_report::Entity::find();
    if let Some(business_id) = &filter.business_id {
        select = select.filter(loket_report::Column::BusinessId.eq(business_id.as_str()));
    }
    if let Some(start) = filter.start_date {
        select = select.filter(loket_report::Column::ReportDate.gte(start));
    }
    if let Some(end) = filter.end_date {
        select = select.filter(loket_report::Column::ReportDate.lte(end));
    }

    let reports = select
        .order_by_desc(loket_report::Column::ReportDate)
        .order_by_asc(loket_report::Column::Shift)
        .all(db)
        .await?;

    let mut views = Vec::with_capacity(reports.len());
    for report in reports {
        let bank_balances = bank_rows(db, &report.id).await?;
        views.push(LoketReportView {
            report,
            bank_balances,
        });
    }
    Ok(views)
}

// ---------------------------------------------------------------------------
// Kasir
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopupEntry {
    pub amount: f64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct KasirReportInput {
    #[validate(length(min = 1, message = "business is required"))]
    pub business_id: String,
    pub report_date: NaiveDate,
    pub setoran_pagi: f64,
    pub setoran_siang: f64,
    pub setoran_sore: f64,
    pub setoran_deposit_loket_luar: f64,
    pub setoran_pelunasan_pagi: f64,
    pub setoran_pelunasan_siang: f64,
    pub topup_transactions: Vec<TopupEntry>,
    pub penerimaan_kas_kecil: f64,
    pub pengurangan_kas_kecil: f64,
    pub belanja_loket: f64,
    pub total_admin: f64,
    pub saldo_bank: f64,
    pub saldo_brankas: f64,
    pub notes: Option<String>,
}

impl Default for KasirReportInput {
    fn default() -> Self {
        Self {
            business_id: String::new(),
            report_date: Utc::now().date_naive(),
            setoran_pagi: 0.0,
            setoran_siang: 0.0,
            setoran_sore: 0.0,
            setoran_deposit_loket_luar: 0.0,
            setoran_pelunasan_pagi: 0.0,
            setoran_pelunasan_siang: 0.0,
            topup_transactions: Vec::new(),
            penerimaan_kas_kecil: 0.0,
            pengurangan_kas_kecil: 0.0,
            belanja_loket: 0.0,
            total_admin: 0.0,
            saldo_bank: 0.0,
            saldo_brankas: 0.0,
            notes: None,
        }
    }
}

/// Derived cashier figures
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct KasirTotals {
    pub total_setoran: f64,
    pub total_topup: f64,
    pub total_kas_kecil: f64,
}

impl KasirTotals {
    pub fn compute(
        setoran: [f64; 3],
        topups: &[TopupEntry],
        penerimaan_kas_kecil: f64,
        pengurangan_kas_kecil: f64,
        belanja_loket: f64,
    ) -> Self {
        Self {
            total_setoran: total(setoran),
            total_topup: total(topups.iter().map(|t| t.amount)),
            total_kas_kecil: penerimaan_kas_kecil - pengurangan_kas_kecil - belanja_loket,
        }
    }

    fn of_input(input: &KasirReportInput) -> Self {
        Self::compute(
            [input.setoran_pagi, input.setoran_siang, input.setoran_sore],
            &input.topup_transactions,
            input.penerimaan_kas_kecil,
            input.pengurangan_kas_kecil,
            input.belanja_loket,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KasirReportView {
    #[serde(flatten)]
    pub report: kasir_report::Model,
    pub topup_transactions: Vec<TopupEntry>,
    #[serde(flatten)]
    pub totals: KasirTotals,
}

impl KasirReportView {
    pub fn from_model(report: kasir_report::Model) -> Result<Self> {
        let topup_transactions: Vec<TopupEntry> = serde_json::from_str(&report.topup_transactions)
            .map_err(|e| AppError::Internal(format!("Corrupt topup list on report {}: {}", report.id, e)))?;
        let totals = KasirTotals::compute(
            [report.setoran_pagi, report.setoran_siang, report.setoran_sore],
            &topup_transactions,
            report.penerimaan_kas_kecil,
            report.pengurangan_kas_kecil,
            report.belanja_loket,
        );
        Ok(Self {
            report,
            topup_transactions,
            totals,
        })
    }
}

fn apply_kasir_input(active: &mut kasir_report::ActiveModel, input: &KasirReportInput) -> Result<()> {
    active.business_id = Set(input.business_id.clone());
    active.report_date = Set(input.report_date);
    active.setoran_pagi = Set(input.setoran_pagi);
    active.setoran_siang = Set(input.setoran_siang);
    active.setoran_sore = Set(input.setoran_sore);
    active.setoran_deposit_loket_luar = Set(input.setoran_deposit_loket_luar);
    active.setoran_pelunasan_pagi = Set(input.setoran_pelunasan_pagi);
    active.setoran_pelunasan_siang = Set(input.setoran_pelunasan_siang);
    active.topup_transactions = Set(serde_json::to_string(&input.topup_transactions)?);
    active.penerimaan_kas_kecil = Set(input.penerimaan_kas_kecil);
    active.pengurangan_kas_kecil = Set(input.pengurangan_kas_kecil);
    active.belanja_loket = Set(input.belanja_loket);
    active.total_admin = Set(input.total_admin);
    active.saldo_bank = Set(input.saldo_bank);
    active.saldo_brankas = Set(input.saldo_brankas);
    active.notes = Set(input.notes.clone());
    Ok(())
}

/// Store a kasir report and book its deposits, shop expenses and admin fees
pub async fn create_kasir_report(
    db: &DbConn,
    input: KasirReportInput,
    user_id: &str,
) -> Result<(KasirReportView, Vec<transaction::Model>)> {
    input.validate()?;

    let now = Utc::now();
    let totals = KasirTotals::of_input(&input);
    let reference = kasir_reference(input.report_date);

    let mut active = kasir_report::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        created_by: Set(user_id.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    apply_kasir_input(&mut active, &input)?;

    let txn = db.begin().await?;
    let report = active.insert(&txn).await?;

    let entries = [
        NewTransaction::income(
            &input.business_id,
            CATEGORY_SETORAN_KASIR,
            format!(
                "Total setoran harian kasir (Pagi: {}, Siang: {}, Sore: {})",
                input.setoran_pagi, input.setoran_siang, input.setoran_sore
            ),
            totals.total_setoran,
            user_id,
        )
        .reference(reference.clone()),
        NewTransaction::expense(
            &input.business_id,
            CATEGORY_BELANJA,
            "Belanja loket harian",
            input.belanja_loket,
            user_id,
        )
        .reference(format!("{}-BELANJA", reference)),
        NewTransaction::income(
            &input.business_id,
            CATEGORY_ADMIN_FEE,
            "Penerimaan admin harian",
            input.total_admin,
            user_id,
        )
        .reference(format!("{}-ADMIN", reference)),
    ];

    let mut booked = Vec::new();
    for entry in entries {
        if let Some(model) = accounting::record_if_positive(&txn, entry).await? {
            booked.push(model);
        }
    }

    txn.commit().await?;

    Ok((KasirReportView::from_model(report)?, booked))
}

pub async fn update_kasir_report(
    db: &DbConn,
    id: &str,
    input: KasirReportInput,
) -> Result<KasirReportView> {
    input.validate()?;

    let existing = kasir_report::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Kasir report not found".to_string()))?;

    let mut active = existing.into_active_model();
    apply_kasir_input(&mut active, &input)?;
    active.updated_at = Set(Utc::now());
    let report = active.update(db).await?;

    KasirReportView::from_model(report)
}

pub async fn delete_kasir_report(db: &DbConn, id: &str) -> Result<kasir_report::Model> {
    let report = kasir_report::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Kasir report not found".to_string()))?;
    report.clone().delete(db).await?;
    Ok(report)
}

pub async fn list_kasir_reports(db: &DbConn, filter: &ReportFilter) -> Result<Vec<KasirReportView>> {
    let mut select = kasir_report::Entity::find();
    if let Some(business_id) = &filter.business_id {
        select = select.filter(kasir_report::Column::BusinessId.eq(business_id.as_str()));
    }
    if let Some(start) = filter.start_date {
        select = select.filter(kasir_report::Column::ReportDate.gte(start));
    }
    if let Some(end) = filter.end_date {
        select = select.filter(kasir_report::Column::ReportDate.lte(end));
    }

    select
        .order_by_desc(kasir_report::Column::ReportDate)
        .all(db)
        .await?
        .into_iter()
        .map(KasirReportView::from_model)
        .collect()
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconciliationStatus {
    Matched,
    Discrepancy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineCheck {
    pub reported: f64,
    pub actual: f64,
    pub difference: f64,
}

impl LineCheck {
    fn new(reported: f64, actual: f64) -> Self {
        Self {
            reported,
            actual,
            difference: reported - actual,
        }
    }

    fn exceeds(&self, tolerance: f64) -> bool {
        self.difference.abs() > tolerance
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Discrepancy {
    pub category: String,
    pub reported: f64,
    pub actual: f64,
    pub difference: f64,
    /// Difference relative to the reported figure, in percent
    pub percentage: f64,
}

impl Discrepancy {
    fn from_check(category: &str, check: &LineCheck) -> Self {
        let percentage = if check.reported > 0.0 {
            round2(check.difference / check.reported * 100.0)
        } else {
            0.0
        };
        Self {
            category: category.to_string(),
            reported: check.reported,
            actual: check.actual,
            difference: check.difference,
            percentage,
        }
    }
}

/// Recorded figures of one business day, by category
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KasirActuals {
    pub income: f64,
    pub setoran_kasir: f64,
    pub admin_fee: f64,
    pub belanja: f64,
}

impl KasirActuals {
    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a transaction::Model>) -> Self {
        let mut actuals = Self::default();
        for txn in transactions {
            if txn.transaction_type == "income" {
                actuals.income += txn.amount;
            }
            match txn.category.as_str() {
                CATEGORY_SETORAN_KASIR => actuals.setoran_kasir += txn.amount,
                CATEGORY_ADMIN_FEE => actuals.admin_fee += txn.amount,
                CATEGORY_BELANJA => actuals.belanja += txn.amount,
                _ => {}
            }
        }
        actuals
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KasirBreakdown {
    pub setoran_kasir: LineCheck,
    pub admin_fee: LineCheck,
    pub belanja_loket: LineCheck,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KasirReconciliation {
    pub report_id: String,
    pub report_date: NaiveDate,
    pub business_id: String,
    pub status: ReconciliationStatus,
    pub reported_total: f64,
    pub actual_total: f64,
    pub total_difference: f64,
    pub breakdown: KasirBreakdown,
    pub discrepancies: Vec<Discrepancy>,
    pub requires_investigation: bool,
    pub created_by: String,
    pub notes: Option<String>,
}

/// Compare one kasir report with the day's recorded transactions
pub fn reconcile_kasir(report: &kasir_report::Model, actuals: &KasirActuals) -> KasirReconciliation {
    let reported_setoran = report.setoran_pagi + report.setoran_siang + report.setoran_sore;
    let breakdown = KasirBreakdown {
        setoran_kasir: LineCheck::new(reported_setoran, actuals.setoran_kasir),
        admin_fee: LineCheck::new(report.total_admin, actuals.admin_fee),
        belanja_loket: LineCheck::new(report.belanja_loket, actuals.belanja),
    };

    let mut discrepancies = Vec::new();
    if breakdown.setoran_kasir.exceeds(SETORAN_TOLERANCE) {
        discrepancies.push(Discrepancy::from_check(
            CATEGORY_SETORAN_KASIR,
            &breakdown.setoran_kasir,
        ));
    }
    if breakdown.admin_fee.exceeds(DETAIL_TOLERANCE) {
        discrepancies.push(Discrepancy::from_check(
            CATEGORY_ADMIN_FEE,
            &breakdown.admin_fee,
        ));
    }
    if breakdown.belanja_loket.exceeds(DETAIL_TOLERANCE) {
        discrepancies.push(Discrepancy::from_check(
            CATEGORY_BELANJA,
            &breakdown.belanja_loket,
        ));
    }

    let has_discrepancy = !discrepancies.is_empty();
    let reported_total = reported_setoran + report.total_admin - report.belanja_loket;
    let actual_total = actuals.income - actuals.belanja;

    KasirReconciliation {
        report_id: report.id.clone(),
        report_date: report.report_date,
        business_id: report.business_id.clone(),
        status: if has_discrepancy {
            ReconciliationStatus::Discrepancy
        } else {
            ReconciliationStatus::Matched
        },
        reported_total: round2(reported_total),
        actual_total: round2(actual_total),
        total_difference: round2(reported_total - actual_total),
        breakdown,
        discrepancies,
        requires_investigation: has_discrepancy,
        created_by: report.created_by.clone(),
        notes: report.notes.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankCheck {
    pub bank_name: String,
    pub reported_saldo_akhir: f64,
    pub calculated_saldo_akhir: f64,
    pub is_balanced: bool,
    pub difference: f64,
    pub sisa_setoran: f64,
}

impl BankCheck {
    /// Compare the teller's closing balance with the calculated one; a bank
    /// without a counted balance is checked against the calculation alone.
    pub fn of(bank: &loket_bank_balance::Model) -> Self {
        let calculated = calculated_saldo_akhir(bank.saldo_awal, bank.saldo_inject, bank.data_lunas);
        let reported = bank.reported_saldo_akhir.unwrap_or(bank.saldo_akhir);
        let difference = reported - calculated;
        Self {
            bank_name: bank.bank_name.clone(),
            reported_saldo_akhir: reported,
            calculated_saldo_akhir: calculated,
            is_balanced: difference.abs() < DETAIL_TOLERANCE,
            difference,
            sisa_setoran: bank.sisa_setoran,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoketReconciliation {
    pub report_id: String,
    pub report_date: NaiveDate,
    pub business_id: String,
    pub shift: i32,
    pub nama_petugas: String,
    pub status: ReconciliationStatus,
    pub reported_total_setoran: f64,
    pub actual_total_setoran: f64,
    pub difference: f64,
    pub bank_balances: Vec<BankCheck>,
    pub all_banks_balanced: bool,
    pub requires_investigation: bool,
    pub notes: Option<String>,
}

/// Compare one loket shift report with the deposits recorded for that shift
pub fn reconcile_loket(
    report: &loket_report::Model,
    banks: &[loket_bank_balance::Model],
    actual_total_setoran: f64,
) -> LoketReconciliation {
    let bank_balances: Vec<BankCheck> = banks.iter().map(BankCheck::of).collect();
    let all_banks_balanced = bank_balances.iter().all(|b| b.is_balanced);
    let difference = report.total_setoran_shift - actual_total_setoran;
    let has_discrepancy = difference.abs() > SETORAN_TOLERANCE || !all_banks_balanced;

    LoketReconciliation {
        report_id: report.id.clone(),
        report_date: report.report_date,
        business_id: report.business_id.clone(),
        shift: report.shift,
        nama_petugas: report.nama_petugas.clone(),
        status: if has_discrepancy {
            ReconciliationStatus::Discrepancy
        } else {
            ReconciliationStatus::Matched
        },
        reported_total_setoran: report.total_setoran_shift,
        actual_total_setoran,
        difference,
        bank_balances,
        all_banks_balanced,
        requires_investigation: has_discrepancy,
        notes: report.notes.clone(),
    }
}

pub trait HasStatus {
    fn status(&self) -> ReconciliationStatus;
}

impl HasStatus for KasirReconciliation {
    fn status(&self) -> ReconciliationStatus {
        self.status
    }
}

impl HasStatus for LoketReconciliation {
    fn status(&self) -> ReconciliationStatus {
        self.status
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationSummary<T> {
    pub reconciliation_date: NaiveDate,
    pub total_reports: usize,
    pub matched_reports: usize,
    pub discrepancy_reports: usize,
    pub reports: Vec<T>,
}

impl<T: HasStatus> ReconciliationSummary<T> {
    pub fn new(reconciliation_date: NaiveDate, reports: Vec<T>) -> Self {
        let matched_reports = reports
            .iter()
            .filter(|r| r.status() == ReconciliationStatus::Matched)
            .count();
        Self {
            reconciliation_date,
            total_reports: reports.len(),
            matched_reports,
            discrepancy_reports: reports.len() - matched_reports,
            reports,
        }
    }
}

/// Transactions booked under one of the given references
async fn transactions_by_reference<C: ConnectionTrait>(
    db: &C,
    references: Vec<String>,
    business_id: Option<&str>,
) -> Result<Vec<transaction::Model>> {
    if references.is_empty() {
        return Ok(Vec::new());
    }
    let mut select =
        transaction::Entity::find().filter(transaction::Column::ReferenceNumber.is_in(references));
    if let Some(business_id) = business_id {
        select = select.filter(transaction::Column::BusinessId.eq(business_id));
    }
    Ok(select.all(db).await?)
}

/// Order payments recorded on a calendar day
async fn order_payments_of_day<C: ConnectionTrait>(
    db: &C,
    date: NaiveDate,
    business_id: Option<&str>,
) -> Result<Vec<transaction::Model>> {
    let start = day_start(date);
    let mut select = transaction::Entity::find()
        .filter(transaction::Column::CreatedAt.gte(start))
        .filter(transaction::Column::CreatedAt.lt(start + Duration::days(1)))
        .filter(transaction::Column::Category.eq(accounting::CATEGORY_ORDER_PAYMENT));
    if let Some(business_id) = business_id {
        select = select.filter(transaction::Column::BusinessId.eq(business_id));
    }
    Ok(select.all(db).await?)
}

/// Reconcile every kasir report of a day.
///
/// Deposits, admin fees and shop expenses are matched through the references
/// booked with the report, so a report filed days later still finds them.
/// Order payments count towards the day's income by their booking time.
pub async fn reconcile_kasir_day(
    db: &DbConn,
    report_date: NaiveDate,
    business_id: Option<&str>,
) -> Result<ReconciliationSummary<KasirReconciliation>> {
    let mut select = kasir_report::Entity::find().filter(kasir_report::Column::ReportDate.eq(report_date));
    if let Some(business_id) = business_id {
        select = select.filter(kasir_report::Column::BusinessId.eq(business_id));
    }
    let reports = select.all(db).await?;
    if reports.is_empty() {
        return Err(AppError::NotFound(format!(
            "No kasir report for {}",
            report_date
        )));
    }

    let reference = kasir_reference(report_date);
    let mut transactions = transactions_by_reference(
        db,
        vec![
            reference.clone(),
            format!("{}-BELANJA", reference),
            format!("{}-ADMIN", reference),
        ],
        business_id,
    )
    .await?;
    transactions.extend(order_payments_of_day(db, report_date, business_id).await?);

    let results = reports
        .iter()
        .map(|report| {
            let actuals = KasirActuals::from_transactions(
                transactions
                    .iter()
                    .filter(|t| t.business_id == report.business_id),
            );
            reconcile_kasir(report, &actuals)
        })
        .collect();

    Ok(ReconciliationSummary::new(report_date, results))
}

/// Reconcile every loket shift report of a day against the deposit booked
/// under its `LOKET-<date>-SHIFT<n>` reference
pub async fn reconcile_loket_day(
    db: &DbConn,
    report_date: NaiveDate,
    business_id: Option<&str>,
) -> Result<ReconciliationSummary<LoketReconciliation>> {
    let mut select = loket_report::Entity::find().filter(loket_report::Column::ReportDate.eq(report_date));
    if let Some(business_id) = business_id {
        select = select.filter(loket_report::Column::BusinessId.eq(business_id));
    }
    let reports = select
        .order_by_asc(loket_report::Column::Shift)
        .all(db)
        .await?;
    if reports.is_empty() {
        return Err(AppError::NotFound(format!(
            "No loket report for {}",
            report_date
        )));
    }

    let references = reports
        .iter()
        .map(|r| loket_reference(r.report_date, r.shift))
        .collect();
    let transactions = transactions_by_reference(db, references, business_id).await?;

    let mut results = Vec::with_capacity(reports.len());
    for report in &reports {
        let reference = loket_reference(report.report_date, report.shift);
        let actual = total(
            transactions
                .iter()
                .filter(|t| t.business_id == report.business_id)
                .filter(|t| t.category == CATEGORY_SETORAN_LOKET)
                .filter(|t| t.reference_number.as_deref() == Some(reference.as_str()))
                .map(|t| t.amount),
        );
        let banks = bank_rows(db, &report.id).await?;
        results.push(reconcile_loket(report, &banks, actual));
    }

    Ok(ReconciliationSummary::new(report_date, results))
}

// ---------------------------------------------------------------------------
// Period verification
// ---------------------------------------------------------------------------

/// Allowed gap between all reported and recorded deposits of a period
pub const VERIFICATION_TOLERANCE: f64 = 10_000.0;
const DEFAULT_VERIFICATION_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VerificationPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationTotals {
    pub total_kasir_reports: usize,
    pub total_loket_reports: usize,
    pub kasir_total_reported: f64,
    pub loket_total_reported: f64,
    pub kasir_total_recorded: f64,
    pub loket_total_recorded: f64,
    pub actual_total_transactions: f64,
    pub overall_difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationStatus {
    pub requires_investigation: bool,
    pub tolerance_threshold: f64,
    /// 100 minus the overall gap relative to the recorded deposits
    pub accuracy_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationSummary {
    pub period: VerificationPeriod,
    pub summary: VerificationTotals,
    pub verification_status: VerificationStatus,
    pub recommendations: Vec<String>,
}

/// Share of `recorded` by which `reported` misses it
fn gap_ratio(reported: f64, recorded: f64) -> f64 {
    if recorded > 0.0 {
        (reported - recorded).abs() / recorded
    } else if reported.abs() > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Deposits of one category booked under a `(business, reference)` pair
fn recorded_deposits(
    transactions: &[transaction::Model],
    category: &str,
    keys: &HashSet<(String, String)>,
) -> f64 {
    total(
        transactions
            .iter()
            .filter(|t| t.category == category)
            .filter(|t| match &t.reference_number {
                Some(reference) => keys.contains(&(t.business_id.clone(), reference.clone())),
                None => false,
            })
            .map(|t| t.amount),
    )
}

/// Compare a period's reported deposits with the deposits booked under the
/// reports' own references
pub fn verify_period(
    period: VerificationPeriod,
    kasir_reports: &[kasir_report::Model],
    loket_reports: &[loket_report::Model],
    transactions: &[transaction::Model],
) -> VerificationSummary {
    let kasir_keys: HashSet<(String, String)> = kasir_reports
        .iter()
        .map(|r| (r.business_id.clone(), kasir_reference(r.report_date)))
        .collect();
    let loket_keys: HashSet<(String, String)> = loket_reports
        .iter()
        .map(|r| (r.business_id.clone(), loket_reference(r.report_date, r.shift)))
        .collect();

    let kasir_total_reported = total(
        kasir_reports
            .iter()
            .map(|r| r.setoran_pagi + r.setoran_siang + r.setoran_sore),
    );
    let loket_total_reported = total(loket_reports.iter().map(|r| r.total_setoran_shift));
    let kasir_total_recorded = recorded_deposits(transactions, CATEGORY_SETORAN_KASIR, &kasir_keys);
    let loket_total_recorded = recorded_deposits(transactions, CATEGORY_SETORAN_LOKET, &loket_keys);

    let actual_total = kasir_total_recorded + loket_total_recorded;
    let overall_difference = kasir_total_reported + loket_total_reported - actual_total;
    let requires_investigation = overall_difference.abs() > VERIFICATION_TOLERANCE;
    let accuracy_rate = if actual_total > 0.0 {
        round2((1.0 - overall_difference.abs() / actual_total) * 100.0)
    } else {
        100.0
    };

    let mut recommendations = Vec::new();
    recommendations.push(if requires_investigation {
        "Run the daily reconciliation for every date in the period".to_string()
    } else {
        "Figures are accurate, no investigation needed".to_string()
    });
    recommendations.push(if gap_ratio(kasir_total_reported, kasir_total_recorded) > 0.01 {
        "Check kasir reports with a gap above 1%".to_string()
    } else {
        "Kasir reports match their deposits".to_string()
    });
    recommendations.push(if loket_reports.is_empty() {
        "No loket reports in the period".to_string()
    } else {
        "Verify the bank balances of the loket reports".to_string()
    });

    VerificationSummary {
        period,
        summary: VerificationTotals {
            total_kasir_reports: kasir_reports.len(),
            total_loket_reports: loket_reports.len(),
            kasir_total_reported: round2(kasir_total_reported),
            loket_total_reported: round2(loket_total_reported),
            kasir_total_recorded: round2(kasir_total_recorded),
            loket_total_recorded: round2(loket_total_recorded),
            actual_total_transactions: round2(actual_total),
            overall_difference: round2(overall_difference),
        },
        verification_status: VerificationStatus {
            requires_investigation,
            tolerance_threshold: VERIFICATION_TOLERANCE,
            accuracy_rate,
        },
        recommendations,
    }
}

/// Verification over a report-date window; defaults to the last seven days
pub async fn verification_summary(db: &DbConn, filter: &ReportFilter) -> Result<VerificationSummary> {
    let end_date = filter.end_date.unwrap_or_else(|| Utc::now().date_naive());
    let start_date = filter
        .start_date
        .unwrap_or(end_date - Duration::days(DEFAULT_VERIFICATION_DAYS));
    if end_date < start_date {
        return Err(AppError::BadRequest(
            "end_date must not be before start_date".to_string(),
        ));
    }
    let window = ReportFilter {
        business_id: filter.business_id.clone(),
        start_date: Some(start_date),
        end_date: Some(end_date),
    };

    let kasir_reports: Vec<kasir_report::Model> = list_kasir_reports(db, &window)
        .await?
        .into_iter()
        .map(|view| view.report)
        .collect();
    let loket_reports: Vec<loket_report::Model> = list_loket_reports(db, &window)
        .await?
        .into_iter()
        .map(|view| view.report)
        .collect();

    let mut references: Vec<String> = kasir_reports
        .iter()
        .map(|r| kasir_reference(r.report_date))
        .chain(loket_reports.iter().map(|r| loket_reference(r.report_date, r.shift)))
        .collect();
    references.sort();
    references.dedup();
    let transactions =
        transactions_by_reference(db, references, filter.business_id.as_deref()).await?;

    Ok(verify_period(
        VerificationPeriod {
            start_date,
            end_date,
        },
        &kasir_reports,
        &loket_reports,
        &transactions,
    ))
}

// ---------------------------------------------------------------------------
// Report drafts
// ---------------------------------------------------------------------------

/// Banks offered when a business has no `banks` setting
pub const DEFAULT_BANKS: [&str; 2] = ["BRIS", "MANDIRI"];

/// A loket report pre-filled from the day's orders; it can be posted back as is
#[derive(Debug, Clone, Serialize)]
pub struct LoketReportDraft {
    #[serde(flatten)]
    pub report: LoketReportInput,
    pub total_setoran_shift: f64,
    pub source_orders: usize,
}

/// A kasir report pre-filled from the day's transactions
#[derive(Debug, Clone, Serialize)]
pub struct KasirReportDraft {
    #[serde(flatten)]
    pub report: KasirReportInput,
    #[serde(flatten)]
    pub totals: KasirTotals,
    pub source_transactions: usize,
}

/// Bank names from a business's settings, falling back to [`DEFAULT_BANKS`]
pub fn business_banks(settings: &str) -> Vec<String> {
    let configured: Vec<String> = serde_json::from_str::<serde_json::Value>(settings)
        .ok()
        .and_then(|value| value.get("banks").and_then(|b| b.as_array()).cloned())
        .unwrap_or_default()
        .iter()
        .filter_map(|b| b.as_str())
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(String::from)
        .collect();

    if configured.is_empty() {
        DEFAULT_BANKS.iter().map(|b| b.to_string()).collect()
    } else {
        configured
    }
}

/// Split the day's settled order payments evenly over the business's banks
pub fn loket_draft_from_orders(
    business: &business::Model,
    report_date: NaiveDate,
    nama_petugas: &str,
    orders: &[order::Model],
) -> LoketReportDraft {
    let paid = PaymentStatus::Paid.to_string();
    let total_lunas = total(
        orders
            .iter()
            .filter(|o| o.payment_status == paid)
            .map(|o| o.paid_amount),
    );
    let banks = business_banks(&business.settings);
    let per_bank = round2(total_lunas / banks.len() as f64);

    let bank_balances: Vec<BankBalanceInput> = banks
        .into_iter()
        .map(|bank_name| BankBalanceInput {
            bank_name,
            data_lunas: per_bank,
            ..Default::default()
        })
        .collect();

    LoketReportDraft {
        total_setoran_shift: total_setoran_shift(&bank_balances),
        report: LoketReportInput {
            business_id: business.id.clone(),
            report_date,
            shift: 1,
            nama_petugas: nama_petugas.to_string(),
            bank_balances,
            notes: Some(format!("Generated from {} orders", orders.len())),
        },
        source_orders: orders.len(),
    }
}

/// Estimate the cashier figures from the day's transactions.
///
/// Income is spread over the three deposits (40/35/25), transfers become
/// top-ups, expenses split 10/90 between petty cash and shop expenses, and
/// admin fees are 2% of income. Entries booked by daily reports are skipped.
pub fn kasir_draft_from_transactions(
    business_id: &str,
    report_date: NaiveDate,
    transactions: &[transaction::Model],
) -> KasirReportDraft {
    let source: Vec<&transaction::Model> = transactions
        .iter()
        .filter(|t| !REPORT_CATEGORIES.contains(&t.category.as_str()))
        .collect();
    let sum_of = |kind: TransactionType| {
        total(
            source
                .iter()
                .filter(|t| t.transaction_type == kind.as_str())
                .map(|t| t.amount),
        )
    };
    let income = sum_of(TransactionType::Income);
    let expenses = sum_of(TransactionType::Expense);
    let topup_transactions = source
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Transfer.as_str())
        .map(|t| TopupEntry {
            amount: t.amount,
            description: t.description.clone(),
        })
        .collect();

    let report = KasirReportInput {
        business_id: business_id.to_string(),
        report_date,
        setoran_pagi: round2(income * 0.40),
        setoran_siang: round2(income * 0.35),
        setoran_sore: round2(income * 0.25),
        topup_transactions,
        pengurangan_kas_kecil: round2(expenses * 0.10),
        belanja_loket: round2(expenses * 0.90),
        total_admin: round2(income * 0.02),
        notes: Some(format!("Generated from {} transactions", source.len())),
        ..Default::default()
    };

    KasirReportDraft {
        totals: KasirTotals::of_input(&report),
        report,
        source_transactions: source.len(),
    }
}

/// Categories booked by daily reports themselves
const REPORT_CATEGORIES: [&str; 4] = [
    CATEGORY_SETORAN_KASIR,
    CATEGORY_SETORAN_LOKET,
    CATEGORY_ADMIN_FEE,
    CATEGORY_BELANJA,
];

async fn find_business(db: &DbConn, business_id: &str) -> Result<business::Model> {
    business::Entity::find_by_id(business_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Business not found".to_string()))
}

pub async fn draft_loket_report(
    db: &DbConn,
    business_id: &str,
    report_date: NaiveDate,
    nama_petugas: &str,
) -> Result<LoketReportDraft> {
    let business = find_business(db, business_id).await?;
    let start = day_start(report_date);
    let orders = order::Entity::find()
        .filter(order::Column::BusinessId.eq(business_id))
        .filter(order::Column::CreatedAt.gte(start))
        .filter(order::Column::CreatedAt.lt(start + Duration::days(1)))
        .all(db)
        .await?;

    Ok(loket_draft_from_orders(&business, report_date, nama_petugas, &orders))
}

pub async fn draft_kasir_report(
    db: &DbConn,
    business_id: &str,
    report_date: NaiveDate,
) -> Result<KasirReportDraft> {
    find_business(db, business_id).await?;
    let start = day_start(report_date);
    let transactions = transaction::Entity::find()
        .filter(transaction::Column::BusinessId.eq(business_id))
        .filter(transaction::Column::CreatedAt.gte(start))
        .filter(transaction::Column::CreatedAt.lt(start + Duration::days(1)))
        .all(db)
        .await?;

    Ok(kasir_draft_from_transactions(business_id, report_date, &transactions))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank(data_lunas: f64, setor_kasir: f64, transfer_amount: f64) -> BankBalanceInput {
        BankBalanceInput {
            bank_name: "BRI".to_string(),
            saldo_awal: 1_000_000.0,
            saldo_inject: 500_000.0,
            data_lunas,
            setor_kasir,
            transfer_amount,
            uang_lebih: 0.0,
            saldo_akhir: None,
        }
    }

    fn kasir_model(pagi: f64, admin: f64, belanja: f64) -> kasir_report::Model {
        let now = Utc::now();
        kasir_report::Model {
            id: "k1".to_string(),
            business_id: "biz".to_string(),
            report_date: now.date_naive(),
            setoran_pagi: pagi,
            setoran_siang: 0.0,
            setoran_sore: 0.0,
            setoran_deposit_loket_luar: 0.0,
            setoran_pelunasan_pagi: 0.0,
            setoran_pelunasan_siang: 0.0,
            topup_transactions: "[]".to_string(),
            penerimaan_kas_kecil: 0.0,
            pengurangan_kas_kecil: 0.0,
            belanja_loket: belanja,
            total_admin: admin,
            saldo_bank: 0.0,
            saldo_brankas: 0.0,
            notes: None,
            created_by: "u".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_bank_formulas() {
        let b = bank(300_000.0, 200_000.0, 50_000.0);
        assert_eq!(b.sisa_setoran(), 50_000.0);
        assert_eq!(b.calculated_saldo_akhir(), 1_200_000.0);
    }

    #[test]
    fn test_total_setoran_shift_sums_banks() {
        let banks = vec![bank(300_000.0, 200_000.0, 50_000.0), bank(100_000.0, 0.0, 0.0)];
        assert_eq!(total_setoran_shift(&banks), 150_000.0);
        assert_eq!(total_setoran_shift(&[]), 0.0);
    }

    #[test]
    fn test_kasir_totals() {
        let topups = vec![
            TopupEntry {
                amount: 25_000.0,
                description: "Dana".to_string(),
            },
            TopupEntry {
                amount: 10_000.0,
                description: "OVO".to_string(),
            },
        ];
        let totals = KasirTotals::compute([100.0, 200.0, 300.0], &topups, 500.0, 100.0, 50.0);
        assert_eq!(totals.total_setoran, 600.0);
        assert_eq!(totals.total_topup, 35_000.0);
        assert_eq!(totals.total_kas_kecil, 350.0);
    }

    #[test]
    fn test_kasir_reconciliation_matched_within_tolerance() {
        let report = kasir_model(100_000.0, 5_000.0, 2_000.0);
        let actuals = KasirActuals {
            income: 104_500.0,
            setoran_kasir: 99_500.0,
            admin_fee: 4_950.0,
            belanja: 2_000.0,
        };

        let result = reconcile_kasir(&report, &actuals);

        assert_eq!(result.status, ReconciliationStatus::Matched);
        assert!(result.discrepancies.is_empty());
        assert_eq!(result.breakdown.setoran_kasir.difference, 500.0);
    }

    #[test]
    fn test_kasir_reconciliation_flags_admin_gap() {
        let report = kasir_model(100_000.0, 5_000.0, 0.0);
        let actuals = KasirActuals {
            income: 104_000.0,
            setoran_kasir: 100_000.0,
            admin_fee: 4_000.0,
            belanja: 0.0,
        };

        let result = reconcile_kasir(&report, &actuals);

        assert_eq!(result.status, ReconciliationStatus::Discrepancy);
        assert!(result.requires_investigation);
        assert_eq!(result.discrepancies.len(), 1);
        assert_eq!(result.discrepancies[0].category, CATEGORY_ADMIN_FEE);
        assert_eq!(result.discrepancies[0].percentage, 20.0);
    }

    fn bank_row(b: &BankBalanceInput) -> loket_bank_balance::Model {
        loket_bank_balance::Model {
            id: 1,
            report_id: "r".to_string(),
            position: 0,
            bank_name: b.bank_name.clone(),
            saldo_awal: b.saldo_awal,
            saldo_inject: b.saldo_inject,
            data_lunas: b.data_lunas,
            setor_kasir: b.setor_kasir,
            transfer_amount: b.transfer_amount,
            sisa_setoran: b.sisa_setoran(),
            saldo_akhir: b.calculated_saldo_akhir(),
            reported_saldo_akhir: b.saldo_akhir,
            uang_lebih: 0.0,
        }
    }

    #[test]
    fn test_bank_check_compares_counted_balance() {
        let mut b = bank(300_000.0, 0.0, 0.0);
        b.saldo_akhir = Some(b.calculated_saldo_akhir() + 150.0);

        let check = BankCheck::of(&bank_row(&b));
        assert!(!check.is_balanced);
        assert_eq!(check.reported_saldo_akhir, 1_200_150.0);
        assert_eq!(check.calculated_saldo_akhir, 1_200_000.0);
        assert_eq!(check.difference, 150.0);

        b.saldo_akhir = Some(1_200_050.0);
        assert!(BankCheck::of(&bank_row(&b)).is_balanced);
    }

    #[test]
    fn test_bank_check_without_counted_balance() {
        let check = BankCheck::of(&bank_row(&bank(300_000.0, 0.0, 0.0)));
        assert!(check.is_balanced);
        assert_eq!(check.reported_saldo_akhir, 1_200_000.0);
    }

    #[test]
    fn test_unbalanced_bank_marks_loket_discrepancy() {
        let mut b = bank(300_000.0, 0.0, 0.0);
        b.saldo_akhir = Some(9_999_999.0);
        let now = Utc::now();
        let report = loket_report::Model {
            id: "l1".to_string(),
            business_id: "biz".to_string(),
            report_date: now.date_naive(),
            shift: 1,
            nama_petugas: "Rina".to_string(),
            total_setoran_shift: 300_000.0,
            notes: None,
            created_by: "u".to_string(),
            created_at: now,
            updated_at: now,
        };

        let result = reconcile_loket(&report, &[bank_row(&b)], 300_000.0);
        assert_eq!(result.status, ReconciliationStatus::Discrepancy);
        assert!(!result.all_banks_balanced);
        assert_eq!(result.difference, 0.0);
    }

    #[test]
    fn test_empty_totals_are_positive_zero() {
        assert!(total_setoran_shift(&[]).is_sign_positive());
        let totals = KasirTotals::compute([0.0; 3], &[], 0.0, 0.0, 0.0);
        assert!(totals.total_topup.is_sign_positive());
    }

    fn booked(category: &str, kind: &str, amount: f64, reference: Option<&str>) -> transaction::Model {
        transaction::Model {
            id: uuid::Uuid::new_v4().to_string(),
            transaction_code: "TXN1".to_string(),
            business_id: "biz".to_string(),
            transaction_type: kind.to_string(),
            category: category.to_string(),
            description: "entry".to_string(),
            amount,
            payment_method: None,
            reference_number: reference.map(String::from),
            order_id: None,
            created_by: "u".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_verify_period_matches_booked_deposits() {
        let report = kasir_model(100_000.0, 0.0, 0.0);
        let reference = kasir_reference(report.report_date);
        let period = VerificationPeriod {
            start_date: report.report_date,
            end_date: report.report_date,
        };
        let transactions = vec![
            booked(CATEGORY_SETORAN_KASIR, "income", 100_000.0, Some(&reference)),
            booked("Order Payment", "income", 750_000.0, None),
        ];

        let summary = verify_period(period, &[report.clone()], &[], &transactions);
        assert_eq!(summary.summary.kasir_total_recorded, 100_000.0);
        assert_eq!(summary.summary.overall_difference, 0.0);
        assert!(!summary.verification_status.requires_investigation);
        assert_eq!(summary.verification_status.accuracy_rate, 100.0);
        assert_eq!(summary.recommendations[2], "No loket reports in the period");

        let summary = verify_period(period, &[report], &[], &[]);
        assert!(summary.verification_status.requires_investigation);
        assert_eq!(summary.summary.overall_difference, 100_000.0);
        assert_eq!(summary.recommendations[1], "Check kasir reports with a gap above 1%");
    }

    #[test]
    fn test_business_banks() {
        assert_eq!(business_banks(r#"{"banks": ["BCA", " ", "BNI"]}"#), vec!["BCA", "BNI"]);
        assert_eq!(business_banks("{}"), vec!["BRIS", "MANDIRI"]);
        assert_eq!(business_banks("not json"), vec!["BRIS", "MANDIRI"]);
    }

    #[test]
    fn test_kasir_draft_skips_report_bookings() {
        let date = Utc::now().date_naive();
        let transactions = vec![
            booked("Order Payment", "income", 1_000_000.0, None),
            booked(CATEGORY_SETORAN_KASIR, "income", 500_000.0, Some("KASIR-x")),
            booked("Operasional", "expense", 100_000.0, None),
            booked("Topup", "transfer", 50_000.0, None),
        ];

        let draft = kasir_draft_from_transactions("biz", date, &transactions);
        assert_eq!(draft.source_transactions, 3);
        assert_eq!(draft.report.setoran_pagi, 400_000.0);
        assert_eq!(draft.report.setoran_siang, 350_000.0);
        assert_eq!(draft.report.setoran_sore, 250_000.0);
        assert_eq!(draft.totals.total_setoran, 1_000_000.0);
        assert_eq!(draft.totals.total_topup, 50_000.0);
        assert_eq!(draft.report.belanja_loket, 90_000.0);
        assert_eq!(draft.report.pengurangan_kas_kecil, 10_000.0);
        assert_eq!(draft.report.total_admin, 20_000.0);
    }
}
