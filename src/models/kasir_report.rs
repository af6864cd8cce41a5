use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kasir_daily_reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub business_id: String,
    pub report_date: Date,
    pub setoran_pagi: f64,
    pub setoran_siang: f64,
    pub setoran_sore: f64,
    pub setoran_deposit_loket_luar: f64,
    pub setoran_pelunasan_pagi: f64,
    pub setoran_pelunasan_siang: f64,
    #[serde(skip_serializing)]
    pub topup_transactions: String, // JSON array of {amount, description}
    pub penerimaan_kas_kecil: f64,
    pub pengurangan_kas_kecil: f64,
    pub belanja_loket: f64,
    pub total_admin: f64,
    pub saldo_bank: f64,
    pub saldo_brankas: f64,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
