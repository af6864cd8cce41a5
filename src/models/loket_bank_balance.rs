use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "loket_bank_balances")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip_serializing)]
    pub id: i64,
    #[serde(skip_serializing)]
    pub report_id: String,
    #[serde(skip_serializing)]
    pub position: i32,
    pub bank_name: String,
    pub saldo_awal: f64,
    pub saldo_inject: f64,
    pub data_lunas: f64,
    pub setor_kasir: f64,
    pub transfer_amount: f64,
    pub sisa_setoran: f64,
    pub saldo_akhir: f64,
    pub reported_saldo_akhir: Option<f64>,
    pub uang_lebih: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::loket_report::Entity",
        from = "Column::ReportId",
        to = "super::loket_report::Column::Id",
        on_delete = "Cascade"
    )]
    Report,
}

impl Related<super::loket_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Report.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
