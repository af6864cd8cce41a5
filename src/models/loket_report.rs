use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "loket_daily_reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub business_id: String,
    pub report_date: Date,
    pub shift: i32,
    pub nama_petugas: String,
    pub total_setoran_shift: f64,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::loket_bank_balance::Entity")]
    BankBalances,
}

impl Related<super::loket_bank_balance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankBalances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
