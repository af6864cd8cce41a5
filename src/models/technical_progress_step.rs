use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "technical_progress_steps")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub progress_id: String,
    pub position: i32,
    pub step_name: String,
    pub step_weight: i32,
    pub status: String,
    pub notes: Option<String>,
    pub started_at: Option<DateTimeUtc>,
    pub completed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::technical_progress::Entity",
        from = "Column::ProgressId",
        to = "super::technical_progress::Column::Id",
        on_delete = "Cascade"
    )]
    Progress,
}

impl Related<super::technical_progress::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Progress.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
