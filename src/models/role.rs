use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user::Entity")]
    Users,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fixed role ids
pub const OWNER: i32 = 1;
pub const MANAGER: i32 = 2;
pub const FINANCE: i32 = 3;
pub const CUSTOMER_SERVICE: i32 = 4;
pub const KASIR: i32 = 5;
pub const LOKET: i32 = 6;
pub const TEKNISI: i32 = 7;

/// Seeded roles: (id, name, description)
pub const DEFAULT_ROLES: [(i32, &str, &str); 7] = [
    (OWNER, "Owner", "Full access to every business and setting"),
    (MANAGER, "Manager", "Manages businesses, orders and staff"),
    (FINANCE, "Finance", "Accounting, transactions and reconciliation"),
    (CUSTOMER_SERVICE, "Customer Service", "Takes orders and handles customers"),
    (KASIR, "Kasir", "Cashier: payments and daily cash reports"),
    (LOKET, "Loket", "Counter teller: shift reports and orders"),
    (TEKNISI, "Teknisi", "Field technician for installation orders"),
];

pub fn role_name(role_id: i32) -> Option<&'static str> {
    DEFAULT_ROLES
        .iter()
        .find(|(id, _, _)| *id == role_id)
        .map(|(_, name, _)| *name)
}
