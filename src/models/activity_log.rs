use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: Option<String>,
    pub action: String,
    pub description: String,
    pub related_type: Option<String>,
    pub related_id: Option<String>,
    pub metadata: Option<String>, // JSON string for flexible data
    pub ip_address: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// Activity action types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityAction {
    // Authentication
    Login,
    Register,

    // Users
    UserUpdated,
    UserDeleted,
    UserActivated,
    UserDeactivated,

    // Businesses
    BusinessCreated,
    BusinessUpdated,

    // Orders
    OrderCreated,
    OrderUpdated,
    OrderStatusChanged,
    PaymentReceived,

    // Accounting
    TransactionCreated,
    TransactionUpdated,
    TransactionDeleted,

    // Daily reports
    ReportCreated,
    ReportUpdated,
    ReportDeleted,

    // Technical progress
    ProgressUpdated,

    // Programs
    ProgramCreated,
    ProgramUpdated,
    ProgramDeleted,

    // System
    SettingChanged,
    DataReset,
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ActivityAction::Login => "login",
            ActivityAction::Register => "register",
            ActivityAction::UserUpdated => "user_updated",
            ActivityAction::UserDeleted => "user_deleted",
            ActivityAction::UserActivated => "user_activated",
            ActivityAction::UserDeactivated => "user_deactivated",
            ActivityAction::BusinessCreated => "business_created",
            ActivityAction::BusinessUpdated => "business_updated",
            ActivityAction::OrderCreated => "order_created",
            ActivityAction::OrderUpdated => "order_updated",
            ActivityAction::OrderStatusChanged => "order_status_changed",
            ActivityAction::PaymentReceived => "payment_received",
            ActivityAction::TransactionCreated => "transaction_created",
            ActivityAction::TransactionUpdated => "transaction_updated",
            ActivityAction::TransactionDeleted => "transaction_deleted",
            ActivityAction::ReportCreated => "report_created",
            ActivityAction::ReportUpdated => "report_updated",
            ActivityAction::ReportDeleted => "report_deleted",
            ActivityAction::ProgressUpdated => "progress_updated",
            ActivityAction::ProgramCreated => "program_created",
            ActivityAction::ProgramUpdated => "program_updated",
            ActivityAction::ProgramDeleted => "program_deleted",
            ActivityAction::SettingChanged => "setting_changed",
            ActivityAction::DataReset => "data_reset",
        };
        f.write_str(name)
    }
}

// Kinds of records an activity can point at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelatedType {
    User,
    Business,
    Order,
    Transaction,
    LoketReport,
    KasirReport,
    TechnicalProgress,
    LoyaltyProgram,
    CsrProgram,
    Setting,
}

impl std::fmt::Display for RelatedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RelatedType::User => "user",
            RelatedType::Business => "business",
            RelatedType::Order => "order",
            RelatedType::Transaction => "transaction",
            RelatedType::LoketReport => "loket_report",
            RelatedType::KasirReport => "kasir_report",
            RelatedType::TechnicalProgress => "technical_progress",
            RelatedType::LoyaltyProgram => "loyalty_program",
            RelatedType::CsrProgram => "csr_program",
            RelatedType::Setting => "setting",
        };
        f.write_str(name)
    }
}
