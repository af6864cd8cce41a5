pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_roles;
mod m20250301_000002_create_users;
mod m20250301_000003_create_businesses;
mod m20250301_000004_create_orders;
mod m20250301_000005_create_transactions;
mod m20250301_000006_create_activity_logs;
mod m20250301_000007_create_settings;
mod m20250301_000008_create_loket_reports;
mod m20250301_000009_create_kasir_reports;
mod m20250301_000010_create_programs;
mod m20250301_000011_create_technical_progress;
mod m20250301_000012_seed_roles;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_roles::Migration),
            Box::new(m20250301_000002_create_users::Migration),
            Box::new(m20250301_000003_create_businesses::Migration),
            Box::new(m20250301_000004_create_orders::Migration),
            Box::new(m20250301_000005_create_transactions::Migration),
            Box::new(m20250301_000006_create_activity_logs::Migration),
            Box::new(m20250301_000007_create_settings::Migration),
            Box::new(m20250301_000008_create_loket_reports::Migration),
            Box::new(m20250301_000009_create_kasir_reports::Migration),
            Box::new(m20250301_000010_create_programs::Migration),
            Box::new(m20250301_000011_create_technical_progress::Migration),
            Box::new(m20250301_000012_seed_roles::Migration),
        ]
    }
}
