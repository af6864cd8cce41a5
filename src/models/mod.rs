pub mod activity_log;
pub mod business;
pub mod csr_program;
pub mod kasir_report;
pub mod loket_bank_balance;
pub mod loket_report;
pub mod loyalty_program;
pub mod order;
pub mod role;
pub mod setting;
pub mod technical_progress;
pub mod technical_progress_step;
pub mod transaction;
pub mod user;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::activity_log::{self, Entity as ActivityLog};
    pub use super::business::{self, Entity as Business};
    pub use super::csr_program::{self, Entity as CsrProgram};
    pub use super::kasir_report::{self, Entity as KasirReport};
    pub use super::loket_bank_balance::{self, Entity as LoketBankBalance};
    pub use super::loket_report::{self, Entity as LoketReport};
    pub use super::loyalty_program::{self, Entity as LoyaltyProgram};
    pub use super::order::{self, Entity as Order};
    pub use super::role::{self, Entity as Role};
    pub use super::setting::{self, Entity as Setting};
    pub use super::technical_progress::{self, Entity as TechnicalProgress};
    pub use super::technical_progress_step::{self, Entity as TechnicalProgressStep};
    pub use super::transaction::{self, Entity as Transaction};
    pub use super::user::{self, Entity as User};
}
