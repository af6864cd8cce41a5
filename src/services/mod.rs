pub mod accounting;
pub mod activity;
pub mod bootstrap;
pub mod progress;
pub mod reports;
pub mod security;
pub mod technical_progress;

pub use activity::{ActivityService, NewActivity};
pub use security::*;
