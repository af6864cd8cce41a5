use crate::db::DbConn;
use crate::services::activity::ActivityService;

/// Application state containing all shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub activity: ActivityService,
}

impl AppState {
    pub fn new(db: DbConn) -> Self {
        Self {
            activity: ActivityService::new(db.clone()),
            db,
        }
    }
}
