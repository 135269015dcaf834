use database::postgres::DatabaseConnection;

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Connection pool, only when the PostgreSQL store is selected
    pub db: Option<DatabaseConnection>,
}
