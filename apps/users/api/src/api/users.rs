use axum::Router;
use domain_users::{InMemoryUserRepository, PgUserRepository, UserService, handlers};
use tracing::info;

use crate::state::AppState;

/// Users router backed by PostgreSQL when a pool is present, otherwise by a
/// fresh in-memory store.
pub fn router(state: &AppState) -> Router {
    match &state.db {
        Some(db) => {
            info!(store = %state.config.store, "Serving users from PostgreSQL");
            handlers::router(UserService::new(PgUserRepository::new(db.clone())))
        }
        None => {
            info!(store = %state.config.store, "Serving users from memory");
            handlers::router(UserService::new(InMemoryUserRepository::new()))
        }
    }
}
