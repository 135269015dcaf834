use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::User;

/// Repository trait for User persistence
///
/// Every call is a single unit of work. Dropping the returned future cancels
/// it; callers bound it with `tokio::time::timeout` where needed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert or replace the user keyed by its id
    async fn save(&self, user: &User) -> UserResult<()>;

    async fn find_by_id(&self, id: Uuid) -> UserResult<User>;

    /// One page of users in ascending id order.
    ///
    /// `page` is 1-based; both arguments must be at least 1. A page past the
    /// end is empty.
    async fn find_all(&self, page: i64, page_size: i64) -> UserResult<Vec<User>>;

    /// Replace the stored user only if it still exists
    async fn update(&self, user: &User) -> UserResult<User>;

    async fn delete(&self, id: Uuid) -> UserResult<()>;
}

/// Reject pagination parameters below 1 and return the row offset.
pub fn page_offset(page: i64, page_size: i64) -> UserResult<u64> {
    if page < 1 {
        return Err(UserError::InvalidArgument(format!(
            "page must be at least 1, got {}",
            page
        )));
    }
    if page_size < 1 {
        return Err(UserError::InvalidArgument(format!(
            "page_size must be at least 1, got {}",
            page_size
        )));
    }

    (page - 1)
        .checked_mul(page_size)
        .map(|offset| offset as u64)
        .ok_or_else(|| UserError::InvalidArgument("page is out of range".to_string()))
}

/// In-memory implementation of UserRepository (for development/testing)
///
/// Clones share the same store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<BTreeMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: &User) -> UserResult<()> {
        let mut users = self.users.write().await;
        users.insert(user.id, user.clone());

        tracing::debug!(user_id = %user.id, "Saved user");
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> UserResult<User> {
        let users = self.users.read().await;
        users.get(&id).cloned().ok_or(UserError::NotFound(id))
    }

    async fn find_all(&self, page: i64, page_size: i64) -> UserResult<Vec<User>> {
        let offset = page_offset(page, page_size)?;

        let users = self.users.read().await;
        Ok(users
            .values()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(page_size).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn update(&self, user: &User) -> UserResult<User> {
        let mut users = self.users.write().await;
        let stored = users.get_mut(&user.id).ok_or(UserError::NotFound(user.id))?;
        *stored = user.clone();

        tracing::debug!(user_id = %user.id, "Updated user");
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> UserResult<()> {
        let mut users = self.users.write().await;
        users.remove(&id).ok_or(UserError::NotFound(id))?;

        tracing::debug!(user_id = %id, "Deleted user");
        Ok(())
    }
}
