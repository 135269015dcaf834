use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::UserResult;
use crate::models::{CreateUser, UpdateUser, User, validation_error};
use crate::repository::UserRepository;

/// Service layer for User business logic
///
/// Holds nothing but the repository, so clones are cheap and share storage.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Validate and persist a new user
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create_user(&self, input: CreateUser) -> UserResult<User> {
        let user = User::new(input)?;
        self.repository.save(&user).await?;

        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    /// Apply the non-empty fields of `input` to an existing user
    #[instrument(skip(self, input))]
    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> UserResult<User> {
        input.validate().map_err(validation_error)?;

        let mut user = self.repository.find_by_id(id).await?;
        user.apply_update(input);

        let updated = self.repository.update(&user).await?;

        tracing::info!(user_id = %id, "Updated user");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> UserResult<User> {
        self.repository.find_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> UserResult<()> {
        self.repository.delete(id).await?;

        tracing::info!(user_id = %id, "Deleted user");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self, page: i64, page_size: i64) -> UserResult<Vec<User>> {
        self.repository.find_all(page, page_size).await
    }
}
