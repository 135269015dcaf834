use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, Statement};
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::User;
use crate::repository::{UserRepository, page_offset};

const USER_COLUMNS: &str = "id, username, email, password, created_at, updated_at";

/// PostgreSQL implementation of UserRepository using raw SeaORM statements
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Row shape of the `users` table
#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            password: row.password,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn save(&self, user: &User) -> UserResult<()> {
        let sql = r#"
            INSERT INTO users (id, username, email, password, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username,
                email = EXCLUDED.email,
                password = EXCLUDED.password,
                created_at = EXCLUDED.created_at,
                updated_at = EXCLUDED.updated_at
        "#;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.username.clone().into(),
                user.email.clone().into(),
                user.password.clone().into(),
                user.created_at.into(),
                user.updated_at.into(),
            ],
        );

        self.db.execute_raw(stmt).await?;

        tracing::debug!(user_id = %user.id, "Saved user");
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> UserResult<User> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .ok_or(UserError::NotFound(id))?;

        Ok(row.into())
    }

    async fn find_all(&self, page: i64, page_size: i64) -> UserResult<Vec<User>> {
        let offset = page_offset(page, page_size)?;

        let sql = format!(
            "SELECT {} FROM users ORDER BY id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [page_size.into(), (offset as i64).into()],
        );

        let rows = UserRow::find_by_statement(stmt).all(&self.db).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, user: &User) -> UserResult<User> {
        let sql = format!(
            r#"
            UPDATE users
            SET username = $2, email = $3, password = $4, updated_at = $5
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.username.clone().into(),
                user.email.clone().into(),
                user.password.clone().into(),
                user.updated_at.into(),
            ],
        );

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .ok_or(UserError::NotFound(user.id))?;

        tracing::debug!(user_id = %user.id, "Updated user");
        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> UserResult<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM users WHERE id = $1",
            [id.into()],
        );

        let result = self.db.execute_raw(stmt).await?;
        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id));
        }

        tracing::debug!(user_id = %id, "Deleted user");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateUser;
    use sea_orm::{DbErr, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn user() -> User {
        User::new(CreateUser {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret".to_string(),
        })
        .unwrap()
    }

    fn row(user: &User) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([
            ("id", user.id.into()),
            ("username", user.username.clone().into()),
            ("email", user.email.clone().into()),
            ("password", user.password.clone().into()),
            ("created_at", user.created_at.into()),
            ("updated_at", user.updated_at.into()),
        ])
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_maps_row() {
        let alice = user();
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![row(&alice)]])
            .into_connection();

        let found = PgUserRepository::new(db).find_by_id(alice.id).await.unwrap();
        assert_eq!(found, alice);
    }

    #[tokio::test]
    async fn test_find_by_id_without_row_is_not_found() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
            .into_connection();

        let id = Uuid::now_v7();
        let err = PgUserRepository::new(db).find_by_id(id).await.unwrap_err();
        assert!(matches!(err, UserError::NotFound(got) if got == id));
    }

    #[tokio::test]
    async fn test_save_issues_upsert() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_exec_results([exec(1)])
            .into_connection();
        let repo = PgUserRepository::new(db.clone());

        repo.save(&user()).await.unwrap();

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("ON CONFLICT (id) DO UPDATE"));
    }

    #[tokio::test]
    async fn test_update_without_row_is_not_found() {
        let alice = user();
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
            .into_connection();

        let err = PgUserRepository::new(db).update(&alice).await.unwrap_err();
        assert!(matches!(err, UserError::NotFound(id) if id == alice.id));
    }

    #[tokio::test]
    async fn test_delete_zero_rows_is_not_found() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_exec_results([exec(1), exec(0)])
            .into_connection();
        let repo = PgUserRepository::new(db);
        let id = Uuid::now_v7();

        repo.delete(id).await.unwrap();
        assert!(matches!(repo.delete(id).await, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_all_validates_before_querying() {
        let db = MockDatabase::new(DbBackend::Postgres).into_connection();
        let repo = PgUserRepository::new(db);

        assert!(matches!(repo.find_all(0, 10).await, Err(UserError::InvalidArgument(_))));
        assert!(matches!(repo.find_all(1, 0).await, Err(UserError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_driver_error_is_storage() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection refused".to_string())])
            .into_connection();

        let err = PgUserRepository::new(db)
            .find_by_id(Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Storage(msg) if msg.contains("connection refused")));
    }
}
